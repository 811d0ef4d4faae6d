// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

pub mod connection;
pub mod credential;
pub mod known_hosts;
pub mod operations;
pub mod params;
pub mod session;
pub mod ssh_config;
pub mod tokio_client;
pub mod transport;

pub use connection::{ConnectionState, SshConnection};
pub use credential::{check_validity, CredentialState, CredentialStatus};
pub use known_hosts::HostKeyPolicy;
pub use params::{ConnectionParameters, ConnectionRequest, JumpOverrides, JumpParameters};
pub use ssh_config::{HostAlias, HostAliasStore, SshConfig};
pub use tokio_client::RusshConnector;
pub use transport::{CommandOutput, Connector, Endpoint, TransferChannel, Transport};
