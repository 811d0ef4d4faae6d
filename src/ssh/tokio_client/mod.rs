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

//! Thin async SSH client on top of russh and russh-sftp.

pub mod authentication;
pub mod channel_manager;
pub mod connection;
pub mod connector;
pub mod error;
pub mod file_transfer;

pub use authentication::{KeyFileAuth, ServerCheckMethod};
pub use connection::{Client, ClientHandler};
pub use connector::RusshConnector;
pub use error::Error;
pub use file_transfer::SftpChannel;

pub use russh::client::Config;
