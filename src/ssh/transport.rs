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

//! Transport seam between the connection manager and the SSH engine.
//!
//! The connection manager only talks to these traits. The russh-backed
//! implementation lives in [`crate::ssh::tokio_client`]; tests plug in
//! in-memory implementations.
//!
//! # Implementing a transport
//!
//! ```ignore
//! use async_trait::async_trait;
//! use remote_slurm::ssh::transport::*;
//!
//! struct Loopback;
//!
//! #[async_trait]
//! impl Connector for Loopback {
//!     async fn connect(
//!         &self,
//!         endpoint: &Endpoint,
//!         via: Option<TunnelStream>,
//!     ) -> Result<Box<dyn Transport>, TransportError> {
//!         Err(TransportError::other(format!("{} unreachable", endpoint.host)))
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Byte stream an SSH handshake can run over (a forwarded channel).
pub trait TunnelIo: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> TunnelIo for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Owned forwarded stream handed from the jump stage to the target stage.
pub type TunnelStream = Box<dyn TunnelIo>;

/// Where and as whom to open a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub identity_file: PathBuf,
}

impl Endpoint {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        identity_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            identity_file: identity_file.into(),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Collected result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CommandOutput {
    /// The stdout output of the command.
    pub stdout: String,
    /// The stderr output of the command.
    pub stderr: String,
    /// The unix exit status (`$?` in bash).
    pub exit_status: u32,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_status: u32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_status,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Fault raised by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Ssh(#[from] crate::ssh::tokio_client::Error),
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// An authenticated SSH session (the primary transport).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the underlying session still reports itself as open.
    ///
    /// Must not touch the network.
    fn is_active(&self) -> bool;

    /// Run one command line and collect its output in full.
    async fn exec(&self, command: &str) -> Result<CommandOutput, TransportError>;

    /// Open a `direct-tcpip` channel to `host:port` from an ephemeral local
    /// origin.
    async fn open_forward(&self, host: &str, port: u16) -> Result<TunnelStream, TransportError>;

    /// Open the file transfer sub-channel on this session.
    async fn open_transfer(&self) -> Result<Box<dyn TransferChannel>, TransportError>;

    /// Best-effort disconnect.
    async fn disconnect(&self);
}

/// File transfer sub-channel (SFTP) bound to a [`Transport`].
#[async_trait]
pub trait TransferChannel: Send + Sync {
    /// Stream a local file to `remote`, returning the number of bytes sent.
    async fn upload(&self, local: &Path, remote: &str) -> Result<u64, TransportError>;

    /// Stream `remote` into a local file, returning the number of bytes received.
    async fn download(&self, remote: &str, local: &Path) -> Result<u64, TransportError>;

    /// Best-effort close.
    async fn close(&self);
}

/// Opens transports, either directly or over a forwarded stream.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate to `endpoint`.
    ///
    /// With `via`, the SSH handshake runs over that stream instead of a new
    /// TCP connection.
    async fn connect(
        &self,
        endpoint: &Endpoint,
        via: Option<TunnelStream>,
    ) -> Result<Box<dyn Transport>, TransportError>;
}
