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

use russh::client::{Config, Handle, Handler};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

use super::authentication::{KeyFileAuth, ServerCheckMethod};

/// An authenticated russh session.
#[derive(Clone)]
pub struct Client {
    pub(super) connection_handle: Arc<Handle<ClientHandler>>,
    pub(super) username: String,
    pub(super) hostname: String,
    pub(super) port: u16,
}

impl Client {
    /// Open a TCP connection to `hostname:port` and authenticate.
    pub async fn connect(
        hostname: &str,
        port: u16,
        username: &str,
        auth: &KeyFileAuth,
        server_check: ServerCheckMethod,
        config: Arc<Config>,
    ) -> Result<Self, super::Error> {
        let handler = ClientHandler::new(hostname.to_string(), port, server_check);
        let mut handle = russh::client::connect(config, (hostname, port), handler).await?;
        super::authentication::authenticate(&mut handle, username, auth).await?;

        Ok(Self::from_handle(handle, username, hostname, port))
    }

    /// Run the SSH handshake over an existing stream and authenticate.
    ///
    /// Used for the target of a jump host, where `stream` is a forwarded
    /// `direct-tcpip` channel. `hostname` and `port` are only used for host
    /// key verification.
    pub async fn connect_stream<S>(
        stream: S,
        hostname: &str,
        port: u16,
        username: &str,
        auth: &KeyFileAuth,
        server_check: ServerCheckMethod,
        config: Arc<Config>,
    ) -> Result<Self, super::Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let handler = ClientHandler::new(hostname.to_string(), port, server_check);
        let mut handle = russh::client::connect_stream(config, stream, handler).await?;
        super::authentication::authenticate(&mut handle, username, auth).await?;

        Ok(Self::from_handle(handle, username, hostname, port))
    }

    fn from_handle(handle: Handle<ClientHandler>, username: &str, hostname: &str, port: u16) -> Self {
        Self {
            connection_handle: Arc::new(handle),
            username: username.to_string(),
            hostname: hostname.to_string(),
            port,
        }
    }

    /// Disconnect from the remote host.
    pub async fn disconnect(&self) -> Result<(), super::Error> {
        self.connection_handle
            .disconnect(russh::Disconnect::ByApplication, "", "")
            .await
            .map_err(super::Error::SshError)
    }

    /// Check if the connection is closed.
    pub fn is_closed(&self) -> bool {
        self.connection_handle.is_closed()
    }
}

impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("username", &self.username)
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("connection_handle", &"Handle<ClientHandler>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ClientHandler {
    hostname: String,
    port: u16,
    server_check: ServerCheckMethod,
}

impl ClientHandler {
    /// Create a new client handler.
    pub fn new(hostname: String, port: u16, server_check: ServerCheckMethod) -> Self {
        Self {
            hostname,
            port,
            server_check,
        }
    }
}

impl Handler for ClientHandler {
    type Error = super::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh::keys::PublicKey,
    ) -> Result<bool, Self::Error> {
        match &self.server_check {
            ServerCheckMethod::NoCheck => Ok(true),
            ServerCheckMethod::KnownHostsFile(known_hosts_path) => {
                russh::keys::check_known_hosts_path(
                    &self.hostname,
                    self.port,
                    server_public_key,
                    known_hosts_path,
                )
                .map_err(|_| super::Error::ServerCheckFailed)
            }
            ServerCheckMethod::DefaultKnownHostsFile => {
                russh::keys::check_known_hosts(&self.hostname, self.port, server_public_key)
                    .map_err(|_| super::Error::ServerCheckFailed)
            }
        }
    }
}
