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

//! russh implementation of the transport traits.

use async_trait::async_trait;
use russh::client::Config;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

use super::authentication::{KeyFileAuth, ServerCheckMethod};
use super::connection::Client;
use super::file_transfer::SftpChannel;
use crate::ssh::transport::{
    CommandOutput, Connector, Endpoint, TransferChannel, Transport, TransportError, TunnelStream,
};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Opens real SSH sessions.
pub struct RusshConnector {
    config: Arc<Config>,
    server_check: ServerCheckMethod,
    key_pass: Option<Zeroizing<String>>,
}

impl RusshConnector {
    pub fn new(server_check: ServerCheckMethod) -> Self {
        let config = Config {
            keepalive_interval: Some(KEEPALIVE_INTERVAL),
            ..Default::default()
        };
        Self {
            config: Arc::new(config),
            server_check,
            key_pass: None,
        }
    }

    /// Passphrase used to decrypt every identity file.
    pub fn with_key_passphrase(mut self, passphrase: Option<Zeroizing<String>>) -> Self {
        self.key_pass = passphrase;
        self
    }

    fn auth_for(&self, identity_file: &Path) -> KeyFileAuth {
        KeyFileAuth::new(identity_file, self.key_pass.as_ref().map(|p| p.as_str()))
    }
}

#[async_trait]
impl Connector for RusshConnector {
    async fn connect(
        &self,
        endpoint: &Endpoint,
        via: Option<TunnelStream>,
    ) -> Result<Box<dyn Transport>, TransportError> {
        let auth = self.auth_for(&endpoint.identity_file);
        let client = match via {
            Some(stream) => {
                Client::connect_stream(
                    stream,
                    &endpoint.host,
                    endpoint.port,
                    &endpoint.username,
                    &auth,
                    self.server_check.clone(),
                    self.config.clone(),
                )
                .await?
            }
            None => {
                Client::connect(
                    &endpoint.host,
                    endpoint.port,
                    &endpoint.username,
                    &auth,
                    self.server_check.clone(),
                    self.config.clone(),
                )
                .await?
            }
        };
        tracing::debug!("Authenticated to {}", endpoint);
        Ok(Box::new(RusshTransport { client }))
    }
}

struct RusshTransport {
    client: Client,
}

#[async_trait]
impl Transport for RusshTransport {
    fn is_active(&self) -> bool {
        !self.client.is_closed()
    }

    async fn exec(&self, command: &str) -> Result<CommandOutput, TransportError> {
        Ok(self.client.execute(command).await?)
    }

    async fn open_forward(&self, host: &str, port: u16) -> Result<TunnelStream, TransportError> {
        let channel = self.client.open_direct_tcpip_channel(host, port).await?;
        Ok(Box::new(channel.into_stream()))
    }

    async fn open_transfer(&self) -> Result<Box<dyn TransferChannel>, TransportError> {
        Ok(Box::new(self.client.open_sftp().await?))
    }

    async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            tracing::debug!("Disconnect from {} failed: {}", self.client.hostname, e);
        }
    }
}

#[async_trait]
impl TransferChannel for SftpChannel {
    async fn upload(&self, local: &Path, remote: &str) -> Result<u64, TransportError> {
        Ok(self.upload_file(local, remote).await?)
    }

    async fn download(&self, remote: &str, local: &Path) -> Result<u64, TransportError> {
        Ok(self.download_file(remote, local).await?)
    }

    async fn close(&self) {
        if let Err(e) = SftpChannel::close(self).await {
            tracing::debug!("Closing SFTP channel failed: {}", e);
        }
    }
}
