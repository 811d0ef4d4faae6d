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

use russh::client::Msg;
use russh::Channel;

use super::connection::Client;
use crate::ssh::transport::CommandOutput;

const SSH_CMD_BUFFER_SIZE: usize = 8192;

const SSH_RESPONSE_BUFFER_SIZE: usize = 1024;

/// Originator reported for forwarded channels; port 0 means ephemeral.
const FORWARD_ORIGIN: (&str, u32) = ("127.0.0.1", 0);

impl Client {
    /// Get a new SSH channel for communication.
    pub async fn get_channel(&self) -> Result<Channel<Msg>, super::Error> {
        self.connection_handle
            .channel_open_session()
            .await
            .map_err(super::Error::SshError)
    }

    /// Open a `direct-tcpip` channel from the remote host to `host:port`.
    ///
    /// The host name is resolved by the remote side, so cluster-internal
    /// names work.
    pub async fn open_direct_tcpip_channel(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Channel<Msg>, super::Error> {
        self.connection_handle
            .channel_open_direct_tcpip(host, u32::from(port), FORWARD_ORIGIN.0, FORWARD_ORIGIN.1)
            .await
            .map_err(super::Error::SshError)
    }

    /// Execute a remote command via the ssh connection.
    ///
    /// Returns stdout, stderr and the exit code of the command.
    /// Make sure your commands don't read from stdin and exit after bounded time.
    ///
    /// Every invocation is a new shell context, so `cd`, setting variables and
    /// alike have no effect on later invocations.
    pub async fn execute(&self, command: &str) -> Result<CommandOutput, super::Error> {
        let mut stdout_buffer = Vec::with_capacity(SSH_CMD_BUFFER_SIZE);
        let mut stderr_buffer = Vec::with_capacity(SSH_RESPONSE_BUFFER_SIZE);
        let mut channel = self.get_channel().await?;
        channel.exec(true, command).await?;

        let mut result: Option<u32> = None;

        while let Some(msg) = channel.wait().await {
            match msg {
                russh::ChannelMsg::Data { ref data } => stdout_buffer.extend_from_slice(data),
                russh::ChannelMsg::ExtendedData { ref data, ext } => {
                    if ext == 1 {
                        stderr_buffer.extend_from_slice(data)
                    }
                }

                // Exit status may arrive before the last data packet, so keep
                // reading until the channel closes.
                russh::ChannelMsg::ExitStatus { exit_status } => result = Some(exit_status),
                _ => {}
            }
        }

        match result {
            Some(exit_status) => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&stdout_buffer).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_buffer).into_owned(),
                exit_status,
            }),
            None => Err(super::Error::CommandDidntExit),
        }
    }
}
