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

use russh_sftp::{client::SftpSession, protocol::OpenFlags};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::connection::Client;

/// SFTP sub-channel opened once per session and reused for every transfer.
pub struct SftpChannel {
    sftp: SftpSession,
}

impl Client {
    /// Start the sftp subsystem on a new channel.
    ///
    /// Some sshd_config does not enable sftp by default. A line like
    /// `Subsystem sftp internal-sftp` is needed on the remote machine.
    pub async fn open_sftp(&self) -> Result<SftpChannel, super::Error> {
        let channel = self.get_channel().await?;
        channel.request_subsystem(true, "sftp").await?;
        let sftp = SftpSession::new(channel.into_stream()).await?;
        Ok(SftpChannel { sftp })
    }
}

impl SftpChannel {
    /// Stream a local file to `dest_file_path`, truncating it.
    pub async fn upload_file(
        &self,
        src_file_path: &Path,
        //This cannot be AsRef<Path> because of underlying lib constraints
        dest_file_path: &str,
    ) -> Result<u64, super::Error> {
        let mut local_file = tokio::fs::File::open(src_file_path).await?;
        let mut remote_file = self
            .sftp
            .open_with_flags(
                dest_file_path,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;

        let copied = tokio::io::copy(&mut local_file, &mut remote_file).await?;
        remote_file.flush().await?;
        remote_file.shutdown().await?;
        Ok(copied)
    }

    /// Stream `remote_file_path` into a local file, creating or truncating it.
    pub async fn download_file(
        &self,
        remote_file_path: &str,
        local_file_path: &Path,
    ) -> Result<u64, super::Error> {
        let mut remote_file = self
            .sftp
            .open_with_flags(remote_file_path, OpenFlags::READ)
            .await?;
        let mut local_file = tokio::fs::File::create(local_file_path).await?;

        let copied = tokio::io::copy(&mut remote_file, &mut local_file).await?;
        local_file.flush().await?;
        Ok(copied)
    }

    pub async fn close(&self) -> Result<(), super::Error> {
        self.sftp.close().await.map_err(super::Error::SftpError)
    }
}
