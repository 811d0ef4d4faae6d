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

//! Remote operations over a managed connection.
//!
//! Every operation first guarantees a live session and returns that
//! failure unchanged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::connection::SshConnection;
use crate::error::{RemoteError, Result};
use crate::ssh::transport::CommandOutput;
use crate::telemetry::Event;
use crate::utils::shell_quote;

/// Marker echoed by [`SshConnection::check_connection`].
const CHECK_MARKER: &str = "connection_test";
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

impl SshConnection {
    /// Run one command line and collect its output.
    ///
    /// A non-zero exit status is not an error here; inspect
    /// [`CommandOutput::exit_status`].
    pub async fn run(&mut self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput> {
        let observer = self.observer.clone();
        let session = self.session().await?;

        let exec = session.primary.exec(command);
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, exec).await.map_err(|_| {
                RemoteError::TimeoutExceeded {
                    command: command.to_string(),
                    timeout: limit,
                }
            })?,
            None => exec.await,
        };
        let output = result.map_err(|e| RemoteError::execution_failed(command, e))?;

        observer.on_event(&Event::CommandFinished {
            command,
            exit_status: output.exit_status,
        });
        Ok(output)
    }

    /// Upload `local` to `remote` over the transfer sub-channel.
    pub async fn copy_to(&mut self, local: impl AsRef<Path>, remote: &str) -> Result<()> {
        let local = local.as_ref();
        let observer = self.observer.clone();
        let host = self.params().effective_hostname.clone();
        let session = self.session().await?;

        if !local.is_file() {
            tracing::error!("Local file not found: {}", local.display());
            return Err(RemoteError::LocalFileNotFound {
                path: local.to_path_buf(),
            });
        }

        let bytes = session.transfer.upload(local, remote).await.map_err(|e| {
            RemoteError::execution_failed(format!("sftp put {} {remote}", local.display()), e)
        })?;
        tracing::debug!("Uploaded {} bytes", bytes);

        observer.on_event(&Event::FileCopied {
            from: &local.display().to_string(),
            to: &format!("{host}:{remote}"),
        });
        Ok(())
    }

    /// Download `remote` to `local`, creating missing local parent directories.
    pub async fn copy_from(&mut self, remote: &str, local: impl AsRef<Path>) -> Result<()> {
        let local = local.as_ref();
        let observer = self.observer.clone();
        let host = self.params().effective_hostname.clone();
        let session = self.session().await?;
        let command = format!("sftp get {remote} {}", local.display());

        if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RemoteError::execution_failed(
                    &command,
                    format!("cannot create {}: {e}", parent.display()),
                )
            })?;
        }

        let bytes = session
            .transfer
            .download(remote, local)
            .await
            .map_err(|e| RemoteError::execution_failed(&command, e))?;
        tracing::debug!("Downloaded {} bytes", bytes);

        observer.on_event(&Event::FileCopied {
            from: &format!("{host}:{remote}"),
            to: &local.display().to_string(),
        });
        Ok(())
    }

    /// Copy a local script into `remote_dir`, make it executable and run it.
    ///
    /// The first failing stage is returned as-is. A `chmod` that exits
    /// non-zero is reported through its own output, like the script's.
    pub async fn run_script(
        &mut self,
        script: impl AsRef<Path>,
        remote_dir: &str,
        args: &str,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let script = script.as_ref();
        let Some(name) = script.file_name().filter(|_| script.is_file()) else {
            return Err(RemoteError::LocalFileNotFound {
                path: script.to_path_buf(),
            });
        };

        let remote_path = remote_script_path(remote_dir, &name.to_string_lossy());
        self.copy_to(script, &remote_path).await?;

        let quoted = shell_quote(&remote_path);
        let chmod = self.run(&format!("chmod +x {quoted}"), None).await?;
        if !chmod.is_success() {
            return Ok(chmod);
        }

        let args = args.trim();
        let command = if args.is_empty() {
            quoted
        } else {
            format!("{quoted} {args}")
        };
        let output = self.run(&command, timeout).await?;
        tracing::info!(
            "Executed script {} on remote (exit code: {})",
            name.to_string_lossy(),
            output.exit_status
        );
        Ok(output)
    }

    /// Check that the session really executes commands.
    ///
    /// `Ok(false)` means the session is up but the marker command failed or
    /// printed something else.
    pub async fn check_connection(&mut self) -> Result<bool> {
        let output = self
            .run(&format!("echo '{CHECK_MARKER}'"), Some(CHECK_TIMEOUT))
            .await?;
        Ok(output.is_success() && output.stdout.contains(CHECK_MARKER))
    }
}

fn remote_script_path(remote_dir: &str, name: &str) -> String {
    let dir = remote_dir.trim_end_matches('/');
    if dir.is_empty() && remote_dir.starts_with('/') {
        format!("/{name}")
    } else if dir.is_empty() {
        name.to_string()
    } else {
        PathBuf::from(dir).join(name).to_string_lossy().into_owned()
    }
}
