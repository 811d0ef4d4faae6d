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

//! Job deployment: render, place, upload, execute, clean up.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;

use super::mode::ExecutionMode;
use crate::error::{RemoteError, Result};
use crate::slurm::ScriptRenderer;
use crate::ssh::transport::CommandOutput;
use crate::ssh::SshConnection;
use crate::telemetry::{Event, SharedObserver, TracingObserver};
use crate::utils::shell::heredoc_delimiter;
use crate::utils::shell_quote;

/// Scratch directory for generated script names.
pub const STAGING_DIR: &str = "/tmp";

/// Something that runs command lines on the cluster.
#[async_trait]
pub trait RemoteShell: Send {
    async fn run(&mut self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput>;
}

#[async_trait]
impl RemoteShell for SshConnection {
    async fn run(&mut self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput> {
        SshConnection::run(self, command, timeout).await
    }
}

/// Result of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Where the script was staged (and removed from).
    pub remote_path: String,
    /// Scheduler output, e.g. `Submitted batch job 12345`.
    pub output: CommandOutput,
}

impl Submission {
    pub fn stdout(&self) -> &str {
        &self.output.stdout
    }
}

/// Deterministic staging path for `content`.
///
/// Identical content maps to the same path; collisions are not avoided.
pub fn default_remote_path(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let id = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    format!("{STAGING_DIR}/slurm_script_{id}.sh")
}

/// Deploys one rendered script through a [`RemoteShell`].
pub struct JobExecutor<'a, S: RemoteShell + ?Sized> {
    shell: &'a mut S,
    renderer: &'a dyn ScriptRenderer,
    observer: SharedObserver,
    timeout: Option<Duration>,
}

impl<'a, S: RemoteShell + ?Sized> JobExecutor<'a, S> {
    pub fn new(shell: &'a mut S, renderer: &'a dyn ScriptRenderer) -> Self {
        Self {
            shell,
            renderer,
            observer: TracingObserver::shared(),
            timeout: None,
        }
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Bound the scheduler command. Upload and cleanup are not bounded.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render, upload, run with `mode` and remove the script.
    ///
    /// The result reflects the scheduler command only. Once the script
    /// was written, exactly one `rm -f` is issued whatever the command's
    /// outcome; its failure is reported to the observer, never returned.
    pub async fn execute(
        &mut self,
        mode: ExecutionMode,
        remote_path: Option<&str>,
    ) -> Result<Submission> {
        let content = self.renderer.render()?;
        let remote_path = remote_path
            .map(str::to_string)
            .unwrap_or_else(|| default_remote_path(&content));
        let quoted = shell_quote(&remote_path);

        let result = match self.upload(&content, &remote_path, &quoted).await {
            Upload::Done => {
                let command = format!("{} {quoted}", mode.command());
                tracing::info!("Running {} on {}", mode.command(), remote_path);
                self.run_checked(&command, self.timeout).await
            }
            // The write never ran, so nothing reached the remote side
            Upload::Failed {
                file_written: false,
                error,
            } => return Err(error),
            Upload::Failed { error, .. } => Err(error),
        };

        self.cleanup(&remote_path, &quoted).await;
        result.map(|output| Submission {
            remote_path,
            output,
        })
    }

    async fn upload(&mut self, content: &str, remote_path: &str, quoted: &str) -> Upload {
        let delimiter = heredoc_delimiter(content);
        let write = format!("cat > {quoted} << '{delimiter}'\n{content}\n{delimiter}");
        // A non-zero exit still means the redirection created or truncated the file
        let written = match self.shell.run(&write, None).await {
            Ok(output) => check_exit(&write, output),
            Err(e) => {
                return Upload::Failed {
                    file_written: false,
                    error: upload_failed(remote_path, e),
                }
            }
        };
        if let Err(e) = written {
            return Upload::Failed {
                file_written: true,
                error: upload_failed(remote_path, e),
            };
        }

        if let Err(e) = self.run_checked(&format!("chmod +x {quoted}"), None).await {
            return Upload::Failed {
                file_written: true,
                error: upload_failed(remote_path, e),
            };
        }

        tracing::debug!("Uploaded script to {}", remote_path);
        Upload::Done
    }

    async fn cleanup(&mut self, remote_path: &str, quoted: &str) {
        let reason = match self.shell.run(&format!("rm -f {quoted}"), None).await {
            Ok(output) if output.is_success() => return,
            Ok(output) => format!("exit status {}: {}", output.exit_status, output.stderr.trim()),
            Err(e) => e.to_string(),
        };
        self.observer.on_event(&Event::CleanupFailed {
            remote_path,
            reason: &reason,
        });
    }

    /// Run `command`, turning a non-zero exit into an error.
    async fn run_checked(&mut self, command: &str, timeout: Option<Duration>) -> Result<CommandOutput> {
        let output = self.shell.run(command, timeout).await?;
        check_exit(command, output)
    }
}

/// Turn a non-zero exit into an error carrying both output streams.
fn check_exit(command: &str, output: CommandOutput) -> Result<CommandOutput> {
    if output.is_success() {
        return Ok(output);
    }

    let stderr = output.stderr.trim();
    let stdout = output.stdout.trim();
    let mut reason = if stderr.is_empty() {
        format!("exit status {}", output.exit_status)
    } else {
        stderr.to_string()
    };
    if !stdout.is_empty() {
        reason.push_str("\nstdout:\n");
        reason.push_str(stdout);
    }

    Err(RemoteError::RemoteExecutionFailed {
        command: first_line(command).to_string(),
        exit_status: Some(output.exit_status),
        reason,
    })
}

enum Upload {
    Done,
    Failed { file_written: bool, error: RemoteError },
}

fn upload_failed(remote_path: &str, cause: RemoteError) -> RemoteError {
    RemoteError::UploadFailed {
        remote_path: remote_path.to_string(),
        source: Box::new(cause),
    }
}

/// Heredoc uploads carry the whole script; keep errors to the command line.
fn first_line(command: &str) -> &str {
    command.lines().next().unwrap_or(command)
}
