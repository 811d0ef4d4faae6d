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

//! Error taxonomy shared by every remote operation.
//!
//! Each layer returns [`Result<T>`] and maps lower-level transport faults
//! into one of the [`RemoteError`] variants at the call site nearest to
//! where they happen, keeping the original message as context.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::jump::TunnelStage;

/// Outcome of a remote operation.
pub type Result<T, E = RemoteError> = std::result::Result<T, E>;

/// Errors surfaced by the connection, execution and deployment layers.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Username or identity file is unknown, or the identity file is absent.
    #[error("missing credential: {reason}")]
    MissingCredential { reason: String },

    /// The identity file is older than the configured expiration window.
    #[error(
        "SSH key {} is older than {} hours (age {}h). Please regenerate the key.",
        .identity_file.display(),
        .expiration.as_secs_f64() / 3600.0,
        .age.as_secs() / 3600
    )]
    ExpiredCredential {
        identity_file: PathBuf,
        age: Duration,
        expiration: Duration,
    },

    /// Authentication, network or tunnel fault while establishing a session.
    #[error("connection to {host} failed during {stage} stage: {reason}")]
    ConnectionFailed {
        host: String,
        stage: TunnelStage,
        reason: String,
    },

    /// A local file needed by the operation does not exist.
    #[error("local file not found: {}", .path.display())]
    LocalFileNotFound { path: PathBuf },

    /// The bash source of a job script does not exist or can't be read.
    #[error("cannot read bash script {}: {reason}", .path.display())]
    SourceNotFound { path: PathBuf, reason: String },

    /// Writing the rendered script to the remote host failed.
    #[error("failed to upload script to {remote_path}: {source}")]
    UploadFailed {
        remote_path: String,
        #[source]
        source: Box<RemoteError>,
    },

    /// The remote command could not be run, or exited with a non-zero status.
    #[error("remote execution of `{command}` failed: {reason}")]
    RemoteExecutionFailed {
        command: String,
        exit_status: Option<u32>,
        reason: String,
    },

    /// The per-command timeout elapsed before the command finished.
    #[error("command `{command}` timed out after {}s", .timeout.as_secs_f64())]
    TimeoutExceeded { command: String, timeout: Duration },
}

impl RemoteError {
    pub fn missing_credential(reason: impl Into<String>) -> Self {
        Self::MissingCredential {
            reason: reason.into(),
        }
    }

    pub fn connection_failed(
        host: impl Into<String>,
        stage: TunnelStage,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::ConnectionFailed {
            host: host.into(),
            stage,
            reason: reason.to_string(),
        }
    }

    pub fn execution_failed(command: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::RemoteExecutionFailed {
            command: command.into(),
            exit_status: None,
            reason: reason.to_string(),
        }
    }

    /// Short machine-friendly name of the variant, used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential { .. } => "MissingCredential",
            Self::ExpiredCredential { .. } => "ExpiredCredential",
            Self::ConnectionFailed { .. } => "ConnectionFailed",
            Self::LocalFileNotFound { .. } => "LocalFileNotFound",
            Self::SourceNotFound { .. } => "SourceNotFound",
            Self::UploadFailed { .. } => "UploadFailed",
            Self::RemoteExecutionFailed { .. } => "RemoteExecutionFailed",
            Self::TimeoutExceeded { .. } => "TimeoutExceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_failed_keeps_cause() {
        let err = RemoteError::UploadFailed {
            remote_path: "/tmp/job.sh".to_string(),
            source: Box::new(RemoteError::execution_failed("chmod +x /tmp/job.sh", "boom")),
        };
        let message = err.to_string();
        assert!(message.contains("/tmp/job.sh"));
        assert!(message.contains("boom"));
        assert_eq!(err.kind(), "UploadFailed");
    }

    #[test]
    fn test_expired_message_mentions_hours() {
        let err = RemoteError::ExpiredCredential {
            identity_file: PathBuf::from("/home/u/.ssh/id_ed25519"),
            age: Duration::from_secs(48 * 3600),
            expiration: Duration::from_secs(24 * 3600),
        };
        assert!(err.to_string().contains("older than 24 hours"));
    }

    #[test]
    fn test_connection_failed_names_stage() {
        let err = RemoteError::connection_failed("bastion", TunnelStage::Jump, "refused");
        assert_eq!(
            err.to_string(),
            "connection to bastion failed during jump stage: refused"
        );
    }
}
