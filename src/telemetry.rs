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

//! Observer capability injected into connections and job executors.
//!
//! Components never log through a process-wide handle for events that
//! callers may want to inspect (credential warnings, failed cleanups, ...).
//! They report an [`Event`] to the [`Observer`] they were built with.
//! [`TracingObserver`] is the default and forwards everything to `tracing`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::jump::TunnelStage;

/// Something noteworthy that happened inside the remote layer.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The identity file is still valid but close to expiring.
    CredentialExpiring {
        identity_file: &'a Path,
        remaining: Duration,
    },
    /// A tunnel stage is about to be attempted.
    StageStarted { stage: TunnelStage, host: &'a str },
    /// A session was established.
    Connected {
        host: &'a str,
        user: &'a str,
        via_jump: Option<&'a str>,
    },
    /// The previous session was found inactive and is being replaced.
    SessionStale { host: &'a str },
    /// The session was torn down.
    Disconnected { host: &'a str },
    /// A remote command finished (whatever its exit status).
    CommandFinished {
        command: &'a str,
        exit_status: u32,
    },
    /// A file was copied over the transfer sub-channel.
    FileCopied { from: &'a str, to: &'a str },
    /// The remote staging file could not be removed after a job ran.
    CleanupFailed { remote_path: &'a str, reason: &'a str },
}

/// Receiver of [`Event`]s.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event<'_>);
}

/// Shared handle passed to components at construction.
pub type SharedObserver = Arc<dyn Observer>;

/// Default observer: emits every event as a `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn shared() -> SharedObserver {
        Arc::new(Self)
    }
}

impl Observer for TracingObserver {
    fn on_event(&self, event: &Event<'_>) {
        match *event {
            Event::CredentialExpiring {
                identity_file,
                remaining,
            } => tracing::warn!(
                "SSH key {} will expire in {}. Consider regenerating it soon.",
                identity_file.display(),
                crate::utils::format_duration(remaining)
            ),
            Event::StageStarted { stage, host } => {
                tracing::debug!("Starting {} stage towards {}", stage, host)
            }
            Event::Connected {
                host,
                user,
                via_jump: Some(jump),
            } => tracing::info!("SSH connection established to {user}@{host} via {jump}"),
            Event::Connected { host, user, .. } => {
                tracing::info!("SSH connection established to {user}@{host}")
            }
            Event::SessionStale { host } => {
                tracing::info!("SSH session to {host} is no longer active, reconnecting")
            }
            Event::Disconnected { host } => tracing::info!("SSH connection closed to {host}"),
            Event::CommandFinished {
                command,
                exit_status,
            } => tracing::debug!("Executed command: {command} (exit code: {exit_status})"),
            Event::FileCopied { from, to } => tracing::info!("Copied {from} to {to}"),
            Event::CleanupFailed {
                remote_path,
                reason,
            } => tracing::warn!("Failed to remove remote script {remote_path}: {reason}"),
        }
    }
}

/// Owned copy of an [`Event`], kept by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    CredentialExpiring,
    StageStarted(TunnelStage),
    Connected,
    SessionStale,
    Disconnected,
    CommandFinished(String, u32),
    FileCopied(String, String),
    CleanupFailed(String),
}

/// Observer that remembers what it saw, then forwards to `tracing`.
///
/// Useful for callers that want to surface warnings after an operation,
/// and for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RecordedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, predicate: impl Fn(&RecordedEvent) -> bool) -> usize {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &Event<'_>) {
        let recorded = match *event {
            Event::CredentialExpiring { .. } => RecordedEvent::CredentialExpiring,
            Event::StageStarted { stage, .. } => RecordedEvent::StageStarted(stage),
            Event::Connected { .. } => RecordedEvent::Connected,
            Event::SessionStale { .. } => RecordedEvent::SessionStale,
            Event::Disconnected { .. } => RecordedEvent::Disconnected,
            Event::CommandFinished {
                command,
                exit_status,
            } => RecordedEvent::CommandFinished(command.to_string(), exit_status),
            Event::FileCopied { from, to } => {
                RecordedEvent::FileCopied(from.to_string(), to.to_string())
            }
            Event::CleanupFailed { remote_path, .. } => {
                RecordedEvent::CleanupFailed(remote_path.to_string())
            }
        };
        if let Ok(mut events) = self.events.lock() {
            events.push(recorded);
        }
        TracingObserver.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.on_event(&Event::StageStarted {
            stage: TunnelStage::Direct,
            host: "cluster",
        });
        observer.on_event(&Event::Connected {
            host: "cluster",
            user: "alice",
            via_jump: None,
        });

        assert_eq!(
            observer.events(),
            vec![
                RecordedEvent::StageStarted(TunnelStage::Direct),
                RecordedEvent::Connected
            ]
        );
        assert_eq!(observer.count(|e| *e == RecordedEvent::Connected), 1);
    }
}
