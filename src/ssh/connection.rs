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

//! Connection lifecycle manager.
//!
//! An [`SshConnection`] lazily opens one session to one host and keeps it
//! for every later operation. Before each operation the identity file is
//! re-checked and the transport's liveness flag inspected; a session that
//! went away is replaced transparently.
//!
//! Operations take `&mut self`: a single manager is driven by one task at a
//! time. Use one manager per host for concurrency.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{RemoteError, Result};
use crate::jump::{open_tunnel, TunnelStage};
use crate::ssh::credential::{self, CredentialState};
use crate::ssh::params::{ConnectionParameters, ConnectionRequest};
use crate::ssh::session::{Session, SessionSlot};
use crate::ssh::ssh_config::HostAliasStore;
use crate::ssh::transport::Connector;
use crate::telemetry::{Event, SharedObserver, TracingObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

pub struct SshConnection {
    params: ConnectionParameters,
    connector: Arc<dyn Connector>,
    pub(crate) observer: SharedObserver,
    key_expiration: Duration,
    slot: SessionSlot,
    state: ConnectionState,
}

impl SshConnection {
    pub fn new(params: ConnectionParameters, connector: Arc<dyn Connector>) -> Self {
        Self {
            params,
            connector,
            observer: TracingObserver::shared(),
            key_expiration: credential::hours(credential::DEFAULT_KEY_EXPIRATION_HOURS),
            slot: SessionSlot::new(),
            state: ConnectionState::Disconnected,
        }
    }

    /// Resolve `request` against `store` and build a manager for it.
    pub fn resolve(
        request: ConnectionRequest,
        store: &dyn HostAliasStore,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let params = ConnectionParameters::resolve(request, store)?;
        Ok(Self::new(params, connector))
    }

    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_key_expiration(mut self, expiration: Duration) -> Self {
        self.key_expiration = expiration;
        self
    }

    pub fn params(&self) -> &ConnectionParameters {
        &self.params
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a session is installed and its transport reports itself open.
    pub fn is_connected(&self) -> bool {
        self.slot.get().is_some_and(Session::is_active)
    }

    /// Check the identity file without touching the network.
    pub fn check_credential(&self) -> Result<CredentialState> {
        credential::check_validity(
            &self.params.identity_file,
            self.key_expiration,
            self.observer.as_ref(),
        )
    }

    /// Guarantee a live session.
    ///
    /// The credential is checked on every call. The network is only touched
    /// when no session exists or the current one is no longer active.
    pub async fn ensure_connected(&mut self) -> Result<()> {
        self.check_credential()?;

        let stale = match self.slot.get() {
            Some(session) if session.is_active() => return Ok(()),
            Some(_) => true,
            None => false,
        };

        if stale {
            self.observer.on_event(&Event::SessionStale {
                host: &self.params.effective_hostname,
            });
            if let Some(session) = self.slot.take() {
                session.teardown().await;
            }
        }

        self.establish().await
    }

    /// Current session, establishing one first if needed.
    pub(crate) async fn session(&mut self) -> Result<&Session> {
        self.ensure_connected().await?;
        self.slot.get().ok_or_else(|| {
            RemoteError::connection_failed(
                &self.params.effective_hostname,
                TunnelStage::Target,
                "no session after connecting",
            )
        })
    }

    async fn establish(&mut self) -> Result<()> {
        self.state = ConnectionState::Connecting;
        match self.open_session().await {
            Ok(session) => {
                self.slot.replace(session).await;
                self.state = ConnectionState::Connected;
                self.observer.on_event(&Event::Connected {
                    host: &self.params.effective_hostname,
                    user: &self.params.username,
                    via_jump: self.params.jump.as_ref().map(|j| j.hostname.as_str()),
                });
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                Err(e)
            }
        }
    }

    async fn open_session(&self) -> Result<Session> {
        let tunnel =
            open_tunnel(self.connector.as_ref(), &self.params, self.observer.as_ref()).await?;

        let transfer = match tunnel.primary.open_transfer().await {
            Ok(transfer) => transfer,
            Err(e) => {
                tunnel.primary.disconnect().await;
                if let Some(jump) = &tunnel.jump {
                    jump.disconnect().await;
                }
                return Err(RemoteError::connection_failed(
                    &self.params.effective_hostname,
                    tunnel.final_stage,
                    format!("failed to open SFTP channel: {e}"),
                ));
            }
        };

        Ok(Session {
            primary: tunnel.primary,
            transfer,
            jump: tunnel.jump,
        })
    }

    /// Release the session, if any. Idempotent and never fails.
    pub async fn close(&mut self) {
        if let Some(session) = self.slot.take() {
            session.teardown().await;
            self.observer.on_event(&Event::Disconnected {
                host: &self.params.effective_hostname,
            });
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl std::fmt::Debug for SshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConnection")
            .field("params", &self.params)
            .field("key_expiration", &self.key_expiration)
            .field("state", &self.state)
            .finish()
    }
}
