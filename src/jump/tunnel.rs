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

//! Two-stage connect protocol.
//!
//! Without a jump host a single [`TunnelStage::Direct`] stage opens the
//! target. With one, the stages run strictly in order:
//!
//! 1. [`TunnelStage::Jump`]: connect and authenticate to the jump host;
//! 2. [`TunnelStage::Forward`]: open a `direct-tcpip` channel from the jump
//!    host to the target;
//! 3. [`TunnelStage::Target`]: run the target handshake over that channel.
//!
//! A failing stage aborts the protocol. The target is never contacted
//! directly when a jump host is configured.

use std::fmt;

use crate::error::{RemoteError, Result};
use crate::ssh::params::ConnectionParameters;
use crate::ssh::transport::{Connector, Transport};
use crate::telemetry::{Event, Observer};

/// Named stage of session establishment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TunnelStage {
    /// Straight TCP connection to the target.
    Direct,
    /// Connection to the jump host.
    Jump,
    /// Forwarding channel from the jump host to the target.
    Forward,
    /// Target handshake over the forwarding channel.
    Target,
}

impl fmt::Display for TunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Jump => "jump",
            Self::Forward => "forward",
            Self::Target => "target",
        })
    }
}

/// Transports produced by a successful run of the protocol.
pub struct Tunnel {
    pub primary: Box<dyn Transport>,
    /// Kept alive for as long as `primary`, which rides on it.
    pub jump: Option<Box<dyn Transport>>,
    /// Stage that produced `primary`.
    pub final_stage: TunnelStage,
}

/// Run the connect protocol for `params`.
pub async fn open_tunnel(
    connector: &dyn Connector,
    params: &ConnectionParameters,
    observer: &dyn Observer,
) -> Result<Tunnel> {
    let target = params.target_endpoint();

    let Some(jump_endpoint) = params.jump_endpoint() else {
        observer.on_event(&Event::StageStarted {
            stage: TunnelStage::Direct,
            host: &target.host,
        });
        let primary = connector.connect(&target, None).await.map_err(|e| {
            RemoteError::connection_failed(&target.host, TunnelStage::Direct, e)
        })?;
        return Ok(Tunnel {
            primary,
            jump: None,
            final_stage: TunnelStage::Direct,
        });
    };

    tracing::info!("Connecting through proxy: {}", jump_endpoint);

    observer.on_event(&Event::StageStarted {
        stage: TunnelStage::Jump,
        host: &jump_endpoint.host,
    });
    let jump = connector
        .connect(&jump_endpoint, None)
        .await
        .map_err(|e| RemoteError::connection_failed(&jump_endpoint.host, TunnelStage::Jump, e))?;

    observer.on_event(&Event::StageStarted {
        stage: TunnelStage::Forward,
        host: &target.host,
    });
    let stream = match jump.open_forward(&target.host, target.port).await {
        Ok(stream) => stream,
        Err(e) => {
            jump.disconnect().await;
            return Err(RemoteError::connection_failed(
                &target.host,
                TunnelStage::Forward,
                format!("via {}: {e}", jump_endpoint.host),
            ));
        }
    };

    observer.on_event(&Event::StageStarted {
        stage: TunnelStage::Target,
        host: &target.host,
    });
    let primary = match connector.connect(&target, Some(stream)).await {
        Ok(primary) => primary,
        Err(e) => {
            jump.disconnect().await;
            return Err(RemoteError::connection_failed(
                &target.host,
                TunnelStage::Target,
                e,
            ));
        }
    };

    Ok(Tunnel {
        primary,
        jump: Some(jump),
        final_stage: TunnelStage::Target,
    })
}
