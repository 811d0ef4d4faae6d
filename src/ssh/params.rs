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

//! Connection parameter resolution.
//!
//! Explicit arguments always win over values found in the host-alias store.

use std::path::PathBuf;

use crate::error::{RemoteError, Result};
use crate::jump::parse_single_hop;
use crate::ssh::ssh_config::HostAliasStore;
use crate::ssh::transport::Endpoint;
use crate::utils::expand_tilde;

pub const DEFAULT_SSH_PORT: u16 = 22;

/// Caller-supplied connection arguments. `None` means "ask the store".
#[derive(Debug, Clone, Default)]
pub struct ConnectionRequest {
    pub hostname: String,
    pub username: Option<String>,
    pub identity_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub jump: JumpOverrides,
}

impl ConnectionRequest {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_identity_file(mut self, identity_file: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(identity_file.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_jump(mut self, spec: impl Into<String>) -> Self {
        self.jump.spec = Some(spec.into());
        self
    }
}

/// Explicit jump host values.
///
/// `spec` replaces the store's `ProxyJump`; `"none"` disables jumping.
#[derive(Debug, Clone, Default)]
pub struct JumpOverrides {
    pub spec: Option<String>,
    pub username: Option<String>,
    pub identity_file: Option<PathBuf>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpParameters {
    pub hostname: String,
    pub username: String,
    /// Falls back to the primary identity when unset.
    pub identity_file: Option<PathBuf>,
    pub port: u16,
}

/// Effective, immutable connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParameters {
    /// Name the caller asked for (possibly an alias).
    pub hostname: String,
    /// Host actually dialled, after alias resolution.
    pub effective_hostname: String,
    pub username: String,
    pub identity_file: PathBuf,
    pub port: u16,
    pub jump: Option<JumpParameters>,
}

impl ConnectionParameters {
    /// Merge `request` over what `store` knows about the host.
    pub fn resolve(request: ConnectionRequest, store: &dyn HostAliasStore) -> Result<Self> {
        let alias = store.lookup(&request.hostname);
        if !alias.is_empty() {
            tracing::debug!("Parsed SSH config for {}: {:?}", request.hostname, alias);
        }

        let effective_hostname = alias
            .hostname
            .clone()
            .unwrap_or_else(|| request.hostname.clone());

        let username = request
            .username
            .or(alias.user)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                RemoteError::missing_credential(format!(
                    "Username not provided and not found in SSH config for host {}",
                    request.hostname
                ))
            })?;

        let identity_file = request
            .identity_file
            .or(alias.identity_file)
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| expand_tilde(&p))
            .ok_or_else(|| {
                RemoteError::missing_credential(format!(
                    "Key path not provided and not found in SSH config for host {}",
                    request.hostname
                ))
            })?;

        let port = request.port.or(alias.port).unwrap_or(DEFAULT_SSH_PORT);

        let jump_spec = request.jump.spec.clone().or(alias.proxy_jump);
        let jump = match jump_spec {
            Some(spec) => resolve_jump(&spec, &request.jump, store)?,
            None => None,
        };

        Ok(Self {
            hostname: request.hostname,
            effective_hostname,
            username,
            identity_file,
            port,
            jump,
        })
    }

    pub fn target_endpoint(&self) -> Endpoint {
        Endpoint::new(
            &self.effective_hostname,
            self.port,
            &self.username,
            &self.identity_file,
        )
    }

    /// Endpoint of the jump host, using the primary identity when the jump
    /// host has none of its own.
    pub fn jump_endpoint(&self) -> Option<Endpoint> {
        self.jump.as_ref().map(|jump| {
            Endpoint::new(
                &jump.hostname,
                jump.port,
                &jump.username,
                jump.identity_file.as_ref().unwrap_or(&self.identity_file),
            )
        })
    }
}

fn resolve_jump(
    spec: &str,
    overrides: &JumpOverrides,
    store: &dyn HostAliasStore,
) -> Result<Option<JumpParameters>> {
    let hop = parse_single_hop(spec).map_err(|e| {
        RemoteError::connection_failed(spec, crate::jump::TunnelStage::Jump, format!("{e:#}"))
    })?;
    let Some(hop) = hop else {
        return Ok(None);
    };

    let alias = store.lookup(&hop.host);
    let hostname = alias.hostname.unwrap_or_else(|| hop.host.clone());
    let username = overrides
        .username
        .clone()
        .or(hop.user)
        .or(alias.user)
        .unwrap_or_else(crate::utils::get_current_username);
    let identity_file = overrides
        .identity_file
        .clone()
        .or(alias.identity_file)
        .map(|p| expand_tilde(&p));
    let port = overrides
        .port
        .or(hop.port)
        .or(alias.port)
        .unwrap_or(DEFAULT_SSH_PORT);

    Ok(Some(JumpParameters {
        hostname,
        username,
        identity_file,
        port,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::ssh_config::{EmptyStore, SshConfig};

    fn store() -> SshConfig {
        SshConfig::parse(
            r#"
Host cluster
    HostName login.hpc.example.org
    User alice
    Port 2222
    IdentityFile /keys/alice
    ProxyJump gate

Host gate
    HostName gw.example.org
    User ops
    IdentityFile /keys/ops
    Port 2022

Host plain
    User bob
    IdentityFile /keys/bob
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_store_values_fill_missing_arguments() {
        let params = ConnectionParameters::resolve(ConnectionRequest::new("cluster"), &store())
            .unwrap();
        assert_eq!(params.hostname, "cluster");
        assert_eq!(params.effective_hostname, "login.hpc.example.org");
        assert_eq!(params.username, "alice");
        assert_eq!(params.identity_file, PathBuf::from("/keys/alice"));
        assert_eq!(params.port, 2222);

        let jump = params.jump.clone().unwrap();
        assert_eq!(jump.hostname, "gw.example.org");
        assert_eq!(jump.username, "ops");
        assert_eq!(jump.identity_file, Some(PathBuf::from("/keys/ops")));
        assert_eq!(jump.port, 2022);
    }

    #[test]
    fn test_explicit_arguments_win() {
        let request = ConnectionRequest::new("cluster")
            .with_username("carol")
            .with_identity_file("/keys/carol")
            .with_port(22)
            .with_jump("admin@other:2200");
        let params = ConnectionParameters::resolve(request, &store()).unwrap();
        assert_eq!(params.username, "carol");
        assert_eq!(params.identity_file, PathBuf::from("/keys/carol"));
        assert_eq!(params.port, 22);

        let jump = params.jump.unwrap();
        assert_eq!(jump.hostname, "other");
        assert_eq!(jump.username, "admin");
        assert_eq!(jump.port, 2200);
        assert_eq!(jump.identity_file, None);
    }

    #[test]
    fn test_jump_none_disables_store_proxy() {
        let request = ConnectionRequest::new("cluster").with_jump("none");
        let params = ConnectionParameters::resolve(request, &store()).unwrap();
        assert!(params.jump.is_none());
        assert!(params.jump_endpoint().is_none());
    }

    #[test]
    fn test_jump_endpoint_falls_back_to_primary_identity() {
        let request = ConnectionRequest::new("plain").with_jump("bastion");
        let params = ConnectionParameters::resolve(request, &store()).unwrap();
        let endpoint = params.jump_endpoint().unwrap();
        assert_eq!(endpoint.host, "bastion");
        assert_eq!(endpoint.port, DEFAULT_SSH_PORT);
        assert_eq!(endpoint.identity_file, PathBuf::from("/keys/bob"));
    }

    #[test]
    fn test_missing_username_or_identity() {
        let err = ConnectionParameters::resolve(ConnectionRequest::new("nowhere"), &EmptyStore)
            .unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredential { .. }));

        let request = ConnectionRequest::new("nowhere").with_username("dave");
        let err = ConnectionParameters::resolve(request, &EmptyStore).unwrap_err();
        assert!(err.to_string().contains("Key path"));
    }

    #[test]
    fn test_target_endpoint_uses_effective_hostname() {
        let params = ConnectionParameters::resolve(ConnectionRequest::new("cluster"), &store())
            .unwrap();
        let endpoint = params.target_endpoint();
        assert_eq!(endpoint.to_string(), "alice@login.hpc.example.org:2222");
    }
}
