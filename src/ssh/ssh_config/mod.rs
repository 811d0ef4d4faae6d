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

//! OpenSSH client configuration as a host-alias store.
//!
//! Only the keywords needed to reach a cluster are interpreted: `HostName`,
//! `User`, `Port`, `IdentityFile` and `ProxyJump`. Everything else is
//! ignored. As in OpenSSH, the first value obtained for a keyword wins.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

mod parser;
mod pattern;
mod types;

pub use types::{HostAlias, SshHostConfig};

/// Read-only source of per-host connection defaults.
///
/// Lookups never fail: an unknown host, or a store that could not be read,
/// yields an empty [`HostAlias`].
pub trait HostAliasStore: Send + Sync {
    fn lookup(&self, hostname: &str) -> HostAlias;
}

/// A store that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl HostAliasStore for EmptyStore {
    fn lookup(&self, _hostname: &str) -> HostAlias {
        HostAlias::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SshConfig {
    pub hosts: Vec<SshHostConfig>,
}

impl SshConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default per-user location, `~/.ssh/config`.
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh").join("config"))
    }

    /// Load SSH configuration from a file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read SSH config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse SSH config file: {}", path.display()))
    }

    /// Load a configuration file, degrading to an empty configuration.
    ///
    /// An absent file is expected and logged at debug level; an unreadable
    /// or malformed one is logged as a warning.
    pub async fn load_tolerant<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!("SSH config file not found at {}", path.display());
            return Self::new();
        }

        match Self::load_from_file(path).await {
            Ok(config) => {
                tracing::debug!(
                    "Loaded {} host block(s) from {}",
                    config.hosts.len(),
                    path.display()
                );
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse SSH config: {:#}", e);
                Self::new()
            }
        }
    }

    /// Load `~/.ssh/config`, tolerating its absence.
    pub async fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_tolerant(path).await,
            None => Self::new(),
        }
    }

    /// Parse SSH configuration from a string
    pub fn parse(content: &str) -> Result<Self> {
        let hosts = parser::parse(content)?;
        Ok(Self { hosts })
    }

    /// Merge every block matching `hostname`, first value wins.
    pub fn find_host_config(&self, hostname: &str) -> SshHostConfig {
        let mut merged = SshHostConfig::default();
        for host in self
            .hosts
            .iter()
            .filter(|host| pattern::matches_host_pattern(hostname, &host.host_patterns))
        {
            merged.host_patterns.extend(host.host_patterns.iter().cloned());
            if merged.hostname.is_none() {
                merged.hostname = host.hostname.clone();
            }
            if merged.user.is_none() {
                merged.user = host.user.clone();
            }
            if merged.port.is_none() {
                merged.port = host.port;
            }
            if merged.proxy_jump.is_none() {
                merged.proxy_jump = host.proxy_jump.clone();
            }
            merged
                .identity_files
                .extend(host.identity_files.iter().cloned());
        }
        merged
    }
}

impl HostAliasStore for SshConfig {
    fn lookup(&self, hostname: &str) -> HostAlias {
        let host = self.find_host_config(hostname);
        HostAlias {
            // %h is the only token worth honouring here
            hostname: host.hostname.map(|h| h.replace("%h", hostname)),
            user: host.user,
            identity_file: host.identity_files.into_iter().next(),
            port: host.port,
            proxy_jump: host.proxy_jump,
        }
    }
}
