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

use super::tokio_client::ServerCheckMethod;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub fn get_default_known_hosts_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(".ssh").join("known_hosts"))
}

/// Host key verification policy.
///
/// Unknown host keys are accepted unless the user opts into verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept any host key without confirmation.
    #[default]
    #[serde(alias = "no")]
    AcceptAll,
    /// Verify against `~/.ssh/known_hosts`; unknown or changed keys fail.
    #[serde(alias = "yes")]
    KnownHosts,
}

impl HostKeyPolicy {
    pub fn check_method(self) -> ServerCheckMethod {
        match self {
            Self::AcceptAll => {
                tracing::debug!("Host key checking disabled");
                ServerCheckMethod::NoCheck
            }
            Self::KnownHosts => match get_default_known_hosts_path() {
                Some(path) => {
                    if !path.exists() {
                        tracing::warn!(
                            "Known hosts file not found at {:?}; every host key will be rejected",
                            path
                        );
                    }
                    ServerCheckMethod::KnownHostsFile(path)
                }
                None => ServerCheckMethod::DefaultKnownHostsFile,
            },
        }
    }
}

impl fmt::Display for HostKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AcceptAll => "no",
            Self::KnownHosts => "yes",
        })
    }
}

impl FromStr for HostKeyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "no" | "false" | "off" | "accept-all" => Ok(Self::AcceptAll),
            "yes" | "true" | "on" | "known-hosts" => Ok(Self::KnownHosts),
            other => Err(format!(
                "invalid host key checking value '{other}' (expected yes or no)"
            )),
        }
    }
}
