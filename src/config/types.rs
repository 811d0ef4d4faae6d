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

use serde::{Deserialize, Serialize};

use crate::slurm::SlurmOptions;
use crate::ssh::credential::DEFAULT_KEY_EXPIRATION_HOURS;
use crate::ssh::HostKeyPolicy;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// Options applied to every rendered job script.
    #[serde(default)]
    pub slurm: SlurmOptions,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Defaults {
    /// Identity files older than this are refused.
    pub key_expiration_hours: f64,
    /// OpenSSH client configuration used as the host-alias store.
    pub ssh_config: String,
    pub host_key_checking: HostKeyPolicy,
    /// Where `script` stages files on the remote side.
    pub remote_dir: String,
    /// Timeout in seconds for remote commands; unset waits forever.
    pub command_timeout: Option<u64>,
    pub user: Option<String>,
    pub identity_file: Option<String>,
    pub port: Option<u16>,
    /// `[user@]host[:port]`, or `none`.
    pub jump_host: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            key_expiration_hours: DEFAULT_KEY_EXPIRATION_HOURS,
            ssh_config: "~/.ssh/config".to_string(),
            host_key_checking: HostKeyPolicy::default(),
            remote_dir: "/tmp".to_string(),
            command_timeout: None,
            user: None,
            identity_file: None,
            port: None,
            jump_host: None,
        }
    }
}
