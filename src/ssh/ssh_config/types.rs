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

use std::path::PathBuf;

/// One `Host` block of an ssh_config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshHostConfig {
    pub host_patterns: Vec<String>,
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity_files: Vec<PathBuf>,
    pub proxy_jump: Option<String>,
}

/// Values a host-alias store knows about one host name.
///
/// Every field is optional; an unknown host yields [`HostAlias::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAlias {
    pub hostname: Option<String>,
    pub user: Option<String>,
    pub identity_file: Option<PathBuf>,
    pub port: Option<u16>,
    /// Raw `ProxyJump` value, parsed by the resolver.
    pub proxy_jump: Option<String>,
}

impl HostAlias {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
