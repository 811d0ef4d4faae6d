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

use super::*;
use crate::ssh::HostKeyPolicy;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.defaults.key_expiration_hours, 24.0);
    assert_eq!(config.defaults.remote_dir, "/tmp");
    assert_eq!(config.defaults.host_key_checking, HostKeyPolicy::AcceptAll);
    assert!(config.slurm.is_empty());
}

#[test]
fn test_parse_partial_config() {
    let yaml = r#"
defaults:
  key_expiration_hours: 12.5
  host_key_checking: "yes"
  user: alice
  jump_host: ops@bastion:2222

slurm:
  partition: gpu
  time: "04:00:00"
"#;
    let config = Config::parse(yaml).unwrap();
    assert_eq!(config.defaults.key_expiration_hours, 12.5);
    assert_eq!(config.defaults.host_key_checking, HostKeyPolicy::KnownHosts);
    assert_eq!(config.defaults.user.as_deref(), Some("alice"));
    assert_eq!(config.defaults.jump_host.as_deref(), Some("ops@bastion:2222"));
    assert_eq!(config.defaults.ssh_config, "~/.ssh/config");
    assert_eq!(config.slurm.partition.as_deref(), Some("gpu"));
}

#[test]
fn test_parse_empty_and_invalid() {
    assert_eq!(Config::parse("").unwrap(), Config::default());
    assert!(Config::parse("defaults: [1, 2").is_err());
    assert!(Config::parse("slurm:\n  bogus: 1\n").is_err());
}

#[tokio::test]
async fn test_load_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(&dir.path().join("absent.yaml")).await.unwrap();
    assert_eq!(config, Config::default());
}

#[tokio::test]
async fn test_load_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "defaults:\n  remote_dir: /scratch/alice\n").unwrap();

    let config = Config::load_or_default(Some(Path::new(&path))).await.unwrap();
    assert_eq!(config.defaults.remote_dir, "/scratch/alice");
}
