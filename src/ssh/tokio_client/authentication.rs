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

use russh::client::{Handle, Handler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Public key authentication from a private key file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFileAuth {
    pub key_file_path: PathBuf,
    pub key_pass: Option<Zeroizing<String>>,
}

impl KeyFileAuth {
    pub fn new<T: AsRef<Path>>(key_file_path: T, passphrase: Option<&str>) -> Self {
        Self {
            key_file_path: key_file_path.as_ref().to_path_buf(),
            key_pass: passphrase.map(|p| Zeroizing::new(p.to_string())),
        }
    }
}

/// How the server's host key is verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerCheckMethod {
    /// Accept any host key.
    NoCheck,
    /// Use default known_hosts file (~/.ssh/known_hosts)
    DefaultKnownHostsFile,
    /// Use a specific known_hosts file path
    KnownHostsFile(PathBuf),
}

/// Authenticate `handle` as `username` with the private key in `auth`.
pub(super) async fn authenticate<H: Handler>(
    handle: &mut Handle<H>,
    username: &str,
    auth: &KeyFileAuth,
) -> Result<(), super::Error> {
    let cprivk = russh::keys::load_secret_key(
        &auth.key_file_path,
        auth.key_pass.as_ref().map(|p| p.as_str()),
    )
    .map_err(super::Error::KeyInvalid)?;

    let is_authentificated = handle
        .authenticate_publickey(
            username,
            russh::keys::PrivateKeyWithHashAlg::new(
                Arc::new(cprivk),
                handle.best_supported_rsa_hash().await?.flatten(),
            ),
        )
        .await?;
    if !is_authentificated.success() {
        return Err(super::Error::KeyAuthFailed);
    }
    Ok(())
}
