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

use std::io;
use thiserror::Error;

/// Faults raised by the russh-backed client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Key authentication failed")]
    KeyAuthFailed,
    #[error("Unable to load key, bad passphrase or invalid format: {0}")]
    KeyInvalid(#[source] russh::keys::Error),
    #[error("Unable to resolve address: {0}")]
    AddressInvalid(#[source] io::Error),
    #[error("The executed command didn't send an exit code")]
    CommandDidntExit,
    #[error("Server host key check failed")]
    ServerCheckFailed,
    #[error("SSH error: {0}")]
    SshError(#[from] russh::Error),
    #[error("SFTP error: {0}")]
    SftpError(#[from] russh_sftp::client::error::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}
