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

//! Validation of user-supplied connection identifiers.

use anyhow::{bail, Result};

/// Sanitize hostname to prevent injection in SSH connection strings
pub fn sanitize_hostname(hostname: &str) -> Result<String> {
    if hostname.trim().is_empty() {
        bail!("Empty hostname not allowed");
    }

    const MAX_HOSTNAME_LENGTH: usize = 253; // DNS limit
    if hostname.len() > MAX_HOSTNAME_LENGTH {
        bail!(
            "Hostname too long: {} bytes (max: {} bytes)",
            hostname.len(),
            MAX_HOSTNAME_LENGTH
        );
    }

    let is_ipv6 = hostname.starts_with('[') && hostname.ends_with(']');
    if is_ipv6 {
        let ipv6_addr = &hostname[1..hostname.len() - 1];
        if !ipv6_addr.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
            bail!("Invalid IPv6 address format: {}", hostname);
        }
    } else if hostname.contains(':') {
        // Bare IPv6 address, as left by the jump host parser after removing brackets
        if !hostname.chars().all(|c| c.is_ascii_hexdigit() || c == ':') {
            bail!("Invalid characters in hostname: {}", hostname);
        }
    } else {
        let valid_chars = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_';
        if !hostname.chars().all(valid_chars) {
            bail!("Invalid characters in hostname: {}", hostname);
        }

        if hostname.contains("..") {
            bail!("Double dots not allowed in hostname");
        }

        for segment in hostname.split('.') {
            if segment.starts_with('-') || segment.ends_with('-') {
                bail!("Hostname segments cannot start or end with hyphen");
            }
        }
    }

    Ok(hostname.to_string())
}

/// Sanitize username to prevent injection attacks
pub fn sanitize_username(username: &str) -> Result<String> {
    if username.trim().is_empty() {
        bail!("Empty username not allowed");
    }

    // Typical Unix limit is 32
    const MAX_USERNAME_LENGTH: usize = 32;
    if username.len() > MAX_USERNAME_LENGTH {
        bail!(
            "Username too long: {} bytes (max: {} bytes)",
            username.len(),
            MAX_USERNAME_LENGTH
        );
    }

    let valid_chars = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.';
    if !username.chars().all(valid_chars) {
        bail!("Invalid characters in username: {}", username);
    }

    if let Some(first_char) = username.chars().next() {
        if !first_char.is_ascii_alphabetic() && first_char != '_' {
            bail!("Username must start with letter or underscore");
        }
    }

    Ok(username.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_hostname_valid() {
        assert!(sanitize_hostname("login.cluster.example.org").is_ok());
        assert!(sanitize_hostname("192.168.1.1").is_ok());
        assert!(sanitize_hostname("[::1]").is_ok());
        assert!(sanitize_hostname("2001:db8::1").is_ok());
        assert!(sanitize_hostname("my-server.local").is_ok());
    }

    #[test]
    fn test_sanitize_hostname_invalid() {
        assert!(sanitize_hostname("").is_err());
        assert!(sanitize_hostname("example..com").is_err());
        assert!(sanitize_hostname("-example.com").is_err());
        assert!(sanitize_hostname("exam ple.com").is_err());
        assert!(sanitize_hostname("example.com;ls").is_err());
    }

    #[test]
    fn test_sanitize_username() {
        assert!(sanitize_username("john_doe").is_ok());
        assert!(sanitize_username("_system").is_ok());
        assert!(sanitize_username("").is_err());
        assert!(sanitize_username("123user").is_err());
        assert!(sanitize_username("user@host").is_err());
        assert!(sanitize_username(&"a".repeat(33)).is_err());
    }
}
