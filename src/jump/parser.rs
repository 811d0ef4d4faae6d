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

use anyhow::{bail, Context, Result};
use std::fmt;

/// One hop of an OpenSSH `ProxyJump` / `-J` value: `[user@]host[:port]`.
///
/// `host` may still be an alias at this point; the parameter resolver looks
/// it up in the host-alias store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JumpSpec {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl JumpSpec {
    pub fn new(host: impl Into<String>, user: Option<String>, port: Option<u16>) -> Self {
        Self {
            user,
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for JumpSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(user) = &self.user {
            write!(f, "{user}@")?;
        }
        if self.host.contains(':') {
            write!(f, "[{}]", self.host)?;
        } else {
            write!(f, "{}", self.host)?;
        }
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}

/// Parse every hop of a comma-separated jump specification.
///
/// An empty string or the OpenSSH keyword `none` yields no hops.
pub fn parse_jump_hosts(jump_spec: &str) -> Result<Vec<JumpSpec>> {
    let jump_spec = jump_spec.trim();
    if jump_spec.is_empty() || jump_spec.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let hops = jump_spec
        .split(',')
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(|hop| {
            parse_single_jump_host(hop)
                .with_context(|| format!("Failed to parse jump host specification: '{hop}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    if hops.is_empty() {
        bail!("No valid jump hosts found in specification: '{jump_spec}'");
    }
    Ok(hops)
}

/// Parse a jump specification down to the single hop this crate tunnels
/// through.
///
/// Multi-hop chains are reduced to their first hop, the one reachable from
/// the client, and a warning is logged.
pub fn parse_single_hop(jump_spec: &str) -> Result<Option<JumpSpec>> {
    let mut hops = parse_jump_hosts(jump_spec)?;
    if hops.len() > 1 {
        tracing::warn!(
            "Only one jump host is supported; using '{}' and ignoring {} further hop(s) in '{}'",
            hops[0],
            hops.len() - 1,
            jump_spec
        );
    }
    Ok(if hops.is_empty() {
        None
    } else {
        Some(hops.swap_remove(0))
    })
}

fn parse_single_jump_host(host_spec: &str) -> Result<JumpSpec> {
    if host_spec.is_empty() {
        bail!("Empty jump host specification");
    }

    let (user, host_port) = match host_spec.split_once('@') {
        Some((user, rest)) => {
            let user = crate::utils::sanitize_username(user).with_context(|| {
                format!("Invalid username in jump host specification: '{host_spec}'")
            })?;
            (Some(user), rest)
        }
        None => (None, host_spec),
    };

    let (host, port) = parse_host_port(host_port)
        .with_context(|| format!("Invalid host:port specification: '{host_port}'"))?;
    let host = crate::utils::sanitize_hostname(&host)
        .with_context(|| format!("Invalid hostname in jump host specification: '{host}'"))?;

    Ok(JumpSpec::new(host, user, port))
}

/// Split `host[:port]`, accepting bracketed IPv6 literals (`[::1]:2222`).
fn parse_host_port(host_port: &str) -> Result<(String, Option<u16>)> {
    if host_port.is_empty() {
        bail!("Empty host specification");
    }

    if let Some(rest) = host_port.strip_prefix('[') {
        let Some((addr, after)) = rest.split_once(']') else {
            bail!("Unclosed bracket in IPv6 address");
        };
        if addr.is_empty() {
            bail!("Empty IPv6 address in brackets");
        }
        return match after {
            "" => Ok((addr.to_string(), None)),
            _ => match after.strip_prefix(':') {
                Some(port) => Ok((addr.to_string(), Some(parse_port(port)?))),
                None => bail!("Invalid characters after IPv6 address: '{after}'"),
            },
        };
    }

    match host_port.rsplit_once(':') {
        // More than one colon without brackets: a bare IPv6 address
        Some((host, _)) if host.contains(':') => Ok((host_port.to_string(), None)),
        Some((host, port)) => {
            if host.is_empty() {
                bail!("Empty hostname");
            }
            Ok((host.to_string(), Some(parse_port(port)?)))
        }
        None => Ok((host_port.to_string(), None)),
    }
}

fn parse_port(port: &str) -> Result<u16> {
    if port.is_empty() {
        bail!("Empty port specification");
    }
    let port = port
        .parse::<u16>()
        .with_context(|| format!("Invalid port number: '{port}'"))?;
    if port == 0 {
        bail!("Port number cannot be zero");
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_host() {
        let hop = parse_single_jump_host("bastion.example.org").unwrap();
        assert_eq!(hop, JumpSpec::new("bastion.example.org", None, None));
    }

    #[test]
    fn test_parse_user_host_port() {
        let hop = parse_single_jump_host("admin@bastion:2222").unwrap();
        assert_eq!(hop.user.as_deref(), Some("admin"));
        assert_eq!(hop.host, "bastion");
        assert_eq!(hop.port, Some(2222));
    }

    #[test]
    fn test_parse_ipv6_forms() {
        assert_eq!(
            parse_single_jump_host("[::1]").unwrap(),
            JumpSpec::new("::1", None, None)
        );
        assert_eq!(
            parse_single_jump_host("ops@[2001:db8::7]:2200").unwrap(),
            JumpSpec::new("2001:db8::7", Some("ops".to_string()), Some(2200))
        );
        assert_eq!(
            parse_single_jump_host("2001:db8::7").unwrap(),
            JumpSpec::new("2001:db8::7", None, None)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_hops() {
        for spec in ["", "@host", "user@", "host:", "host:0", "host:99999", "[::1", "[]"] {
            assert!(parse_single_jump_host(spec).is_err(), "accepted {spec:?}");
        }
    }

    #[test]
    fn test_parse_jump_hosts_none_and_empty() {
        assert!(parse_jump_hosts("").unwrap().is_empty());
        assert!(parse_jump_hosts("none").unwrap().is_empty());
        assert!(parse_jump_hosts("NONE").unwrap().is_empty());
        assert!(parse_jump_hosts(" , ,").is_err());
    }

    #[test]
    fn test_single_hop_takes_first_of_chain() {
        let hop = parse_single_hop(" first@hop1 , hop2:2022 ").unwrap().unwrap();
        assert_eq!(hop, JumpSpec::new("hop1", Some("first".to_string()), None));
        assert!(parse_single_hop("none").unwrap().is_none());
    }

    #[test]
    fn test_display_roundtrips_user_and_port() {
        let hop = JumpSpec::new("bastion", Some("ops".to_string()), Some(2222));
        assert_eq!(hop.to_string(), "ops@bastion:2222");
        assert_eq!(JumpSpec::new("::1", None, Some(22)).to_string(), "[::1]:22");
    }
}
