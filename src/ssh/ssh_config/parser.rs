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

use super::types::SshHostConfig;
use crate::utils::expand_tilde;
use anyhow::{bail, Context, Result};
use std::path::Path;

const MAX_LINE_LENGTH: usize = 8192;

pub(super) fn parse(content: &str) -> Result<Vec<SshHostConfig>> {
    let mut hosts = Vec::new();
    let mut current_host: Option<SshHostConfig> = None;
    // Options inside `Match` blocks are not evaluated
    let mut in_match_block = false;

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;

        if raw_line.len() > MAX_LINE_LENGTH {
            bail!("Line {line_number} exceeds maximum length of {MAX_LINE_LENGTH} bytes");
        }

        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, args) = split_keyword(line);
        if keyword.is_empty() {
            continue;
        }

        match keyword.as_str() {
            "host" => {
                if let Some(host) = current_host.take() {
                    hosts.push(host);
                }
                let patterns = split_args(&args);
                if patterns.is_empty() {
                    bail!("Host directive requires at least one pattern at line {line_number}");
                }
                current_host = Some(SshHostConfig {
                    host_patterns: patterns,
                    ..Default::default()
                });
                in_match_block = false;
            }
            "match" => {
                if let Some(host) = current_host.take() {
                    hosts.push(host);
                }
                tracing::debug!("Skipping Match block at line {}", line_number);
                in_match_block = true;
            }
            _ if in_match_block => {}
            _ => match current_host.as_mut() {
                Some(host) => apply_option(host, &keyword, &args)
                    .with_context(|| format!("Error at line {line_number}: {line}"))?,
                None => tracing::debug!(
                    "Ignoring global option '{}' at line {}",
                    keyword,
                    line_number
                ),
            },
        }
    }

    if let Some(host) = current_host {
        hosts.push(host);
    }

    Ok(hosts)
}

/// Apply one option to a host block, keeping the first value seen.
fn apply_option(host: &mut SshHostConfig, keyword: &str, args: &str) -> Result<()> {
    let value = unquote(args);
    if value.is_empty() {
        bail!("Option '{keyword}' requires a value");
    }

    match keyword {
        "hostname" => {
            host.hostname.get_or_insert_with(|| value.to_string());
        }
        "user" => {
            host.user.get_or_insert_with(|| value.to_string());
        }
        "port" => {
            let port: u16 = value
                .parse()
                .with_context(|| format!("Invalid port number: '{value}'"))?;
            if port == 0 {
                bail!("Port number cannot be zero");
            }
            host.port.get_or_insert(port);
        }
        "identityfile" => {
            host.identity_files.push(expand_tilde(Path::new(value)));
        }
        "proxyjump" => {
            host.proxy_jump.get_or_insert_with(|| value.to_string());
        }
        _ => tracing::trace!("Ignoring unsupported option '{}'", keyword),
    }
    Ok(())
}

/// Split `Keyword value`, `Keyword=value` or `Keyword = value`.
fn split_keyword(line: &str) -> (String, String) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let keyword = line[..end].to_lowercase();
    let rest = line[end..].trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();
    (keyword, rest.to_string())
}

fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(|s| unquote(s).to_string()).collect()
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
