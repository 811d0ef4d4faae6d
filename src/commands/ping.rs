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
use anyhow::Result;
use owo_colors::OwoColorize;
use std::time::Instant;

use super::print_error_chain;
use crate::ssh::SshConnection;
use crate::utils::format_duration;

/// Connect and run the marker command; returns whether the host answered.
pub async fn ping_host(conn: &mut SshConnection) -> Result<bool> {
    let target = conn.params().target_endpoint().to_string();
    let via = conn
        .params()
        .jump_endpoint()
        .map(|jump| format!(" via {jump}"))
        .unwrap_or_default();

    println!("\n{} {}\n", "▶".cyan(), "Connection Test Results".bold());

    let started = Instant::now();
    let result = conn.check_connection().await;
    let elapsed = format_duration(started.elapsed());

    let ok = match result {
        Ok(true) => {
            println!(
                "  {} {}{} - {} ({})",
                "●".green(),
                target.bold(),
                via.dimmed(),
                "Connected".green(),
                elapsed
            );
            true
        }
        Ok(false) => {
            println!(
                "  {} {}{} - {}",
                "●".yellow(),
                target.bold(),
                via.dimmed(),
                "Connected, but the marker command did not answer".yellow()
            );
            false
        }
        Err(e) => {
            println!(
                "  {} {}{} - {}",
                "●".red(),
                target.bold(),
                via.dimmed(),
                "Failed".red()
            );
            print_error_chain(&e);
            false
        }
    };
    println!();

    Ok(ok)
}
