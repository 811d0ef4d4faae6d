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
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::ssh::SshConnection;
use crate::utils::fs::format_bytes;

pub async fn upload_file(conn: &mut SshConnection, source: &Path, destination: &str) -> Result<()> {
    let size = std::fs::metadata(source).map(|m| m.len()).ok();
    conn.copy_to(source, destination)
        .await
        .with_context(|| format!("Failed to upload {}", source.display()))?;

    println!(
        "  {} {} -> {}:{}{}",
        "●".green(),
        source.display().to_string().bold(),
        conn.params().hostname,
        destination,
        size.map(|s| format!(" ({})", format_bytes(s)))
            .unwrap_or_default()
            .dimmed()
    );
    Ok(())
}

pub async fn download_file(
    conn: &mut SshConnection,
    source: &str,
    destination: &Path,
) -> Result<()> {
    conn.copy_from(source, destination)
        .await
        .with_context(|| format!("Failed to download {source}"))?;

    let size = std::fs::metadata(destination).map(|m| m.len()).ok();
    println!(
        "  {} {}:{} -> {}{}",
        "●".green(),
        conn.params().hostname,
        source.bold(),
        destination.display(),
        size.map(|s| format!(" ({})", format_bytes(s)))
            .unwrap_or_default()
            .dimmed()
    );
    Ok(())
}
