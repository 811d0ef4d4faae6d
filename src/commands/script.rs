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
use std::path::Path;
use std::time::Duration;

use crate::ssh::SshConnection;

/// Stage `script` under `remote_dir` and run it; returns its exit status.
pub async fn run_script(
    conn: &mut SshConnection,
    script: &Path,
    remote_dir: &str,
    args: &str,
    timeout: Option<Duration>,
) -> Result<i32> {
    let output = conn.run_script(script, remote_dir, args, timeout).await?;

    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        eprint!("{}", output.stderr);
    }
    if !output.is_success() {
        eprintln!(
            "{} {} exited with status {}",
            "●".red(),
            script.display(),
            output.exit_status
        );
    }

    Ok(i32::try_from(output.exit_status).unwrap_or(i32::MAX))
}
