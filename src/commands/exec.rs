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
use std::time::Duration;

use crate::ssh::SshConnection;

/// Run `command` and mirror its output; returns the remote exit status.
pub async fn execute_command(
    conn: &mut SshConnection,
    command: &str,
    timeout: Option<Duration>,
) -> Result<i32> {
    tracing::debug!("Executing on {}: {}", conn.params().hostname, command);
    let output = conn.run(command, timeout).await?;

    if !output.stdout.is_empty() {
        print!("{}", output.stdout);
    }
    if !output.stderr.is_empty() {
        eprint!("{}", output.stderr);
    }

    Ok(i32::try_from(output.exit_status).unwrap_or(i32::MAX))
}
