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
use std::time::Duration;

use crate::cli::SlurmArgs;
use crate::executor::{ExecutionMode, JobExecutor};
use crate::slurm::{ScriptRenderer, SlurmOptions, SlurmScript};
use crate::ssh::SshConnection;

/// Layer the configured options, the options file and the flags, in that
/// order of increasing precedence.
pub fn collect_options(configured: &SlurmOptions, args: &SlurmArgs) -> Result<SlurmOptions> {
    let mut options = configured.clone();
    if let Some(path) = &args.options_file {
        options = options.merged_with(&SlurmOptions::load(path)?)?;
    }
    options.merged_with(&args.to_options())
}

/// Print the job script that `submit` would stage.
pub fn render_script(script: &Path, options: SlurmOptions) -> Result<()> {
    let rendered = SlurmScript::new(options, script).render()?;
    print!("{rendered}");
    Ok(())
}

pub async fn submit_job(
    conn: &mut SshConnection,
    script: &Path,
    options: SlurmOptions,
    mode: ExecutionMode,
    remote_path: Option<&str>,
    timeout: Option<Duration>,
) -> Result<()> {
    let renderer = SlurmScript::new(options, script);
    let observer = conn.observer.clone();
    let submission = JobExecutor::new(conn, &renderer)
        .with_observer(observer)
        .with_timeout(timeout)
        .execute(mode, remote_path)
        .await
        .with_context(|| format!("Failed to submit {} in {mode} mode", script.display()))?;

    println!(
        "{} {} ({})",
        "▶".cyan(),
        "Job submitted".bold(),
        mode.command()
    );
    let stdout = submission.stdout().trim_end();
    if !stdout.is_empty() {
        println!("{stdout}");
    }
    if !submission.output.stderr.is_empty() {
        eprint!("{}", submission.output.stderr);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_options_precedence() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("options.yaml");
        std::fs::write(&file, "partition: batch\ntime: \"01:00:00\"\naccount: lab\n").unwrap();

        let configured = SlurmOptions {
            partition: Some("debug".to_string()),
            qos: Some("normal".to_string()),
            ..Default::default()
        };
        let args = SlurmArgs {
            options_file: Some(file),
            time: Some("02:00:00".to_string()),
            ..Default::default()
        };

        let options = collect_options(&configured, &args).unwrap();
        assert_eq!(options.partition.as_deref(), Some("batch"));
        assert_eq!(options.time.as_deref(), Some("02:00:00"));
        assert_eq!(options.account.as_deref(), Some("lab"));
        assert_eq!(options.qos.as_deref(), Some("normal"));
    }

    #[test]
    fn test_collect_options_missing_file() {
        let args = SlurmArgs {
            options_file: Some("/nonexistent/options.yaml".into()),
            ..Default::default()
        };
        assert!(collect_options(&SlurmOptions::default(), &args).is_err());
    }
}
