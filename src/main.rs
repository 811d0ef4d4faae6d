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
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use zeroize::Zeroizing;

use remote_slurm::{
    cli::{Cli, Commands},
    commands::{
        exec::execute_command,
        ping::ping_host,
        script::run_script,
        submit::{collect_options, render_script, submit_job},
        transfer::{download_file, upload_file},
    },
    config::Config,
    ssh::{credential, ConnectionRequest, RusshConnector, SshConfig, SshConnection},
    utils::{expand_tilde, init_logging},
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::load_or_default(cli.config.as_deref()).await?;

    // Rendering never touches the network
    if let Commands::Render { script, slurm } = &cli.command {
        let options = collect_options(&config.slurm, slurm)?;
        render_script(script, options)?;
        return Ok(0);
    }

    let mut conn = connect(&cli, &config).await?;
    let timeout = |secs: Option<u64>| {
        secs.or(config.defaults.command_timeout)
            .map(Duration::from_secs)
    };

    let result = match cli.command {
        Commands::Exec { command, timeout: t } => {
            execute_command(&mut conn, &command.join(" "), timeout(t)).await
        }
        Commands::Upload {
            source,
            destination,
        } => upload_file(&mut conn, &source, &destination).await.map(|_| 0),
        Commands::Download {
            source,
            destination,
        } => download_file(&mut conn, &source, &destination)
            .await
            .map(|_| 0),
        Commands::Script {
            script,
            remote_dir,
            args,
            timeout: t,
        } => {
            let remote_dir = remote_dir.unwrap_or_else(|| config.defaults.remote_dir.clone());
            run_script(&mut conn, &script, &remote_dir, &args, timeout(t)).await
        }
        Commands::Ping => ping_host(&mut conn)
            .await
            .map(|ok| if ok { 0 } else { 1 }),
        Commands::Submit {
            script,
            mode,
            remote_path,
            slurm,
            timeout: t,
        } => match collect_options(&config.slurm, &slurm) {
            Ok(options) => submit_job(
                &mut conn,
                &script,
                options,
                mode,
                remote_path.as_deref(),
                timeout(t),
            )
            .await
            .map(|_| 0),
            Err(e) => Err(e),
        },
        Commands::Render { .. } => Ok(0),
    };

    conn.close().await;
    result
}

/// Resolve connection parameters from flags, configuration and ssh_config.
async fn connect(cli: &Cli, config: &Config) -> Result<SshConnection> {
    let host = cli
        .host
        .clone()
        .context("No target host given. Use -H <host> or set REMOTE_SLURM_HOST.")?;

    let ssh_config_path = cli
        .ssh_config
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.defaults.ssh_config));
    let store = SshConfig::load_tolerant(expand_tilde(&ssh_config_path)).await;

    let mut request = ConnectionRequest::new(host);
    if let Some(user) = cli.user.clone().or_else(|| config.defaults.user.clone()) {
        request = request.with_username(user);
    }
    if let Some(identity) = cli
        .identity
        .clone()
        .or_else(|| config.defaults.identity_file.clone().map(Into::into))
    {
        request = request.with_identity_file(identity);
    }
    if let Some(port) = cli.port.or(config.defaults.port) {
        request = request.with_port(port);
    }
    if let Some(jump) = cli
        .jump_host
        .clone()
        .or_else(|| config.defaults.jump_host.clone())
    {
        request = request.with_jump(jump);
    }

    let policy = cli
        .strict_host_key_checking
        .unwrap_or(config.defaults.host_key_checking);
    let connector = RusshConnector::new(policy.check_method())
        .with_key_passphrase(cli.key_passphrase.clone().map(Zeroizing::new));

    let expiration_hours = cli
        .key_expiration_hours
        .unwrap_or(config.defaults.key_expiration_hours);

    let conn = SshConnection::resolve(request, &store, Arc::new(connector))?
        .with_key_expiration(credential::hours(expiration_hours));
    tracing::debug!("Resolved connection: {:?}", conn);
    Ok(conn)
}
