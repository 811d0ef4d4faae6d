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

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::executor::ExecutionMode;
use crate::slurm::SlurmOptions;
use crate::ssh::HostKeyPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "remote-slurm",
    version,
    about = "Prepare and run Slurm jobs on a remote cluster over SSH",
    long_about = "remote-slurm connects to a cluster login node over SSH (optionally through a \
                  jump host), then runs commands, transfers files, or renders and submits Slurm \
                  job scripts without any Slurm tooling on the local machine.\n\n\
                  Host aliases, users, keys and ProxyJump settings are read from ~/.ssh/config."
)]
pub struct Cli {
    /// Target host or ~/.ssh/config alias
    #[arg(short = 'H', long, global = true, env = "REMOTE_SLURM_HOST")]
    pub host: Option<String>,

    /// Login name on the target host
    #[arg(short = 'l', long = "user", global = true)]
    pub user: Option<String>,

    /// Private key used to authenticate
    #[arg(short = 'i', long = "identity", global = true)]
    pub identity: Option<PathBuf>,

    /// SSH port of the target host
    #[arg(short = 'p', long, global = true)]
    pub port: Option<u16>,

    /// Jump host, `[user@]host[:port]`; `none` disables ProxyJump from ssh_config
    #[arg(short = 'J', long = "jump-host", global = true)]
    pub jump_host: Option<String>,

    /// Alternative OpenSSH client configuration file
    #[arg(short = 'F', long = "ssh-config", global = true)]
    pub ssh_config: Option<PathBuf>,

    /// Configuration file (default: ~/.config/remote-slurm/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Refuse identity files older than this many hours
    #[arg(long, global = true)]
    pub key_expiration_hours: Option<f64>,

    /// Verify host keys against ~/.ssh/known_hosts (yes/no)
    #[arg(long, global = true)]
    pub strict_host_key_checking: Option<HostKeyPolicy>,

    /// Passphrase for encrypted identity files
    #[arg(long, global = true, env = "REMOTE_SLURM_KEY_PASSPHRASE", hide_env_values = true)]
    pub key_passphrase: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a command on the remote host
    Exec {
        /// Command line to run
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,

        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Copy a local file to the remote host
    Upload {
        /// Local file
        source: PathBuf,
        /// Remote destination path
        destination: String,
    },

    /// Copy a remote file to the local machine
    Download {
        /// Remote file path
        source: String,
        /// Local destination (parent directories are created)
        destination: PathBuf,
    },

    /// Copy a local script to the remote host and run it
    Script {
        /// Local script file
        script: PathBuf,

        /// Remote directory to stage the script in
        #[arg(long)]
        remote_dir: Option<String>,

        /// Arguments passed to the script
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        args: String,

        /// Timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Check that the remote host accepts and runs commands
    Ping,

    /// Render a bash script as a Slurm job and run it on the cluster
    Submit {
        /// Bash script to submit
        script: PathBuf,

        /// interactive (srun) or batch (sbatch)
        #[arg(short, long, value_enum, default_value_t = ExecutionMode::Batch)]
        mode: ExecutionMode,

        /// Remote path of the staged job script (default: /tmp/slurm_script_<hash>.sh)
        #[arg(long)]
        remote_path: Option<String>,

        #[command(flatten)]
        slurm: SlurmArgs,

        /// Timeout in seconds for the scheduler command
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the Slurm job script rendered from a bash script
    Render {
        /// Bash script to render
        script: PathBuf,

        #[command(flatten)]
        slurm: SlurmArgs,
    },
}

/// Common `#SBATCH` options exposed as flags.
#[derive(Args, Debug, Default, Clone)]
pub struct SlurmArgs {
    /// YAML file with Slurm options
    #[arg(long = "options")]
    pub options_file: Option<PathBuf>,

    #[arg(long)]
    pub partition: Option<String>,

    /// Wall time limit, `[DD-]HH:MM:SS`
    #[arg(long)]
    pub time: Option<String>,

    #[arg(long)]
    pub nodes: Option<u32>,

    #[arg(long)]
    pub ntasks: Option<u32>,

    #[arg(long)]
    pub cpus_per_task: Option<u32>,

    /// Memory per node, e.g. `4G`
    #[arg(long)]
    pub mem: Option<String>,

    /// Generic resources, e.g. `gpu:2`
    #[arg(long)]
    pub gres: Option<String>,

    #[arg(long)]
    pub job_name: Option<String>,

    #[arg(long)]
    pub output: Option<String>,

    #[arg(long)]
    pub error: Option<String>,

    #[arg(long)]
    pub account: Option<String>,

    #[arg(long)]
    pub qos: Option<String>,
}

impl SlurmArgs {
    /// Options set directly on the command line.
    pub fn to_options(&self) -> SlurmOptions {
        SlurmOptions {
            partition: self.partition.clone(),
            time: self.time.clone(),
            nodes: self.nodes,
            ntasks: self.ntasks,
            cpus_per_task: self.cpus_per_task,
            mem: self.mem.clone(),
            gres: self.gres.clone(),
            job_name: self.job_name.clone(),
            output: self.output.clone(),
            error: self.error.clone(),
            account: self.account.clone(),
            qos: self.qos.clone(),
            ..Default::default()
        }
    }
}
