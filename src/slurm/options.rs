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
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::Path;

/// A count that Slurm also accepts in typed form (`gpus: 2` or `gpus: a100:2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountSpec {
    Count(u32),
    Spec(String),
}

impl fmt::Display for CountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{n}"),
            Self::Spec(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MailType {
    None,
    Begin,
    End,
    Fail,
    Requeue,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Block,
    Cyclic,
    Arbitrary,
    Plane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Append,
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    None,
    Energy,
    Task,
    Lustre,
    Network,
    All,
}

/// `#SBATCH` options of a job.
///
/// Field names map to long option names with `_` replaced by `-`; unset
/// fields emit no directive. Declaration order is directive order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SlurmOptions {
    // Partition and QOS
    pub partition: Option<String>,
    pub qos: Option<String>,
    pub account: Option<String>,

    // Time limits, `[DD-]HH:MM:SS`
    pub time: Option<String>,
    pub time_min: Option<String>,

    // Resource allocation
    pub nodes: Option<u32>,
    pub ntasks: Option<u32>,
    pub ntasks_per_node: Option<u32>,
    pub cpus_per_task: Option<u32>,
    pub ntasks_per_core: Option<u32>,
    pub ntasks_per_socket: Option<u32>,

    // Memory, e.g. `4G`
    pub mem: Option<String>,
    pub mem_per_cpu: Option<String>,
    pub mem_per_gpu: Option<String>,

    // GPUs and generic resources
    pub gres: Option<String>,
    pub gpus: Option<CountSpec>,
    pub gpus_per_node: Option<CountSpec>,
    pub gpus_per_task: Option<CountSpec>,

    // Job identification
    pub job_name: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,

    pub mail_type: Option<MailType>,
    pub mail_user: Option<String>,

    /// e.g. `afterok:12345`
    pub dependency: Option<String>,
    /// e.g. `1-10:2`
    pub array: Option<String>,
    pub constraint: Option<String>,
    pub chdir: Option<String>,
    pub distribution: Option<Distribution>,

    pub priority: Option<i64>,
    pub nice: Option<i64>,

    pub requeue: Option<bool>,
    pub no_requeue: Option<bool>,
    pub signal: Option<String>,

    pub exclusive: Option<bool>,
    pub overcommit: Option<bool>,
    pub wait: Option<bool>,
    pub test_only: Option<bool>,

    pub begin: Option<String>,
    pub deadline: Option<String>,
    pub licenses: Option<String>,
    pub reservation: Option<String>,

    pub core_spec: Option<u32>,
    pub thread_spec: Option<u32>,
    pub sockets_per_node: Option<u32>,
    pub cores_per_socket: Option<u32>,
    pub threads_per_core: Option<u32>,

    pub input: Option<String>,
    pub open_mode: Option<OpenMode>,
    pub network: Option<String>,
    pub het_group: Option<String>,
    pub mpi: Option<String>,

    pub propagate: Option<String>,
    pub export: Option<String>,
    pub export_file: Option<String>,
    pub power: Option<String>,
    pub profile: Option<Profile>,

    pub comment: Option<String>,
    pub wckey: Option<String>,
    pub cluster: Option<String>,
    pub clusters: Option<String>,
}

impl SlurmOptions {
    /// Load options from a YAML mapping file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Slurm options from {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse Slurm options in {}", path.display()))
    }

    /// `(option, value)` pairs for every set field, in declaration order.
    ///
    /// Booleans are rendered lowercase.
    pub fn to_directives(&self) -> Vec<(String, String)> {
        let Ok(Value::Mapping(mapping)) = serde_yaml::to_value(self) else {
            return Vec::new();
        };

        mapping
            .into_iter()
            .filter_map(|(key, value)| {
                let key = key.as_str()?.to_string();
                let value = match value {
                    Value::Null => return None,
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    Value::String(s) => s,
                    other => serde_yaml::to_string(&other).ok()?.trim().to_string(),
                };
                Some((key, value))
            })
            .collect()
    }

    /// Overlay every field set in `other` onto `self`.
    pub fn merged_with(&self, other: &SlurmOptions) -> Result<SlurmOptions> {
        let mut base = to_mapping(self)?;
        for (key, value) in to_mapping(other)? {
            if !value.is_null() {
                base.insert(key, value);
            }
        }
        serde_yaml::from_value(Value::Mapping(base)).context("Failed to merge Slurm options")
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn to_mapping(options: &SlurmOptions) -> Result<Mapping> {
    match serde_yaml::to_value(options).context("Failed to serialize Slurm options")? {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Ok(Mapping::new()),
    }
}
