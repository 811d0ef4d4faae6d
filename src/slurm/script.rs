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

use std::path::{Path, PathBuf};

use super::converter::bash_to_slurm;
use super::options::SlurmOptions;
use crate::error::{RemoteError, Result};

/// Producer of the final job script text.
pub trait ScriptRenderer: Send + Sync {
    fn render(&self) -> Result<String>;
}

/// A bash script file combined with Slurm options.
#[derive(Debug, Clone)]
pub struct SlurmScript {
    options: SlurmOptions,
    bash_script_path: PathBuf,
}

impl SlurmScript {
    pub fn new(options: SlurmOptions, bash_script_path: impl Into<PathBuf>) -> Self {
        Self {
            options,
            bash_script_path: bash_script_path.into(),
        }
    }

    pub fn options(&self) -> &SlurmOptions {
        &self.options
    }

    pub fn bash_script_path(&self) -> &Path {
        &self.bash_script_path
    }
}

impl ScriptRenderer for SlurmScript {
    /// Read the bash file and prepend the `#SBATCH` header.
    fn render(&self) -> Result<String> {
        let content = std::fs::read_to_string(&self.bash_script_path).map_err(|e| {
            RemoteError::SourceNotFound {
                path: self.bash_script_path.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(bash_to_slurm(&content, Some(&self.options)))
    }
}
