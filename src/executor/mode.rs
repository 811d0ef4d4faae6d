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

use clap::ValueEnum;
use std::fmt;

/// How a job script is handed to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExecutionMode {
    /// Run in the foreground and wait for completion (`srun`).
    #[value(alias = "srun")]
    Interactive,
    /// Queue the job and return its id (`sbatch`).
    #[default]
    #[value(alias = "sbatch")]
    Batch,
}

impl ExecutionMode {
    /// Scheduler command implementing this mode.
    pub fn command(self) -> &'static str {
        match self {
            Self::Interactive => "srun",
            Self::Batch => "sbatch",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interactive => "interactive",
            Self::Batch => "batch",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_commands() {
        assert_eq!(ExecutionMode::Interactive.command(), "srun");
        assert_eq!(ExecutionMode::Batch.command(), "sbatch");
        assert_eq!(ExecutionMode::default(), ExecutionMode::Batch);
    }

    #[test]
    fn test_mode_parses_names_and_aliases() {
        assert_eq!(
            ExecutionMode::from_str("interactive", true),
            Ok(ExecutionMode::Interactive)
        );
        assert_eq!(ExecutionMode::from_str("sbatch", true), Ok(ExecutionMode::Batch));
        assert!(ExecutionMode::from_str("queue", true).is_err());
    }
}
