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

//! Conversion between plain bash scripts and `#SBATCH`-annotated ones.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::options::SlurmOptions;

const DEFAULT_SHEBANG: &str = "#!/bin/bash";
const DIRECTIVE_PREFIX: &str = "#SBATCH";

static DIRECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#SBATCH\s+--([a-zA-Z-]+)=(.+)$").expect("directive pattern is valid")
});

/// Prefix `bash_script` with `#SBATCH` directives.
///
/// The script's shebang is kept (or `#!/bin/bash` added), followed by a
/// blank line, the directives, another blank line and the body.
pub fn bash_to_slurm(bash_script: &str, options: Option<&SlurmOptions>) -> String {
    let mut lines = bash_script.trim().lines().peekable();
    let mut out = Vec::new();

    match lines.peek() {
        Some(first) if first.starts_with("#!") => {
            out.push(first.to_string());
            lines.next();
        }
        _ => out.push(DEFAULT_SHEBANG.to_string()),
    }

    if let Some(options) = options {
        out.push(String::new());
        out.extend(
            options
                .to_directives()
                .into_iter()
                .map(|(key, value)| format!("{DIRECTIVE_PREFIX} --{key}={value}")),
        );
    }

    out.push(String::new());
    out.extend(lines.map(str::to_string));
    out.join("\n")
}

/// Strip (or keep) the `#SBATCH` lines of a Slurm script.
pub fn slurm_to_bash(slurm_script: &str, remove_directives: bool) -> String {
    slurm_script
        .trim()
        .lines()
        .filter(|line| !(remove_directives && line.starts_with(DIRECTIVE_PREFIX)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collect `#SBATCH --key=value` directives; later duplicates win.
pub fn extract_slurm_options(slurm_script: &str) -> BTreeMap<String, String> {
    slurm_script
        .lines()
        .filter_map(|line| DIRECTIVE_RE.captures(line.trim()))
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect()
}
