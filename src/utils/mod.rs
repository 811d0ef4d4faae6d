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

pub mod fs;
pub mod logging;
pub mod sanitize;
pub mod shell;

pub use logging::init_logging;
pub use sanitize::{sanitize_hostname, sanitize_username};
pub use shell::shell_quote;

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Expand tilde (~) in path to home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if path_str == "~" || path_str.starts_with("~/") {
            if let Some(home) = directories::BaseDirs::new() {
                return PathBuf::from(path_str.replacen(
                    '~',
                    &home.home_dir().to_string_lossy(),
                    1,
                ));
            }
        }
    }
    path.to_path_buf()
}

/// Get the login name of the local user.
pub fn get_current_username() -> String {
    whoami::username()
}

/// Format a Duration into a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if total_seconds < 3600 {
        format!("{}m {}s", total_seconds / 60, total_seconds % 60)
    } else if total_seconds < 86400 {
        format!("{}h {}m", total_seconds / 3600, (total_seconds % 3600) / 60)
    } else {
        format!(
            "{}d {}h",
            total_seconds / 86400,
            (total_seconds % 86400) / 3600
        )
    }
}
