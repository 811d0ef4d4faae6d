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
pub mod exec;
pub mod ping;
pub mod script;
pub mod submit;
pub mod transfer;

use owo_colors::OwoColorize;

/// Print an error chain under a result line, one indented line per cause.
pub(crate) fn print_error_chain(error: &dyn std::fmt::Display) {
    let error_chain = format!("{error:#}");
    for (i, line) in error_chain.lines().enumerate() {
        if i == 0 {
            println!("    {} {}", "└".dimmed(), line.dimmed());
        } else {
            println!("      {}", line.dimmed());
        }
    }
}
