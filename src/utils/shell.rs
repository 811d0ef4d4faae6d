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

/// Quote a word for a POSIX shell.
///
/// Words made only of characters that are never special to the shell are
/// returned unchanged, so plain paths such as `/tmp/job.sh` stay readable
/// in logs and command lines.
pub fn shell_quote(word: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "/._-+:,@%=".contains(c);

    if !word.is_empty() && word.chars().all(is_plain) {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}

/// Pick a heredoc delimiter that does not occur as a line of `content`.
pub fn heredoc_delimiter(content: &str) -> String {
    let mut delimiter = String::from("EOF");
    let mut n = 0;
    while content.lines().any(|line| line == delimiter) {
        n += 1;
        delimiter = format!("EOF_{n}");
    }
    delimiter
}
