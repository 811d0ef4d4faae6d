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

//! `Host` pattern matching.

/// Whether `hostname` is selected by a `Host` line's pattern list.
///
/// Follows OpenSSH: the block applies when at least one positive pattern
/// matches and no negated (`!pattern`) one does.
pub(super) fn matches_host_pattern(hostname: &str, patterns: &[String]) -> bool {
    let mut matched = false;
    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            if wildcard_match(hostname, negated) {
                return false;
            }
        } else if wildcard_match(hostname, pattern) {
            matched = true;
        }
    }
    matched
}

/// Case-insensitive glob match supporting `*` and `?`.
pub(super) fn wildcard_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    match_recursive(&text, &pattern)
}

fn match_recursive(text: &[char], pattern: &[char]) -> bool {
    match (pattern.first(), text.first()) {
        (None, _) => text.is_empty(),
        (Some('*'), _) => {
            // Zero characters, or one more character
            match_recursive(text, &pattern[1..])
                || (!text.is_empty() && match_recursive(&text[1..], pattern))
        }
        (Some(_), None) => false,
        (Some('?'), Some(_)) => match_recursive(&text[1..], &pattern[1..]),
        (Some(p), Some(t)) => t.eq_ignore_ascii_case(p) && match_recursive(&text[1..], &pattern[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_matching() {
        assert!(wildcard_match("login1.hpc.example.org", "login*.hpc.example.org"));
        assert!(!wildcard_match("gpu1.hpc.example.org", "login*.hpc.example.org"));
        assert!(wildcard_match("node", "?ode"));
        assert!(!wildcard_match("nodes", "?ode"));
        assert!(wildcard_match("anything", "*"));
        assert!(wildcard_match("Cluster", "cluster"));
    }

    #[test]
    fn test_negation_excludes_block() {
        let list = patterns(&["*.hpc.example.org", "!gpu*.hpc.example.org"]);
        assert!(matches_host_pattern("login1.hpc.example.org", &list));
        assert!(!matches_host_pattern("gpu3.hpc.example.org", &list));
    }

    #[test]
    fn test_negation_alone_matches_nothing() {
        assert!(!matches_host_pattern("login", &patterns(&["!gpu"])));
    }
}
