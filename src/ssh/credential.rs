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

//! Identity file freshness check.
//!
//! Cluster sites that issue short-lived keys expect clients to refuse stale
//! ones. The check is recomputed from the file's modification time every
//! time a connection is guaranteed, never cached.

use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::error::{RemoteError, Result};
use crate::telemetry::{Event, Observer};

/// Upper bound of the warning window.
pub const MAX_WARNING_THRESHOLD: Duration = Duration::from_secs(7 * 24 * 3600);

/// Default expiration window in hours.
pub const DEFAULT_KEY_EXPIRATION_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Valid,
    /// Still usable, but past the warning threshold.
    Warning,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialState {
    pub age: Duration,
    pub status: CredentialStatus,
}

/// Age after which a still-valid key triggers a warning.
pub fn warning_threshold(expiration: Duration) -> Duration {
    (expiration / 2).min(MAX_WARNING_THRESHOLD)
}

/// Convert a (possibly fractional) number of hours into a [`Duration`].
///
/// NaN and negative values are clamped to zero. Infinity, and anything too
/// large to represent, saturates to [`Duration::MAX`] so the key never expires.
pub fn hours(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value * 3600.0).unwrap_or(Duration::MAX)
}

/// Classify a key of the given age.
pub fn classify(age: Duration, expiration: Duration) -> CredentialStatus {
    if age > expiration {
        CredentialStatus::Expired
    } else if age > warning_threshold(expiration) {
        CredentialStatus::Warning
    } else {
        CredentialStatus::Valid
    }
}

/// Check `identity_file` against the expiration window.
///
/// Succeeds for valid and warning keys (emitting
/// [`Event::CredentialExpiring`] for the latter) and fails with
/// [`RemoteError::MissingCredential`] or [`RemoteError::ExpiredCredential`].
pub fn check_validity(
    identity_file: &Path,
    expiration: Duration,
    observer: &dyn Observer,
) -> Result<CredentialState> {
    let metadata = std::fs::metadata(identity_file).map_err(|e| {
        RemoteError::missing_credential(format!(
            "SSH key not found at {}: {e}",
            identity_file.display()
        ))
    })?;
    if !metadata.is_file() {
        return Err(RemoteError::missing_credential(format!(
            "SSH key at {} is not a regular file",
            identity_file.display()
        )));
    }

    let modified = metadata.modified().map_err(|e| {
        RemoteError::missing_credential(format!(
            "cannot read modification time of {}: {e}",
            identity_file.display()
        ))
    })?;
    // A timestamp in the future counts as brand new
    let age = SystemTime::now()
        .duration_since(modified)
        .unwrap_or(Duration::ZERO);

    let status = classify(age, expiration);
    match status {
        CredentialStatus::Expired => {
            return Err(RemoteError::ExpiredCredential {
                identity_file: identity_file.to_path_buf(),
                age,
                expiration,
            })
        }
        CredentialStatus::Warning => observer.on_event(&Event::CredentialExpiring {
            identity_file,
            remaining: expiration.saturating_sub(age),
        }),
        CredentialStatus::Valid => {}
    }

    Ok(CredentialState { age, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{RecordedEvent, RecordingObserver};
    use std::fs::File;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn key_with_age(dir: &TempDir, age: Duration) -> std::path::PathBuf {
        let path = dir.path().join("id_ed25519");
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    #[test]
    fn test_warning_threshold_is_capped_at_one_week() {
        assert_eq!(warning_threshold(24 * HOUR), 12 * HOUR);
        assert_eq!(warning_threshold(30 * 24 * HOUR), MAX_WARNING_THRESHOLD);
    }

    #[test]
    fn test_classify_windows() {
        let exp = 24 * HOUR;
        assert_eq!(classify(HOUR, exp), CredentialStatus::Valid);
        assert_eq!(classify(12 * HOUR, exp), CredentialStatus::Valid);
        assert_eq!(classify(13 * HOUR, exp), CredentialStatus::Warning);
        assert_eq!(classify(24 * HOUR, exp), CredentialStatus::Warning);
        assert_eq!(classify(25 * HOUR, exp), CredentialStatus::Expired);
    }

    #[test]
    fn test_hours_conversion() {
        assert_eq!(hours(1.5), Duration::from_secs(5400));
        assert_eq!(hours(-3.0), Duration::ZERO);
        assert_eq!(hours(f64::NAN), Duration::ZERO);
        assert_eq!(hours(f64::NEG_INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_hours_saturates_on_huge_values() {
        assert_eq!(hours(f64::INFINITY), Duration::MAX);
        assert_eq!(hours(1e20), Duration::MAX);
    }

    #[test]
    fn test_unbounded_window_accepts_key() {
        let dir = TempDir::new().unwrap();
        let key = key_with_age(&dir, Duration::from_secs(60));
        let observer = RecordingObserver::new();

        let state = check_validity(&key, hours(f64::INFINITY), observer.as_ref()).unwrap();
        assert_eq!(state.status, CredentialStatus::Valid);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_missing_key_is_missing_credential() {
        let dir = TempDir::new().unwrap();
        let observer = RecordingObserver::new();
        let err = check_validity(&dir.path().join("absent"), 24 * HOUR, observer.as_ref())
            .unwrap_err();
        assert!(matches!(err, RemoteError::MissingCredential { .. }));
    }

    #[test]
    fn test_fresh_key_is_silent() {
        let dir = TempDir::new().unwrap();
        let key = key_with_age(&dir, HOUR);
        let observer = RecordingObserver::new();

        let state = check_validity(&key, 24 * HOUR, observer.as_ref()).unwrap();
        assert_eq!(state.status, CredentialStatus::Valid);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_ageing_key_warns_but_succeeds() {
        let dir = TempDir::new().unwrap();
        let key = key_with_age(&dir, 20 * HOUR);
        let observer = RecordingObserver::new();

        let state = check_validity(&key, 24 * HOUR, observer.as_ref()).unwrap();
        assert_eq!(state.status, CredentialStatus::Warning);
        assert_eq!(observer.events(), vec![RecordedEvent::CredentialExpiring]);
    }

    #[test]
    fn test_old_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let key = key_with_age(&dir, 48 * HOUR);
        let observer = RecordingObserver::new();

        let err = check_validity(&key, 24 * HOUR, observer.as_ref()).unwrap_err();
        assert!(matches!(err, RemoteError::ExpiredCredential { .. }));
        assert!(observer.events().is_empty());
    }
}
