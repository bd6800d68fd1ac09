//! Linkage profiles.
//!
//! A profile is the versioned configuration that accompanies one snapshot of
//! the reference datasets: the normalization policy, the lake-name override
//! table and the set of survey transcriptions known to be duplicates. Profiles
//! are plain JSON so they can be diffed when the reference data changes.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;
use crate::overrides::{OverrideRule, OverrideTable};

const DEFAULT_PROFILE: &str = include_str!("../profiles/default.json");

/// Inclusive integer window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    /// Lower bound (inclusive).
    pub min: i32,
    /// Upper bound (inclusive).
    pub max: i32,
}

impl Window {
    /// Creates a window.
    #[must_use]
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Returns true if `value` lies in the window.
    #[must_use]
    pub const fn contains(&self, value: i32) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(self, window: &'static str) -> Result<Self, ProfileError> {
        if self.min > self.max {
            return Err(ProfileError::InvalidWindow {
                window,
                min: self.min,
                max: self.max,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Survey columns holding environmental measurements.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementColumns {
    pub area: String,
    pub depth: String,
    pub temperature: String,
    pub shoreline_development: String,
}

impl Default for MeasurementColumns {
    fn default() -> Self {
        Self {
            area: "area".to_string(),
            depth: "max_depth".to_string(),
            temperature: "temperature".to_string(),
            shoreline_development: "shoreline_development".to_string(),
        }
    }
}

/// Serialized form of a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Label of the dataset snapshot this profile belongs to.
    pub version: String,
    /// Required `stateProvince`, compared exactly.
    pub state: String,
    /// Accepted sampling years.
    pub year_window: Window,
    /// Accepted two-digit years in field numbers.
    pub field_number_window: Window,
    /// Regular expression whose first capture group is the individual count.
    pub count_pattern: String,
    /// Override rules in evaluation order.
    pub overrides: Vec<OverrideRule>,
    /// Survey `subject_id`s known to duplicate another transcription.
    pub duplicate_subjects: Vec<String>,
    pub measurement_columns: MeasurementColumns,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            version: "unversioned".to_string(),
            state: "Michigan".to_string(),
            year_window: Window::new(1915, 1995),
            field_number_window: Window::new(19, 96),
            count_pattern: r"EtOH - (\d+)".to_string(),
            overrides: Vec::new(),
            duplicate_subjects: Vec::new(),
            measurement_columns: MeasurementColumns::default(),
        }
    }
}

impl ProfileConfig {
    /// Parses a profile from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns [`ProfileError::Json`] if the document is not a valid profile.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A validated profile, ready to drive the pipeline.
#[derive(Debug, Clone)]
pub struct LinkageProfile {
    config: ProfileConfig,
    count_pattern: Regex,
    overrides: OverrideTable,
    duplicate_subjects: HashSet<String>,
    fingerprint: String,
}

impl LinkageProfile {
    /// Validates and compiles a profile.
    ///
    /// # Errors
    /// - either window has `min > max`;
    /// - the count pattern does not compile or has no capture group;
    /// - the override table is inconsistent.
    pub fn new(config: ProfileConfig) -> Result<Self, ProfileError> {
        config.year_window.validate("year")?;
        config.field_number_window.validate("field number")?;

        let count_pattern =
            Regex::new(&config.count_pattern).map_err(|e| ProfileError::InvalidCountPattern {
                pattern: config.count_pattern.clone(),
                reason: e.to_string(),
            })?;
        if count_pattern.captures_len() < 2 {
            return Err(ProfileError::InvalidCountPattern {
                pattern: config.count_pattern.clone(),
                reason: "pattern needs a capture group for the count".to_string(),
            });
        }

        let overrides = OverrideTable::new(config.overrides.clone())?;
        let duplicate_subjects = config
            .duplicate_subjects
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let canonical = serde_json::to_vec(&config)?;
        let fingerprint = blake3::hash(&canonical).to_hex().to_string();

        Ok(Self {
            config,
            count_pattern,
            overrides,
            duplicate_subjects,
            fingerprint,
        })
    }

    /// Parses and compiles a profile from JSON.
    ///
    /// # Errors
    /// See [`ProfileConfig::from_json`] and [`LinkageProfile::new`].
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Self::new(ProfileConfig::from_json(json)?)
    }

    /// Loads a profile from a JSON file.
    ///
    /// # Errors
    /// Returns [`ProfileError::Io`] if the file cannot be read, otherwise as
    /// [`LinkageProfile::from_json`].
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let json = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// The profile shipped with the crate.
    ///
    /// # Errors
    /// Only if the bundled JSON is invalid.
    pub fn bundled() -> Result<Self, ProfileError> {
        Self::from_json(DEFAULT_PROFILE)
    }

    /// The serialized configuration.
    #[must_use]
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Snapshot label.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Stable hex digest of the configuration.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Compiled preparation count pattern.
    #[must_use]
    pub fn count_pattern(&self) -> &Regex {
        &self.count_pattern
    }

    /// Validated override table.
    #[must_use]
    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Survey `subject_id`s excluded after the join, trimmed.
    #[must_use]
    pub fn duplicate_subjects(&self) -> &HashSet<String> {
        &self.duplicate_subjects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_profile_compiles() {
        let profile = LinkageProfile::bundled().unwrap();
        assert_eq!(profile.version(), "default");
        assert_eq!(profile.config().state, "Michigan");
        assert_eq!(profile.config().year_window, Window::new(1915, 1995));
        assert_eq!(profile.config().field_number_window, Window::new(19, 96));
        assert!(!profile.overrides().is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let profile = LinkageProfile::from_json(r#"{"version": "2021-snapshot"}"#).unwrap();
        assert_eq!(profile.version(), "2021-snapshot");
        assert_eq!(profile.config().count_pattern, r"EtOH - (\d+)");
        assert!(profile.overrides().is_empty());
        assert!(profile.duplicate_subjects().is_empty());
    }

    #[test]
    fn test_duplicate_subjects() {
        let profile =
            LinkageProfile::from_json(r#"{"duplicate_subjects": ["51234", " 51240 ", ""]}"#)
                .unwrap();
        let subjects = profile.duplicate_subjects();
        assert!(subjects.contains("51234"));
        assert!(subjects.contains("51240"));
        assert!(!subjects.contains(""));
        assert_eq!(profile.duplicate_subjects().len(), 2);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let err = LinkageProfile::from_json(r#"{"year_window": {"min": 1995, "max": 1915}}"#)
            .unwrap_err();
        assert!(matches!(err, ProfileError::InvalidWindow { window: "year", .. }));
    }

    #[test]
    fn test_count_pattern_without_group_rejected() {
        let err = LinkageProfile::from_json(r#"{"count_pattern": "EtOH - \\d+"}"#).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidCountPattern { .. }));
    }

    #[test]
    fn test_invalid_count_pattern_rejected() {
        let err = LinkageProfile::from_json(r#"{"count_pattern": "EtOH - (\\d+"}"#).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidCountPattern { .. }));
    }

    #[test]
    fn test_inconsistent_overrides_rejected() {
        let json = r#"{"overrides": [
            {"kind": "value", "extracted": "DEVIL", "lakename": "DEVILS"},
            {"kind": "value", "extracted": "DEVIL", "lakename": "DEVIL"}
        ]}"#;
        let err = LinkageProfile::from_json(json).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidOverrideTable { .. }));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let a = LinkageProfile::from_json(r#"{"version": "a"}"#).unwrap();
        let a_again = LinkageProfile::from_json(r#"{"version": "a"}"#).unwrap();
        let b = LinkageProfile::from_json(r#"{"version": "a", "duplicate_subjects": ["1"]}"#)
            .unwrap();
        assert_eq!(a.fingerprint(), a_again.fingerprint());
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LinkageProfile::load(Path::new("/nonexistent/profile.json")).unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
    }

    #[test]
    fn test_window_contains() {
        let w = Window::new(19, 96);
        assert!(w.contains(19));
        assert!(w.contains(96));
        assert!(!w.contains(18));
        assert!(!w.contains(97));
        assert_eq!(format!("{w}"), "[19, 96]");
    }
}
