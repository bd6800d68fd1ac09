//! Field normalization for specimen records.
//!
//! Derives the individual count and, where missing, the sampling year, then
//! filters the table to the profile's state and year window. Nothing here
//! fails: unusable values become `None` and out-of-policy rows are dropped.

use regex::Regex;
use tracing::debug;

use crate::profile::{LinkageProfile, Window};
use crate::record::SpecimenRecord;
use crate::text::digits_in;

/// Century prefixed to two-digit field-number years.
const FIELD_NUMBER_CENTURY: i32 = 1900;

/// Row counts from one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Rows given to the normalizer.
    pub input: usize,
    /// Rows dropped for a different `stateProvince`.
    pub dropped_state: usize,
    /// Rows whose year was derived from the field number.
    pub derived_years: usize,
    /// Rows dropped for a missing or out-of-window year.
    pub dropped_year: usize,
    /// Kept rows with an individual count.
    pub counted: usize,
    /// Rows kept.
    pub output: usize,
}

/// Extracts the individual count from a preparation note.
///
/// Returns `None` if the pattern does not match or the digits overflow.
#[must_use]
pub fn individual_count(pattern: &Regex, preparations: &str) -> Option<u32> {
    pattern
        .captures(preparations)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// Derives a sampling year from a field number such as `"H31-42"`.
///
/// The token before the first hyphen must contain a two-digit run inside
/// `window`; the year is that number in the 1900s.
#[must_use]
pub fn year_from_field_number(field_number: &str, window: Window) -> Option<i32> {
    let token = field_number.split('-').next()?;
    let digits = digits_in(token)?;
    if digits.len() != 2 {
        return None;
    }
    let two_digit: i32 = digits.parse().ok()?;
    window
        .contains(two_digit)
        .then_some(FIELD_NUMBER_CENTURY + two_digit)
}

/// Applies the profile's normalization policy to specimen tables.
#[derive(Debug, Clone)]
pub struct FieldNormalizer<'p> {
    state: &'p str,
    year_window: Window,
    field_number_window: Window,
    count_pattern: &'p Regex,
}

impl<'p> FieldNormalizer<'p> {
    /// Creates a normalizer for `profile`.
    #[must_use]
    pub fn new(profile: &'p LinkageProfile) -> Self {
        let config = profile.config();
        Self {
            state: &config.state,
            year_window: config.year_window,
            field_number_window: config.field_number_window,
            count_pattern: profile.count_pattern(),
        }
    }

    /// Normalizes one record, or returns `None` if it falls outside policy.
    ///
    /// A record whose year is already set keeps it unchanged.
    #[must_use]
    pub fn normalize_record(&self, mut record: SpecimenRecord) -> Option<SpecimenRecord> {
        if record.state_province != self.state {
            return None;
        }
        record.num_individuals = individual_count(self.count_pattern, &record.preparations);
        if record.year.is_none() {
            record.year = year_from_field_number(&record.field_number, self.field_number_window);
            record.year_text = record.year.map(|y| y.to_string()).unwrap_or_default();
        }
        match record.year {
            Some(year) if self.year_window.contains(year) => Some(record),
            _ => None,
        }
    }

    /// Normalizes a table, preserving row order.
    #[must_use]
    pub fn normalize(&self, records: Vec<SpecimenRecord>) -> (Vec<SpecimenRecord>, NormalizeReport) {
        let mut report = NormalizeReport {
            input: records.len(),
            ..NormalizeReport::default()
        };
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            if record.state_province != self.state {
                report.dropped_state += 1;
                continue;
            }
            let had_year = record.year.is_some();
            let Some(normalized) = self.normalize_record(record) else {
                report.dropped_year += 1;
                continue;
            };
            if !had_year {
                report.derived_years += 1;
            }
            if normalized.num_individuals.is_some() {
                report.counted += 1;
            }
            kept.push(normalized);
        }

        report.output = kept.len();
        debug!(
            input = report.input,
            dropped_state = report.dropped_state,
            dropped_year = report.dropped_year,
            derived_years = report.derived_years,
            counted = report.counted,
            "normalized specimen table"
        );
        (kept, report)
    }
}
