//! Exact join of specimen lots to survey cards.
//!
//! The join key is `(county, lakename, year)`. Both sides are compared in
//! join-key form (see [`normalize_key`]) and a specimen missing any component
//! never matches. One card may match many lots. After the join, rows whose
//! card is a known duplicate transcription are removed.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::record::{MatchedRecord, MatchedTable, SpecimenRecord, SurveyTable};
use crate::text::normalize_key;

/// Join key in normalized form.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinKey {
    pub county: String,
    pub lakename: String,
    pub year: i32,
}

impl JoinKey {
    /// Key for a specimen, or `None` if any component is missing.
    #[must_use]
    pub fn for_specimen(record: &SpecimenRecord) -> Option<Self> {
        let county = normalize_key(&record.county);
        let lakename = normalize_key(record.lakename.as_deref()?);
        if county.is_empty() || lakename.is_empty() {
            return None;
        }
        Some(Self {
            county,
            lakename,
            year: record.year?,
        })
    }

    fn for_survey(county: &str, lakename: &str, year: Option<i32>) -> Option<Self> {
        let county = normalize_key(county);
        let lakename = normalize_key(lakename);
        if county.is_empty() || lakename.is_empty() {
            return None;
        }
        Some(Self {
            county,
            lakename,
            year: year?,
        })
    }
}

/// Counts from one matching pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Rows produced by the join.
    pub joined: usize,
    /// Joined rows removed as duplicate transcriptions.
    pub excluded: usize,
    /// Rows in the final table.
    pub matched: usize,
    /// Distinct `(lakename, county)` pairs in the final table. Diagnostic only.
    pub distinct_lakes: usize,
}

/// Joins specimens to survey cards.
#[derive(Debug, Clone, Copy)]
pub struct Matcher<'p> {
    duplicate_subjects: &'p HashSet<String>,
}

impl<'p> Matcher<'p> {
    /// Creates a matcher that drops cards whose `subject_id` is listed.
    #[must_use]
    pub const fn new(duplicate_subjects: &'p HashSet<String>) -> Self {
        Self { duplicate_subjects }
    }

    /// Inner join of `specimens` with `surveys`.
    ///
    /// Rows come out in specimen order; a specimen matching several cards
    /// yields them in survey order.
    #[must_use]
    pub fn match_tables(
        &self,
        specimens: &[SpecimenRecord],
        surveys: &SurveyTable,
    ) -> (MatchedTable, MatchReport) {
        let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (i, card) in surveys.records.iter().enumerate() {
            if let Some(key) = JoinKey::for_survey(&card.county, &card.lakename, card.begin_date_year)
            {
                index.entry(key).or_default().push(i);
            }
        }

        let mut report = MatchReport::default();
        let mut rows = Vec::new();
        for specimen in specimens {
            let Some(key) = JoinKey::for_specimen(specimen) else {
                continue;
            };
            let Some(cards) = index.get(&key) else {
                continue;
            };
            for &i in cards {
                report.joined += 1;
                let card = &surveys.records[i];
                if self.duplicate_subjects.contains(card.subject_id.trim()) {
                    report.excluded += 1;
                    continue;
                }
                rows.push(MatchedRecord {
                    specimen: specimen.clone(),
                    survey: card.clone(),
                });
            }
        }

        report.matched = rows.len();
        report.distinct_lakes = distinct_lakes(&rows);
        debug!(
            specimens = specimens.len(),
            cards = surveys.len(),
            joined = report.joined,
            excluded = report.excluded,
            matched = report.matched,
            distinct_lakes = report.distinct_lakes,
            "matched specimens to survey cards"
        );

        let table = MatchedTable {
            survey_columns: surveys.carried_columns.clone(),
            rows,
        };
        (table, report)
    }
}

/// Number of distinct `(lakename, county)` pairs among matched rows.
#[must_use]
pub fn distinct_lakes(rows: &[MatchedRecord]) -> usize {
    rows.iter()
        .map(|row| (normalize_key(&row.survey.lakename), normalize_key(&row.survey.county)))
        .collect::<HashSet<_>>()
        .len()
}
