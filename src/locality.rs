//! Lake-name extraction from locality strings.
//!
//! Extraction is ordered, first match wins:
//!
//! 1. uppercase, drop apostrophes (`'` or `’`) and `)`, expand `L.` to `LAKE`;
//! 2. the word right before `LAKE` or `POND`;
//! 3. otherwise the word right after `LAKE` or `POND`;
//! 4. the override table.
//!
//! A locality with no word next to either anchor yields no name. Those are
//! river and creek sites and never match a survey card.

use tracing::{debug, trace};

use crate::overrides::{NameSource, OverrideTable, ResolvedName};
use crate::record::SpecimenRecord;
use crate::text::{expand_abbreviation, normalize_key, token_after_any, token_before_any};

/// Words that mark a standing body of water.
pub const WATER_ANCHORS: [&str; 2] = ["LAKE", "POND"];

/// Uppercases locality text and expands the lake abbreviation.
#[must_use]
pub fn normalize_locality(locality: &str) -> String {
    let stripped: String = locality
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}' | ')'))
        .collect();
    expand_abbreviation(&stripped, "L.", "LAKE")
}

/// Extracts the raw lake-name token, before any override.
#[must_use]
pub fn extract_lake_name(locality: &str) -> Option<String> {
    let text = normalize_locality(locality);
    let token = token_before_any(&text, &WATER_ANCHORS)
        .or_else(|| token_after_any(&text, &WATER_ANCHORS))?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Counts from one parsing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Names taken as extracted.
    pub extracted: usize,
    /// Names forced by identifier rules.
    pub identifier_overrides: usize,
    /// Names rewritten by value rules.
    pub value_overrides: usize,
    /// Records left without a lake name.
    pub unresolved: usize,
}

impl ParseReport {
    fn record(&mut self, resolved: &ResolvedName) {
        match resolved.source {
            NameSource::Extracted => self.extracted += 1,
            NameSource::Identifier => self.identifier_overrides += 1,
            NameSource::Value => self.value_overrides += 1,
            NameSource::Unresolved => {}
        }
        if resolved.lakename.is_none() {
            self.unresolved += 1;
        }
    }
}

/// Assigns lake names to specimen records.
#[derive(Debug, Clone, Copy)]
pub struct LocalityParser<'p> {
    overrides: &'p OverrideTable,
}

impl<'p> LocalityParser<'p> {
    /// Creates a parser that applies `overrides` after extraction.
    #[must_use]
    pub const fn new(overrides: &'p OverrideTable) -> Self {
        Self { overrides }
    }

    /// Resolves the lake name for one record.
    #[must_use]
    pub fn resolve(&self, record: &SpecimenRecord) -> ResolvedName {
        let extracted = extract_lake_name(&record.locality);
        let resolved = self.overrides.apply(&record.gbif_id, extracted.as_deref());
        if resolved.source == NameSource::Identifier || resolved.source == NameSource::Value {
            trace!(
                gbif_id = %record.gbif_id,
                extracted = ?extracted,
                lakename = ?resolved.lakename,
                "override applied"
            );
        }
        resolved
    }

    /// Sets `lakename` and normalizes `county` on every record.
    #[must_use]
    pub fn parse(&self, records: Vec<SpecimenRecord>) -> (Vec<SpecimenRecord>, ParseReport) {
        let mut report = ParseReport::default();
        let parsed: Vec<SpecimenRecord> = records
            .into_iter()
            .map(|mut record| {
                let resolved = self.resolve(&record);
                report.record(&resolved);
                record.lakename = resolved.lakename;
                record.county = normalize_key(&record.county);
                record
            })
            .collect();

        debug!(
            records = parsed.len(),
            extracted = report.extracted,
            identifier_overrides = report.identifier_overrides,
            value_overrides = report.value_overrides,
            unresolved = report.unresolved,
            "parsed localities"
        );
        (parsed, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::OverrideRule;

    fn specimen(gbif_id: &str, locality: &str) -> SpecimenRecord {
        SpecimenRecord {
            gbif_id: gbif_id.to_string(),
            locality: locality.to_string(),
            county: "Hillsdale".to_string(),
            ..SpecimenRecord::default()
        }
    }

    #[test]
    fn test_extract_before_anchor() {
        assert_eq!(
            extract_lake_name("Bankers Lake, Hillsdale Co.").as_deref(),
            Some("BANKERS")
        );
        assert_eq!(extract_lake_name("Devil Lake").as_deref(), Some("DEVIL"));
        assert_eq!(extract_lake_name("Mud Pond, 2 mi N").as_deref(), Some("MUD"));
    }

    #[test]
    fn test_extract_after_anchor() {
        assert_eq!(extract_lake_name("Lake Orion, Oakland Co.").as_deref(), Some("ORION"));
        assert_eq!(extract_lake_name("pond   Hollow").as_deref(), Some("HOLLOW"));
    }

    #[test]
    fn test_before_takes_priority_over_after() {
        assert_eq!(
            extract_lake_name("Lake Orion at Long Lake").as_deref(),
            Some("LONG")
        );
    }

    #[test]
    fn test_extract_strips_apostrophes_and_parens() {
        assert_eq!(
            extract_lake_name("Devil's Lake (Lenawee Co.)").as_deref(),
            Some("DEVILS")
        );
        assert_eq!(extract_lake_name("(Bass) Lake").as_deref(), Some("BASS"));
    }

    #[test]
    fn test_extract_strips_typographic_apostrophe() {
        assert_eq!(extract_lake_name("Devil\u{2019}s Lake").as_deref(), Some("DEVILS"));
    }

    #[test]
    fn test_extract_expands_abbreviation() {
        assert_eq!(extract_lake_name("Clark L., Jackson Co.").as_deref(), Some("CLARK"));
        assert_eq!(extract_lake_name("L. Orion").as_deref(), Some("ORION"));
    }

    #[test]
    fn test_extract_river_site_is_none() {
        assert_eq!(extract_lake_name("St. Joseph River at Hillsdale"), None);
        assert_eq!(extract_lake_name("Lakeside creek"), None);
        assert_eq!(extract_lake_name(""), None);
    }

    #[test]
    fn test_default_profile_corrects_devil() {
        let profile = crate::profile::LinkageProfile::bundled().unwrap();
        let parser = LocalityParser::new(profile.overrides());
        let resolved = parser.resolve(&specimen("1", "Devil Lake"));
        assert_eq!(resolved.lakename.as_deref(), Some("DEVILS"));
        assert_eq!(resolved.source, NameSource::Value);
    }

    #[test]
    fn test_identifier_override_beats_extraction() {
        let table = OverrideTable::new(vec![
            OverrideRule::identifier("77", Some("BAW BEESE")),
            OverrideRule::value("BANKERS", "BANKER"),
        ])
        .unwrap();
        let parser = LocalityParser::new(&table);
        let resolved = parser.resolve(&specimen("77", "Bankers Lake"));
        assert_eq!(resolved.lakename.as_deref(), Some("BAW BEESE"));
        assert_eq!(resolved.source, NameSource::Identifier);
    }

    #[test]
    fn test_parse_sets_names_and_county() {
        let table = OverrideTable::default();
        let parser = LocalityParser::new(&table);
        let (parsed, report) = parser.parse(vec![
            specimen("1", "Bankers Lake, Hillsdale Co."),
            specimen("2", "St. Joseph River"),
        ]);
        assert_eq!(parsed[0].lakename.as_deref(), Some("BANKERS"));
        assert_eq!(parsed[0].county, "HILLSDALE");
        assert_eq!(parsed[1].lakename, None);
        assert_eq!(report.extracted, 1);
        assert_eq!(report.unresolved, 1);
    }
}
