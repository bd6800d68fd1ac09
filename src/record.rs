//! Record types for the two input tables and the matched output.
//!
//! Column names are a compatibility surface with the reference datasets and
//! are reproduced verbatim in [`SPECIMEN_COLUMNS`] and [`SURVEY_KEY_COLUMNS`].

/// Specimen columns in input and output order.
pub const SPECIMEN_COLUMNS: [&str; 17] = [
    "gbifID",
    "identifier",
    "basisOfRecord",
    "occurrenceID",
    "catalogNumber",
    "preparations",
    "fieldNumber",
    "eventDate",
    "year",
    "month",
    "day",
    "stateProvince",
    "county",
    "decimalLatitude",
    "decimalLongitude",
    "locality",
    "recordedBy",
];

/// Columns the pipeline derives and appends to each specimen.
pub const DERIVED_COLUMNS: [&str; 2] = ["num_individuals", "lakename"];

/// Survey columns the loader requires.
pub const SURVEY_KEY_COLUMNS: [&str; 5] =
    ["new_key", "lakename", "county", "begin_date_year", "subject_id"];

/// Survey columns shared with the specimen table; they appear once in output.
pub const SHARED_JOIN_COLUMNS: [&str; 2] = ["county", "lakename"];

/// One museum catalog lot.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecimenRecord {
    /// External identifier (`gbifID`).
    pub gbif_id: String,
    pub identifier: String,
    pub basis_of_record: String,
    pub occurrence_id: String,
    pub catalog_number: String,
    /// Free-text preparation note, e.g. `"EtOH - 12"`.
    pub preparations: String,
    /// Collector field number, e.g. `"H31-42"`.
    pub field_number: String,
    pub event_date: String,
    pub year: Option<i32>,
    /// `year` cell as loaded. Replaced when the year is derived.
    pub year_text: String,
    pub month: String,
    pub day: String,
    pub state_province: String,
    pub county: String,
    pub decimal_latitude: String,
    pub decimal_longitude: String,
    /// Free-text locality the lake name is extracted from.
    pub locality: String,
    pub recorded_by: String,

    /// Individuals in the lot, derived from `preparations`.
    pub num_individuals: Option<u32>,
    /// Extracted lake name. `None` means no lake or pond was detected.
    pub lakename: Option<String>,
}

impl SpecimenRecord {
    /// Month as a number, if the cell holds one.
    #[must_use]
    pub fn month(&self) -> Option<u32> {
        parse_whole(&self.month).and_then(|v| u32::try_from(v).ok())
    }

    /// Day as a number, if the cell holds one.
    #[must_use]
    pub fn day(&self) -> Option<u32> {
        parse_whole(&self.day).and_then(|v| u32::try_from(v).ok())
    }

    /// Decimal latitude, if the cell holds a finite number.
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        parse_decimal(&self.decimal_latitude)
    }

    /// Decimal longitude, if the cell holds a finite number.
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        parse_decimal(&self.decimal_longitude)
    }

    /// Cell values in [`SPECIMEN_COLUMNS`] order followed by [`DERIVED_COLUMNS`].
    ///
    /// Loaded cells are written back as read. The year falls back to the
    /// parsed value when no cell text is held.
    #[must_use]
    pub fn cells(&self) -> Vec<String> {
        let year = if self.year_text.is_empty() {
            opt_cell(self.year)
        } else {
            self.year_text.clone()
        };
        vec![
            self.gbif_id.clone(),
            self.identifier.clone(),
            self.basis_of_record.clone(),
            self.occurrence_id.clone(),
            self.catalog_number.clone(),
            self.preparations.clone(),
            self.field_number.clone(),
            self.event_date.clone(),
            year,
            self.month.clone(),
            self.day.clone(),
            self.state_province.clone(),
            self.county.clone(),
            self.decimal_latitude.clone(),
            self.decimal_longitude.clone(),
            self.locality.clone(),
            self.recorded_by.clone(),
            opt_cell(self.num_individuals),
            self.lakename.clone().unwrap_or_default(),
        ]
    }
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parses a whole number, accepting the float form `"1931.0"`.
pub(crate) fn parse_whole(value: &str) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(whole) = value.parse::<i32>() {
        return Some(whole);
    }
    let float: f64 = value.parse().ok()?;
    if float.fract() != 0.0 || !float.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let whole = float as i32;
    (f64::from(whole) == float).then_some(whole)
}

/// Parses a finite decimal number.
pub(crate) fn parse_decimal(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Environmental measurements from a survey card, each possibly absent.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    pub area: Option<f64>,
    pub depth: Option<f64>,
    pub temperature: Option<f64>,
    pub shoreline_development: Option<f64>,
}

/// One transcribed lake survey summary card.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyRecord {
    /// Lake identifier.
    pub new_key: String,
    /// Lake name, already in canonical form.
    pub lakename: String,
    pub county: String,
    pub begin_date_year: Option<i32>,
    /// Provenance of the transcription.
    pub subject_id: String,
    pub measurements: Measurements,
    /// Raw values for [`SurveyTable::carried_columns`], aligned by position.
    pub carried: Vec<String>,
}

/// The survey table plus the column layout carried into the output.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyTable {
    /// Every survey column except [`SHARED_JOIN_COLUMNS`], in file order.
    pub carried_columns: Vec<String>,
    pub records: Vec<SurveyRecord>,
}

impl SurveyTable {
    /// Number of survey cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table has no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A specimen lot joined to the survey card for the same lake, county and year.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedRecord {
    pub specimen: SpecimenRecord,
    pub survey: SurveyRecord,
}

/// The matched table in output layout.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchedTable {
    /// Survey columns appended after the specimen and derived columns.
    pub survey_columns: Vec<String>,
    pub rows: Vec<MatchedRecord>,
}

impl MatchedTable {
    /// Full output header.
    #[must_use]
    pub fn header(&self) -> Vec<String> {
        SPECIMEN_COLUMNS
            .iter()
            .chain(DERIVED_COLUMNS.iter())
            .map(|c| (*c).to_string())
            .chain(self.survey_columns.iter().cloned())
            .collect()
    }

    /// Number of matched rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
