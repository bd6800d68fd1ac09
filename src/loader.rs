//! Loading specimen and survey tables from delimited files.
//!
//! Columns are looked up by header name, so extra columns and any column
//! order are accepted. A missing required column, a row with the wrong number
//! of fields or an unreadable file is fatal. Unparsable cell values are not:
//! they load as `None`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, Table};
use crate::profile::MeasurementColumns;
use crate::record::{
    parse_decimal, parse_whole, Measurements, SpecimenRecord, SurveyRecord, SurveyTable, SHARED_JOIN_COLUMNS,
    SPECIMEN_COLUMNS, SURVEY_KEY_COLUMNS,
};

/// Delimiter implied by a file name: tab for `.tsv` and `.txt`, comma otherwise.
#[must_use]
pub fn delimiter_for_path(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("tsv" | "txt") => b'\t',
        _ => b',',
    }
}

/// Header positions by column name.
struct ColumnIndex {
    table: Table,
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(table: Table, headers: &csv::StringRecord) -> Result<Self, LoadError> {
        if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
            return Err(LoadError::EmptyHeader { table });
        }
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let mut positions = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            positions.entry(name.clone()).or_insert(i);
        }
        Ok(Self {
            table,
            names,
            positions,
        })
    }

    fn require(&self, column: &str) -> Result<usize, LoadError> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| LoadError::MissingColumn {
                table: self.table,
                column: column.to_string(),
            })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }
}

fn reader<R: Read>(input: R, delimiter: u8) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        // GBIF tab exports are unquoted and localities contain stray quotes.
        .quoting(delimiter != b'\t')
        .has_headers(true)
        .from_reader(input)
}

fn open(table: Table, path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        table,
        path: path.to_path_buf(),
        source,
    })
}

fn cell(row: &csv::StringRecord, position: usize) -> &str {
    row.get(position).map_or("", str::trim)
}

/// Parses a year cell. Accepts `"1931"` and the float form `"1931.0"`.
#[must_use]
pub fn parse_year(value: &str) -> Option<i32> {
    parse_whole(value)
}

/// Reads a specimen table.
///
/// # Errors
/// Returns a [`LoadError`] if a required column is missing or the data is not
/// well-formed delimited text.
pub fn read_specimens<R: Read>(input: R, delimiter: u8) -> Result<Vec<SpecimenRecord>, LoadError> {
    let table = Table::Specimens;
    let mut rdr = reader(input, delimiter);
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Csv { table, source })?
        .clone();
    let columns = ColumnIndex::new(table, &headers)?;
    let mut pos = [0usize; SPECIMEN_COLUMNS.len()];
    for (slot, name) in pos.iter_mut().zip(SPECIMEN_COLUMNS) {
        *slot = columns.require(name)?;
    }
    let [
        gbif_id,
        identifier,
        basis_of_record,
        occurrence_id,
        catalog_number,
        preparations,
        field_number,
        event_date,
        year,
        month,
        day,
        state_province,
        county,
        decimal_latitude,
        decimal_longitude,
        locality,
        recorded_by,
    ] = pos;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|source| LoadError::Csv { table, source })?;
        records.push(SpecimenRecord {
            gbif_id: cell(&row, gbif_id).to_string(),
            identifier: cell(&row, identifier).to_string(),
            basis_of_record: cell(&row, basis_of_record).to_string(),
            occurrence_id: cell(&row, occurrence_id).to_string(),
            catalog_number: cell(&row, catalog_number).to_string(),
            preparations: cell(&row, preparations).to_string(),
            field_number: cell(&row, field_number).to_string(),
            event_date: cell(&row, event_date).to_string(),
            year: parse_year(cell(&row, year)),
            year_text: cell(&row, year).to_string(),
            month: cell(&row, month).to_string(),
            day: cell(&row, day).to_string(),
            state_province: cell(&row, state_province).to_string(),
            county: cell(&row, county).to_string(),
            decimal_latitude: cell(&row, decimal_latitude).to_string(),
            decimal_longitude: cell(&row, decimal_longitude).to_string(),
            locality: cell(&row, locality).to_string(),
            recorded_by: cell(&row, recorded_by).to_string(),
            num_individuals: None,
            lakename: None,
        });
    }

    debug!(rows = records.len(), "loaded specimen table");
    Ok(records)
}

/// Reads a survey table.
///
/// Columns other than `county` and `lakename` are carried verbatim into the
/// output. Measurement columns are optional.
///
/// # Errors
/// Returns a [`LoadError`] if a required column is missing or the data is not
/// well-formed delimited text.
pub fn read_surveys<R: Read>(
    input: R,
    delimiter: u8,
    measurements: &MeasurementColumns,
) -> Result<SurveyTable, LoadError> {
    let table = Table::Surveys;
    let mut rdr = reader(input, delimiter);
    let headers = rdr
        .headers()
        .map_err(|source| LoadError::Csv { table, source })?
        .clone();
    let columns = ColumnIndex::new(table, &headers)?;
    let mut pos = [0usize; SURVEY_KEY_COLUMNS.len()];
    for (slot, name) in pos.iter_mut().zip(SURVEY_KEY_COLUMNS) {
        *slot = columns.require(name)?;
    }
    let [new_key, lakename, county, begin_date_year, subject_id] = pos;

    let area = columns.optional(&measurements.area);
    let depth = columns.optional(&measurements.depth);
    let temperature = columns.optional(&measurements.temperature);
    let shoreline = columns.optional(&measurements.shoreline_development);

    let carried_positions: Vec<usize> = columns
        .names
        .iter()
        .enumerate()
        .filter(|(i, name)| {
            !SHARED_JOIN_COLUMNS.contains(&name.as_str()) && columns.positions.get(*name) == Some(i)
        })
        .map(|(i, _)| i)
        .collect();
    let carried_columns = carried_positions
        .iter()
        .map(|&i| columns.names[i].clone())
        .collect();

    let measure = |row: &csv::StringRecord, position: Option<usize>| {
        position.and_then(|p| parse_decimal(cell(row, p)))
    };

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row.map_err(|source| LoadError::Csv { table, source })?;
        records.push(SurveyRecord {
            new_key: cell(&row, new_key).to_string(),
            lakename: cell(&row, lakename).to_string(),
            county: cell(&row, county).to_string(),
            begin_date_year: parse_year(cell(&row, begin_date_year)),
            subject_id: cell(&row, subject_id).to_string(),
            measurements: Measurements {
                area: measure(&row, area),
                depth: measure(&row, depth),
                temperature: measure(&row, temperature),
                shoreline_development: measure(&row, shoreline),
            },
            carried: carried_positions
                .iter()
                .map(|&p| row.get(p).unwrap_or_default().to_string())
                .collect(),
        });
    }

    debug!(rows = records.len(), "loaded survey table");
    Ok(SurveyTable {
        carried_columns,
        records,
    })
}

/// Loads a specimen file.
///
/// # Errors
/// As [`read_specimens`], plus [`LoadError::Io`] if the file cannot be opened.
pub fn load_specimens(path: &Path, delimiter: u8) -> Result<Vec<SpecimenRecord>, LoadError> {
    read_specimens(open(Table::Specimens, path)?, delimiter)
}

/// Loads a survey file.
///
/// # Errors
/// As [`read_surveys`], plus [`LoadError::Io`] if the file cannot be opened.
pub fn load_surveys(
    path: &Path,
    delimiter: u8,
    measurements: &MeasurementColumns,
) -> Result<SurveyTable, LoadError> {
    read_surveys(open(Table::Surveys, path)?, delimiter, measurements)
}
