//! Serializing the matched table.

use std::io::Write;

use crate::error::{LinkError, LinkResult};
use crate::record::MatchedTable;

/// Writes `table` as delimited text with a header row.
///
/// Columns: every specimen column, `num_individuals`, `lakename`, then the
/// carried survey columns. Null values are written as empty cells.
///
/// # Errors
/// Returns [`LinkError::Output`] if the destination fails.
pub fn write_matched<W: Write>(table: &MatchedTable, output: W, delimiter: u8) -> LinkResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(output);

    wtr.write_record(table.header()).map_err(output_err)?;
    for row in &table.rows {
        let cells = row
            .specimen
            .cells()
            .into_iter()
            .chain(row.survey.carried.iter().cloned());
        wtr.write_record(cells).map_err(output_err)?;
    }
    wtr.flush()
        .map_err(|e| LinkError::output(format!("flush failed: {e}")))?;
    Ok(())
}

fn output_err(e: csv::Error) -> LinkError {
    LinkError::output(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{MatchedRecord, SpecimenRecord, SurveyRecord};

    #[test]
    fn test_write_matched() {
        let table = MatchedTable {
            survey_columns: vec!["new_key".to_string(), "subject_id".to_string()],
            rows: vec![MatchedRecord {
                specimen: SpecimenRecord {
                    gbif_id: "1".to_string(),
                    locality: "Bankers Lake, Hillsdale Co.".to_string(),
                    year: Some(1931),
                    num_individuals: Some(12),
                    lakename: Some("BANKERS".to_string()),
                    ..SpecimenRecord::default()
                },
                survey: SurveyRecord {
                    carried: vec!["K1".to_string(), "s1".to_string()],
                    ..SurveyRecord::default()
                },
            }],
        };

        let mut out = Vec::new();
        write_matched(&table, &mut out, b',').unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("gbifID,identifier,"));
        assert!(header.ends_with("num_individuals,lakename,new_key,subject_id"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,"));
        assert!(row.contains("\"Bankers Lake, Hillsdale Co.\""));
        assert!(row.ends_with("12,BANKERS,K1,s1"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_empty_table_has_header() {
        let mut out = Vec::new();
        write_matched(&MatchedTable::default(), &mut out, b'\t').unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("num_individuals\tlakename"));
    }
}
