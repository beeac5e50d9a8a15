//! CSV import of incident exports into unvalidated [`IncidentRow`]s.

mod mapping;
mod normalizer;
mod parser;

use crate::analysis::IncidentRow;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum IncidentImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for IncidentImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncidentImportError::Io(err) => write!(f, "failed to read incident export: {}", err),
            IncidentImportError::Csv(err) => write!(f, "invalid incident CSV data: {}", err),
        }
    }
}

impl std::error::Error for IncidentImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IncidentImportError::Io(err) => Some(err),
            IncidentImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for IncidentImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IncidentImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct IncidentCsvImporter;

impl IncidentCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<IncidentRow>, IncidentImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<IncidentRow>, IncidentImportError> {
        let rows = parser::parse_rows(reader)?;
        tracing::debug!(rows = rows.len(), "incident export parsed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{IncidentRecord, Severity};
    use chrono::{TimeZone, Utc};
    use std::io::Cursor;

    const EXPORT: &str = "\u{feff}ID,Title,Description,Location,Region,State,Category,Severity,Status,Verification,Reported At,Resolved At,Impacted Population\n\
inc-1,Market  attack,Gunmen opened fire,Maiduguri,North East,Borno,Terrorism,High,Active,Verified,2025-03-01T08:30:00Z,,\"1,200\"\n\
inc-2,Land dispute,Farmers and herders clashed,Jos,North Central,Plateau,farmer herder,medium,resolved,Under Review,2025-03-02,2025-03-05,\n";

    #[test]
    fn parse_timestamp_supports_rfc3339_and_date_strings() {
        let rfc =
            parser::parse_timestamp_for_tests("2025-03-01T09:30:00+01:00").expect("parse rfc");
        assert_eq!(rfc, Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap());

        let date = parser::parse_timestamp_for_tests("2025-03-02").expect("parse date");
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 3, 2, 0, 0, 0).unwrap());

        assert!(parser::parse_timestamp_for_tests("  ").is_none());
        assert!(parser::parse_timestamp_for_tests("last tuesday").is_none());
    }

    #[test]
    fn importer_maps_headers_and_normalises_cells() {
        let rows = IncidentCsvImporter::from_reader(Cursor::new(EXPORT)).expect("import succeeds");

        assert_eq!(rows.len(), 2);
        let first = &rows[0];
        assert_eq!(first.id.as_deref(), Some("inc-1"));
        assert_eq!(first.title.as_deref(), Some("Market attack"));
        assert_eq!(first.category.as_deref(), Some("terrorism"));
        assert_eq!(first.severity.as_deref(), Some("high"));
        assert_eq!(first.impacted_population, Some(1200));
        assert_eq!(first.resolved_at, None);

        let second = &rows[1];
        assert_eq!(second.category.as_deref(), Some("farmer_herder"));
        assert_eq!(second.verification_status.as_deref(), Some("under_review"));
        assert_eq!(
            second.resolved_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn imported_rows_validate_into_records() {
        let rows = IncidentCsvImporter::from_reader(Cursor::new(EXPORT)).expect("import succeeds");

        let record = IncidentRecord::try_from(rows[0].clone()).expect("valid record");
        assert_eq!(record.severity, Severity::High);
        assert_eq!(record.region, "North East");
    }

    #[test]
    fn missing_columns_and_bad_cells_become_none() {
        let csv = "Incident ID,Title,Date,Reporter Phone\ninc-9,Roadblock,yesterday,0803\n";
        let rows = IncidentCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.as_deref(), Some("inc-9"));
        assert_eq!(rows[0].reported_at, None);
        assert_eq!(rows[0].severity, None);
        assert!(IncidentRecord::try_from(rows[0].clone()).is_err());
    }

    #[test]
    fn duplicate_aliases_keep_the_first_column() {
        let csv = "ID,Reported At,Date\ninc-3,2025-01-02,not a date\n";
        let rows = IncidentCsvImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        assert_eq!(
            rows[0].reported_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = IncidentCsvImporter::from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            IncidentImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
