//! CSV Export Module
//! Writes result views as UTF-8, comma separated text with a header row.

use crate::data::dates::EXPORT_DATETIME_FORMAT;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Nothing to export")]
    Empty,
}

/// Which result view is being exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Classified,
    Stale,
}

impl ExportKind {
    /// Suggested file name in the save dialog.
    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::Classified => "classified-filtered.csv",
            ExportKind::Stale => "stale-processes.csv",
        }
    }
}

/// Serialize a view to CSV. No index column is written.
pub fn write_csv<W: Write>(df: &DataFrame, writer: &mut W) -> Result<(), ExportError> {
    if df.width() == 0 {
        return Err(ExportError::Empty);
    }

    let mut df = df.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .with_separator(b',')
        .with_datetime_format(Some(EXPORT_DATETIME_FORMAT.to_string()))
        .finish(&mut df)?;
    Ok(())
}

/// Write a view to `path`, replacing any existing file.
pub fn export_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    write_csv(df, &mut file)?;
    file.flush()?;

    info!(path = %path.display(), rows = df.height(), "exported csv");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::processor::{ACTION_COLUMN, CASE_COLUMN, DATE_COLUMN};
    use crate::data::{ProcessedData, RecordProcessor};
    use chrono::NaiveDate;

    fn processed() -> ProcessedData {
        let df = df!(
            CASE_COLUMN => ["'1'", "2"],
            DATE_COLUMN => ["2022-12-01", "2023-03-15 10:30:00"],
            ACTION_COLUMN => ["Auto", "Sentencia"]
        )
        .unwrap();
        let now = NaiveDate::from_ymd_opt(2023, 4, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        RecordProcessor::default().process(&df, now).unwrap()
    }

    #[test]
    fn classified_export_has_header_and_no_index() {
        let data = processed();
        let mut buf = Vec::new();

        write_csv(&data.classified, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Número Noticia,Fecha Actuación,Última Actuación");
        assert_eq!(lines[1], "2,2023-03-15 10:30:00,Sentencia");
        assert_eq!(lines[2], "1,2022-12-01 00:00:00,Auto");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn stale_export_includes_age() {
        let data = processed();
        let mut buf = Vec::new();

        write_csv(&data.stale, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Número Noticia,Fecha Actuación,Última Actuación,Días de Antigüedad"
        );
        assert_eq!(lines[1], "1,2022-12-01 00:00:00,Auto,121");
    }

    #[test]
    fn empty_view_is_rejected() {
        let mut buf = Vec::new();
        assert!(matches!(
            write_csv(&DataFrame::empty(), &mut buf),
            Err(ExportError::Empty)
        ));
    }

    #[test]
    fn export_writes_file() {
        let data = processed();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ExportKind::Classified.file_name());

        export_csv(&data.classified, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Número Noticia,"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn csv_file_round_trip_through_processor() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("procesos.csv");
        std::fs::write(
            &input,
            "Número Noticia,Fecha Actuación,Última Actuación,Despacho\n\
             '110016000',2023-01-10,Audiencia,J1\n\
             '220017000',2023-03-20,Sentencia,J2\n\
             330018000,sin fecha,Auto,J3\n",
        )
        .unwrap();
        let raw = crate::data::DataLoader::read_csv(&input).unwrap();
        let now = NaiveDate::from_ymd_opt(2023, 4, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let data = RecordProcessor::default().process(&raw, now).unwrap();
        let output = dir.path().join(ExportKind::Stale.file_name());
        export_csv(&data.stale, &output).unwrap();

        assert_eq!(data.action_labels, vec!["Audiencia", "Sentencia"]);
        assert_eq!(data.dropped_rows, 1);
        let text = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "110016000,2023-01-10 00:00:00,Audiencia,81");

        let filtered = data.filter_classified(&["Sentencia".to_string()]).unwrap();
        let mut buf = Vec::new();
        write_csv(&filtered, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "Número Noticia,Fecha Actuación,Última Actuación,Despacho",
                "220017000,2023-03-20 00:00:00,Sentencia,J2",
            ]
        );
    }
}
