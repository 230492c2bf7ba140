//! CSV Data Loader Module
//! Reads process exports into a Polars DataFrame.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Holds the raw export exactly as read from disk.
pub struct DataLoader {
    df: Option<DataFrame>,
    file_path: Option<PathBuf>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            file_path: None,
        }
    }

    /// Read a CSV file with every column kept as text.
    ///
    /// Values reach the processor untyped, the way they were written in the
    /// export, so date and case id cleaning see the original strings.
    pub fn read_csv(file_path: &Path) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded csv"
        );
        Ok(df)
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }

    /// Set DataFrame directly (used for background loading)
    pub fn set_dataframe(&mut self, df: DataFrame, file_path: PathBuf) {
        self.df = Some(df);
        self.file_path = Some(file_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(content.as_bytes()).unwrap();
        tmp.flush().unwrap();
        tmp
    }

    #[test]
    fn reads_every_column_as_text() {
        let tmp = write_csv(
            "Número Noticia,Fecha Actuación,Última Actuación\n\
             '110016000',2023-01-10,Audiencia\n\
             220017000,10/02/2023,Sentencia\n",
        );

        let df = DataLoader::read_csv(tmp.path()).unwrap();

        assert_eq!(df.height(), 2);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        let cases = df
            .column("Número Noticia")
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(0)
            .map(str::to_string);
        assert_eq!(cases.as_deref(), Some("'110016000'"));
    }

    #[test]
    fn loader_keeps_frame_and_path() {
        let tmp = write_csv("Número Noticia,Fecha Actuación,Última Actuación\n1,2023-01-10,Auto\n");
        let df = DataLoader::read_csv(tmp.path()).unwrap();

        let mut loader = DataLoader::new();
        assert_eq!(loader.get_row_count(), 0);
        assert!(loader.get_columns().is_empty());

        loader.set_dataframe(df, tmp.path().to_path_buf());

        assert_eq!(
            loader.get_columns(),
            vec!["Número Noticia", "Fecha Actuación", "Última Actuación"]
        );
        assert_eq!(loader.get_row_count(), 1);
        assert_eq!(loader.get_file_path().map(|p| p.as_path()), Some(tmp.path()));
    }

    #[test]
    fn empty_fields_become_nulls() {
        let tmp = write_csv("a,b\nx,\n,y\n");

        let df = DataLoader::read_csv(tmp.path()).unwrap();

        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.csv");

        assert!(DataLoader::read_csv(&missing).is_err());
    }
}
