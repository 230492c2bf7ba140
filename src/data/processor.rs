//! Record Processor Module
//! Cleans judicial-process records, classifies them by action date and
//! flags stale processes.

use crate::data::dates;
use chrono::NaiveDateTime;
use polars::prelude::*;
use rayon::prelude::*;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

/// Case identifier column.
pub const CASE_COLUMN: &str = "Número Noticia";
/// Date of the last recorded action.
pub const DATE_COLUMN: &str = "Fecha Actuación";
/// Label of the last recorded action.
pub const ACTION_COLUMN: &str = "Última Actuación";
/// Derived age column of the stale view.
pub const AGE_COLUMN: &str = "Días de Antigüedad";

/// Calendar months without activity before a process counts as stale.
pub const STALE_AFTER_MONTHS: u32 = 2;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error("Unexpected processing error: {0}")]
    Processing(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Column names and staleness window used by the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub case_column: String,
    pub date_column: String,
    pub action_column: String,
    pub age_column: String,
    pub stale_after_months: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            case_column: CASE_COLUMN.to_string(),
            date_column: DATE_COLUMN.to_string(),
            action_column: ACTION_COLUMN.to_string(),
            age_column: AGE_COLUMN.to_string(),
            stale_after_months: STALE_AFTER_MONTHS,
        }
    }
}

impl ProcessorConfig {
    fn required_columns(&self) -> [&str; 3] {
        [
            self.case_column.as_str(),
            self.date_column.as_str(),
            self.action_column.as_str(),
        ]
    }
}

/// One cleaned row, reduced to the fields the views display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Position of the row in the cleaned dataset.
    pub row: usize,
    pub case_id: Option<String>,
    pub action_date: NaiveDateTime,
    pub action_label: Option<String>,
}

/// A record whose last action predates the cutoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleRecord {
    pub record: ActionRecord,
    pub age_days: i64,
}

/// Every view derived from one raw dataset.
#[derive(Debug, Clone)]
pub struct ProcessedData {
    /// Distinct action labels, sorted ascending.
    pub action_labels: Vec<String>,
    /// Input rows with a parseable date, quotes stripped from case ids.
    pub cleaned: DataFrame,
    /// `cleaned` sorted by action date, most recent first.
    pub classified: DataFrame,
    /// Typed rows of `classified`, same order.
    pub classified_records: Vec<ActionRecord>,
    /// Case, date, action and age of stale rows; no columns when none are stale.
    pub stale: DataFrame,
    /// Typed rows of `stale`, same order.
    pub stale_records: Vec<StaleRecord>,
    /// Current time truncated to midnight.
    pub reference_now: NaiveDateTime,
    /// `reference_now` minus the staleness window.
    pub cutoff: NaiveDateTime,
    /// Length of the staleness window in calendar months.
    pub stale_after_months: u32,
    /// Rows discarded because their date could not be parsed.
    pub dropped_rows: usize,
}

impl ProcessedData {
    /// Rows of the classified view whose action is in `selected`.
    pub fn filtered_records<'a>(
        &'a self,
        selected: &'a [String],
    ) -> impl Iterator<Item = &'a ActionRecord> + 'a {
        self.classified_records
            .iter()
            .filter(move |r| label_selected(r.action_label.as_deref(), selected))
    }

    /// Classified view restricted to the selected actions, all columns kept.
    pub fn filter_classified(&self, selected: &[String]) -> Result<DataFrame, ProcessorError> {
        let mask: BooleanChunked = self
            .classified_records
            .iter()
            .map(|r| label_selected(r.action_label.as_deref(), selected))
            .collect();
        Ok(self.classified.filter(&mask)?)
    }
}

fn label_selected(label: Option<&str>, selected: &[String]) -> bool {
    label.is_some_and(|l| selected.iter().any(|s| s == l))
}

/// Handles cleaning, classification and staleness of process records.
#[derive(Debug, Clone, Default)]
pub struct RecordProcessor {
    config: ProcessorConfig,
}

impl RecordProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Derive all views from `raw` as of `now`.
    ///
    /// `raw` is left untouched; the working copy shares its column buffers.
    pub fn process(
        &self,
        raw: &DataFrame,
        now: NaiveDateTime,
    ) -> Result<ProcessedData, ProcessorError> {
        self.check_schema(raw)?;
        let cfg = &self.config;

        let mut working = raw.clone();
        if let Some(case) = self.strip_case_quotes(raw.column(&cfg.case_column)?)? {
            working.with_column(case)?;
        }

        let parsed = Self::parse_dates(raw.column(&cfg.date_column)?)?;
        let valid_rows: Vec<IdxSize> = parsed
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some())
            .map(|(i, _)| i as IdxSize)
            .collect();
        let dropped_rows = raw.height() - valid_rows.len();
        if dropped_rows > 0 {
            debug!(dropped_rows, "discarding rows with unparseable action dates");
        }

        working.with_column(Self::datetime_series(&cfg.date_column, &parsed))?;
        let cleaned = working.take(&IdxCa::from_vec("idx".into(), valid_rows))?;

        let records = self.collect_records(&cleaned, &parsed)?;
        let action_labels = Self::distinct_labels(&records);

        let mut classified_records = records.clone();
        classified_records.sort_by(|a, b| b.action_date.cmp(&a.action_date));
        let classified = cleaned.take(&Self::row_index(
            classified_records.iter().map(|r| r.row),
        ))?;

        let reference_now = dates::floor_to_day(now);
        let cutoff = dates::months_before(reference_now, cfg.stale_after_months).ok_or_else(
            || {
                ProcessorError::Processing(format!(
                    "cannot subtract {} months from {}",
                    cfg.stale_after_months, reference_now
                ))
            },
        )?;

        let mut stale_records: Vec<StaleRecord> = records
            .into_iter()
            .filter(|r| dates::floor_to_day(r.action_date) < cutoff)
            .map(|record| StaleRecord {
                age_days: dates::whole_days_between(reference_now, record.action_date),
                record,
            })
            .collect();
        stale_records.sort_by(|a, b| b.age_days.cmp(&a.age_days));
        let stale = self.stale_frame(&cleaned, &stale_records)?;

        info!(
            rows = raw.height(),
            cleaned = cleaned.height(),
            dropped_rows,
            actions = action_labels.len(),
            stale = stale_records.len(),
            %cutoff,
            "processed records"
        );

        Ok(ProcessedData {
            action_labels,
            cleaned,
            classified,
            classified_records,
            stale,
            stale_records,
            reference_now,
            cutoff,
            stale_after_months: cfg.stale_after_months,
            dropped_rows,
        })
    }

    fn check_schema(&self, df: &DataFrame) -> Result<(), ProcessorError> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        let missing: Vec<String> = self
            .config
            .required_columns()
            .iter()
            .filter(|c| !present.iter().any(|p| p == *c))
            .map(|c| c.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProcessorError::Schema { missing })
        }
    }

    /// Replacement case column without `'`, or `None` when the column is not textual.
    fn strip_case_quotes(&self, column: &Column) -> Result<Option<Series>, ProcessorError> {
        if column.dtype() != &DataType::String {
            return Ok(None);
        }
        let ca = column.as_materialized_series().str()?;
        let stripped: StringChunked = ca
            .into_iter()
            .map(|opt| opt.map(|s| s.replace('\'', "")))
            .collect();
        Ok(Some(stripped.with_name(column.name().clone()).into_series()))
    }

    /// Parse every value of the date column; unparseable values become `None`.
    fn parse_dates(column: &Column) -> Result<Vec<Option<NaiveDateTime>>, ProcessorError> {
        if matches!(
            column.dtype(),
            DataType::List(_) | DataType::Array(..) | DataType::Struct(_)
        ) {
            return Err(ProcessorError::Processing(format!(
                "column '{}' holds {} values, which cannot be read as dates",
                column.name(),
                column.dtype()
            )));
        }
        let as_text = column.cast(&DataType::String)?;
        let values: Vec<Option<&str>> = as_text
            .as_materialized_series()
            .str()?
            .into_iter()
            .collect();

        Ok(values
            .par_iter()
            .map(|v| v.and_then(dates::parse_action_date))
            .collect())
    }

    fn datetime_series(name: &str, parsed: &[Option<NaiveDateTime>]) -> Series {
        let micros: Int64Chunked = parsed
            .iter()
            .map(|d| d.map(|dt| dt.and_utc().timestamp_micros()))
            .collect();
        micros
            .with_name(name.into())
            .into_datetime(TimeUnit::Microseconds, None)
            .into_series()
    }

    fn row_index(rows: impl Iterator<Item = usize>) -> IdxCa {
        IdxCa::from_vec("idx".into(), rows.map(|r| r as IdxSize).collect())
    }

    /// Typed rows of the cleaned frame, in cleaned order.
    fn collect_records(
        &self,
        cleaned: &DataFrame,
        parsed: &[Option<NaiveDateTime>],
    ) -> Result<Vec<ActionRecord>, ProcessorError> {
        let cfg = &self.config;
        let cases = Self::text_values(cleaned.column(&cfg.case_column)?)?;
        let labels = Self::text_values(cleaned.column(&cfg.action_column)?)?;
        let dates = parsed.iter().flatten().copied();

        let records: Vec<ActionRecord> = cases
            .into_iter()
            .zip(labels)
            .zip(dates)
            .enumerate()
            .map(|(row, ((case_id, action_label), action_date))| ActionRecord {
                row,
                case_id,
                action_date,
                action_label,
            })
            .collect();

        if records.len() != cleaned.height() {
            return Err(ProcessorError::Processing(format!(
                "expected {} cleaned rows, collected {}",
                cleaned.height(),
                records.len()
            )));
        }
        Ok(records)
    }

    fn text_values(column: &Column) -> Result<Vec<Option<String>>, ProcessorError> {
        let as_text = column.cast(&DataType::String)?;
        Ok(as_text
            .as_materialized_series()
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect())
    }

    fn distinct_labels(records: &[ActionRecord]) -> Vec<String> {
        let labels: BTreeSet<&str> = records
            .iter()
            .filter_map(|r| r.action_label.as_deref())
            .collect();
        labels.into_iter().map(str::to_string).collect()
    }

    /// Project stale rows to case, date, action and age.
    fn stale_frame(
        &self,
        cleaned: &DataFrame,
        stale: &[StaleRecord],
    ) -> Result<DataFrame, ProcessorError> {
        if stale.is_empty() {
            return Ok(DataFrame::empty());
        }

        let cfg = &self.config;
        let mut df = cleaned
            .take(&Self::row_index(stale.iter().map(|s| s.record.row)))?
            .select([
                cfg.case_column.as_str(),
                cfg.date_column.as_str(),
                cfg.action_column.as_str(),
            ])?;
        let ages: Vec<i64> = stale.iter().map(|s| s.age_days).collect();
        df.with_column(Series::new(cfg.age_column.as_str().into(), ages))?;
        Ok(df)
    }
}
