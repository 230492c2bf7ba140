//! Data module - CSV loading, record processing and export

pub mod dates;
mod export;
mod loader;
mod processor;

pub use export::{export_csv, ExportKind};
pub use loader::DataLoader;
pub use processor::{
    ActionRecord, ProcessedData, ProcessorConfig, ProcessorError, RecordProcessor, StaleRecord,
};
