//! Process Tracker Main Application
//! Main window with control panel and results view.

use crate::data::{
    export_csv, DataLoader, ExportKind, ProcessedData, ProcessorConfig, ProcessorError,
    RecordProcessor,
};
use crate::gui::{ControlPanel, ControlPanelAction, ResultsAction, ResultsView};
use chrono::Local;
use egui::SidePanel;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{error, info, warn};

/// Loading and processing result from background thread
enum LoadResult {
    Progress(String),
    Complete {
        df: DataFrame,
        path: PathBuf,
        processed: Result<ProcessedData, ProcessorError>,
    },
    Error(String),
}

/// Main application window.
pub struct TrackerApp {
    loader: DataLoader,
    processor: RecordProcessor,
    control_panel: ControlPanel,
    results: ResultsView,

    // Background CSV loading and processing
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl TrackerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            loader: DataLoader::new(),
            processor: RecordProcessor::new(ProcessorConfig::default()),
            control_panel: ControlPanel::new(),
            results: ResultsView::new(),
            load_rx: None,
            is_loading: false,
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.results.clear();
            self.control_panel.update_actions(Vec::new());
            self.control_panel.settings.csv_path = Some(path.clone());
            self.control_panel.set_status("Loading CSV file...");
            self.control_panel.busy = true;
            self.is_loading = true;

            let (tx, rx) = channel();
            self.load_rx = Some(rx);

            let processor = self.processor.clone();
            thread::spawn(move || Self::run_load(tx, path, processor));
        }
    }

    /// Load and process a file (called from background thread)
    fn run_load(tx: Sender<LoadResult>, path: PathBuf, processor: RecordProcessor) {
        let _ = tx.send(LoadResult::Progress("Reading CSV file...".to_string()));

        let df = match DataLoader::read_csv(&path) {
            Ok(df) => df,
            Err(e) => {
                let _ = tx.send(LoadResult::Error(e.to_string()));
                return;
            }
        };

        let _ = tx.send(LoadResult::Progress("Processing records...".to_string()));

        let now = Local::now().naive_local();
        let processed = processor.process(&df, now);
        let _ = tx.send(LoadResult::Complete {
            df,
            path,
            processed,
        });
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Progress(status) => {
                        self.control_panel.set_status(&status);
                    }
                    LoadResult::Complete {
                        df,
                        path,
                        processed,
                    } => {
                        self.loader.set_dataframe(df, path);
                        self.handle_processed(processed);
                        self.finish_loading();
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        warn!(%error, "csv load failed");
                        self.control_panel
                            .set_status(&format!("Error: {}", error));
                        self.finish_loading();
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn finish_loading(&mut self) {
        self.is_loading = false;
        self.control_panel.busy = false;
    }

    /// Show processing output or translate its failure for the user
    fn handle_processed(&mut self, processed: Result<ProcessedData, ProcessorError>) {
        match processed {
            Ok(data) => {
                let status = format!(
                    "Complete! {} rows loaded, {} processes classified, {} rows without a valid date",
                    self.loader.get_row_count(),
                    data.cleaned.height(),
                    data.dropped_rows
                );
                self.control_panel.update_actions(data.action_labels.clone());
                let selected = self.control_panel.get_selected_actions();
                self.results.set_data(data, &selected);
                self.control_panel.set_status(&status);
            }
            Err(err) => {
                let config = self.processor.config();
                let message = match &err {
                    ProcessorError::Schema { missing } => format!(
                        "Error: required column(s) not found: {}. Make sure the file contains the columns '{}', '{}' and '{}'.",
                        missing.join(", "),
                        config.case_column,
                        config.date_column,
                        config.action_column
                    ),
                    other => format!(
                        "Error: an unexpected error occurred while processing the data: {}",
                        other
                    ),
                };
                error!(
                    error = %err,
                    path = ?self.loader.get_file_path(),
                    columns = ?self.loader.get_columns(),
                    "processing failed"
                );
                self.results.set_error(message);
                self.control_panel.set_status("Error: processing failed");
            }
        }
    }

    /// Handle selection change in the action filter
    fn handle_selection_changed(&mut self) {
        let selected = self.control_panel.get_selected_actions();
        self.results.set_selection(&selected);
    }

    /// Export a result view to a user-chosen CSV file
    fn handle_export(&mut self, kind: ExportKind) {
        let Some(data) = self.results.data() else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let df = match kind {
            ExportKind::Classified => {
                let selected = self.control_panel.get_selected_actions();
                match data.filter_classified(&selected) {
                    Ok(df) => df,
                    Err(e) => {
                        self.control_panel.set_status(&format!("Error: {}", e));
                        return;
                    }
                }
            }
            ExportKind::Stale => data.stale.clone(),
        };

        let output_path = match rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(kind.file_name())
            .save_file()
        {
            Some(path) => path,
            None => return, // User cancelled
        };

        match export_csv(&df, &output_path) {
            Ok(()) => {
                info!(?kind, rows = df.height(), "export finished");
                self.control_panel.set_status(&format!(
                    "Exported {} rows to {}",
                    df.height(),
                    output_path.display()
                ));
            }
            Err(e) => {
                warn!(?kind, error = %e, "export failed");
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.handle_selection_changed(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Results
        egui::CentralPanel::default().show(ctx, |ui| match self.results.show(ui) {
            ResultsAction::ExportClassified => self.handle_export(ExportKind::Classified),
            ResultsAction::ExportStale => self.handle_export(ExportKind::Stale),
            ResultsAction::None => {}
        });
    }
}
