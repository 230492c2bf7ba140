//! Results View Widget
//! Central panel with the classified table and the inactivity alert.

use crate::data::dates::BANNER_DATE_FORMAT;
use crate::data::{ActionRecord, ProcessedData, StaleRecord};
use egui::{Color32, RichText, ScrollArea};

const ROW_HEIGHT: f32 = 20.0;
const TABLE_HEIGHT: f32 = 320.0;
const COLUMN_WIDTH: f32 = 180.0;
const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Rows rendered in a results table
type TableRow = Vec<String>;

/// Scrollable view of processing results.
#[derive(Default)]
pub struct ResultsView {
    data: Option<ProcessedData>,
    error: Option<String>,
    /// Classified rows matching the current action selection
    filtered_rows: Vec<TableRow>,
    selection_empty: bool,
    stale_rows: Vec<TableRow>,
}

impl ResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear results and errors
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn data(&self) -> Option<&ProcessedData> {
        self.data.as_ref()
    }

    /// Show new results, filtered by `selected`.
    pub fn set_data(&mut self, data: ProcessedData, selected: &[String]) {
        self.stale_rows = data.stale_records.iter().map(stale_row).collect();
        self.data = Some(data);
        self.error = None;
        self.set_selection(selected);
    }

    /// Show an error in place of the tables.
    pub fn set_error(&mut self, message: String) {
        self.clear();
        self.error = Some(message);
    }

    /// Recompute the classified rows for a new action selection.
    pub fn set_selection(&mut self, selected: &[String]) {
        self.selection_empty = selected.is_empty();
        self.filtered_rows = self
            .data
            .as_ref()
            .map(|d| d.filtered_records(selected).map(classified_row).collect())
            .unwrap_or_default();
    }

    /// Draw the results
    pub fn show(&mut self, ui: &mut egui::Ui) -> ResultsAction {
        let mut action = ResultsAction::None;

        if let Some(error) = &self.error {
            ui.centered_and_justified(|ui| {
                ui.label(
                    RichText::new(error)
                        .size(16.0)
                        .color(Color32::from_rgb(220, 53, 69)),
                );
            });
            return action;
        }

        let Some(data) = &self.data else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Load a process export (CSV) to begin").size(20.0));
            });
            return action;
        };

        ScrollArea::vertical()
            .id_salt("results")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                // ===== 1. Classification =====
                ui.heading("1. Process Classification");
                ui.label("Processes filtered by action and sorted by action date, most recent first.");
                ui.add_space(8.0);

                if self.selection_empty {
                    ui.label(
                        RichText::new("Select at least one action in the left panel to see results.")
                            .color(Color32::from_rgb(255, 193, 7)),
                    );
                } else if !self.filtered_rows.is_empty() {
                    ui.label(
                        RichText::new(format!(
                            "Showing {} processes with the selected actions",
                            self.filtered_rows.len()
                        ))
                        .strong(),
                    );
                    ui.add_space(5.0);
                    Self::draw_table(
                        ui,
                        "classified_table",
                        &["Case", "Last Action", "Action Date"],
                        &self.filtered_rows,
                    );
                    ui.add_space(5.0);
                    if ui.button("📥 Download classified processes").clicked() {
                        action = ResultsAction::ExportClassified;
                    }
                }

                ui.add_space(15.0);
                ui.separator();
                ui.add_space(10.0);

                // ===== 2. Inactivity alert =====
                ui.heading(format!(
                    "2. Inactivity Alert: Processes With No Action for More Than {} Months",
                    data.stale_after_months
                ));
                ui.add_space(5.0);

                egui::Frame::none()
                    .fill(ui.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.label(format!(
                            "Reference date is today ({}). Processes whose last action is before {} are overdue.",
                            data.reference_now.format(BANNER_DATE_FORMAT),
                            data.cutoff.format(BANNER_DATE_FORMAT)
                        ));
                    });
                ui.add_space(8.0);

                if self.stale_rows.is_empty() {
                    ui.label(
                        RichText::new(format!(
                            "✓ Every process has a last action within the last {} months.",
                            data.stale_after_months
                        ))
                        .size(14.0)
                        .color(Color32::from_rgb(40, 167, 69)),
                    );
                } else {
                    ui.label(
                        RichText::new(format!(
                            "⚠ {} processes have been inactive for more than {} months.",
                            self.stale_rows.len(),
                            data.stale_after_months
                        ))
                        .size(14.0)
                        .strong()
                        .color(Color32::from_rgb(220, 53, 69)),
                    );
                    ui.add_space(5.0);
                    Self::draw_table(
                        ui,
                        "stale_table",
                        &["Case", "Action Date", "Last Action", "Days Inactive"],
                        &self.stale_rows,
                    );
                    ui.add_space(5.0);
                    if ui.button("📥 Download overdue processes").clicked() {
                        action = ResultsAction::ExportStale;
                    }
                }
            });

        action
    }

    /// Draw a table, rendering only the rows in view
    fn draw_table(ui: &mut egui::Ui, id: &str, headers: &[&str], rows: &[TableRow]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(format!("{id}_header"))
                    .min_col_width(COLUMN_WIDTH)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in headers {
                            ui.label(RichText::new(*header).strong().size(12.0));
                        }
                        ui.end_row();
                    });
                ui.separator();

                ScrollArea::vertical()
                    .id_salt(id)
                    .max_height(TABLE_HEIGHT)
                    .auto_shrink([false, true])
                    .show_rows(ui, ROW_HEIGHT, rows.len(), |ui, row_range| {
                        egui::Grid::new(format!("{id}_rows_{}", row_range.start))
                            .striped(true)
                            .min_col_width(COLUMN_WIDTH)
                            .min_row_height(ROW_HEIGHT - 4.0)
                            .spacing([8.0, 4.0])
                            .show(ui, |ui| {
                                for row in &rows[row_range] {
                                    for cell in row {
                                        ui.label(RichText::new(cell).size(12.0));
                                    }
                                    ui.end_row();
                                }
                            });
                    });
            });
    }
}

fn classified_row(record: &ActionRecord) -> TableRow {
    vec![
        record.case_id.clone().unwrap_or_default(),
        record.action_label.clone().unwrap_or_default(),
        record.action_date.format(DISPLAY_DATE_FORMAT).to_string(),
    ]
}

fn stale_row(stale: &StaleRecord) -> TableRow {
    vec![
        stale.record.case_id.clone().unwrap_or_default(),
        stale.record.action_date.format(DISPLAY_DATE_FORMAT).to_string(),
        stale.record.action_label.clone().unwrap_or_default(),
        stale.age_days.to_string(),
    ]
}

/// Actions triggered from the results view
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultsAction {
    None,
    ExportClassified,
    ExportStale,
}
