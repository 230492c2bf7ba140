//! Control Panel Widget
//! Left side panel with file selection, action filter and status.

use egui::{Color32, RichText, ScrollArea};
use std::path::PathBuf;

/// User settings for the current session
#[derive(Default, Clone)]
pub struct UserSettings {
    pub csv_path: Option<PathBuf>,
}

/// Left side control panel with file selection and the action filter.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub actions: Vec<String>,
    pub selected_actions: Vec<bool>,
    pub busy: bool,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            actions: Vec::new(),
            selected_actions: Vec::new(),
            busy: false,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the available actions; every action starts selected.
    pub fn update_actions(&mut self, actions: Vec<String>) {
        self.selected_actions = vec![true; actions.len()];
        self.actions = actions;
    }

    /// Get the actions currently ticked in the filter
    pub fn get_selected_actions(&self) -> Vec<String> {
        self.actions
            .iter()
            .zip(self.selected_actions.iter())
            .filter(|(_, &selected)| selected)
            .map(|(action, _)| action.clone())
            .collect()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("⚖ Process Tracker")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Judicial process classification")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Process Export").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                        });
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Filter Section =====
        ui.label(RichText::new("🔍 Action Filter").size(14.0).strong());
        ui.add_space(5.0);

        if self.actions.is_empty() {
            ui.label(RichText::new("Load a file to list its actions").color(Color32::GRAY));
        } else {
            ui.label("Choose the actions to show:");
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                        for (i, label) in self.actions.iter().enumerate() {
                            if i < self.selected_actions.len()
                                && ui.checkbox(&mut self.selected_actions[i], label).changed()
                            {
                                action = ControlPanelAction::SelectionChanged;
                            }
                        }
                    });
                });

            ui.add_space(5.0);
            ui.horizontal(|ui| {
                if ui.small_button("Select All").clicked() {
                    self.selected_actions.iter_mut().for_each(|v| *v = true);
                    action = ControlPanelAction::SelectionChanged;
                }
                if ui.small_button("Clear All").clicked() {
                    self.selected_actions.iter_mut().for_each(|v| *v = false);
                    action = ControlPanelAction::SelectionChanged;
                }
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.contains("Error") {
                Color32::from_rgb(220, 53, 69)
            } else if self.status.contains("Complete") || self.status.contains("Exported") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }

    /// Set status line text
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
}
