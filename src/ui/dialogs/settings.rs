// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings window: project display settings plus user preferences.

use super::{modal_window, ok_cancel_buttons, DialogOutcome};
use crate::config::LogLevel;
use crate::models::project::ProjectSettings;

/// Values confirmed by the settings window.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    /// `None` when no project is open
    pub project: Option<ProjectSettings>,
    pub log_level: LogLevel,
    pub dark_theme: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDialog {
    draft: SettingsUpdate,
}

impl SettingsDialog {
    pub fn new(project: Option<ProjectSettings>, log_level: LogLevel, dark_theme: bool) -> Self {
        Self {
            draft: SettingsUpdate {
                project,
                log_level,
                dark_theme,
            },
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome<SettingsUpdate> {
        let mut outcome = DialogOutcome::Open;
        modal_window("⚙ Settings").min_width(320.0).show(ctx, |ui| {
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([10.0, 8.0])
                .show(ui, |ui| {
                    if let Some(project) = self.draft.project.as_mut() {
                        ui.label("Line width:");
                        ui.add(egui::Slider::new(&mut project.line_width, 0.5..=8.0));
                        ui.end_row();

                        ui.label("Vertex size:");
                        ui.add(egui::Slider::new(&mut project.vertex_size, 1.0..=12.0));
                        ui.end_row();

                        ui.label("Auto save:");
                        ui.checkbox(&mut project.auto_save, "Save labels when switching files");
                        ui.end_row();
                    }

                    ui.label("Log level:");
                    egui::ComboBox::from_id_source("log_level_combo")
                        .selected_text(self.draft.log_level.as_filter())
                        .show_ui(ui, |ui| {
                            for level in LogLevel::all() {
                                ui.selectable_value(&mut self.draft.log_level, *level, level.as_filter());
                            }
                        });
                    ui.end_row();

                    ui.label("Theme:");
                    ui.checkbox(&mut self.draft.dark_theme, "Dark");
                    ui.end_row();
                });

            ui.separator();
            match ok_cancel_buttons(ui, "OK", "Cancel") {
                Some(true) => outcome = DialogOutcome::Accepted(self.draft.clone()),
                Some(false) => outcome = DialogOutcome::Cancelled,
                None => {}
            }
        });
        outcome
    }
}
