// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Choice of media type before a file is picked.

use super::{modal_window, DialogOutcome};
use crate::models::project::FileType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectFileTypeDialog;

impl SelectFileTypeDialog {
    pub fn show(&self, ctx: &egui::Context) -> DialogOutcome<FileType> {
        let mut outcome = DialogOutcome::Open;
        modal_window("Select File Type")
            .fixed_size([250.0, 150.0])
            .show(ctx, |ui| {
                ui.vertical_centered_justified(|ui| {
                    for file_type in FileType::ALL {
                        let button = egui::Button::new(egui::RichText::new(file_type.label()).strong())
                            .min_size(egui::vec2(0.0, 28.0));
                        if ui.add(button).clicked() {
                            outcome = DialogOutcome::Accepted(file_type);
                        }
                    }
                    ui.add_space(4.0);
                    if ui.button("Cancel").clicked() {
                        outcome = DialogOutcome::Cancelled;
                    }
                });
            });
        outcome
    }
}

/// Open a native picker restricted to the extensions of `file_type`.
pub fn pick_file(file_type: FileType) -> Option<std::path::PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Select File")
        .add_filter(
            format!("File ({})", file_type.extensions().join(" ")),
            file_type.extensions(),
        );
    if let Some(home) = dirs::home_dir() {
        dialog = dialog.set_directory(home);
    }
    dialog.pick_file()
}
