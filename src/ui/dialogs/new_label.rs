// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label selection for a new or relabeled shape.
//!
//! Lists the project's classes plus a trailing "New" row that opens the
//! class creation dialog. A search field filters the rows live.

use super::create_class::CreateNewLabelClassDialog;
use super::{modal_window, DialogOutcome};
use crate::models::{filter::ListFilter, label_class::LabelClassRegistry};
use crate::ui::lists;

/// Display text of the row that creates a new class.
pub const NEW_ENTRY: &str = "New";

/// A row of the class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRow {
    Class(usize),
    New,
}

#[derive(Debug, Clone, Default)]
pub struct NewLabelDialog {
    search: ListFilter,
    class_name: String,
    create: Option<CreateNewLabelClassDialog>,
}

impl NewLabelDialog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the search field.
    pub fn set_text(&mut self, text: &str) {
        self.search.set_text(text);
    }

    pub fn is_creating(&self) -> bool {
        self.create.is_some()
    }

    /// Rows left visible by the search, classes first, "New" last.
    pub fn visible_rows(&self, classes: &LabelClassRegistry) -> Vec<LabelRow> {
        let texts = classes.names().chain(std::iter::once(NEW_ENTRY));
        self.search
            .visible_indices(texts)
            .into_iter()
            .map(|i| {
                if i < classes.len() {
                    LabelRow::Class(i)
                } else {
                    LabelRow::New
                }
            })
            .collect()
    }

    /// Handle a click on a row.
    pub fn select_row(&mut self, row: LabelRow, classes: &LabelClassRegistry) {
        match row {
            LabelRow::Class(index) => {
                if let Some(class) = classes.get(index) {
                    self.class_name = class.name.clone();
                }
            }
            LabelRow::New => self.create = Some(CreateNewLabelClassDialog::new()),
        }
    }

    /// Apply the result of the nested class creation dialog. A new name is
    /// registered and selected; a cancelled creation clears the selection.
    pub fn finish_create(&mut self, outcome: DialogOutcome<String>, classes: &mut LabelClassRegistry) {
        match outcome {
            DialogOutcome::Open => return,
            DialogOutcome::Accepted(name) => match classes.add_class(&name) {
                Ok(index) => {
                    log::info!("Created label class '{}' ({})", name, index);
                    self.class_name = name;
                }
                Err(e) => {
                    log::warn!("Label class not created: {}", e);
                    self.class_name.clear();
                }
            },
            DialogOutcome::Cancelled => self.class_name.clear(),
        }
        self.create = None;
    }

    /// OK: close with the current selection. Without one there is nothing
    /// to assign, so the dialog counts as cancelled.
    pub fn accept(&self) -> DialogOutcome<String> {
        if self.class_name.is_empty() {
            DialogOutcome::Cancelled
        } else {
            DialogOutcome::Accepted(self.class_name.clone())
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, classes: &mut LabelClassRegistry) -> DialogOutcome<String> {
        let mut outcome = DialogOutcome::Open;
        let mut clicked = None;
        let enabled = !self.is_creating();

        modal_window("Select class of new shape")
            .fixed_size([300.0, 400.0])
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    ui.add(
                        egui::TextEdit::singleline(self.search.text_mut())
                            .hint_text("Search shape label")
                            .desired_width(f32::INFINITY),
                    );
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            outcome = self.accept();
                        }
                        if ui.button("Cancel").clicked() {
                            outcome = DialogOutcome::Cancelled;
                        }
                    });
                    ui.separator();

                    egui::ScrollArea::vertical().show(ui, |ui| {
                        for row in self.visible_rows(classes) {
                            let response = match row {
                                LabelRow::Class(index) => match classes.get(index) {
                                    Some(class) => lists::color_square_item(
                                        ui,
                                        &class.name,
                                        class.color,
                                        class.name == self.class_name,
                                    ),
                                    None => continue,
                                },
                                LabelRow::New => ui.selectable_label(false, format!("➕ {}", NEW_ENTRY)),
                            };
                            if response.clicked() {
                                clicked = Some(row);
                            }
                        }
                    });
                });
            });

        if let Some(row) = clicked {
            self.select_row(row, classes);
        }

        if let Some(create) = self.create.as_mut() {
            let result = create.show(ctx, classes);
            self.finish_create(result, classes);
        }

        outcome
    }
}
