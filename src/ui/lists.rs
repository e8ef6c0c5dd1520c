// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! List widgets.
//!
//! The lists are projections of the in-memory collections and are redrawn
//! from them every frame; they never own data.

use crate::models::{
    annotation::Annotation,
    filter::ListFilter,
    label_class::LabelClassRegistry,
    project::{FileEntry, Patient},
};
use crate::ui::properties::PropertiesAction;
use crate::util::color::Color;

const ICON_SIZE: f32 = 10.0;
const HEADER_FILL: egui::Color32 = egui::Color32::from_rgb(186, 189, 182);

/// A selectable row with a small color square in front of the text.
pub fn color_square_item(ui: &mut egui::Ui, text: &str, color: Color, selected: bool) -> egui::Response {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(ICON_SIZE, ICON_SIZE), egui::Sense::hover());
        ui.painter().rect_filled(rect, 1.0, color.to_color32());
        ui.selectable_label(selected, text)
    })
    .inner
}

/// Gray title strip above a list.
pub fn list_header(ui: &mut egui::Ui, title: &str) {
    egui::Frame::none()
        .fill(HEADER_FILL)
        .inner_margin(egui::Margin::symmetric(4.0, 2.0))
        .show(ui, |ui| {
            ui.vertical_centered_justified(|ui| {
                ui.label(egui::RichText::new(title).color(egui::Color32::BLACK));
            });
        });
}

/// Text of a shape's comment link.
pub fn comment_text(annotation: &Annotation) -> &'static str {
    if annotation.has_comment() {
        "Details"
    } else {
        "Add comment"
    }
}

/// Shapes of the current file, each with its comment link.
pub fn label_list(
    ui: &mut egui::Ui,
    annotations: &[Annotation],
    selected: Option<usize>,
) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    egui::Grid::new("label_list")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            for (idx, annotation) in annotations.iter().enumerate() {
                let text = if annotation.label.is_empty() {
                    "(unlabeled)"
                } else {
                    annotation.label.as_str()
                };
                let response = color_square_item(ui, text, annotation.line_color, selected == Some(idx));
                if response.clicked() {
                    action = PropertiesAction::SelectAnnotation(idx);
                }
                if response.double_clicked() {
                    action = PropertiesAction::RelabelAnnotation(idx);
                }
                response.context_menu(|ui| {
                    if ui.button("Change label").clicked() {
                        action = PropertiesAction::RelabelAnnotation(idx);
                        ui.close_menu();
                    }
                    if ui.button("Delete").clicked() {
                        action = PropertiesAction::DeleteAnnotation(idx);
                        ui.close_menu();
                    }
                });

                let link = ui
                    .add(egui::Label::new(egui::RichText::new(comment_text(annotation)).underline()).sense(egui::Sense::click()))
                    .on_hover_cursor(egui::CursorIcon::PointingHand);
                if link.clicked() {
                    action = PropertiesAction::EditComment(idx);
                }
                ui.end_row();
            }
        });

    action
}

/// Unique label classes of the project, display only.
pub fn labels_viewing(ui: &mut egui::Ui, classes: &LabelClassRegistry) {
    list_header(ui, "Labels");
    if classes.is_empty() {
        ui.label(egui::RichText::new("No labels yet").weak());
    }
    for (name, color) in classes.list_classes() {
        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(ICON_SIZE, ICON_SIZE), egui::Sense::hover());
            ui.painter().rect_filled(rect, 1.0, color.to_color32());
            ui.label(name);
        });
    }
}

/// Result of interacting with the file list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileListAction {
    None,
    Open(usize),
    Delete(usize),
    AssignPatient(usize, Option<i64>),
}

/// File list with a live search field.
#[derive(Debug, Clone, Default)]
pub struct FileViewingWidget {
    filter: ListFilter,
}

impl FileViewingWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of the files matching the search.
    pub fn visible(&self, files: &[FileEntry]) -> Vec<usize> {
        self.filter
            .visible_indices(files.iter().map(|f| f.filename.as_str()))
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        files: &[FileEntry],
        patients: &[Patient],
        current: Option<usize>,
    ) -> FileListAction {
        let mut action = FileListAction::None;

        list_header(ui, "File List");
        ui.horizontal(|ui| {
            let clear_width = if self.filter.is_active() { 24.0 } else { 0.0 };
            ui.add(
                egui::TextEdit::singleline(self.filter.text_mut())
                    .hint_text("Search Filename")
                    .desired_width(ui.available_width() - clear_width),
            );
            if self.filter.is_active() && ui.small_button("✖").clicked() {
                self.filter.clear();
            }
        });

        let visible = self.visible(files);
        if self.filter.is_active() {
            ui.label(egui::RichText::new(format!("{} of {} files", visible.len(), files.len())).weak());
        }

        egui::ScrollArea::vertical().show(ui, |ui| {
            for idx in visible {
                let entry = &files[idx];
                let response = ui.selectable_label(current == Some(idx), &entry.filename);
                if response.clicked() {
                    action = FileListAction::Open(idx);
                }
                response.context_menu(|ui| {
                    if !patients.is_empty() {
                        ui.menu_button("Assign patient", |ui| {
                            if ui.selectable_label(entry.patient_id.is_none(), "None").clicked() {
                                action = FileListAction::AssignPatient(idx, None);
                                ui.close_menu();
                            }
                            for patient in patients {
                                let assigned = entry.patient_id == Some(patient.id);
                                if ui.selectable_label(assigned, &patient.name).clicked() {
                                    action = FileListAction::AssignPatient(idx, Some(patient.id));
                                    ui.close_menu();
                                }
                            }
                        });
                    }
                    if ui.button("Delete file").clicked() {
                        action = FileListAction::Delete(idx);
                        ui.close_menu();
                    }
                });
            }
        });

        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::AnnotationType;
    use crate::models::project::FileType;
    use std::path::Path;

    #[test]
    fn test_comment_link_text() {
        let shape = Annotation::new(AnnotationType::Polygon);
        assert_eq!(comment_text(&shape), "Add comment");
        assert_eq!(comment_text(&shape.edit_comment("note")), "Details");
    }

    #[test]
    fn test_file_search_hides_and_restores() {
        let files: Vec<FileEntry> = ["scan_01.png", "scan_02.png", "video.mp4"]
            .iter()
            .map(|name| FileEntry::from_source(&Path::new("/in").join(name), FileType::Image).unwrap())
            .collect();
        let mut widget = FileViewingWidget::new();

        widget.filter.set_text("scan");
        assert_eq!(widget.visible(&files), vec![0, 1]);
        widget.filter.set_text("SCAN");
        assert!(widget.visible(&files).is_empty());
        widget.filter.clear();
        assert_eq!(widget.visible(&files), vec![0, 1, 2]);
    }
}
