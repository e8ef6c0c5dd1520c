// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation properties panel.
//!
//! Right-hand panel listing the project's label classes and the shapes of
//! the current file with their comment links.

use crate::models::{annotation::Annotation, label_class::LabelClassRegistry};
use crate::ui::lists;

/// Result of interacting with the properties panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertiesAction {
    None,
    SelectAnnotation(usize),
    RelabelAnnotation(usize),
    EditComment(usize),
    DeleteAnnotation(usize),
}

/// Display the properties panel.
pub fn show(
    ui: &mut egui::Ui,
    annotations: &[Annotation],
    classes: &LabelClassRegistry,
    selected: Option<usize>,
) -> PropertiesAction {
    lists::labels_viewing(ui, classes);
    ui.add_space(12.0);

    lists::list_header(ui, "Shapes");
    if annotations.is_empty() {
        ui.label(egui::RichText::new("No shapes on this file").weak());
        return PropertiesAction::None;
    }

    egui::ScrollArea::vertical()
        .id_source("shape_scroll")
        .show(ui, |ui| lists::label_list(ui, annotations, selected))
        .inner
}
