// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Message and confirmation boxes.

use super::{modal_window, ok_cancel_buttons, DialogOutcome};

/// Informational box with a single OK button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBox {
    title: String,
    text: String,
}

impl MessageBox {
    pub fn new(title: &str, text: &str) -> Self {
        Self {
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    /// Returns true once dismissed.
    pub fn show(&self, ctx: &egui::Context) -> bool {
        let mut closed = false;
        modal_window(&self.title).show(ctx, |ui| {
            ui.label(&self.text);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                closed = true;
            }
        });
        closed
    }
}

/// Two-button question box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmBox {
    title: String,
    text: String,
    informative: Option<String>,
    ok_label: &'static str,
    cancel_label: &'static str,
}

impl ConfirmBox {
    pub fn new(title: &str, text: &str) -> Self {
        Self {
            title: title.to_string(),
            text: text.to_string(),
            informative: None,
            ok_label: "OK",
            cancel_label: "Cancel",
        }
    }

    pub fn informative(mut self, text: &str) -> Self {
        self.informative = Some(text.to_string());
        self
    }

    pub fn buttons(mut self, ok_label: &'static str, cancel_label: &'static str) -> Self {
        self.ok_label = ok_label;
        self.cancel_label = cancel_label;
        self
    }

    pub fn show(&self, ctx: &egui::Context) -> DialogOutcome<()> {
        let mut outcome = DialogOutcome::Open;
        modal_window(&self.title).show(ctx, |ui| {
            ui.label(&self.text);
            if let Some(informative) = &self.informative {
                ui.label(egui::RichText::new(informative).weak());
            }
            ui.add_space(8.0);
            match ok_cancel_buttons(ui, self.ok_label, self.cancel_label) {
                Some(true) => outcome = DialogOutcome::Accepted(()),
                Some(false) => outcome = DialogOutcome::Cancelled,
                None => {}
            }
        });
        outcome
    }
}

/// Asks before a shape is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteShapeMessageBox {
    index: usize,
    question: ConfirmBox,
}

impl DeleteShapeMessageBox {
    pub fn new(index: usize, shape: &str) -> Self {
        let question = ConfirmBox::new(
            "Deleting Shape",
            &format!("You are about to delete {}. Continue?", shape),
        )
        .buttons("Yes", "No");
        Self { index, question }
    }

    /// Accepted with the index of the shape to delete.
    pub fn show(&self, ctx: &egui::Context) -> DialogOutcome<usize> {
        match self.question.show(ctx) {
            DialogOutcome::Accepted(()) => DialogOutcome::Accepted(self.index),
            DialogOutcome::Cancelled => DialogOutcome::Cancelled,
            DialogOutcome::Open => DialogOutcome::Open,
        }
    }
}

/// What to do with unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveChoice {
    Save,
    Dismiss,
}

/// Shown before unsaved labels would be lost. Cancel keeps the user where
/// they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotToSaveMessageBox;

impl ForgotToSaveMessageBox {
    pub fn show(&self, ctx: &egui::Context) -> DialogOutcome<SaveChoice> {
        let mut outcome = DialogOutcome::Open;
        modal_window("Caution: Unsaved Changes").show(ctx, |ui| {
            ui.label("Unsaved Changes: How do you want to progress?");
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("💾 Save Changes").clicked() {
                    outcome = DialogOutcome::Accepted(SaveChoice::Save);
                }
                if ui.button("Cancel").clicked() {
                    outcome = DialogOutcome::Cancelled;
                }
                if ui.button("🗑 Dismiss Changes").clicked() {
                    outcome = DialogOutcome::Accepted(SaveChoice::Dismiss);
                }
            });
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_question_names_shape() {
        let dialog = DeleteShapeMessageBox::new(2, "tumor");
        assert_eq!(dialog.question.text, "You are about to delete tumor. Continue?");
    }
}
