// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Registering a patient in the open project.

use super::{modal_window, ok_cancel_buttons, DialogOutcome};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientDialog {
    name: String,
}

impl PatientDialog {
    /// Blank names keep the dialog open.
    pub fn submit(&self) -> DialogOutcome<String> {
        let name = self.name.trim();
        if name.is_empty() {
            DialogOutcome::Open
        } else {
            DialogOutcome::Accepted(name.to_string())
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome<String> {
        let mut outcome = DialogOutcome::Open;
        modal_window("Add Patient").show(ctx, |ui| {
            ui.add(egui::TextEdit::singleline(&mut self.name).hint_text("Patient identifier"));
            match ok_cancel_buttons(ui, "Add", "Cancel") {
                Some(true) => outcome = self.submit(),
                Some(false) => outcome = DialogOutcome::Cancelled,
                None => {}
            }
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_not_accepted() {
        let mut dialog = PatientDialog::default();
        assert_eq!(dialog.submit(), DialogOutcome::Open);
        dialog.name = "  P-17 ".to_string();
        assert_eq!(dialog.submit(), DialogOutcome::Accepted("P-17".to_string()));
    }
}
