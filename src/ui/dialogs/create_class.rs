// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dialog for entering a new label class name.
//!
//! The dialog only validates; adding the class to the registry is left to
//! the label selection dialog that opened it.

use super::{modal_window, ok_cancel_buttons, DialogOutcome};
use crate::models::label_class::LabelClassRegistry;

const PLACEHOLDER: &str = "Enter new Shape name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateNewLabelClassDialog {
    text: String,
    placeholder: String,
    focused: bool,
}

impl Default for CreateNewLabelClassDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateNewLabelClassDialog {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            placeholder: PLACEHOLDER.to_string(),
            focused: false,
        }
    }

    /// Validate the entered name.
    ///
    /// A name that already exists clears the input and turns the
    /// placeholder into a notice; an empty name is ignored. Both keep the
    /// dialog open.
    pub fn submit(&mut self, classes: &LabelClassRegistry) -> DialogOutcome<String> {
        let name = self.text.trim().to_string();
        if classes.contains(&name) {
            self.text.clear();
            self.placeholder = format!("'{}' already exists", name);
            DialogOutcome::Open
        } else if name.is_empty() {
            DialogOutcome::Open
        } else {
            DialogOutcome::Accepted(name)
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, classes: &LabelClassRegistry) -> DialogOutcome<String> {
        let mut outcome = DialogOutcome::Open;
        modal_window("Create new Shape class")
            .fixed_size([220.0, 80.0])
            .show(ctx, |ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.text)
                        .hint_text(self.placeholder.as_str())
                        .desired_width(f32::INFINITY),
                );
                if !self.focused {
                    response.request_focus();
                    self.focused = true;
                }
                let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                match ok_cancel_buttons(ui, "OK", "Cancel") {
                    Some(true) => outcome = self.submit(classes),
                    Some(false) => outcome = DialogOutcome::Cancelled,
                    None if entered => outcome = self.submit(classes),
                    None => {}
                }
            });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LabelClassRegistry {
        LabelClassRegistry::from_names(["tumor", "stroma"])
    }

    #[test]
    fn test_duplicate_reprompts() {
        let mut dialog = CreateNewLabelClassDialog::new();
        dialog.text = "tumor".to_string();

        assert_eq!(dialog.submit(&registry()), DialogOutcome::Open);
        assert_eq!(dialog.text, "");
        assert_eq!(dialog.placeholder, "'tumor' already exists");
    }

    #[test]
    fn test_empty_name_keeps_dialog_open() {
        let mut dialog = CreateNewLabelClassDialog::new();
        assert_eq!(dialog.submit(&registry()), DialogOutcome::Open);
        dialog.text = "   ".to_string();
        assert_eq!(dialog.submit(&registry()), DialogOutcome::Open);
        assert_eq!(dialog.placeholder, PLACEHOLDER);
    }

    #[test]
    fn test_fresh_name_accepted() {
        let mut dialog = CreateNewLabelClassDialog::new();
        dialog.text = "necrosis ".to_string();
        assert_eq!(
            dialog.submit(&registry()),
            DialogOutcome::Accepted("necrosis".to_string())
        );
    }
}
