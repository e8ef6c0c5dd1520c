// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Notes attached to a single shape.

use super::{modal_window, ok_cancel_buttons, DialogOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDialog {
    index: usize,
    text: String,
}

impl CommentDialog {
    /// Edit the comment of the shape at `index`, starting from `comment`.
    pub fn new(index: usize, comment: &str) -> Self {
        Self {
            index,
            text: comment.to_string(),
        }
    }

    /// Accepted with the shape index and the full replacement text.
    pub fn accept(&self) -> DialogOutcome<(usize, String)> {
        DialogOutcome::Accepted((self.index, self.text.clone()))
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome<(usize, String)> {
        let mut outcome = DialogOutcome::Open;
        modal_window("Notes")
            .fixed_size([500.0, 300.0])
            .show(ctx, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.text)
                        .desired_rows(14)
                        .desired_width(f32::INFINITY),
                );
                match ok_cancel_buttons(ui, "OK", "Cancel") {
                    Some(true) => outcome = self.accept(),
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
    fn test_accept_returns_replacement_text() {
        let mut dialog = CommentDialog::new(4, "old note");
        dialog.text = "new note".to_string();
        assert_eq!(dialog.accept(), DialogOutcome::Accepted((4, "new note".to_string())));
    }

    #[test]
    fn test_unedited_comment_is_returned_as_is() {
        let dialog = CommentDialog::new(0, "keep");
        assert_eq!(dialog.accept(), DialogOutcome::Accepted((0, "keep".to_string())));
    }
}
