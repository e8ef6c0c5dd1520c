// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Modal dialogs.
//!
//! Every dialog is a small state machine: the app keeps it alive while it
//! reports [`DialogOutcome::Open`] and drops it once it is accepted or
//! cancelled. The form logic lives in plain methods so it can be tested
//! without a window; `show` only draws and forwards clicks to them.

pub mod comment;
pub mod create_class;
pub mod file_type;
pub mod import;
pub mod message_box;
pub mod new_label;
pub mod patient;
pub mod project_handler;
pub mod settings;

/// State of a dialog after a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome<T> {
    /// Still waiting for the user
    Open,
    Accepted(T),
    Cancelled,
}

/// A centered, fixed window used for every modal dialog.
///
/// Dialogs sit one layer order above the backdrop from [`dim_background`],
/// so clicking the backdrop cannot raise it over them.
pub fn modal_window(title: &str) -> egui::Window<'static> {
    egui::Window::new(title.to_string())
        .order(egui::Order::Foreground)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
}

/// Darken the area behind a modal dialog.
pub fn dim_background(ctx: &egui::Context) {
    let screen = ctx.screen_rect();
    egui::Area::new(egui::Id::new("modal_backdrop"))
        .fixed_pos(screen.min)
        .order(egui::Order::Middle)
        .interactable(true)
        .show(ctx, |ui| {
            ui.allocate_response(screen.size(), egui::Sense::click());
            ui.painter()
                .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(120));
        });
}

/// OK/Cancel button row. Returns `Some(true)` for OK, `Some(false)` for
/// Cancel.
pub fn ok_cancel_buttons(ui: &mut egui::Ui, ok_label: &str, cancel_label: &str) -> Option<bool> {
    let mut result = None;
    ui.horizontal(|ui| {
        if ui.button(ok_label).clicked() {
            result = Some(true);
        }
        if ui.button(cancel_label).clicked() {
            result = Some(false);
        }
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ctx: &egui::Context, events: Vec<egui::Event>) {
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(800.0, 600.0),
            )),
            events,
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            dim_background(ctx);
            modal_window("Question").show(ctx, |ui| {
                ui.label("Continue?");
                ok_cancel_buttons(ui, "Yes", "No");
            });
        });
    }

    fn click(pos: egui::Pos2, pressed: bool) -> Vec<egui::Event> {
        vec![
            egui::Event::PointerMoved(pos),
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                modifiers: egui::Modifiers::default(),
            },
        ]
    }

    #[test]
    fn test_backdrop_click_keeps_dialog_on_top() {
        let ctx = egui::Context::default();
        let center = egui::pos2(400.0, 300.0);
        let outside = egui::pos2(10.0, 10.0);

        frame(&ctx, Vec::new());
        frame(&ctx, Vec::new());
        frame(&ctx, click(outside, true));
        frame(&ctx, click(outside, false));
        frame(&ctx, Vec::new());

        let backdrop = ctx.layer_id_at(outside).unwrap();
        assert_eq!(backdrop.id, egui::Id::new("modal_backdrop"));

        let top = ctx.layer_id_at(center).unwrap();
        assert_eq!(top.order, egui::Order::Foreground);
        assert_ne!(top.id, backdrop.id);
    }
}
