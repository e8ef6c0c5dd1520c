// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! Drawing tools are only offered while a displayable file is open; the
//! history and save buttons follow the state passed in.

use crate::app::Tool;

/// Buttons pressed on the toolbar this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolbarAction {
    pub save: bool,
    pub undo: bool,
    pub redo: bool,
}

/// What the toolbar can offer right now.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarState {
    pub drawing_enabled: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub dirty: bool,
}

/// Display the toolbar with tool selection buttons.
pub fn show(ui: &mut egui::Ui, current_tool: &mut Tool, state: ToolbarState) -> ToolbarAction {
    let mut action = ToolbarAction::default();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.add_enabled_ui(state.drawing_enabled, |ui| {
            ui.label("Tools:");
            ui.separator();

            for (tool, text) in [
                (Tool::Select, "⬆ Select"),
                (Tool::Polygon, "▱ Polygon"),
                (Tool::Line, "⟋ Line"),
            ] {
                if ui.selectable_label(*current_tool == tool, text).clicked() {
                    *current_tool = tool;
                }
            }
        });

        ui.separator();

        action.undo = ui.add_enabled(state.can_undo, egui::Button::new("↶ Undo")).clicked();
        action.redo = ui.add_enabled(state.can_redo, egui::Button::new("↷ Redo")).clicked();
        let save_text = if state.dirty { "💾 Save*" } else { "💾 Save" };
        action.save = ui.add_enabled(state.dirty, egui::Button::new(save_text)).clicked();

        ui.separator();

        let tool_text = match current_tool {
            Tool::Select => "Click to select shapes, drag vertices to move them",
            Tool::Polygon => "Click to add vertices, double-click or Enter to close polygon",
            Tool::Line => "Click to add points, press Enter to finish line",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
