// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and annotation.
//!
//! This module provides the main canvas area where users view the current
//! file, draw shapes, select them and drag their vertices.

use crate::app::Tool;
use crate::models::{
    annotation::{Annotation, Point},
    project::ProjectSettings,
};
use crate::util::geometry::{denormalize_coordinates, normalize_coordinates};

/// Result of canvas interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    None,
    AddVertex(Point),
    FinishAnnotation,
    SelectAnnotation(usize),
    DeselectAnnotation,
    StartDraggingVertex(usize, usize),
    DragVertex(Point),
    StopDragging,
}

/// What the canvas draws this frame.
pub struct CanvasView<'a> {
    pub annotations: &'a [Annotation],
    pub current_tool: Tool,
    pub image_texture: Option<&'a egui::TextureHandle>,
    pub image_size: Option<(u32, u32)>,
    pub in_progress_annotation: Option<&'a Annotation>,
    pub selected_annotation: Option<usize>,
    pub dragging_vertex: Option<(usize, usize)>,
    pub settings: &'a ProjectSettings,
    /// Text shown instead of an image (no project, or undisplayable file)
    pub placeholder: Option<&'a str>,
    pub status: &'a str,
}

/// Display the main canvas area and handle mouse interactions.
pub fn show(ui: &mut egui::Ui, view: &CanvasView<'_>) -> CanvasAction {
    let mut action = CanvasAction::None;
    // Set background color
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size() - egui::vec2(0.0, 24.0);

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        match (view.image_texture, view.image_size) {
            (Some(texture), Some((img_width, img_height))) => {
                let available = ui.available_size();
                let image_rect = fit_rect(ui.min_rect().min, available, img_width, img_height);

                ui.painter().image(
                    texture.id(),
                    image_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );

                let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());
                action = handle_pointer(&response, &image_rect, view);

                let painter = ui.painter();
                for (idx, annotation) in view.annotations.iter().enumerate() {
                    let selected = view.selected_annotation == Some(idx);
                    draw_annotation(painter, annotation, &image_rect, view.settings, selected, false);
                }
                if let Some(annotation) = view.in_progress_annotation {
                    draw_annotation(painter, annotation, &image_rect, view.settings, false, true);
                }
            }
            _ => match view.placeholder {
                Some(text) => {
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(text).color(egui::Color32::from_gray(180)));
                    });
                }
                None => welcome(ui),
            },
        }
    });

    // Display current tool info at the bottom
    ui.separator();
    ui.horizontal(|ui| {
        ui.label(format!("Current tool: {:?}", view.current_tool));
        ui.separator();
        ui.label(view.status);
    });

    action
}

/// Largest rect with the image's aspect ratio centered in `available`.
fn fit_rect(origin: egui::Pos2, available: egui::Vec2, img_width: u32, img_height: u32) -> egui::Rect {
    let img_aspect = img_width as f32 / img_height as f32;
    let available_aspect = available.x / available.y;

    let (display_width, display_height) = if img_aspect > available_aspect {
        (available.x, available.x / img_aspect)
    } else {
        (available.y * img_aspect, available.y)
    };

    let offset = egui::vec2(
        (available.x - display_width) / 2.0,
        (available.y - display_height) / 2.0,
    );
    egui::Rect::from_min_size(origin + offset, egui::vec2(display_width, display_height))
}

fn to_normalized(pos: egui::Pos2, image_rect: &egui::Rect) -> Point {
    let point = normalize_coordinates(
        (pos.x - image_rect.min.x) as f64,
        (pos.y - image_rect.min.y) as f64,
        image_rect.width() as f64,
        image_rect.height() as f64,
    );
    Point::new(point.x.clamp(0.0, 1.0), point.y.clamp(0.0, 1.0))
}

fn handle_pointer(response: &egui::Response, image_rect: &egui::Rect, view: &CanvasView<'_>) -> CanvasAction {
    let Some(pos) = response.interact_pointer_pos() else {
        return CanvasAction::None;
    };
    let point = to_normalized(pos, image_rect);
    // Pick radius in normalized units, scaled from the drawn vertex size.
    let tolerance = (view.settings.vertex_size as f64 * 2.0) / image_rect.width().max(1.0) as f64;

    if view.current_tool != Tool::Select {
        if response.double_clicked() && view.current_tool == Tool::Polygon {
            return CanvasAction::FinishAnnotation;
        }
        if response.clicked() && image_rect.contains(pos) {
            return CanvasAction::AddVertex(point);
        }
        return CanvasAction::None;
    }

    if response.drag_started() {
        let hit = view
            .selected_annotation
            .into_iter()
            .chain((0..view.annotations.len()).rev())
            .find_map(|idx| {
                view.annotations
                    .get(idx)?
                    .nearest_vertex(&point, tolerance)
                    .map(|vertex| (idx, vertex))
            });
        if let Some((idx, vertex)) = hit {
            return CanvasAction::StartDraggingVertex(idx, vertex);
        }
    }
    if response.dragged() && view.dragging_vertex.is_some() {
        return CanvasAction::DragVertex(point);
    }
    if response.drag_stopped() && view.dragging_vertex.is_some() {
        return CanvasAction::StopDragging;
    }
    if response.clicked() {
        // Topmost shape wins.
        return match view
            .annotations
            .iter()
            .rposition(|a| a.hit_test(&point, tolerance))
        {
            Some(idx) => CanvasAction::SelectAnnotation(idx),
            None => CanvasAction::DeselectAnnotation,
        };
    }
    CanvasAction::None
}

fn welcome(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading(
                egui::RichText::new("Welcome to the All-Purpose Labeling Tool")
                    .size(28.0)
                    .strong()
                    .color(egui::Color32::from_gray(200)),
            );
            ui.add_space(20.0);
            ui.label(
                egui::RichText::new("Create or open a project to get started")
                    .size(16.0)
                    .color(egui::Color32::from_gray(170)),
            );
            ui.add_space(10.0);
            ui.label(
                egui::RichText::new("File → New Project... / Open Project...")
                    .weak()
                    .color(egui::Color32::from_gray(130)),
            );
        });
    });
}

/// Draw an annotation on the canvas.
fn draw_annotation(
    painter: &egui::Painter,
    annotation: &Annotation,
    image_rect: &egui::Rect,
    settings: &ProjectSettings,
    is_selected: bool,
    is_in_progress: bool,
) {
    let vertices = &annotation.vertices;
    if vertices.is_empty() {
        return;
    }

    let screen_points: Vec<egui::Pos2> = vertices
        .iter()
        .map(|p| {
            let (x, y) = denormalize_coordinates(p, image_rect.width() as f64, image_rect.height() as f64);
            image_rect.min + egui::vec2(x as f32, y as f32)
        })
        .collect();

    let color = if is_in_progress {
        egui::Color32::LIGHT_BLUE
    } else {
        annotation.line_color.to_color32()
    };
    let width = if is_selected {
        settings.line_width * 2.0
    } else {
        settings.line_width
    };

    if annotation.is_closed() && !is_in_progress && screen_points.len() > 2 {
        painter.add(egui::Shape::closed_line(
            screen_points.clone(),
            egui::Stroke::new(width, color),
        ));
    } else {
        painter.add(egui::Shape::line(
            screen_points.clone(),
            egui::Stroke::new(width, color),
        ));
    }

    let vertex_color = if is_in_progress {
        egui::Color32::WHITE
    } else {
        color
    };
    for point in &screen_points {
        painter.circle_filled(*point, settings.vertex_size, vertex_color);
        painter.circle_stroke(*point, settings.vertex_size, egui::Stroke::new(1.0, egui::Color32::BLACK));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_rect_keeps_aspect_and_centers() {
        let rect = fit_rect(egui::pos2(0.0, 0.0), egui::vec2(400.0, 400.0), 200, 100);
        assert_eq!(rect.width(), 400.0);
        assert_eq!(rect.height(), 200.0);
        assert_eq!(rect.min.y, 100.0);
    }

    #[test]
    fn test_to_normalized_clamps() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 10.0), egui::vec2(100.0, 50.0));
        assert_eq!(to_normalized(egui::pos2(60.0, 35.0), &rect), Point::new(0.5, 0.5));
        assert_eq!(to_normalized(egui::pos2(500.0, 0.0), &rect), Point::new(1.0, 0.0));
    }
}
