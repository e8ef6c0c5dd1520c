// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! A shape is a user-drawn region (polygon) or polyline on the current
//! file, tagged with a label class and an optional free-text comment.

use crate::util::color::Color;
use crate::util::geometry;
use serde::{Deserialize, Serialize};

/// A 2D point with normalized coordinates (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Type of annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationType {
    Polygon,
    Line,
}

impl AnnotationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationType::Polygon => "polygon",
            AnnotationType::Line => "line",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "polygon" => Some(AnnotationType::Polygon),
            "line" => Some(AnnotationType::Line),
            _ => None,
        }
    }
}

/// A labeled shape with its class name, color and comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Name of the label class this shape belongs to
    pub label: String,
    #[serde(rename = "type")]
    pub annotation_type: AnnotationType,
    pub line_color: Color,
    /// Free-text notes; empty means no comment
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    pub vertices: Vec<Point>,
}

impl Annotation {
    /// Create a new, unlabeled annotation of the given type.
    pub fn new(annotation_type: AnnotationType) -> Self {
        Self {
            label: String::new(),
            annotation_type,
            line_color: Color::UNLABELED,
            comment: String::new(),
            vertices: Vec::new(),
        }
    }

    /// Add a vertex to the annotation.
    pub fn add_vertex(&mut self, point: Point) {
        self.vertices.push(point);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Move an existing vertex. Out of range indices are ignored.
    pub fn update_vertex(&mut self, index: usize, point: Point) {
        if let Some(vertex) = self.vertices.get_mut(index) {
            *vertex = point;
        }
    }

    /// Check if the annotation is closed (polygon).
    pub fn is_closed(&self) -> bool {
        matches!(self.annotation_type, AnnotationType::Polygon)
    }

    /// Minimum number of vertices before the shape can be finished.
    pub fn is_complete(&self) -> bool {
        match self.annotation_type {
            AnnotationType::Polygon => self.vertex_count() >= 3,
            AnnotationType::Line => self.vertex_count() >= 2,
        }
    }

    pub fn has_comment(&self) -> bool {
        !self.comment.is_empty()
    }

    /// Assign the shape to a label class.
    pub fn set_label(&mut self, label: &str, color: Color) {
        self.label = label.to_string();
        self.line_color = color;
    }

    /// Replace the comment text.
    pub fn edit_comment(mut self, text: &str) -> Self {
        self.comment = text.to_string();
        self
    }

    /// Whether `point` hits this shape, within `tolerance` of an edge or
    /// inside a closed polygon.
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> bool {
        if self.is_closed() && geometry::point_in_polygon(point, &self.vertices) {
            return true;
        }
        self.edges()
            .any(|(a, b)| geometry::distance_to_segment(point, a, b) <= tolerance)
    }

    /// Index of the vertex closest to `point`, if within `tolerance`.
    pub fn nearest_vertex(&self, point: &Point, tolerance: f64) -> Option<usize> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (i, ((v.x - point.x).powi(2) + (v.y - point.y).powi(2)).sqrt()))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
        let n = self.vertices.len();
        let closing = if self.is_closed() && n > 2 { n } else { n.saturating_sub(1) };
        (0..closing).map(move |i| (&self.vertices[i], &self.vertices[(i + 1) % n]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Annotation {
        let mut a = Annotation::new(AnnotationType::Polygon);
        a.add_vertex(Point::new(0.1, 0.1));
        a.add_vertex(Point::new(0.9, 0.1));
        a.add_vertex(Point::new(0.5, 0.9));
        a
    }

    #[test]
    fn test_edit_comment_replaces_text() {
        let shape = triangle().edit_comment("first");
        assert!(shape.has_comment());
        let shape = shape.edit_comment("second");
        assert_eq!(shape.comment, "second");
        assert!(!shape.edit_comment("").has_comment());
    }

    #[test]
    fn test_completion_thresholds() {
        let mut line = Annotation::new(AnnotationType::Line);
        line.add_vertex(Point::new(0.0, 0.0));
        assert!(!line.is_complete());
        line.add_vertex(Point::new(1.0, 1.0));
        assert!(line.is_complete());

        let mut polygon = Annotation::new(AnnotationType::Polygon);
        polygon.add_vertex(Point::new(0.0, 0.0));
        polygon.add_vertex(Point::new(1.0, 0.0));
        assert!(!polygon.is_complete());
    }

    #[test]
    fn test_hit_test_inside_and_near_edge() {
        let shape = triangle();
        assert!(shape.hit_test(&Point::new(0.5, 0.4), 0.01));
        assert!(shape.hit_test(&Point::new(0.5, 0.105), 0.01));
        assert!(!shape.hit_test(&Point::new(0.05, 0.95), 0.01));
    }

    #[test]
    fn test_nearest_vertex() {
        let mut shape = triangle();
        assert_eq!(shape.nearest_vertex(&Point::new(0.91, 0.11), 0.05), Some(1));
        assert_eq!(shape.nearest_vertex(&Point::new(0.3, 0.5), 0.05), None);

        shape.update_vertex(1, Point::new(0.8, 0.2));
        assert_eq!(shape.vertices[1], Point::new(0.8, 0.2));
        shape.update_vertex(10, Point::new(0.0, 0.0));
        assert_eq!(shape.vertex_count(), 3);
    }

    #[test]
    fn test_set_label() {
        let mut shape = triangle();
        shape.set_label("cell", Color::new(1, 2, 3));
        assert_eq!(shape.label, "cell");
        assert_eq!(shape.line_color, Color::new(1, 2, 3));
    }
}
