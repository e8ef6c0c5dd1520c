// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides utilities for coordinate transformations between
//! canvas coordinates and normalized image coordinates, and the hit tests
//! the canvas uses for selecting shapes.

use crate::models::annotation::Point;

/// Convert pixel coordinates to normalized coordinates (0.0 to 1.0).
pub fn normalize_coordinates(pixel_x: f64, pixel_y: f64, width: f64, height: f64) -> Point {
    Point {
        x: pixel_x / width,
        y: pixel_y / height,
    }
}

/// Convert normalized coordinates to pixel coordinates.
pub fn denormalize_coordinates(point: &Point, width: f64, height: f64) -> (f64, f64) {
    (point.x * width, point.y * height)
}

/// Even-odd point-in-polygon test on normalized coordinates.
pub fn point_in_polygon(point: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: &Point, a: &Point, b: &Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((point.x - a.x).powi(2) + (point.y - a.y).powi(2)).sqrt();
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    let (px, py) = (a.x + t * dx, a.y + t * dy);
    ((point.x - px).powi(2) + (point.y - py).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_corners() {
        let tl = normalize_coordinates(0.0, 0.0, 1920.0, 1080.0);
        assert_eq!(tl, Point::new(0.0, 0.0));

        let br = normalize_coordinates(1920.0, 1080.0, 1920.0, 1080.0);
        assert_eq!(br, Point::new(1.0, 1.0));

        let (x, y) = denormalize_coordinates(&Point::new(0.5, 0.5), 1920.0, 1080.0);
        assert!((x - 960.0).abs() < 0.0001);
        assert!((y - 540.0).abs() < 0.0001);
    }

    #[test]
    fn test_point_in_square() {
        let square = [
            Point::new(0.2, 0.2),
            Point::new(0.8, 0.2),
            Point::new(0.8, 0.8),
            Point::new(0.2, 0.8),
        ];
        assert!(point_in_polygon(&Point::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(&Point::new(0.9, 0.5), &square));
        assert!(!point_in_polygon(&Point::new(0.5, 0.5), &square[..2]));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!((distance_to_segment(&Point::new(0.5, 0.2), &a, &b) - 0.2).abs() < 1e-9);
        assert!((distance_to_segment(&Point::new(2.0, 0.0), &a, &b) - 1.0).abs() < 1e-9);
    }
}
