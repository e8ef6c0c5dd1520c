// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Label class colors.
//!
//! Every label class gets a display color derived from its insertion index,
//! so the same class list always renders with the same palette.

use serde::{Deserialize, Serialize};

/// Hue step between consecutive classes (golden angle, in degrees).
const HUE_STEP: f32 = 137.508;

/// An opaque RGB color stored with shapes and classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Color used for shapes that have not been assigned a class yet.
    pub const UNLABELED: Color = Color::new(173, 216, 230);

    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::UNLABELED
    }
}

/// Convert HSV to RGB.
///
/// `h` is in degrees (0-360), `s` and `v` in 0.0-1.0. Returns components
/// in 0.0-1.0.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Palette color for the class at `index`.
pub fn class_color(index: usize) -> Color {
    let hue = (index as f32 * HUE_STEP) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.95);
    Color::new(
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb_primaries() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((r - 1.0).abs() < 0.01 && g.abs() < 0.01 && b.abs() < 0.01);

        let (r, g, b) = hsv_to_rgb(120.0, 1.0, 1.0);
        assert!(r.abs() < 0.01 && (g - 1.0).abs() < 0.01 && b.abs() < 0.01);
    }

    #[test]
    fn test_class_color_is_stable() {
        assert_eq!(class_color(3), class_color(3));
    }

    #[test]
    fn test_neighbouring_classes_differ() {
        for i in 0..20 {
            assert_ne!(class_color(i), class_color(i + 1));
        }
    }
}
