// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Media file loading.
//!
//! Images are decoded into RGBA8 buffers suitable for an egui texture.
//! Videos and whole slide images are tracked by the project but not
//! decoded here.

use anyhow::{Context, Result};
use std::path::Path;

/// Decoded image ready for upload.
pub struct LoadedImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row major
    pub pixels: Vec<u8>,
}

/// Decode an image file into RGBA8 pixels.
pub fn load_image(path: &Path) -> Result<LoadedImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();

    Ok(LoadedImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        image::RgbaImage::from_pixel(4, 3, image::Rgba([255, 0, 0, 255]))
            .save(&path)
            .unwrap();

        let loaded = load_image(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (4, 3));
        assert_eq!(loaded.pixels.len(), 4 * 3 * 4);
        assert_eq!(&loaded.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load_image(Path::new("/nonexistent/image.png")).is_err());
    }
}
