// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation export and import.
//!
//! This module writes and reads the labels of a single file in YAML and
//! JSON, chosen by the path's extension.

use crate::models::project::ProjectData;
use anyhow::{bail, Context, Result};
use std::path::Path;

fn write_yaml(data: &ProjectData, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(data).context("Failed to encode YAML")?;
    std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))
}

fn write_json(data: &ProjectData, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to encode JSON")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn read_yaml(text: &str) -> Result<ProjectData> {
    serde_yaml::from_str(text).context("Failed to import YAML")
}

fn read_json(text: &str) -> Result<ProjectData> {
    serde_json::from_str(text).context("Failed to import JSON")
}

/// Export, picking the format from the extension.
pub fn export(data: &ProjectData, path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => write_yaml(data, path),
        Some("json") => write_json(data, path),
        other => bail!("Unsupported file extension: {:?}", other),
    }
}

/// Import, picking the format from the extension.
pub fn import(path: &Path) -> Result<ProjectData> {
    let read: fn(&str) -> Result<ProjectData> = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => read_yaml,
        Some("json") => read_json,
        other => bail!("Unsupported file extension: {:?}", other),
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    read(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Annotation, AnnotationType, Point};
    use crate::util::color::Color;

    fn sample() -> ProjectData {
        let mut data = ProjectData::new("scan.png".to_string(), 640, 480);
        let mut shape = Annotation::new(AnnotationType::Polygon);
        shape.set_label("tumor", Color::new(200, 10, 10));
        shape.add_vertex(Point::new(0.1, 0.1));
        shape.add_vertex(Point::new(0.2, 0.1));
        shape.add_vertex(Point::new(0.2, 0.3));
        data.annotations.push(shape.edit_comment("irregular border"));
        data.annotations.push(Annotation::new(AnnotationType::Line));
        data
    }

    #[test]
    fn test_yaml_keeps_comment_and_label() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.yaml");
        export(&sample(), &path).unwrap();

        let loaded = import(&path).unwrap();
        assert_eq!(loaded.annotations, sample().annotations);
        assert_eq!(loaded.media_file, "scan.png");
    }

    #[test]
    fn test_json_omits_empty_comment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.json");
        export(&sample(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("\"comment\"").count(), 1);
        assert_eq!(import(&path).unwrap().annotations.len(), 2);
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(export(&sample(), &dir.path().join("labels.txt")).is_err());
    }
}
