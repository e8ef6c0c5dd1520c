// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project state management.
//!
//! This module holds the project-level records: tracked media files,
//! patients, per-project settings, the draft assembled while the
//! project creation dialog is open, and the per-file export format.

use super::annotation::Annotation;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Media kind chosen before a file is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Video,
    Image,
    WholeSlide,
}

impl FileType {
    pub const ALL: [FileType; 3] = [FileType::Video, FileType::Image, FileType::WholeSlide];

    /// Tag stored in the database.
    pub fn tag(&self) -> &'static str {
        match self {
            FileType::Video => "mp4",
            FileType::Image => "png",
            FileType::WholeSlide => "wsi",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "mp4" => Ok(FileType::Video),
            "png" => Ok(FileType::Image),
            "wsi" => Ok(FileType::WholeSlide),
            _ => Err(AppError::UnknownFileType {
                tag: tag.to_string(),
            }),
        }
    }

    /// Button text in the file type chooser.
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Video => "Video",
            FileType::Image => "Image",
            FileType::WholeSlide => "Whole Slide Image",
        }
    }

    /// Extensions accepted by the file picker for this type.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileType::Video => &["mp4"],
            FileType::Image => &["png", "jpg", "jpeg"],
            FileType::WholeSlide => &["svs", "ndpi", "tif", "tiff"],
        }
    }

    /// Whether the canvas can decode and display this type.
    pub fn is_displayable(&self) -> bool {
        matches!(self, FileType::Image)
    }
}

/// A media file tracked by a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Database id, `None` until the file is registered
    pub id: Option<i64>,
    /// Basename, unique within a project
    pub filename: String,
    /// Path the file was imported from
    pub source: PathBuf,
    pub file_type: FileType,
    pub patient_id: Option<i64>,
}

impl FileEntry {
    /// Build an unregistered entry for `source`. Returns `None` when the
    /// path has no file name.
    pub fn from_source(source: &Path, file_type: FileType) -> Option<Self> {
        let filename = source.file_name()?.to_str()?.to_string();
        if filename.is_empty() {
            return None;
        }
        Some(Self {
            id: None,
            filename,
            source: source.to_path_buf(),
            file_type,
            patient_id: None,
        })
    }
}

/// A patient files can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: i64,
    pub name: String,
}

/// Per-project display settings, persisted in the project database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default = "default_line_width")]
    pub line_width: f32,
    #[serde(default = "default_vertex_size")]
    pub vertex_size: f32,
    /// Save labels automatically when switching files
    #[serde(default)]
    pub auto_save: bool,
}

fn default_line_width() -> f32 {
    2.0
}

fn default_vertex_size() -> f32 {
    4.0
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            vertex_size: default_vertex_size(),
            auto_save: false,
        }
    }
}

/// Result of adding a file to a draft or an open project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddFileOutcome {
    /// The file was added under this basename
    Added(String),
    /// A file with this basename is already tracked; the caller must ask
    /// before replacing it
    NeedsOverwrite(FileEntry),
    /// Nothing to add (no file name)
    Ignored,
}

/// Files collected by the project creation dialog before the project
/// exists on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    files: Vec<FileEntry>,
}

impl ProjectDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.filename.as_str())
    }

    /// Whether a file with this basename is already in the draft.
    pub fn exists(&self, filename: &str) -> bool {
        self.files.iter().any(|f| f.filename == filename)
    }

    /// Queue `source` for import. Files are keyed by basename only, so two
    /// sources with the same name in different directories clash.
    pub fn add_file(&mut self, source: &Path, file_type: FileType) -> AddFileOutcome {
        let Some(entry) = FileEntry::from_source(source, file_type) else {
            return AddFileOutcome::Ignored;
        };
        if self.exists(&entry.filename) {
            return AddFileOutcome::NeedsOverwrite(entry);
        }
        let filename = entry.filename.clone();
        self.files.push(entry);
        AddFileOutcome::Added(filename)
    }

    /// Replace the entry sharing `entry`'s basename with `entry`.
    pub fn overwrite(&mut self, entry: FileEntry) {
        self.files.retain(|f| f.filename != entry.filename);
        self.files.push(entry);
    }
}

/// Complete per-file annotation data for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectData {
    pub media_file: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub annotations: Vec<Annotation>,
}

impl ProjectData {
    /// Create export data for the given media file and dimensions.
    pub fn new(media_file: String, frame_width: u32, frame_height: u32) -> Self {
        Self {
            media_file,
            frame_width,
            frame_height,
            annotations: Vec::new(),
        }
    }
}
