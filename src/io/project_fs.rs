// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project directory handling.
//!
//! Location checks for new projects, the default location suggestion, and
//! copying imported media into the project's `files/` directory.

use crate::error::{AppError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Sub directory holding imported media.
pub const FILES_DIR: &str = "files";

/// Message shown when a project location is rejected.
pub const INVALID_LOCATION: &str = "Please enter a valid project location.";

/// Verdict on a user-entered project location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCheck {
    /// Location can be used as is
    Accept(PathBuf),
    /// Location is a non-empty directory; its content must be cleared,
    /// which needs the user's confirmation
    ConfirmClear(PathBuf),
    /// Location is unusable; the message is shown to the user
    Reject(String),
}

/// Validate a project location.
///
/// Existing non-empty directories need confirmation, existing empty
/// directories and non-existing absolute paths are accepted, anything else
/// is rejected.
pub fn check_project_path(input: &str) -> PathCheck {
    let path = PathBuf::from(input.trim());
    // Relative paths depend on the working directory and are never cleared.
    if input.trim().is_empty() || !path.is_absolute() {
        return PathCheck::Reject(INVALID_LOCATION.to_string());
    }

    if !path.exists() {
        return PathCheck::Accept(path);
    }
    if !path.is_dir() {
        return PathCheck::Reject(INVALID_LOCATION.to_string());
    }
    match fs::read_dir(&path) {
        Ok(mut entries) => {
            if entries.next().is_some() {
                PathCheck::ConfirmClear(path)
            } else {
                PathCheck::Accept(path)
            }
        }
        Err(e) => {
            log::warn!("Cannot read {}: {}", path.display(), e);
            PathCheck::Reject(INVALID_LOCATION.to_string())
        }
    }
}

/// Suggest `<base>/AnnotationProjects/project<N>` for the first free `N`
/// in `1..100`, falling back to the unnumbered name.
pub fn suggest_project_path(base: &Path) -> PathBuf {
    let parent = base.join("AnnotationProjects");
    (1..100)
        .map(|i| parent.join(format!("project{}", i)))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| parent.join("project"))
}

/// Default suggestion rooted at the user's home directory.
pub fn default_project_suggestion() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    suggest_project_path(&home)
}

/// Remove every entry inside `path`, keeping the directory itself.
pub fn clear_directory(path: &Path) -> Result<()> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let entry_path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)?;
        }
    }
    log::info!("Cleared project directory {}", path.display());
    Ok(())
}

/// Create the project root and its media directory.
pub fn create_layout(root: &Path) -> Result<()> {
    if !root.is_absolute() {
        return Err(AppError::InvalidProjectPath {
            path: root.to_path_buf(),
        });
    }
    fs::create_dir_all(root.join(FILES_DIR))?;
    Ok(())
}

/// Location of an imported file inside the project.
pub fn media_path(root: &Path, filename: &str) -> PathBuf {
    root.join(FILES_DIR).join(filename)
}

/// Copy `source` next to its final place in the project. The copy only
/// replaces an earlier import once [`commit_media`] runs.
pub fn stage_media(root: &Path, source: &Path, filename: &str) -> Result<PathBuf> {
    let staged = root.join(FILES_DIR).join(format!(".{}.part", filename));
    fs::copy(source, &staged)?;
    Ok(staged)
}

/// Move a staged copy over `files/<filename>`.
pub fn commit_media(staged: &Path, root: &Path, filename: &str) -> Result<PathBuf> {
    let target = media_path(root, filename);
    fs::rename(staged, &target)?;
    Ok(target)
}

/// Drop a staged copy that will not be committed.
pub fn discard_media(staged: &Path) {
    if let Err(e) = fs::remove_file(staged) {
        log::warn!("Cannot remove {}: {}", staged.display(), e);
    }
}

/// Remove an imported file. Missing files are not an error.
pub fn remove_media(root: &Path, filename: &str) -> Result<()> {
    match fs::remove_file(media_path(root, filename)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
