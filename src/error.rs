// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for the label model and the project store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the label model, the project filesystem layer and the
/// project database.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the SQLite driver
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A label class with this name is already registered
    #[error("'{name}' already exists")]
    DuplicateClass { name: String },

    /// Label class names may not be empty
    #[error("Label class name must not be empty")]
    EmptyClassName,

    /// Path is not usable as a project location
    #[error("Please enter a valid project location.")]
    InvalidProjectPath { path: PathBuf },

    /// Directory does not contain a project database
    #[error("No project found in {path:?}")]
    NotAProject { path: PathBuf },

    /// File type tag not known to the tool
    #[error("Unknown file type '{tag}'")]
    UnknownFileType { tag: String },

    /// Operation needs an open project
    #[error("No project is open")]
    NoProject,

    /// File entry referenced by id does not exist
    #[error("File not found in project: {id}")]
    FileNotFound { id: i64 },
}

/// Result alias used across the model and store.
pub type Result<T> = std::result::Result<T, AppError>;
