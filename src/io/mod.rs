// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: the project database, project directories, media
//! decoding and annotation export.

pub mod database;
pub mod media;
pub mod project_fs;
pub mod serialization;
