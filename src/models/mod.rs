// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! In-memory model mutated by the dialogs and projected by the list widgets.

pub mod annotation;
pub mod filter;
pub mod label_class;
pub mod project;
