// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Importing a file into the open project.
//!
//! Type choice, then a native file picker, then an overwrite question when
//! the basename is already tracked.

use super::file_type::{pick_file, SelectFileTypeDialog};
use super::message_box::ConfirmBox;
use super::DialogOutcome;
use crate::models::project::{FileEntry, FileType};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    ChoosingType,
    ConfirmOverwrite(FileEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDialog {
    existing: Vec<String>,
    stage: Stage,
}

impl ImportDialog {
    /// Start an import into a project already tracking `existing` names.
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: existing.into_iter().map(Into::into).collect(),
            stage: Stage::ChoosingType,
        }
    }

    /// Handle the picker's result.
    pub fn add_picked_file(&mut self, source: Option<&Path>, file_type: FileType) -> DialogOutcome<FileEntry> {
        let Some(entry) = source.and_then(|s| FileEntry::from_source(s, file_type)) else {
            return DialogOutcome::Cancelled;
        };
        if self.existing.contains(&entry.filename) {
            self.stage = Stage::ConfirmOverwrite(entry);
            DialogOutcome::Open
        } else {
            DialogOutcome::Accepted(entry)
        }
    }

    /// Answer to the overwrite question.
    pub fn resolve_overwrite(&mut self, confirmed: bool) -> DialogOutcome<FileEntry> {
        match std::mem::replace(&mut self.stage, Stage::ChoosingType) {
            Stage::ConfirmOverwrite(entry) if confirmed => DialogOutcome::Accepted(entry),
            _ => DialogOutcome::Cancelled,
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome<FileEntry> {
        match &self.stage {
            Stage::ChoosingType => match SelectFileTypeDialog.show(ctx) {
                DialogOutcome::Accepted(file_type) => {
                    let picked = pick_file(file_type);
                    self.add_picked_file(picked.as_deref(), file_type)
                }
                DialogOutcome::Cancelled => DialogOutcome::Cancelled,
                DialogOutcome::Open => DialogOutcome::Open,
            },
            Stage::ConfirmOverwrite(entry) => {
                let question = ConfirmBox::new(
                    "File exists",
                    &format!("The file\n{}\nalready exists.\nOverwrite?", entry.filename),
                );
                match question.show(ctx) {
                    DialogOutcome::Accepted(()) => self.resolve_overwrite(true),
                    DialogOutcome::Cancelled => self.resolve_overwrite(false),
                    DialogOutcome::Open => DialogOutcome::Open,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_name_imported_directly() {
        let mut dialog = ImportDialog::new(["a.png"]);
        let outcome = dialog.add_picked_file(Some(Path::new("/in/b.png")), FileType::Image);
        let DialogOutcome::Accepted(entry) = outcome else {
            panic!("expected import, got {:?}", outcome);
        };
        assert_eq!(entry.filename, "b.png");
    }

    #[test]
    fn test_existing_name_asks_first() {
        let mut dialog = ImportDialog::new(["a.png"]);
        let source = Path::new("/elsewhere/a.png");
        assert_eq!(dialog.add_picked_file(Some(source), FileType::Image), DialogOutcome::Open);
        assert!(matches!(dialog.stage, Stage::ConfirmOverwrite(_)));

        let outcome = dialog.resolve_overwrite(true);
        let DialogOutcome::Accepted(entry) = outcome else {
            panic!("expected overwrite, got {:?}", outcome);
        };
        assert_eq!(entry.source, source);
    }

    #[test]
    fn test_declined_overwrite_and_empty_pick_cancel() {
        let mut dialog = ImportDialog::new(["a.png"]);
        dialog.add_picked_file(Some(Path::new("/x/a.png")), FileType::Image);
        assert_eq!(dialog.resolve_overwrite(false), DialogOutcome::Cancelled);

        let mut dialog = ImportDialog::new(Vec::<String>::new());
        assert_eq!(dialog.add_picked_file(None, FileType::Video), DialogOutcome::Cancelled);
    }
}
