// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project creation dialog.
//!
//! Collects a project location and an initial list of files. Files are only
//! copied once the project is actually created; until then they live in a
//! [`ProjectDraft`].

use super::file_type::{pick_file, SelectFileTypeDialog};
use super::message_box::{ConfirmBox, MessageBox};
use super::{modal_window, ok_cancel_buttons, DialogOutcome};
use crate::io::project_fs::{check_project_path, PathCheck};
use crate::models::project::{AddFileOutcome, FileEntry, FileType, ProjectDraft};
use std::path::{Path, PathBuf};

/// Everything needed to create the project once the dialog is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    pub root: PathBuf,
    /// The user agreed to delete the directory's current content
    pub clear_existing: bool,
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Stage {
    Editing,
    ChoosingType,
    ConfirmOverwrite(FileEntry),
    ConfirmClear(PathBuf),
    Message(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectHandlerDialog {
    path: String,
    draft: ProjectDraft,
    stage: Stage,
}

impl ProjectHandlerDialog {
    /// Open the dialog with a suggested location.
    pub fn new(suggestion: &Path) -> Self {
        Self {
            path: suggestion.to_string_lossy().into_owned(),
            draft: ProjectDraft::new(),
            stage: Stage::Editing,
        }
    }

    /// "Add files" clicked: ask for the media type first.
    pub fn request_add_file(&mut self) {
        self.stage = Stage::ChoosingType;
    }

    /// Handle the picker's result for the chosen type.
    pub fn add_picked_file(&mut self, source: Option<&Path>, file_type: FileType) {
        self.stage = Stage::Editing;
        let Some(source) = source else {
            return;
        };
        match self.draft.add_file(source, file_type) {
            AddFileOutcome::Added(filename) => log::info!("Queued {} for the new project", filename),
            AddFileOutcome::NeedsOverwrite(entry) => self.stage = Stage::ConfirmOverwrite(entry),
            AddFileOutcome::Ignored => {}
        }
    }

    /// Answer to "already exists. Overwrite?".
    pub fn resolve_overwrite(&mut self, confirmed: bool) {
        if let Stage::ConfirmOverwrite(entry) = std::mem::replace(&mut self.stage, Stage::Editing) {
            if confirmed {
                log::info!("Replacing queued {} with {}", entry.filename, entry.source.display());
                self.draft.overwrite(entry);
            }
        }
    }

    /// "Create Project" clicked: validate the location.
    pub fn check_path(&mut self) -> DialogOutcome<ProjectRequest> {
        match check_project_path(&self.path) {
            PathCheck::Accept(root) => DialogOutcome::Accepted(self.request(root, false)),
            PathCheck::ConfirmClear(root) => {
                self.stage = Stage::ConfirmClear(root);
                DialogOutcome::Open
            }
            PathCheck::Reject(message) => {
                self.stage = Stage::Message(message);
                DialogOutcome::Open
            }
        }
    }

    /// Answer to "directory is not empty". Declining returns to the form.
    pub fn resolve_clear(&mut self, confirmed: bool) -> DialogOutcome<ProjectRequest> {
        match std::mem::replace(&mut self.stage, Stage::Editing) {
            Stage::ConfirmClear(root) if confirmed => DialogOutcome::Accepted(self.request(root, true)),
            _ => DialogOutcome::Open,
        }
    }

    pub fn dismiss_message(&mut self) {
        if matches!(self.stage, Stage::Message(_)) {
            self.stage = Stage::Editing;
        }
    }

    fn request(&self, root: PathBuf, clear_existing: bool) -> ProjectRequest {
        ProjectRequest {
            root,
            clear_existing,
            files: self.draft.files().to_vec(),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogOutcome<ProjectRequest> {
        let mut outcome = DialogOutcome::Open;
        let editing = self.stage == Stage::Editing;
        let size = ctx.screen_rect().size() / 2.0;

        modal_window("Create new Project")
            .fixed_size(size)
            .show(ctx, |ui| {
                ui.add_enabled_ui(editing, |ui| {
                    ui.label(egui::RichText::new("Choose Project Location").strong());
                    ui.horizontal(|ui| {
                        ui.add(egui::TextEdit::singleline(&mut self.path).desired_width(size.x - 70.0));
                        if ui.button("...").clicked() {
                            let mut picker = rfd::FileDialog::new();
                            if let Some(home) = dirs::home_dir() {
                                picker = picker.set_directory(home);
                            }
                            if let Some(dir) = picker.pick_folder() {
                                self.path = dir.to_string_lossy().into_owned();
                            }
                        }
                    });

                    ui.add_space(12.0);
                    if ui.button("Add files to get started").clicked() {
                        self.request_add_file();
                    }
                    egui::ScrollArea::vertical()
                        .max_height(size.y - 140.0)
                        .show(ui, |ui| {
                            for filename in self.draft.filenames() {
                                ui.label(filename);
                            }
                        });

                    ui.separator();
                    match ok_cancel_buttons(ui, "Create Project", "Cancel") {
                        Some(true) => outcome = self.check_path(),
                        Some(false) => outcome = DialogOutcome::Cancelled,
                        None => {}
                    }
                });
            });

        match &self.stage {
            Stage::Editing => {}
            Stage::ChoosingType => match SelectFileTypeDialog.show(ctx) {
                DialogOutcome::Accepted(file_type) => {
                    let picked = pick_file(file_type);
                    self.add_picked_file(picked.as_deref(), file_type);
                }
                DialogOutcome::Cancelled => self.stage = Stage::Editing,
                DialogOutcome::Open => {}
            },
            Stage::ConfirmOverwrite(entry) => {
                let question = ConfirmBox::new(
                    "File exists",
                    &format!("The file\n{}\nalready exists.\nOverwrite?", entry.filename),
                );
                match question.show(ctx) {
                    DialogOutcome::Accepted(()) => self.resolve_overwrite(true),
                    DialogOutcome::Cancelled => self.resolve_overwrite(false),
                    DialogOutcome::Open => {}
                }
            }
            Stage::ConfirmClear(root) => {
                let question = ConfirmBox::new(
                    "Directory not empty",
                    &format!("The directory\n{}\nis not empty.", root.display()),
                )
                .informative("All existing files in that directory will be deleted.\nProceed?");
                match question.show(ctx) {
                    DialogOutcome::Accepted(()) => outcome = self.resolve_clear(true),
                    DialogOutcome::Cancelled => outcome = self.resolve_clear(false),
                    DialogOutcome::Open => {}
                }
            }
            Stage::Message(text) => {
                if MessageBox::new("Invalid location", text).show(ctx) {
                    self.dismiss_message();
                }
            }
        }

        outcome
    }
}
