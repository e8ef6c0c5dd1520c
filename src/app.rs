// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main window that implements the eframe::App
//! trait. It owns the open project, the shapes of the current file and the
//! modal dialog stack, and turns UI events into database calls.

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::io::{database::ProjectDatabase, project_fs, serialization};
use crate::models::{
    annotation::{Annotation, AnnotationType},
    label_class::LabelClassRegistry,
    project::{FileEntry, Patient, ProjectData, ProjectSettings},
};
use crate::ui::dialogs::{
    self,
    comment::CommentDialog,
    import::ImportDialog,
    message_box::{ConfirmBox, DeleteShapeMessageBox, ForgotToSaveMessageBox, MessageBox, SaveChoice},
    new_label::NewLabelDialog,
    patient::PatientDialog,
    project_handler::{ProjectHandlerDialog, ProjectRequest},
    settings::{SettingsDialog, SettingsUpdate},
    DialogOutcome,
};
use crate::ui::{
    canvas,
    lists::{FileListAction, FileViewingWidget},
    properties, toolbar,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

/// History system for undo/redo functionality.
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Vec<Annotation>>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Vec<Annotation>>,
    /// Maximum history size
    max_size: usize,
}

impl History {
    fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 50, // Keep last 50 states
        }
    }

    /// Save current state before making a change
    fn push(&mut self, annotations: Vec<Annotation>) {
        self.undo_stack.push(annotations);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // Clear redo stack when new action is performed
        self.redo_stack.clear();
    }

    /// Undo: restore previous state
    fn undo(&mut self, current: Vec<Annotation>) -> Option<Vec<Annotation>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Redo: restore next state
    fn redo(&mut self, current: Vec<Annotation>) -> Option<Vec<Annotation>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Current drawing tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Polygon,
    Line,
}

/// Result of background image loading operation.
struct LoadedImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    /// File the pixels belong to; stale results are dropped
    file_id: i64,
}

/// Shape a label dialog is choosing a class for.
#[derive(Debug, Clone)]
enum LabelTarget {
    /// Freshly drawn, not yet in the shape list
    NewShape(Annotation),
    /// Index into the current shape list
    Existing(usize),
}

/// Action postponed until unsaved changes are dealt with.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingAction {
    NewProject,
    OpenProject(PathBuf),
    OpenFile(usize),
    Quit,
}

/// The dialog currently blocking the main window.
enum Modal {
    NewLabel(NewLabelDialog, LabelTarget),
    Comment(CommentDialog),
    DeleteShape(DeleteShapeMessageBox),
    DeleteFile(ConfirmBox, usize),
    ForgotToSave(ForgotToSaveMessageBox, PendingAction),
    ProjectHandler(ProjectHandlerDialog),
    Import(ImportDialog),
    Patient(PatientDialog),
    Settings(SettingsDialog),
    Message(MessageBox),
}

/// Main application state.
pub struct LabelApp {
    config: AppConfig,
    /// Where `config` is written back, `None` to keep it in memory only
    config_path: Option<PathBuf>,

    /// Open project, if any
    database: Option<ProjectDatabase>,
    files: Vec<FileEntry>,
    patients: Vec<Patient>,
    classes: LabelClassRegistry,
    settings: ProjectSettings,

    /// Index into `files` of the file being labeled
    current_file: Option<usize>,
    /// Shapes of the current file
    annotations: Vec<Annotation>,
    /// Shapes or classes changed since the last save
    dirty: bool,

    current_tool: Tool,
    selected_annotation: Option<usize>,
    in_progress_annotation: Option<Annotation>,
    /// Currently dragged vertex (annotation_index, vertex_index)
    dragging_vertex: Option<(usize, usize)>,
    /// Shapes as they were when the current drag started
    drag_origin: Option<Vec<Annotation>>,
    history: History,

    image_texture: Option<egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
    image_loader: Option<Receiver<std::result::Result<LoadedImageData, String>>>,
    loading_message: Option<String>,

    file_list: FileViewingWidget,
    show_toolbar: bool,
    show_file_list: bool,
    modal: Option<Modal>,
    status: String,

    /// Unsaved changes were handled; the next close request goes through
    allow_close: bool,
    close_requested: bool,
}

impl LabelApp {
    /// Create the main window, reopening the last project if there is one.
    pub fn new(config: AppConfig) -> Self {
        Self::with_config_path(config, AppConfig::default_path())
    }

    fn with_config_path(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        let recent = config.recent_project.clone();
        let mut app = Self {
            config,
            config_path,
            database: None,
            files: Vec::new(),
            patients: Vec::new(),
            classes: LabelClassRegistry::new(),
            settings: ProjectSettings::default(),
            current_file: None,
            annotations: Vec::new(),
            dirty: false,
            current_tool: Tool::Select,
            selected_annotation: None,
            in_progress_annotation: None,
            dragging_vertex: None,
            drag_origin: None,
            history: History::new(),
            image_texture: None,
            image_size: None,
            image_loader: None,
            loading_message: None,
            file_list: FileViewingWidget::new(),
            show_toolbar: true,
            show_file_list: true,
            modal: None,
            status: String::new(),
            allow_close: false,
            close_requested: false,
        };

        if let Some(root) = recent {
            if let Err(e) = app.open_project(&root) {
                log::warn!("Could not reopen {}: {}", root.display(), e);
            }
        }
        app
    }

    pub fn visuals(&self) -> egui::Visuals {
        if self.config.dark_theme {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        }
    }

    fn save_config(&self) {
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                log::warn!("Failed to save config: {:#}", e);
            }
        }
    }

    /// Show an error to the user instead of propagating it.
    fn report<E: std::fmt::Display>(&mut self, result: std::result::Result<(), E>) {
        if let Err(e) = result {
            let text = format!("{:#}", e);
            log::error!("{}", text);
            self.status = text.clone();
            self.modal = Some(Modal::Message(MessageBox::new("Error", &text)));
        }
    }

    fn database(&self) -> Result<&ProjectDatabase> {
        self.database.as_ref().ok_or(AppError::NoProject)
    }

    fn current_entry(&self) -> Option<&FileEntry> {
        self.current_file.and_then(|idx| self.files.get(idx))
    }

    fn current_file_id(&self) -> Option<i64> {
        self.current_entry().and_then(|entry| entry.id)
    }

    // ---- projects -------------------------------------------------------

    /// Open the project stored at `root`.
    fn open_project(&mut self, root: &Path) -> Result<()> {
        let db = ProjectDatabase::open(root)?;
        self.install_project(db)
    }

    /// Create a project from an accepted project dialog.
    fn create_project(&mut self, request: ProjectRequest) -> Result<()> {
        // Release the current database first, it may live in the directory
        // about to be cleared.
        if !request.root.is_absolute() {
            return Err(AppError::InvalidProjectPath { path: request.root });
        }
        self.close_project();
        if request.clear_existing {
            project_fs::clear_directory(&request.root)?;
        }
        let db = ProjectDatabase::create_project(&request.root, &request.files)?;
        self.install_project(db)
    }

    fn install_project(&mut self, db: ProjectDatabase) -> Result<()> {
        let files = db.files()?;
        let patients = db.patients()?;
        let classes = db.classes()?;
        let settings = db.load_settings()?;
        let root = db.root().to_path_buf();

        self.close_project();
        self.files = files;
        self.patients = patients;
        self.classes = classes;
        self.settings = settings;
        self.database = Some(db);

        self.status = format!("Project {}", root.display());
        log::info!("Loaded project {} ({} files)", root.display(), self.files.len());
        self.config.recent_project = Some(root);
        self.save_config();
        Ok(())
    }

    fn close_project(&mut self) {
        self.clear_file_view();
        self.database = None;
        self.files.clear();
        self.patients.clear();
        self.classes = LabelClassRegistry::new();
        self.settings = ProjectSettings::default();
    }

    /// Forget the current file and everything drawn on it.
    fn clear_file_view(&mut self) {
        self.current_file = None;
        self.annotations.clear();
        self.history.clear();
        self.selected_annotation = None;
        self.in_progress_annotation = None;
        self.dragging_vertex = None;
        self.drag_origin = None;
        self.image_texture = None;
        self.image_size = None;
        self.image_loader = None;
        self.loading_message = None;
        self.dirty = false;
    }

    /// Reload the file list, keeping the current file selected if it is
    /// still tracked.
    fn refresh_files(&mut self) -> Result<()> {
        let current_id = self.current_file_id();
        self.files = self.database()?.files()?;
        let index = current_id.and_then(|id| self.files.iter().position(|f| f.id == Some(id)));
        if index.is_none() && current_id.is_some() {
            self.clear_file_view();
        }
        self.current_file = index;
        Ok(())
    }

    // ---- files ----------------------------------------------------------

    /// Make `index` the current file and load its stored shapes.
    fn open_file(&mut self, index: usize) -> Result<()> {
        let Some(entry) = self.files.get(index).cloned() else {
            log::warn!("No file at index {}", index);
            return Ok(());
        };
        let id = entry.id.ok_or(AppError::FileNotFound { id: -1 })?;
        let db = self.database()?;
        let annotations = db.labels_for(id)?;
        let media = db.media_path(&entry);

        self.clear_file_view();
        self.current_file = Some(index);
        self.annotations = annotations;
        self.status = entry.filename.clone();
        log::info!("Opened {} with {} shapes", entry.filename, self.annotations.len());

        if entry.file_type.is_displayable() {
            self.load_image_file(media, id);
        }
        Ok(())
    }

    /// Store the current file's shapes and the class list.
    fn save_current(&mut self) -> Result<()> {
        let db = self.database()?;
        if let Some(id) = self.current_file_id() {
            db.save(id, &self.annotations, &self.classes)?;
            self.status = format!("Saved {} shapes", self.annotations.len());
        }
        self.dirty = false;
        Ok(())
    }

    /// Copy a file into the open project. An existing file of the same
    /// name is replaced together with its shapes.
    fn import_file(&mut self, entry: FileEntry) -> Result<()> {
        let replaces_current = self
            .current_entry()
            .is_some_and(|current| current.filename == entry.filename);
        if replaces_current {
            self.clear_file_view();
        }
        let added = self.database()?.add_file(&entry)?;
        self.refresh_files()?;
        self.status = format!("Imported {}", added.filename);
        Ok(())
    }

    fn delete_file(&mut self, index: usize) -> Result<()> {
        let Some(id) = self.files.get(index).and_then(|f| f.id) else {
            return Ok(());
        };
        if self.current_file == Some(index) {
            self.clear_file_view();
        }
        self.database()?.delete_file(id)?;
        self.refresh_files()
    }

    fn add_patient(&mut self, name: &str) -> Result<()> {
        let db = self.database()?;
        let patient = db.add_patient(name)?;
        self.patients = db.patients()?;
        log::info!("Added patient {} ({})", patient.name, patient.id);
        Ok(())
    }

    fn assign_patient(&mut self, index: usize, patient_id: Option<i64>) -> Result<()> {
        let Some(id) = self.files.get(index).and_then(|f| f.id) else {
            return Ok(());
        };
        self.database()?.assign_patient(id, patient_id)?;
        self.refresh_files()
    }

    /// Load an image file and create a texture for display (asynchronously).
    fn load_image_file(&mut self, path: PathBuf, file_id: i64) {
        let (sender, receiver) = channel();
        self.image_loader = Some(receiver);
        self.loading_message = Some("Loading image...".to_string());

        std::thread::spawn(move || {
            let result = crate::io::media::load_image(&path)
                .map(|loaded| {
                    log::info!("Loaded image: {} ({}x{})", path.display(), loaded.width, loaded.height);
                    LoadedImageData {
                        width: loaded.width,
                        height: loaded.height,
                        pixels: loaded.pixels,
                        file_id,
                    }
                })
                .map_err(|e| format!("Failed to load image: {:#}", e));

            let _ = sender.send(result);
        });
    }

    fn poll_image_loader(&mut self, ctx: &egui::Context) {
        let Some(receiver) = &self.image_loader else {
            return;
        };
        let Ok(result) = receiver.try_recv() else {
            return;
        };
        self.image_loader = None;
        self.loading_message = None;

        match result {
            Ok(loaded) if Some(loaded.file_id) == self.current_file_id() => {
                let size = [loaded.width as usize, loaded.height as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &loaded.pixels);
                let texture = ctx.load_texture("loaded_image", color_image, egui::TextureOptions::LINEAR);
                self.image_texture = Some(texture);
                self.image_size = Some((loaded.width, loaded.height));
            }
            Ok(loaded) => log::debug!("Dropping stale image for file {}", loaded.file_id),
            Err(e) => {
                log::error!("{}", e);
                self.status = e;
            }
        }
    }

    // ---- unsaved changes ------------------------------------------------

    /// Run `action`, asking about unsaved changes first.
    fn request(&mut self, action: PendingAction) {
        if !self.dirty {
            self.perform(action);
            return;
        }
        if self.settings.auto_save {
            match self.save_current() {
                Ok(()) => self.perform(action),
                Err(e) => self.report(Err(e)),
            }
            return;
        }
        self.modal = Some(Modal::ForgotToSave(ForgotToSaveMessageBox, action));
    }

    fn perform(&mut self, action: PendingAction) {
        match action {
            PendingAction::NewProject => {
                let suggestion = project_fs::default_project_suggestion();
                self.modal = Some(Modal::ProjectHandler(ProjectHandlerDialog::new(&suggestion)));
            }
            PendingAction::OpenProject(root) => {
                let result = self.open_project(&root);
                self.report(result);
            }
            PendingAction::OpenFile(index) => {
                let result = self.open_file(index);
                self.report(result);
            }
            PendingAction::Quit => {
                self.allow_close = true;
                self.close_requested = true;
            }
        }
    }

    // ---- shapes ---------------------------------------------------------

    fn save_to_history(&mut self) {
        self.history.push(self.annotations.clone());
    }

    /// Start a new annotation based on the current tool.
    fn start_annotation(&mut self) {
        let annotation_type = match self.current_tool {
            Tool::Polygon => AnnotationType::Polygon,
            Tool::Line => AnnotationType::Line,
            Tool::Select => return,
        };
        self.in_progress_annotation = Some(Annotation::new(annotation_type));
    }

    /// Close the shape being drawn and ask for its class.
    fn finish_annotation(&mut self) {
        let Some(annotation) = self.in_progress_annotation.take() else {
            return;
        };
        if !annotation.is_complete() {
            log::warn!("Discarding shape with {} vertices", annotation.vertex_count());
            return;
        }
        self.modal = Some(Modal::NewLabel(NewLabelDialog::new(), LabelTarget::NewShape(annotation)));
    }

    fn request_relabel(&mut self, index: usize) {
        let Some(annotation) = self.annotations.get(index) else {
            return;
        };
        let mut dialog = NewLabelDialog::new();
        dialog.set_text(&annotation.label);
        self.modal = Some(Modal::NewLabel(dialog, LabelTarget::Existing(index)));
    }

    /// Apply a closed label dialog. A new shape without a class is dropped.
    fn apply_label(&mut self, target: LabelTarget, outcome: DialogOutcome<String>) {
        let DialogOutcome::Accepted(name) = outcome else {
            if let LabelTarget::NewShape(_) = target {
                log::info!("Shape discarded without a label");
            }
            return;
        };
        let color = self.classes.color_of(&name);
        match target {
            LabelTarget::NewShape(mut annotation) => {
                self.save_to_history();
                annotation.set_label(&name, color);
                self.annotations.push(annotation);
                self.selected_annotation = Some(self.annotations.len() - 1);
                log::info!("Added '{}' shape, total: {}", name, self.annotations.len());
            }
            LabelTarget::Existing(index) => {
                if index >= self.annotations.len() {
                    return;
                }
                self.save_to_history();
                self.annotations[index].set_label(&name, color);
                log::info!("Relabeled shape {} as '{}'", index, name);
            }
        }
        self.dirty = true;
    }

    fn request_comment(&mut self, index: usize) {
        if let Some(annotation) = self.annotations.get(index) {
            self.modal = Some(Modal::Comment(CommentDialog::new(index, &annotation.comment)));
        }
    }

    fn apply_comment(&mut self, index: usize, text: &str) {
        let Some(annotation) = self.annotations.get(index) else {
            return;
        };
        if annotation.comment == text {
            return;
        }
        let edited = annotation.clone().edit_comment(text);
        self.save_to_history();
        self.annotations[index] = edited;
        self.dirty = true;
    }

    fn request_delete(&mut self, index: usize) {
        let Some(annotation) = self.annotations.get(index) else {
            return;
        };
        let name = if annotation.label.is_empty() {
            "this shape"
        } else {
            annotation.label.as_str()
        };
        self.modal = Some(Modal::DeleteShape(DeleteShapeMessageBox::new(index, name)));
    }

    fn delete_annotation(&mut self, index: usize) {
        if index >= self.annotations.len() {
            return;
        }
        self.save_to_history();
        self.annotations.remove(index);
        self.selected_annotation = None;
        self.dirty = true;
        log::info!("Deleted shape, total: {}", self.annotations.len());
    }

    fn undo(&mut self) {
        if let Some(previous) = self.history.undo(self.annotations.clone()) {
            self.annotations = previous;
            self.selected_annotation = None;
            self.dirty = true;
            log::info!("Undo");
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.history.redo(self.annotations.clone()) {
            self.annotations = next;
            self.selected_annotation = None;
            self.dirty = true;
            log::info!("Redo");
        }
    }

    fn apply_canvas_action(&mut self, action: canvas::CanvasAction) {
        match action {
            canvas::CanvasAction::AddVertex(point) => {
                if self.in_progress_annotation.is_none() {
                    self.start_annotation();
                }
                if let Some(annotation) = self.in_progress_annotation.as_mut() {
                    annotation.add_vertex(point);
                    log::debug!(
                        "Added vertex at ({:.3}, {:.3}), total vertices: {}",
                        point.x,
                        point.y,
                        annotation.vertex_count()
                    );
                }
            }
            canvas::CanvasAction::FinishAnnotation => self.finish_annotation(),
            canvas::CanvasAction::SelectAnnotation(idx) => self.selected_annotation = Some(idx),
            canvas::CanvasAction::DeselectAnnotation => self.selected_annotation = None,
            canvas::CanvasAction::StartDraggingVertex(ann_idx, vertex_idx) => {
                self.drag_origin = Some(self.annotations.clone());
                self.dragging_vertex = Some((ann_idx, vertex_idx));
                self.selected_annotation = Some(ann_idx);
            }
            canvas::CanvasAction::DragVertex(point) => {
                if let Some((ann_idx, vertex_idx)) = self.dragging_vertex {
                    if let Some(annotation) = self.annotations.get_mut(ann_idx) {
                        annotation.update_vertex(vertex_idx, point);
                    }
                }
            }
            canvas::CanvasAction::StopDragging => {
                self.dragging_vertex = None;
                // A drag that ends where it began is not an edit.
                if let Some(origin) = self.drag_origin.take() {
                    if origin != self.annotations {
                        self.history.push(origin);
                        self.dirty = true;
                    }
                }
            }
            canvas::CanvasAction::None => {}
        }
    }

    // ---- settings and exchange -----------------------------------------

    fn open_settings(&mut self) {
        let project = self.database.as_ref().map(|_| self.settings.clone());
        self.modal = Some(Modal::Settings(SettingsDialog::new(
            project,
            self.config.log_level,
            self.config.dark_theme,
        )));
    }

    fn apply_settings(&mut self, update: SettingsUpdate) -> Result<()> {
        if let Some(settings) = update.project {
            self.database()?.update_settings(&settings)?;
            self.settings = settings;
        }
        self.config.log_level = update.log_level;
        self.config.dark_theme = update.dark_theme;
        log::set_max_level(update.log_level.to_level_filter());
        self.save_config();
        Ok(())
    }

    /// Export the current file's shapes.
    fn export_annotations(&self, path: &Path) -> anyhow::Result<()> {
        let entry = self
            .current_entry()
            .ok_or_else(|| anyhow::anyhow!("No file selected"))?;
        let (width, height) = self.image_size.unwrap_or((0, 0));
        let mut data = ProjectData::new(entry.filename.clone(), width, height);
        data.annotations = self.annotations.clone();
        serialization::export(&data, path)?;
        log::info!("Exported {} shapes to {}", data.annotations.len(), path.display());
        Ok(())
    }

    /// Replace the current file's shapes with those of an exported file.
    fn import_annotations(&mut self, path: &Path) -> anyhow::Result<()> {
        let filename = self
            .current_entry()
            .map(|entry| entry.filename.clone())
            .ok_or_else(|| anyhow::anyhow!("No file selected"))?;
        let data = serialization::import(path)?;
        if data.media_file != filename {
            log::warn!("Shapes exported from {} applied to {}", data.media_file, filename);
        }
        for annotation in &data.annotations {
            if !annotation.label.is_empty() && !self.classes.contains(&annotation.label) {
                self.classes.add_class(&annotation.label)?;
            }
        }
        self.save_to_history();
        self.annotations = data.annotations;
        self.selected_annotation = None;
        self.dirty = true;
        log::info!("Imported {} shapes from {}", self.annotations.len(), path.display());
        Ok(())
    }

    // ---- UI -------------------------------------------------------------

    /// Draw the open dialog and act on its outcome.
    fn show_modal(&mut self, ctx: &egui::Context) {
        let Some(mut modal) = self.modal.take() else {
            return;
        };
        dialogs::dim_background(ctx);
        let class_count = self.classes.len();

        let keep_open = match &mut modal {
            Modal::NewLabel(dialog, target) => match dialog.show(ctx, &mut self.classes) {
                DialogOutcome::Open => true,
                outcome => {
                    self.apply_label(target.clone(), outcome);
                    false
                }
            },
            Modal::Comment(dialog) => match dialog.show(ctx) {
                DialogOutcome::Accepted((index, text)) => {
                    self.apply_comment(index, &text);
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::DeleteShape(dialog) => match dialog.show(ctx) {
                DialogOutcome::Accepted(index) => {
                    self.delete_annotation(index);
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::DeleteFile(question, index) => match question.show(ctx) {
                DialogOutcome::Accepted(()) => {
                    let result = self.delete_file(*index);
                    self.report(result);
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::ForgotToSave(dialog, action) => match dialog.show(ctx) {
                DialogOutcome::Accepted(SaveChoice::Save) => {
                    match self.save_current() {
                        Ok(()) => self.perform(action.clone()),
                        Err(e) => self.report(Err(e)),
                    }
                    false
                }
                DialogOutcome::Accepted(SaveChoice::Dismiss) => {
                    self.dirty = false;
                    self.perform(action.clone());
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::ProjectHandler(dialog) => match dialog.show(ctx) {
                DialogOutcome::Accepted(request) => {
                    let result = self.create_project(request);
                    self.report(result);
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::Import(dialog) => match dialog.show(ctx) {
                DialogOutcome::Accepted(entry) => {
                    let result = self.import_file(entry);
                    self.report(result);
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::Patient(dialog) => match dialog.show(ctx) {
                DialogOutcome::Accepted(name) => {
                    let result = self.add_patient(&name);
                    self.report(result);
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::Settings(dialog) => match dialog.show(ctx) {
                DialogOutcome::Accepted(update) => {
                    let result = self.apply_settings(update);
                    self.report(result);
                    ctx.set_visuals(self.visuals());
                    false
                }
                DialogOutcome::Cancelled => false,
                DialogOutcome::Open => true,
            },
            Modal::Message(message) => !message.show(ctx),
        };

        if self.classes.len() != class_count {
            self.dirty = true;
        }
        // A handler may already have opened a follow-up dialog.
        if keep_open && self.modal.is_none() {
            self.modal = Some(modal);
        }
    }

    fn show_menu(&mut self, ctx: &egui::Context) {
        let has_project = self.database.is_some();
        let has_file = self.current_file.is_some();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Project...").clicked() {
                        self.request(PendingAction::NewProject);
                        ui.close_menu();
                    }
                    if ui.button("Open Project...").clicked() {
                        let mut picker = rfd::FileDialog::new();
                        if let Some(home) = dirs::home_dir() {
                            picker = picker.set_directory(home);
                        }
                        if let Some(root) = picker.pick_folder() {
                            self.request(PendingAction::OpenProject(root));
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(has_project, egui::Button::new("Import File...")).clicked() {
                        let names = self.files.iter().map(|f| f.filename.clone());
                        self.modal = Some(Modal::Import(ImportDialog::new(names)));
                        ui.close_menu();
                    }
                    if ui.add_enabled(has_project, egui::Button::new("Add Patient...")).clicked() {
                        self.modal = Some(Modal::Patient(PatientDialog::default()));
                        ui.close_menu();
                    }
                    if ui.add_enabled(self.dirty, egui::Button::new("Save (Ctrl+S)")).clicked() {
                        let result = self.save_current();
                        self.report(result);
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.add_enabled(has_file, egui::Button::new("Load Annotations...")).clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Annotations", &["yaml", "yml", "json"])
                            .pick_file()
                        {
                            let result = self.import_annotations(&path);
                            self.report(result);
                        }
                        ui.close_menu();
                    }
                    ui.add_enabled_ui(has_file, |ui| {
                        ui.menu_button("Export Annotations", |ui| {
                            for (label, filter, extensions, default_name) in [
                                ("Export as YAML...", "YAML", &["yaml", "yml"][..], "annotations.yaml"),
                                ("Export as JSON...", "JSON", &["json"][..], "annotations.json"),
                            ] {
                                if ui.button(label).clicked() {
                                    if let Some(path) = rfd::FileDialog::new()
                                        .add_filter(filter, extensions)
                                        .set_file_name(default_name)
                                        .save_file()
                                    {
                                        let result = self.export_annotations(&path);
                                        self.report(result);
                                    }
                                    ui.close_menu();
                                }
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("Settings...").clicked() {
                        self.open_settings();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        self.request(PendingAction::Quit);
                        ui.close_menu();
                    }
                });

                ui.menu_button("Edit", |ui| {
                    if ui.add_enabled(self.history.can_undo(), egui::Button::new("Undo (Ctrl+Z)")).clicked() {
                        self.undo();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(self.history.can_redo(), egui::Button::new("Redo (Ctrl+Shift+Z)"))
                        .clicked()
                    {
                        self.redo();
                        ui.close_menu();
                    }

                    ui.separator();

                    let selected = self.selected_annotation;
                    if ui.add_enabled(selected.is_some(), egui::Button::new("Change Label...")).clicked() {
                        if let Some(idx) = selected {
                            self.request_relabel(idx);
                        }
                        ui.close_menu();
                    }
                    if ui.add_enabled(selected.is_some(), egui::Button::new("Edit Comment...")).clicked() {
                        if let Some(idx) = selected {
                            self.request_comment(idx);
                        }
                        ui.close_menu();
                    }
                    if ui.add_enabled(selected.is_some(), egui::Button::new("Delete Selected")).clicked() {
                        if let Some(idx) = selected {
                            self.request_delete(idx);
                        }
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_toolbar, "Toolbar");
                    ui.checkbox(&mut self.show_file_list, "File List");
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        let text = format!(
                            "Labeling Tool {}\nLabel images and videos with classed shapes.",
                            env!("CARGO_PKG_VERSION")
                        );
                        self.modal = Some(Modal::Message(MessageBox::new("About", &text)));
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.in_progress_annotation.is_some() {
                self.in_progress_annotation = None;
            } else {
                self.selected_annotation = None;
            }
        }

        // Skip while a text field has focus, e.g. the file search.
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.finish_annotation();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            if let Some(idx) = self.selected_annotation {
                self.request_delete(idx);
            }
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::S)) && self.dirty {
            let result = self.save_current();
            self.report(result);
        }
        if ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Z) && !i.modifiers.shift) {
            self.undo();
        }
        if ctx.input(|i| {
            (i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::Z))
                || (i.modifiers.command && i.key_pressed(egui::Key::Y))
        }) {
            self.redo();
        }
    }

    /// Text drawn instead of an image, `None` for the welcome screen.
    fn canvas_placeholder(&self) -> Option<String> {
        self.database.as_ref()?;
        Some(match self.current_entry() {
            None => "Select a file from the list".to_string(),
            Some(entry) if entry.file_type.is_displayable() => format!("Could not display {}", entry.filename),
            Some(entry) => format!("No preview for {} files ({})", entry.file_type.label(), entry.filename),
        })
    }
}

impl eframe::App for LabelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_image_loader(ctx);

        // Request repaint if still loading (to update spinner)
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        if ctx.input(|i| i.viewport().close_requested()) && !self.allow_close && self.dirty {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            if self.modal.is_none() {
                self.request(PendingAction::Quit);
            }
        }

        self.show_menu(ctx);

        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show_animated(ctx, self.show_toolbar, |ui| {
                let state = toolbar::ToolbarState {
                    drawing_enabled: self.image_texture.is_some(),
                    can_undo: self.history.can_undo(),
                    can_redo: self.history.can_redo(),
                    dirty: self.dirty,
                };
                toolbar::show(ui, &mut self.current_tool, state)
            })
            .map(|response| response.inner)
            .unwrap_or_default();
        if toolbar_action.undo {
            self.undo();
        }
        if toolbar_action.redo {
            self.redo();
        }
        if toolbar_action.save {
            let result = self.save_current();
            self.report(result);
        }

        // File list (left side)
        if self.database.is_some() && self.show_file_list {
            let file_action = egui::SidePanel::left("files")
                .default_width(220.0)
                .show(ctx, |ui| {
                    self.file_list
                        .show(ui, &self.files, &self.patients, self.current_file)
                })
                .inner;
            match file_action {
                FileListAction::Open(idx) if self.current_file != Some(idx) => {
                    self.request(PendingAction::OpenFile(idx));
                }
                FileListAction::Delete(idx) => {
                    if let Some(entry) = self.files.get(idx) {
                        let question = ConfirmBox::new(
                            "Delete file",
                            &format!("Remove {} and its labels from the project?", entry.filename),
                        )
                        .buttons("Yes", "No");
                        self.modal = Some(Modal::DeleteFile(question, idx));
                    }
                }
                FileListAction::AssignPatient(idx, patient) => {
                    let result = self.assign_patient(idx, patient);
                    self.report(result);
                }
                FileListAction::Open(_) | FileListAction::None => {}
            }
        }

        // Properties panel (right side)
        let properties_action = egui::SidePanel::right("properties")
            .default_width(250.0)
            .show(ctx, |ui| {
                properties::show(ui, &self.annotations, &self.classes, self.selected_annotation)
            })
            .inner;
        match properties_action {
            properties::PropertiesAction::SelectAnnotation(idx) => self.selected_annotation = Some(idx),
            properties::PropertiesAction::RelabelAnnotation(idx) => self.request_relabel(idx),
            properties::PropertiesAction::EditComment(idx) => self.request_comment(idx),
            properties::PropertiesAction::DeleteAnnotation(idx) => self.request_delete(idx),
            properties::PropertiesAction::None => {}
        }

        if self.modal.is_none() {
            self.handle_shortcuts(ctx);
        }

        // Main canvas (center)
        let placeholder = self.canvas_placeholder();
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(message) = &self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    return canvas::CanvasAction::None;
                }
                let status = if self.dirty {
                    format!("{} (unsaved)", self.status)
                } else {
                    self.status.clone()
                };
                let view = canvas::CanvasView {
                    annotations: &self.annotations,
                    current_tool: self.current_tool,
                    image_texture: self.image_texture.as_ref(),
                    image_size: self.image_size,
                    in_progress_annotation: self.in_progress_annotation.as_ref(),
                    selected_annotation: self.selected_annotation,
                    dragging_vertex: self.dragging_vertex,
                    settings: &self.settings,
                    placeholder: placeholder.as_deref(),
                    status: &status,
                };
                canvas::show(ui, &view)
            })
            .inner;
        if self.modal.is_none() {
            self.apply_canvas_action(canvas_action);
        }

        self.show_modal(ctx);

        if self.close_requested {
            self.close_requested = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use crate::models::{annotation::Point, project::FileType};
    use std::fs;

    fn polygon() -> Annotation {
        let mut shape = Annotation::new(AnnotationType::Polygon);
        shape.add_vertex(Point::new(0.1, 0.1));
        shape.add_vertex(Point::new(0.5, 0.1));
        shape.add_vertex(Point::new(0.3, 0.6));
        shape
    }

    fn test_app() -> LabelApp {
        LabelApp::with_config_path(AppConfig::default(), None)
    }

    /// App with a fresh project holding `names` as video files, so no
    /// image decoding is started.
    fn app_with_project(dir: &Path, names: &[&str]) -> LabelApp {
        let media = dir.join("media");
        fs::create_dir_all(&media).unwrap();
        let files = names
            .iter()
            .map(|name| {
                let source = media.join(name);
                fs::write(&source, b"data").unwrap();
                FileEntry::from_source(&source, FileType::Video).unwrap()
            })
            .collect();
        let mut app = test_app();
        app.create_project(ProjectRequest {
            root: dir.join("project"),
            clear_existing: false,
            files,
        })
        .unwrap();
        app
    }

    fn label_new_shape(app: &mut LabelApp, class: &str) {
        if !app.classes.contains(class) {
            app.classes.add_class(class).unwrap();
        }
        app.in_progress_annotation = Some(polygon());
        app.finish_annotation();
        let Some(Modal::NewLabel(_, target)) = app.modal.take() else {
            panic!("expected the label dialog");
        };
        app.apply_label(target, DialogOutcome::Accepted(class.to_string()));
    }

    #[test]
    fn test_create_project_clears_confirmed_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");
        fs::create_dir_all(root.join("old")).unwrap();
        fs::write(root.join("stale.txt"), "x").unwrap();

        let mut app = test_app();
        app.create_project(ProjectRequest {
            root: root.clone(),
            clear_existing: true,
            files: Vec::new(),
        })
        .unwrap();

        assert!(app.database.is_some());
        assert!(!root.join("stale.txt").exists());
        assert!(!root.join("old").exists());
        assert!(root.join(project_fs::FILES_DIR).is_dir());
    }

    #[test]
    fn test_create_project_keeps_relative_directory() {
        let dir = tempfile::Builder::new()
            .prefix("relative_root")
            .tempdir_in(".")
            .unwrap();
        let kept = dir.path().join("keep.txt");
        fs::write(&kept, "x").unwrap();
        let relative = PathBuf::from(dir.path().file_name().unwrap());

        let mut app = test_app();
        let result = app.create_project(ProjectRequest {
            root: relative,
            clear_existing: true,
            files: Vec::new(),
        });

        assert!(matches!(result, Err(AppError::InvalidProjectPath { .. })));
        assert!(kept.exists());
        assert!(app.database.is_none());
    }

    #[test]
    fn test_vertex_drag_is_recorded_only_when_moved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");
        app.save_current().unwrap();
        app.history.clear();

        app.apply_canvas_action(canvas::CanvasAction::StartDraggingVertex(0, 1));
        app.apply_canvas_action(canvas::CanvasAction::StopDragging);
        assert!(!app.dirty);
        assert!(!app.history.can_undo());

        let moved = Point::new(0.9, 0.2);
        app.apply_canvas_action(canvas::CanvasAction::StartDraggingVertex(0, 1));
        app.apply_canvas_action(canvas::CanvasAction::DragVertex(moved));
        app.apply_canvas_action(canvas::CanvasAction::StopDragging);
        assert!(app.dirty);
        assert_eq!(app.annotations[0].vertices[1], moved);

        app.undo();
        assert_eq!(app.annotations[0].vertices[1], Point::new(0.5, 0.1));
    }

    #[test]
    fn test_history_undo_redo() {
        let mut history = History::new();
        let a = vec![polygon()];
        let b = vec![polygon(), polygon()];

        history.push(Vec::new());
        history.push(a.clone());
        assert_eq!(history.undo(b.clone()), Some(a.clone()));
        assert_eq!(history.redo(a.clone()), Some(b));
        assert!(!history.can_redo());

        history.undo(Vec::new());
        assert!(history.can_redo());
        history.push(Vec::new());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new();
        for _ in 0..60 {
            history.push(Vec::new());
        }
        assert_eq!(history.undo_stack.len(), 50);
        history.clear();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_labeled_shapes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();

        label_new_shape(&mut app, "tumor");
        assert!(app.dirty);
        app.apply_comment(0, "check margin");
        app.save_current().unwrap();
        assert!(!app.dirty);

        let mut reopened = test_app();
        reopened.open_project(&dir.path().join("project")).unwrap();
        reopened.open_file(0).unwrap();
        assert_eq!(reopened.annotations.len(), 1);
        assert_eq!(reopened.annotations[0].label, "tumor");
        assert_eq!(reopened.annotations[0].comment, "check margin");
        assert!(reopened.classes.contains("tumor"));
    }

    #[test]
    fn test_unlabeled_shape_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();

        app.in_progress_annotation = Some(polygon());
        app.finish_annotation();
        let Some(Modal::NewLabel(_, target)) = app.modal.take() else {
            panic!("expected the label dialog");
        };
        app.apply_label(target, DialogOutcome::Cancelled);
        assert!(app.annotations.is_empty());
        assert!(!app.dirty);
    }

    #[test]
    fn test_incomplete_shape_never_asks_for_label() {
        let mut app = test_app();
        let mut line = Annotation::new(AnnotationType::Line);
        line.add_vertex(Point::new(0.2, 0.2));
        app.in_progress_annotation = Some(line);
        app.finish_annotation();
        assert!(app.modal.is_none());
        assert!(app.in_progress_annotation.is_none());
    }

    #[test]
    fn test_delete_and_undo_restore_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");
        label_new_shape(&mut app, "stroma");

        app.delete_annotation(0);
        assert_eq!(app.annotations.len(), 1);
        assert_eq!(app.annotations[0].label, "stroma");

        app.undo();
        assert_eq!(app.annotations.len(), 2);
        app.redo();
        assert_eq!(app.annotations.len(), 1);
    }

    #[test]
    fn test_comment_edit_undoable() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");

        app.apply_comment(0, "first");
        app.apply_comment(0, "second");
        assert_eq!(app.annotations[0].comment, "second");
        app.undo();
        assert_eq!(app.annotations[0].comment, "first");
    }

    #[test]
    fn test_switching_with_unsaved_changes_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["a.mp4", "b.mp4"]);
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");

        app.request(PendingAction::OpenFile(1));
        assert!(matches!(
            app.modal,
            Some(Modal::ForgotToSave(_, PendingAction::OpenFile(1)))
        ));
        assert_eq!(app.current_file, Some(0));
    }

    #[test]
    fn test_auto_save_switches_directly() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["a.mp4", "b.mp4"]);
        app.settings.auto_save = true;
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");

        app.request(PendingAction::OpenFile(1));
        assert!(app.modal.is_none());
        assert_eq!(app.current_file, Some(1));

        app.request(PendingAction::OpenFile(0));
        assert_eq!(app.annotations.len(), 1);
    }

    #[test]
    fn test_quit_without_changes_closes() {
        let mut app = test_app();
        app.request(PendingAction::Quit);
        assert!(app.allow_close);
        assert!(app.close_requested);
    }

    #[test]
    fn test_import_overwrite_replaces_entry_and_labels() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");
        app.save_current().unwrap();

        let other = dir.path().join("other");
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("clip.mp4"), b"newer").unwrap();
        let entry = FileEntry::from_source(&other.join("clip.mp4"), FileType::Video).unwrap();
        app.import_file(entry).unwrap();

        assert_eq!(app.files.len(), 1);
        assert_eq!(app.files[0].source, other.join("clip.mp4"));
        assert_eq!(app.current_file, None);

        app.open_file(0).unwrap();
        assert!(app.annotations.is_empty());
    }

    #[test]
    fn test_delete_current_file_clears_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["a.mp4", "b.mp4"]);
        app.open_file(1).unwrap();

        app.delete_file(0).unwrap();
        assert_eq!(app.files.len(), 1);
        // "b.mp4" moved up one row and stays selected.
        assert_eq!(app.current_file, Some(0));

        app.delete_file(0).unwrap();
        assert!(app.files.is_empty());
        assert_eq!(app.current_file, None);
    }

    #[test]
    fn test_patients_assigned_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["a.mp4"]);
        app.add_patient("P-001").unwrap();
        let patient = app.patients[0].id;

        app.assign_patient(0, Some(patient)).unwrap();
        assert_eq!(app.files[0].patient_id, Some(patient));
        app.assign_patient(0, None).unwrap();
        assert_eq!(app.files[0].patient_id, None);
    }

    #[test]
    fn test_settings_persist_in_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &[]);
        let settings = ProjectSettings {
            line_width: 5.0,
            ..ProjectSettings::default()
        };
        app.apply_settings(SettingsUpdate {
            project: Some(settings.clone()),
            log_level: LogLevel::Debug,
            dark_theme: false,
        })
        .unwrap();
        assert!(!app.config.dark_theme);
        assert_eq!(app.config.log_level, LogLevel::Debug);
        assert_eq!(log::max_level(), log::LevelFilter::Debug);

        let mut reopened = test_app();
        reopened.open_project(&dir.path().join("project")).unwrap();
        assert_eq!(reopened.settings, settings);
    }

    #[test]
    fn test_export_then_import_annotations() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_project(dir.path(), &["clip.mp4"]);
        app.open_file(0).unwrap();
        label_new_shape(&mut app, "tumor");
        let path = dir.path().join("shapes.json");
        app.export_annotations(&path).unwrap();

        app.delete_annotation(0);
        app.classes = LabelClassRegistry::new();
        app.import_annotations(&path).unwrap();
        assert_eq!(app.annotations.len(), 1);
        assert!(app.classes.contains("tumor"));
    }

    #[test]
    fn test_operations_need_a_project() {
        let mut app = test_app();
        assert!(matches!(app.save_current(), Err(AppError::NoProject)));
        assert!(matches!(app.add_patient("x"), Err(AppError::NoProject)));
        assert!(app.canvas_placeholder().is_none());
    }
}
