// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Project database.
//!
//! Each project keeps a SQLite database next to its media. The UI thread
//! owns the connection; every call blocks on a private current-thread
//! runtime, so the store behaves like a synchronous API.

use crate::error::{AppError, Result};
use crate::io::project_fs;
use crate::models::{
    annotation::{Annotation, AnnotationType},
    label_class::LabelClassRegistry,
    project::{FileEntry, FileType, Patient, ProjectSettings},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::runtime::{Builder, Runtime};

/// File name of the database inside a project root.
pub const DATABASE_FILE: &str = "project.db";

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS patients (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL UNIQUE,
        source TEXT NOT NULL,
        file_type TEXT NOT NULL,
        patient_id INTEGER REFERENCES patients(id) ON DELETE SET NULL
    )",
    "CREATE TABLE IF NOT EXISTS labels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_id INTEGER NOT NULL REFERENCES files(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        label TEXT NOT NULL,
        kind TEXT NOT NULL,
        line_color TEXT NOT NULL,
        comment TEXT NOT NULL DEFAULT '',
        vertices TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS classes (
        position INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )",
];

#[derive(FromRow)]
struct FileRow {
    id: i64,
    filename: String,
    source: String,
    file_type: String,
    patient_id: Option<i64>,
}

impl FileRow {
    fn into_entry(self) -> Result<FileEntry> {
        Ok(FileEntry {
            id: Some(self.id),
            filename: self.filename,
            source: PathBuf::from(self.source),
            file_type: FileType::from_tag(&self.file_type)?,
            patient_id: self.patient_id,
        })
    }
}

#[derive(FromRow)]
struct LabelRow {
    label: String,
    kind: String,
    line_color: String,
    comment: String,
    vertices: String,
}

impl LabelRow {
    fn into_annotation(self) -> Result<Annotation> {
        let annotation_type = AnnotationType::parse(&self.kind).unwrap_or_else(|| {
            log::warn!("Unknown shape kind '{}', treating as polygon", self.kind);
            AnnotationType::Polygon
        });
        Ok(Annotation {
            label: self.label,
            annotation_type,
            line_color: serde_json::from_str(&self.line_color)?,
            comment: self.comment,
            vertices: serde_json::from_str(&self.vertices)?,
        })
    }
}

#[derive(FromRow)]
struct PatientRow {
    id: i64,
    name: String,
}

/// Handle to an open project: its root directory and database.
pub struct ProjectDatabase {
    root: PathBuf,
    pool: SqlitePool,
    runtime: Runtime,
}

impl ProjectDatabase {
    /// Create (or reopen) the project at `root`, creating the directory
    /// layout and schema as needed.
    pub fn initialize(root: &Path) -> Result<Self> {
        project_fs::create_layout(root)?;
        let db = Self::connect(root, true)?;
        log::info!("Initialized project at {}", root.display());
        Ok(db)
    }

    /// Open an existing project. Fails if `root` has no project database.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.join(DATABASE_FILE).is_file() {
            return Err(AppError::NotAProject {
                path: root.to_path_buf(),
            });
        }
        let db = Self::connect(root, false)?;
        log::info!("Opened project at {}", root.display());
        Ok(db)
    }

    /// Initialize a project and register the given files, copying each
    /// into the project.
    pub fn create_project(root: &Path, files: &[FileEntry]) -> Result<Self> {
        let db = Self::initialize(root)?;
        for entry in files {
            db.add_file(entry)?;
        }
        Ok(db)
    }

    fn connect(root: &Path, create: bool) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = SqliteConnectOptions::new()
            .filename(root.join(DATABASE_FILE))
            .create_if_missing(create)
            .foreign_keys(true);
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options),
        )?;

        let db = Self {
            root: root.to_path_buf(),
            pool,
            runtime,
        };
        db.block_on(db.create_schema())?;
        Ok(db)
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    async fn create_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the project's copy of `entry` lives.
    pub fn media_path(&self, entry: &FileEntry) -> PathBuf {
        project_fs::media_path(&self.root, &entry.filename)
    }

    /// Copy a file into the project and register it. A file with the same
    /// basename is replaced, together with its labels.
    pub fn add_file(&self, entry: &FileEntry) -> Result<FileEntry> {
        let staged = project_fs::stage_media(&self.root, &entry.source, &entry.filename)?;
        let id = match self.block_on(self.insert_file(entry)) {
            Ok(id) => id,
            Err(e) => {
                project_fs::discard_media(&staged);
                return Err(e);
            }
        };
        project_fs::commit_media(&staged, &self.root, &entry.filename)?;
        log::info!("Added file {} (id {})", entry.filename, id);
        Ok(FileEntry {
            id: Some(id),
            ..entry.clone()
        })
    }

    async fn insert_file(&self, entry: &FileEntry) -> Result<i64> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM files WHERE filename = ?1")
            .bind(&entry.filename)
            .execute(&mut *tx)
            .await?;
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO files (filename, source, file_type, patient_id)
             VALUES (?1, ?2, ?3, ?4) RETURNING id",
        )
        .bind(&entry.filename)
        .bind(entry.source.to_string_lossy().into_owned())
        .bind(entry.file_type.tag())
        .bind(entry.patient_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Remove a file, its labels and the project's copy of it.
    pub fn delete_file(&self, id: i64) -> Result<()> {
        let entry = self.file(id)?;
        self.block_on(async {
            sqlx::query("DELETE FROM files WHERE id = ?1")
                .bind(id)
                .execute(&self.pool)
                .await
        })?;
        project_fs::remove_media(&self.root, &entry.filename)?;
        log::info!("Deleted file {}", entry.filename);
        Ok(())
    }

    /// All tracked files in import order.
    pub fn files(&self) -> Result<Vec<FileEntry>> {
        let rows = self.block_on(
            sqlx::query_as::<_, FileRow>(
                "SELECT id, filename, source, file_type, patient_id FROM files ORDER BY id",
            )
            .fetch_all(&self.pool),
        )?;
        rows.into_iter().map(FileRow::into_entry).collect()
    }

    pub fn file(&self, id: i64) -> Result<FileEntry> {
        let row = self.block_on(
            sqlx::query_as::<_, FileRow>(
                "SELECT id, filename, source, file_type, patient_id FROM files WHERE id = ?1",
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )?;
        row.ok_or(AppError::FileNotFound { id })?.into_entry()
    }

    pub fn add_patient(&self, name: &str) -> Result<Patient> {
        let id = self.block_on(
            sqlx::query_scalar::<_, i64>("INSERT INTO patients (name) VALUES (?1) RETURNING id")
                .bind(name)
                .fetch_one(&self.pool),
        )?;
        log::info!("Added patient {} (id {})", name, id);
        Ok(Patient {
            id,
            name: name.to_string(),
        })
    }

    pub fn patients(&self) -> Result<Vec<Patient>> {
        let rows = self.block_on(
            sqlx::query_as::<_, PatientRow>("SELECT id, name FROM patients ORDER BY id")
                .fetch_all(&self.pool),
        )?;
        Ok(rows
            .into_iter()
            .map(|r| Patient {
                id: r.id,
                name: r.name,
            })
            .collect())
    }

    /// Link a file to a patient, or unlink it with `None`.
    pub fn assign_patient(&self, file_id: i64, patient_id: Option<i64>) -> Result<()> {
        let result = self.block_on(
            sqlx::query("UPDATE files SET patient_id = ?1 WHERE id = ?2")
                .bind(patient_id)
                .bind(file_id)
                .execute(&self.pool),
        )?;
        if result.rows_affected() == 0 {
            return Err(AppError::FileNotFound { id: file_id });
        }
        Ok(())
    }

    /// Replace the stored labels of a file and the project's class list.
    pub fn save(
        &self,
        file_id: i64,
        annotations: &[Annotation],
        classes: &LabelClassRegistry,
    ) -> Result<()> {
        self.block_on(self.write_labels(file_id, annotations, classes))?;
        log::info!("Saved {} labels for file {}", annotations.len(), file_id);
        Ok(())
    }

    async fn write_labels(
        &self,
        file_id: i64,
        annotations: &[Annotation],
        classes: &LabelClassRegistry,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM labels WHERE file_id = ?1")
            .bind(file_id)
            .execute(&mut *tx)
            .await?;
        for (position, annotation) in annotations.iter().enumerate() {
            sqlx::query(
                "INSERT INTO labels (file_id, position, label, kind, line_color, comment, vertices)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(file_id)
            .bind(position as i64)
            .bind(&annotation.label)
            .bind(annotation.annotation_type.as_str())
            .bind(serde_json::to_string(&annotation.line_color)?)
            .bind(&annotation.comment)
            .bind(serde_json::to_string(&annotation.vertices)?)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM classes").execute(&mut *tx).await?;
        for class in classes.iter() {
            sqlx::query("INSERT INTO classes (position, name) VALUES (?1, ?2)")
                .bind(class.index as i64)
                .bind(&class.name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Stored labels of a file, in the order they were saved.
    pub fn labels_for(&self, file_id: i64) -> Result<Vec<Annotation>> {
        let rows = self.block_on(
            sqlx::query_as::<_, LabelRow>(
                "SELECT label, kind, line_color, comment, vertices FROM labels
                 WHERE file_id = ?1 ORDER BY position",
            )
            .bind(file_id)
            .fetch_all(&self.pool),
        )?;
        rows.into_iter().map(LabelRow::into_annotation).collect()
    }

    /// The project's label classes.
    pub fn classes(&self) -> Result<LabelClassRegistry> {
        let names = self.block_on(
            sqlx::query_scalar::<_, String>("SELECT name FROM classes ORDER BY position")
                .fetch_all(&self.pool),
        )?;
        Ok(LabelClassRegistry::from_names(names))
    }

    /// Persist settings as one row per field.
    pub fn update_settings(&self, settings: &ProjectSettings) -> Result<()> {
        let value = serde_json::to_value(settings)?;
        let fields = value.as_object().cloned().unwrap_or_default();
        self.block_on(async {
            let mut tx = self.pool.begin().await?;
            for (key, value) in &fields {
                sqlx::query(
                    "INSERT INTO settings (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                )
                .bind(key)
                .bind(value.to_string())
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await
        })?;
        log::info!("Updated project settings");
        Ok(())
    }

    /// Stored settings; fields never saved fall back to their defaults.
    pub fn load_settings(&self) -> Result<ProjectSettings> {
        let rows = self.block_on(
            sqlx::query_as::<_, (String, String)>("SELECT key, value FROM settings")
                .fetch_all(&self.pool),
        )?;
        let mut fields = serde_json::Map::new();
        for (key, value) in rows {
            fields.insert(key, serde_json::from_str(&value)?);
        }
        Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
    }
}

impl Drop for ProjectDatabase {
    fn drop(&mut self) {
        let pool = self.pool.clone();
        self.runtime.block_on(pool.close());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::Point;
    use crate::util::color::Color;
    use std::fs;

    fn source_file(dir: &Path, name: &str) -> FileEntry {
        let path = dir.join(name);
        fs::write(&path, name).unwrap();
        FileEntry::from_source(&path, FileType::Image).unwrap()
    }

    fn shape(label: &str, comment: &str) -> Annotation {
        let mut a = Annotation::new(AnnotationType::Polygon);
        a.set_label(label, Color::new(10, 20, 30));
        a.add_vertex(Point::new(0.1, 0.2));
        a.add_vertex(Point::new(0.3, 0.4));
        a.add_vertex(Point::new(0.5, 0.1));
        a.edit_comment(comment)
    }

    #[test]
    fn test_create_project_registers_and_copies_files() {
        let sources = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let root = project.path().join("p1");
        let files = vec![
            source_file(sources.path(), "a.png"),
            source_file(sources.path(), "b.png"),
        ];

        let db = ProjectDatabase::create_project(&root, &files).unwrap();
        let stored = db.files().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].filename, "a.png");
        assert!(db.media_path(&stored[1]).is_file());
        assert!(root.join(DATABASE_FILE).is_file());
    }

    #[test]
    fn test_open_requires_database() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ProjectDatabase::open(dir.path()),
            Err(AppError::NotAProject { .. })
        ));

        drop(ProjectDatabase::initialize(dir.path()).unwrap());
        assert!(ProjectDatabase::open(dir.path()).is_ok());
    }

    #[test]
    fn test_labels_and_classes_round_trip() {
        let sources = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let db = ProjectDatabase::initialize(project.path()).unwrap();
        let file = db.add_file(&source_file(sources.path(), "scan.png")).unwrap();
        let file_id = file.id.unwrap();

        let mut classes = LabelClassRegistry::new();
        classes.add_class("tumor").unwrap();
        classes.add_class("stroma").unwrap();
        let shapes = vec![shape("tumor", "check margin"), shape("stroma", "")];

        db.save(file_id, &shapes, &classes).unwrap();
        assert_eq!(db.labels_for(file_id).unwrap(), shapes);
        assert_eq!(db.classes().unwrap(), classes);

        db.save(file_id, &shapes[..1], &classes).unwrap();
        assert_eq!(db.labels_for(file_id).unwrap().len(), 1);
    }

    #[test]
    fn test_overwriting_file_drops_old_labels() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let db = ProjectDatabase::initialize(project.path()).unwrap();

        let old = db.add_file(&source_file(first.path(), "scan.png")).unwrap();
        db.save(old.id.unwrap(), &[shape("a", "")], &LabelClassRegistry::new())
            .unwrap();

        let new = db.add_file(&source_file(second.path(), "scan.png")).unwrap();
        let files = db.files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].source, second.path().join("scan.png"));
        assert!(db.labels_for(new.id.unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_failed_overwrite_keeps_old_file() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let db = ProjectDatabase::initialize(project.path()).unwrap();

        let old = db.add_file(&source_file(first.path(), "scan.png")).unwrap();
        let old_id = old.id.unwrap();
        db.save(old_id, &[shape("a", "")], &LabelClassRegistry::new())
            .unwrap();

        // Unknown patient, the insert violates its foreign key.
        let mut replacement = source_file(second.path(), "scan.png");
        fs::write(&replacement.source, "replacement bytes").unwrap();
        replacement.patient_id = Some(999);
        assert!(db.add_file(&replacement).is_err());

        assert_eq!(fs::read_to_string(db.media_path(&old)).unwrap(), "scan.png");
        assert_eq!(db.files().unwrap()[0].id, Some(old_id));
        assert_eq!(db.labels_for(old_id).unwrap().len(), 1);
        let leftovers = fs::read_dir(project.path().join(project_fs::FILES_DIR))
            .unwrap()
            .count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_delete_file_removes_labels_and_copy() {
        let sources = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let db = ProjectDatabase::initialize(project.path()).unwrap();
        let file = db.add_file(&source_file(sources.path(), "x.png")).unwrap();
        let id = file.id.unwrap();
        db.save(id, &[shape("a", "")], &LabelClassRegistry::new()).unwrap();

        db.delete_file(id).unwrap();
        assert!(db.files().unwrap().is_empty());
        assert!(db.labels_for(id).unwrap().is_empty());
        assert!(!db.media_path(&file).exists());
        assert!(matches!(db.file(id), Err(AppError::FileNotFound { .. })));
    }

    #[test]
    fn test_settings_round_trip() {
        let project = tempfile::tempdir().unwrap();
        let db = ProjectDatabase::initialize(project.path()).unwrap();
        assert_eq!(db.load_settings().unwrap(), ProjectSettings::default());

        let settings = ProjectSettings {
            line_width: 3.5,
            vertex_size: 6.0,
            auto_save: true,
        };
        db.update_settings(&settings).unwrap();
        assert_eq!(db.load_settings().unwrap(), settings);
    }

    #[test]
    fn test_patients() {
        let sources = tempfile::tempdir().unwrap();
        let project = tempfile::tempdir().unwrap();
        let db = ProjectDatabase::initialize(project.path()).unwrap();
        let file = db.add_file(&source_file(sources.path(), "x.png")).unwrap();

        let patient = db.add_patient("P-001").unwrap();
        assert_eq!(db.patients().unwrap(), vec![patient.clone()]);

        db.assign_patient(file.id.unwrap(), Some(patient.id)).unwrap();
        assert_eq!(db.files().unwrap()[0].patient_id, Some(patient.id));
        assert!(db.assign_patient(999, None).is_err());
    }
}
