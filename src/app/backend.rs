use crate::{
    eid::Eid,
    notes::{Note, NoteCreate, NoteQuery, NoteUpdate},
    subjects::Subject,
};

use super::errors::AppError;

/// Everything the application needs from "the notes service", either the
/// local store or a daemon reached over HTTP.
pub trait AppBackend: Send + Sync {
    fn search(&self, query: NoteQuery) -> anyhow::Result<Vec<Note>, AppError>;
    fn get(&self, id: &Eid) -> anyhow::Result<Note, AppError>;
    fn create(&self, note_create: NoteCreate) -> anyhow::Result<Note, AppError>;
    fn update(&self, id: &Eid, note_update: NoteUpdate) -> anyhow::Result<Note, AppError>;
    fn delete(&self, id: &Eid) -> anyhow::Result<(), AppError>;

    fn subjects(&self) -> anyhow::Result<Vec<Subject>, AppError>;
    fn create_subject(&self, name: &str) -> anyhow::Result<Subject, AppError>;
    fn delete_subject(&self, id: &Eid) -> anyhow::Result<(), AppError>;
}

/// Title must be non-blank; it is stored trimmed.
pub fn validate_note_create(mut note_create: NoteCreate) -> anyhow::Result<NoteCreate, AppError> {
    let title = note_create.title.trim();
    if title.is_empty() {
        return Err(AppError::Invalid("Note title is required".to_string()));
    }

    note_create.title = title.to_string();
    Ok(note_create)
}

/// Same rule as creation for a title that is being changed.
pub fn validate_note_update(mut note_update: NoteUpdate) -> anyhow::Result<NoteUpdate, AppError> {
    if let Some(title) = note_update.title.as_deref() {
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::Invalid("Note title is required".to_string()));
        }
        note_update.title = Some(title.to_string());
    }

    Ok(note_update)
}

pub fn validate_subject_name(name: &str) -> anyhow::Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Invalid("Subject name is required".to_string()));
    }
    Ok(name)
}
