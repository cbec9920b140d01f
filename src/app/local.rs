use crate::{
    eid::Eid,
    notes::{self, Note, NoteCreate, NoteQuery, NoteUpdate},
    subjects::{self, Subject},
};
use std::sync::Arc;

use super::{backend::*, errors::AppError};

/// Backend working directly on the CSV stores in the base directory.
pub struct AppLocal {
    pub note_mgr: Arc<dyn notes::NoteManager>,
    pub subject_mgr: Arc<dyn subjects::SubjectManager>,
}

impl AppLocal {
    pub fn new(notes_path: &str, subjects_path: &str) -> anyhow::Result<Self> {
        let note_mgr = Arc::new(notes::BackendCsv::load(notes_path)?);
        let subject_mgr = Arc::new(subjects::SubjectsCsv::load(subjects_path)?);

        Ok(Self::new_with(note_mgr, subject_mgr))
    }

    pub fn new_with(
        note_mgr: Arc<dyn notes::NoteManager>,
        subject_mgr: Arc<dyn subjects::SubjectManager>,
    ) -> Self {
        Self {
            note_mgr,
            subject_mgr,
        }
    }
}

impl AppBackend for AppLocal {
    fn search(&self, query: NoteQuery) -> anyhow::Result<Vec<Note>, AppError> {
        Ok(self.note_mgr.search(query)?)
    }

    fn get(&self, id: &Eid) -> anyhow::Result<Note, AppError> {
        self.note_mgr
            .search(NoteQuery::by_id(id))?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound("Note"))
    }

    fn create(&self, note_create: NoteCreate) -> anyhow::Result<Note, AppError> {
        let note_create = validate_note_create(note_create)?;
        let note = self.note_mgr.create(note_create)?;
        log::info!("created note {} under {:?}", note.id, note.subject);
        Ok(note)
    }

    fn update(&self, id: &Eid, note_update: NoteUpdate) -> anyhow::Result<Note, AppError> {
        let note_update = validate_note_update(note_update)?;
        self.note_mgr
            .update(id, note_update)?
            .ok_or(AppError::NotFound("Note"))
    }

    fn delete(&self, id: &Eid) -> anyhow::Result<(), AppError> {
        if !self.note_mgr.delete(id)? {
            return Err(AppError::NotFound("Note"));
        }
        log::info!("deleted note {id}");
        Ok(())
    }

    fn subjects(&self) -> anyhow::Result<Vec<Subject>, AppError> {
        Ok(self.subject_mgr.list()?)
    }

    fn create_subject(&self, name: &str) -> anyhow::Result<Subject, AppError> {
        let name = validate_subject_name(name)?;
        self.subject_mgr
            .create(name)?
            .ok_or_else(|| AppError::AlreadyExists("Subject".to_string()))
    }

    fn delete_subject(&self, id: &Eid) -> anyhow::Result<(), AppError> {
        if !self.subject_mgr.delete(id)? {
            return Err(AppError::NotFound("Subject"));
        }
        Ok(())
    }
}
