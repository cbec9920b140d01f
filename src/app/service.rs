use crate::{
    app::{backend::AppBackend, errors::AppError},
    eid::Eid,
    notes::{Note, NoteCreate, NoteQuery, NoteUpdate},
    subjects::Subject,
    suggest::{self, is_default_subject},
};
use serde::{Deserialize, Serialize};

/// A note as the editor holds it right before an explicit save.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    /// `None` for a note that was never saved.
    pub id: Option<Eid>,
    pub title: String,
    pub body: String,
    /// Explicitly selected subject, or the interactive suggestion.
    pub subject: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecategorizeReport {
    /// Notes that were still uncategorized.
    pub scanned: usize,
    pub updated: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    pub notes: Vec<Note>,
    /// Most likely subject for the search term, when there is one.
    pub likely_subject: Option<String>,
}

/// The subject to persist for `draft`: its own subject, unless that is still
/// the default and the draft has some text, in which case the suggestion
/// computed against `corpus` (minus the draft itself) replaces it.
pub fn resolve_save_subject(draft: &NoteDraft, corpus: &[Note]) -> String {
    let has_text = !draft.title.trim().is_empty() || !draft.body.trim().is_empty();
    if !is_default_subject(&draft.subject) || !has_text {
        return draft.subject.clone();
    }

    let exclude_id = draft.id.as_ref().map(|id| id.as_str());
    suggest::suggest(&draft.title, &draft.body, corpus, exclude_id)
}

/// Suggests subjects for every uncategorized note in `notes` and writes the
/// ones that found a subject through `backend`, one at a time in the given
/// order. A failed write is logged and skipped.
pub fn recategorize(backend: &dyn AppBackend, notes: &[Note]) -> RecategorizeReport {
    let mut report = RecategorizeReport::default();

    for note in notes.iter().filter(|n| is_default_subject(&n.subject)) {
        report.scanned += 1;

        let suggested = suggest::suggest(&note.title, &note.body, notes, Some(note.id.as_str()));
        if is_default_subject(&suggested) {
            continue;
        }

        let update = NoteUpdate {
            subject: Some(suggested.clone()),
            ..Default::default()
        };

        match backend.update(&note.id, update) {
            Ok(_) => {
                log::info!("note {} recategorized as {suggested:?}", note.id);
                report.updated += 1;
            }
            Err(err) => {
                log::warn!("couldnt recategorize note {}: {err}", note.id);
                report.failed += 1;
            }
        }
    }

    report
}

pub struct AppService {
    backend: Box<dyn AppBackend>,
}

impl AppService {
    pub fn new(backend: Box<dyn AppBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn AppBackend {
        self.backend.as_ref()
    }

    pub fn all_notes(&self) -> anyhow::Result<Vec<Note>, AppError> {
        self.backend.search(NoteQuery::all())
    }

    pub fn list_notes(&self, query: NoteQuery) -> anyhow::Result<Vec<Note>, AppError> {
        self.backend.search(query)
    }

    /// Lists notes matching `query`. A non-empty result for a text search also
    /// carries the subject the search term most likely belongs to.
    pub fn search_notes(&self, query: NoteQuery) -> anyhow::Result<SearchResult, AppError> {
        let term = query.search.clone().unwrap_or_default();
        let notes = self.backend.search(query)?;

        let likely_subject = if notes.is_empty() || term.trim().is_empty() {
            None
        } else {
            let corpus = self.all_notes()?;
            Some(suggest::suggest(&term, "", &corpus, None)).filter(|s| !is_default_subject(s))
        };

        Ok(SearchResult {
            notes,
            likely_subject,
        })
    }

    pub fn get_note(&self, id: &Eid) -> anyhow::Result<Note, AppError> {
        self.backend.get(id)
    }

    pub fn delete_note(&self, id: &Eid) -> anyhow::Result<(), AppError> {
        self.backend.delete(id)
    }

    /// Suggestion for a note being written; `id` keeps a saved note from
    /// voting for itself.
    pub fn suggest_subject(
        &self,
        title: &str,
        body: &str,
        id: Option<&Eid>,
    ) -> anyhow::Result<String, AppError> {
        let corpus = self.all_notes()?;
        Ok(suggest::suggest(
            title,
            body,
            &corpus,
            id.map(|id| id.as_str()),
        ))
    }

    /// Explicit save. Falls back to a suggested subject while the draft is
    /// still uncategorized.
    pub fn save_note(&self, draft: NoteDraft) -> anyhow::Result<Note, AppError> {
        let corpus = self.all_notes()?;
        save_draft(self.backend.as_ref(), draft, &corpus)
    }

    pub fn recategorize_all(&self) -> anyhow::Result<RecategorizeReport, AppError> {
        let notes = self.all_notes()?;
        let report = recategorize(self.backend.as_ref(), &notes);
        log::info!(
            "recategorize: {} uncategorized, {} updated, {} failed",
            report.scanned,
            report.updated,
            report.failed
        );
        Ok(report)
    }

    pub fn subjects(&self) -> anyhow::Result<Vec<Subject>, AppError> {
        self.backend.subjects()
    }

    pub fn create_subject(&self, name: &str) -> anyhow::Result<Subject, AppError> {
        self.backend.create_subject(name)
    }

    pub fn delete_subject(&self, id: &Eid) -> anyhow::Result<(), AppError> {
        self.backend.delete_subject(id)
    }
}

/// Persists `draft`, creating the note when it has no id yet.
pub fn save_draft(
    backend: &dyn AppBackend,
    draft: NoteDraft,
    corpus: &[Note],
) -> anyhow::Result<Note, AppError> {
    let draft = NoteDraft {
        title: draft.title.trim().to_string(),
        ..draft
    };

    if draft.title.is_empty() {
        return Err(AppError::Invalid("Note title is required".to_string()));
    }

    let subject = resolve_save_subject(&draft, corpus);
    if subject != draft.subject {
        log::debug!("save fell back to suggested subject {subject:?}");
    }

    match draft.id {
        Some(id) => backend.update(
            &id,
            NoteUpdate {
                title: Some(draft.title),
                body: Some(draft.body),
                subject: Some(subject),
            },
        ),
        None => backend.create(NoteCreate {
            title: draft.title,
            body: Some(draft.body),
            subject: Some(subject),
        }),
    }
}
