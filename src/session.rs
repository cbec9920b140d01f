//! Editing session for a single note.
//!
//! While the note is still uncategorized, every title or body edit restarts a
//! quiet-period timer; when it fires, the subject suggested from the other
//! notes replaces the default. Saving applies the same suggestion once more
//! as a fallback.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::watch;

use crate::{
    app::{
        backend::AppBackend,
        errors::AppError,
        service::{save_draft, NoteDraft},
    },
    debounce::Debouncer,
    eid::Eid,
    notes::Note,
    suggest::{self, is_default_subject, DEFAULT_SUBJECT},
};

#[derive(Debug)]
struct DraftState {
    draft: NoteDraft,
    /// Bumped on every change so a late suggestion never lands on text it was
    /// not computed from.
    revision: u64,
}

pub struct EditSession {
    state: Arc<Mutex<DraftState>>,
    corpus: Arc<Vec<Note>>,
    debouncer: Debouncer,
    subject_tx: Arc<watch::Sender<String>>,
}

impl EditSession {
    /// `note` is `None` for a note that does not exist yet. `corpus` holds all
    /// known notes; the edited note is skipped by id when suggesting.
    pub fn new(note: Option<&Note>, corpus: Vec<Note>, quiet_period: Duration) -> Self {
        let draft = match note {
            Some(note) => NoteDraft {
                id: Some(note.id.clone()),
                title: note.title.clone(),
                body: note.body.clone(),
                subject: note.subject.clone(),
            },
            None => NoteDraft {
                subject: DEFAULT_SUBJECT.to_string(),
                ..Default::default()
            },
        };

        let (subject_tx, _) = watch::channel(draft.subject.clone());

        Self {
            state: Arc::new(Mutex::new(DraftState { draft, revision: 0 })),
            corpus: Arc::new(corpus),
            debouncer: Debouncer::new(quiet_period),
            subject_tx: Arc::new(subject_tx),
        }
    }

    pub fn id(&self) -> Option<Eid> {
        self.state.lock().unwrap().draft.id.clone()
    }

    pub fn draft(&self) -> NoteDraft {
        self.state.lock().unwrap().draft.clone()
    }

    pub fn subject(&self) -> String {
        self.state.lock().unwrap().draft.subject.clone()
    }

    /// Receives every subject change, interactive suggestions included.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.subject_tx.subscribe()
    }

    pub fn is_suggestion_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn set_title(&self, title: &str) {
        self.edit(|draft| draft.title = title.to_string());
    }

    pub fn set_body(&self, body: &str) {
        self.edit(|draft| draft.body = body.to_string());
    }

    pub fn append_body(&self, text: &str) {
        self.edit(|draft| {
            if !draft.body.is_empty() {
                draft.body.push('\n');
            }
            draft.body.push_str(text);
        });
    }

    /// Explicit subject choice. Choosing the default subject re-enables
    /// interactive suggestions.
    pub fn select_subject(&self, subject: &str) {
        self.edit(|draft| draft.subject = subject.to_string());
        self.subject_tx.send_replace(subject.to_string());
    }

    fn edit<F>(&self, change: F)
    where
        F: FnOnce(&mut NoteDraft),
    {
        let (draft, revision) = {
            let mut state = self.state.lock().unwrap();
            change(&mut state.draft);
            state.revision += 1;
            (state.draft.clone(), state.revision)
        };

        self.reschedule(draft, revision);
    }

    fn reschedule(&self, draft: NoteDraft, revision: u64) {
        let has_text = !draft.title.trim().is_empty() || !draft.body.trim().is_empty();

        if !is_default_subject(&draft.subject) || !has_text || self.corpus.is_empty() {
            self.debouncer.cancel();
            return;
        }

        let state = self.state.clone();
        let corpus = self.corpus.clone();
        let subject_tx = self.subject_tx.clone();

        self.debouncer.schedule(move || {
            let exclude_id = draft.id.as_ref().map(|id| id.as_str());
            let suggested = suggest::suggest(&draft.title, &draft.body, &corpus, exclude_id);
            if is_default_subject(&suggested) {
                return;
            }

            let mut state = state.lock().unwrap();
            if state.revision != revision || !is_default_subject(&state.draft.subject) {
                return;
            }

            log::debug!("interactive suggestion {suggested:?}");
            state.draft.subject = suggested.clone();
            subject_tx.send_replace(suggested);
        });
    }

    /// Explicit save through `backend`. Pending suggestions are dropped; the
    /// save-time fallback computes its own against the session corpus.
    pub fn save(&self, backend: &dyn AppBackend) -> anyhow::Result<Note, AppError> {
        self.debouncer.cancel();

        let draft = self.draft();
        let note = save_draft(backend, draft, &self.corpus)?;

        let mut state = self.state.lock().unwrap();
        state.draft = NoteDraft {
            id: Some(note.id.clone()),
            title: note.title.clone(),
            body: note.body.clone(),
            subject: note.subject.clone(),
        };
        state.revision += 1;
        drop(state);

        self.subject_tx.send_replace(note.subject.clone());

        Ok(note)
    }
}
