use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use super::{app::create_app, math_and_science, note};
use crate::{
    app::backend::AppBackend,
    debounce::Debouncer,
    notes::{NoteCreate, NoteQuery},
    session::EditSession,
    suggest::DEFAULT_SUBJECT,
};

const QUIET: Duration = Duration::from_millis(500);

async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
}

// --- debouncer ---

#[tokio::test(start_paused = true)]
async fn only_last_job_runs() {
    let debouncer = Debouncer::new(QUIET);
    let ran = Arc::new(Mutex::new(vec![]));

    for i in 0..3 {
        let ran = ran.clone();
        debouncer.schedule(move || ran.lock().unwrap().push(i));
        wait(200).await;
    }

    assert!(ran.lock().unwrap().is_empty());
    assert!(debouncer.is_pending());

    wait(400).await;

    assert_eq!(*ran.lock().unwrap(), vec![2]);
    assert!(!debouncer.is_pending());
}

#[tokio::test(start_paused = true)]
async fn job_waits_for_full_quiet_period() {
    let debouncer = Debouncer::new(QUIET);
    let count = Arc::new(AtomicUsize::new(0));

    let counter = count.clone();
    debouncer.schedule(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    wait(499).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    wait(2).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_pending_job() {
    let debouncer = Debouncer::new(QUIET);
    let count = Arc::new(AtomicUsize::new(0));

    let counter = count.clone();
    debouncer.schedule(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    debouncer.cancel();

    wait(1000).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(!debouncer.is_pending());
}

// --- edit session ---

#[tokio::test(start_paused = true)]
async fn suggestion_lands_after_quiet_period() {
    let session = EditSession::new(None, math_and_science(), QUIET);
    let mut subjects = session.subscribe();

    session.set_title("Derivative practice");
    wait(200).await;
    session.append_body("limits and rules");

    wait(400).await;
    assert_eq!(session.subject(), DEFAULT_SUBJECT);
    assert!(session.is_suggestion_pending());

    wait(200).await;
    assert_eq!(session.subject(), "Math");
    assert!(subjects.has_changed().unwrap());
    assert_eq!(*subjects.borrow_and_update(), "Math");
}

#[tokio::test(start_paused = true)]
async fn blank_text_schedules_nothing() {
    let session = EditSession::new(None, math_and_science(), QUIET);

    session.set_title("   ");
    assert!(!session.is_suggestion_pending());

    wait(1000).await;
    assert_eq!(session.subject(), DEFAULT_SUBJECT);
}

#[tokio::test(start_paused = true)]
async fn explicit_subject_is_never_overwritten() {
    let session = EditSession::new(None, math_and_science(), QUIET);

    session.set_title("Derivative practice");
    session.select_subject("Science");
    assert!(!session.is_suggestion_pending());

    session.append_body("limits and rules");
    wait(1000).await;
    assert_eq!(session.subject(), "Science");
}

#[tokio::test(start_paused = true)]
async fn choosing_default_subject_resumes_suggestions() {
    let session = EditSession::new(None, math_and_science(), QUIET);

    session.set_title("Derivative practice");
    session.select_subject("Science");
    session.select_subject(DEFAULT_SUBJECT);

    wait(600).await;
    assert_eq!(session.subject(), "Math");
}

#[tokio::test(start_paused = true)]
async fn categorized_note_is_left_alone() {
    let existing = note("9", "Essay", "", "History");
    let mut corpus = math_and_science();
    corpus.push(existing.clone());

    let session = EditSession::new(Some(&existing), corpus, QUIET);
    session.set_body("derivative limits");

    wait(1000).await;
    assert_eq!(session.subject(), "History");
}

#[tokio::test(start_paused = true)]
async fn edited_note_does_not_vote_for_itself() {
    let existing = note("9", "Calculus limits", "", DEFAULT_SUBJECT);
    let corpus = vec![note("1", "Calculus limits", "", "Math"), existing.clone()];

    let session = EditSession::new(Some(&existing), vec![existing.clone()], QUIET);
    session.append_body("more limits");
    wait(1000).await;
    assert_eq!(session.subject(), DEFAULT_SUBJECT);

    let session = EditSession::new(Some(&existing), corpus, QUIET);
    session.append_body("more limits");
    wait(1000).await;
    assert_eq!(session.subject(), "Math");
}

#[tokio::test(start_paused = true)]
async fn save_before_quiet_period_uses_fallback() {
    let (app, _tmp) = create_app();
    for note in math_and_science() {
        app.create(NoteCreate {
            title: note.title,
            body: Some(note.body),
            subject: Some(note.subject),
        })
        .unwrap();
    }
    let corpus = app.search(NoteQuery::all()).unwrap();

    let session = EditSession::new(None, corpus, QUIET);
    let mut subjects = session.subscribe();

    session.set_title("Derivative practice");
    session.set_body("limits and rules");
    assert!(session.is_suggestion_pending());

    let saved = session.save(&app).unwrap();

    assert_eq!(saved.subject, "Math");
    assert!(!session.is_suggestion_pending());
    assert_eq!(session.id(), Some(saved.id.clone()));
    assert_eq!(*subjects.borrow_and_update(), "Math");
    assert_eq!(app.get(&saved.id).unwrap().subject, "Math");

    // the cancelled suggestion never fires afterwards
    wait(1000).await;
    assert_eq!(session.subject(), "Math");
}

#[tokio::test(start_paused = true)]
async fn save_without_title_fails() {
    let (app, _tmp) = create_app();

    let session = EditSession::new(None, math_and_science(), QUIET);
    session.set_body("limits");

    assert!(session.save(&app).is_err());
    assert!(session.id().is_none());
    assert!(app.search(NoteQuery::all()).unwrap().is_empty());
}
