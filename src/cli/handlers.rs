use crate::{
    app::{AppService, NoteDraft},
    cli::{SortArg, SubjectArgs},
    config::Config,
    eid::Eid,
    notes::{Note, NoteQuery, SortBy},
    session::EditSession,
    suggest::DEFAULT_SUBJECT,
};
use anyhow::{bail, Result};
use inquire::error::InquireResult;
use serde::Serialize;
use tokio::io::AsyncBufReadExt;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Asks for confirmation unless `yes` is set.
fn confirm(message: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    match inquire::prompt_confirmation(message) {
        InquireResult::Ok(answer) => Ok(answer),
        InquireResult::Err(err) => bail!("An error occurred: {}", err),
    }
}

pub fn handle_list(
    sort: Option<SortArg>,
    subject: Option<String>,
    search: Option<String>,
    app: &AppService,
) -> Result<()> {
    let query = NoteQuery {
        id: None,
        subject,
        search,
        sort_by: sort.map(|sort| match sort {
            SortArg::Date => SortBy::Date,
            SortArg::Subject => SortBy::Subject,
        }),
    };

    let result = app.search_notes(query)?;
    print_json(&result.notes)?;

    if let Some(subject) = result.likely_subject {
        eprintln!("likely subject: {subject}");
    }

    Ok(())
}

pub fn handle_show(id: String, app: &AppService) -> Result<()> {
    let note = app.get_note(&Eid::from(id))?;
    print_json(&note)
}

pub fn handle_add(
    title: String,
    body: Option<String>,
    subject: Option<String>,
    app: &AppService,
) -> Result<()> {
    let draft = NoteDraft {
        id: None,
        title,
        body: body.unwrap_or_default(),
        subject: subject.unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
    };

    let note = app.save_note(draft)?;
    print_json(&note)
}

pub fn handle_edit(
    id: String,
    title: Option<String>,
    body: Option<String>,
    subject: Option<String>,
    app: &AppService,
) -> Result<()> {
    let note = app.get_note(&Eid::from(id))?;

    let draft = NoteDraft {
        id: Some(note.id),
        title: title.unwrap_or(note.title),
        body: body.unwrap_or(note.body),
        subject: subject.unwrap_or(note.subject),
    };

    let note = app.save_note(draft)?;
    print_json(&note)
}

pub fn handle_delete(id: String, yes: bool, app: &AppService) -> Result<()> {
    let id = Eid::from(id);

    if !confirm("Are you sure you want to delete this note?", yes)? {
        return Ok(());
    }

    app.delete_note(&id)?;
    println!("Note deleted");
    Ok(())
}

pub fn handle_suggest(
    title: String,
    body: String,
    id: Option<String>,
    app: &AppService,
) -> Result<()> {
    let id = id.map(Eid::from);
    let subject = app.suggest_subject(&title, &body, id.as_ref())?;
    println!("{subject}");
    Ok(())
}

pub fn handle_recategorize(yes: bool, app: &AppService) -> Result<()> {
    if !confirm(
        &format!("This will check and update all '{DEFAULT_SUBJECT}' notes. Continue?"),
        yes,
    )? {
        return Ok(());
    }

    let report = app.recategorize_all()?;

    if report.scanned == 0 {
        println!("No uncategorized notes found.");
        return Ok(());
    }

    println!(
        "Updated {} note(s) with suggested subjects.",
        report.updated
    );
    if report.failed > 0 {
        eprintln!("{} note(s) could not be updated", report.failed);
    }

    Ok(())
}

pub fn handle_subject(action: SubjectArgs, app: &AppService) -> Result<()> {
    match action {
        SubjectArgs::List {} => print_json(&app.subjects()?),
        SubjectArgs::Add { name } => print_json(&app.create_subject(&name)?),
        SubjectArgs::Delete { id } => {
            app.delete_subject(&Eid::from(id))?;
            println!("Subject deleted");
            Ok(())
        }
    }
}

/// Rejects a session that could never be saved, before any input is read.
pub fn check_compose_title(existing: Option<&Note>, title: Option<&str>) -> Result<()> {
    match (existing, title) {
        (_, Some(title)) if title.trim().is_empty() => bail!("--title must not be blank"),
        (None, None) => bail!("a new note needs a title, pass --title"),
        _ => Ok(()),
    }
}

/// Interactive session: every stdin line is appended to the body, suggestions
/// are printed as they land and end of input saves the note.
pub fn handle_compose(
    title: Option<String>,
    id: Option<String>,
    app: AppService,
    config: &Config,
) -> Result<()> {
    let existing = id.map(|id| app.get_note(&Eid::from(id))).transpose()?;
    check_compose_title(existing.as_ref(), title.as_deref())?;

    let corpus = app.all_notes()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async move {
            let session = EditSession::new(existing.as_ref(), corpus, config.suggest_quiet_period());
            if let Some(title) = title {
                session.set_title(&title);
            }

            let mut subjects = session.subscribe();
            let watcher = tokio::spawn(async move {
                while subjects.changed().await.is_ok() {
                    let subject = subjects.borrow_and_update().clone();
                    eprintln!("subject: {subject}");
                }
            });

            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                session.append_body(&line);
            }

            let note = tokio::task::block_in_place(|| session.save(app.backend()))?;

            // closing the channel lets the watcher print the saved subject and stop
            drop(session);
            let _ = watcher.await;

            print_json(&note)
        })
}
