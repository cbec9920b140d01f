use crate::{eid::Eid, suggest::DEFAULT_SUBJECT};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    sync::{Arc, RwLock},
    time::Instant,
};

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Eid,

    pub title: String,
    pub body: String,
    pub subject: String,

    pub created: DateTime<Utc>,
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoteCreate {
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, alias = "content", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoteUpdate {
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, alias = "content", skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Newest first.
    Date,
    /// Ascending subject name.
    Subject,
}

impl SortBy {
    /// Unknown orders fall back to store order, like an absent one.
    pub fn parse(value: &str) -> Option<SortBy> {
        match value {
            "date" => Some(SortBy::Date),
            "subject" => Some(SortBy::Subject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Date => "date",
            SortBy::Subject => "subject",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoteQuery {
    pub id: Option<Eid>,
    /// Exact subject; `"all"` disables the filter.
    pub subject: Option<String>,
    /// Case-insensitive pattern matched against title or body.
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
}

impl NoteQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &Eid) -> Self {
        Self {
            id: Some(id.clone()),
            ..Default::default()
        }
    }

    fn subject_filter(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .filter(|subject| !subject.is_empty() && *subject != "all")
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|search| !search.trim().is_empty())
    }
}

/// Builds the matcher for a search term. Terms that are not valid patterns
/// are matched literally.
pub fn search_matcher(term: &str) -> anyhow::Result<Regex> {
    let regex = RegexBuilder::new(term).case_insensitive(true).build();
    match regex {
        Ok(regex) => Ok(regex),
        Err(_) => RegexBuilder::new(&regex::escape(term))
            .case_insensitive(true)
            .build()
            .context("couldnt build search pattern"),
    }
}

pub trait NoteManager: Send + Sync {
    fn search(&self, query: NoteQuery) -> anyhow::Result<Vec<Note>>;
    fn create(&self, note: NoteCreate) -> anyhow::Result<Note>;
    fn update(&self, id: &Eid, update: NoteUpdate) -> anyhow::Result<Option<Note>>;
    fn delete(&self, id: &Eid) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct BackendCsv {
    list: Arc<RwLock<Vec<Note>>>,
    path: String,
}

const CSV_HEADERS: [&str; 5] = ["id", "title", "body", "subject", "created"];

impl BackendCsv {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if let Err(err) = std::fs::metadata(path) {
            match err.kind() {
                ErrorKind::NotFound => {
                    log::info!("Creating new notes database at {path}");
                    let mut csv_wrt = csv::Writer::from_path(path)?;
                    csv_wrt.write_record(CSV_HEADERS)?;
                    csv_wrt.flush()?;
                }
                _ => Err(err)?,
            }
        }

        let now = Instant::now();
        let mut csv_reader = csv::Reader::from_path(path)?;

        let mut notes = vec![];
        for record in csv_reader.records() {
            let record = record?;
            let field = |idx: usize, name: &str| {
                record
                    .get(idx)
                    .map(|value| value.to_string())
                    .ok_or_else(|| anyhow!("couldnt get record {name}"))
            };

            let created = DateTime::parse_from_rfc3339(&field(4, "created")?)
                .context("malformed created timestamp")?
                .with_timezone(&Utc);

            notes.push(Note {
                id: Eid::from(field(0, "id")?),
                title: field(1, "title")?,
                body: field(2, "body")?,
                subject: field(3, "subject")?,
                created,
            });
        }

        log::debug!(
            "took {}ms to read {} notes",
            now.elapsed().as_micros() as f64 / 1000.0,
            notes.len()
        );

        Ok(BackendCsv {
            list: Arc::new(RwLock::new(notes)),
            path: path.to_string(),
        })
    }

    fn save(&self, notes: &[Note]) -> anyhow::Result<()> {
        let temp_path = format!("{}-tmp", &self.path);
        let mut csv_wrt = csv::Writer::from_path(&temp_path)?;
        csv_wrt.write_record(CSV_HEADERS)?;
        for note in notes {
            csv_wrt.write_record([
                note.id.as_str(),
                note.title.as_str(),
                note.body.as_str(),
                note.subject.as_str(),
                note.created.to_rfc3339().as_str(),
            ])?;
        }
        csv_wrt.flush()?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl NoteManager for BackendCsv {
    fn create(&self, note_create: NoteCreate) -> anyhow::Result<Note> {
        let subject = note_create
            .subject
            .filter(|subject| !subject.is_empty())
            .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

        let note = Note {
            id: Eid::new(),
            title: note_create.title,
            body: note_create.body.unwrap_or_default(),
            subject,
            created: Utc::now(),
        };

        let mut notes = self.list.write().unwrap();
        notes.push(note.clone());
        self.save(&notes)?;

        Ok(note)
    }

    fn delete(&self, id: &Eid) -> anyhow::Result<bool> {
        let mut notes = self.list.write().unwrap();
        let Some(idx) = notes.iter().position(|n| &n.id == id) else {
            return Ok(false);
        };

        notes.remove(idx);
        self.save(&notes)?;

        Ok(true)
    }

    fn update(&self, id: &Eid, note_update: NoteUpdate) -> anyhow::Result<Option<Note>> {
        let mut notes = self.list.write().unwrap();

        let Some(note) = notes.iter_mut().find(|n| &n.id == id) else {
            return Ok(None);
        };

        if let Some(title) = note_update.title {
            note.title = title;
        }
        if let Some(body) = note_update.body {
            note.body = body;
        }
        if let Some(subject) = note_update.subject {
            note.subject = subject;
        }

        let result = note.clone();
        self.save(&notes)?;

        Ok(Some(result))
    }

    fn search(&self, query: NoteQuery) -> anyhow::Result<Vec<Note>> {
        let notes = self.list.read().unwrap();

        if let Some(id) = &query.id {
            return Ok(notes.iter().filter(|n| &n.id == id).cloned().collect());
        }

        let subject = query.subject_filter();
        let matcher = query.search_term().map(search_matcher).transpose()?;

        let mut output = notes
            .iter()
            .filter(|note| subject.map_or(true, |subject| note.subject == subject))
            .filter(|note| {
                matcher
                    .as_ref()
                    .map_or(true, |re| re.is_match(&note.title) || re.is_match(&note.body))
            })
            .cloned()
            .collect::<Vec<_>>();

        match query.sort_by {
            Some(SortBy::Date) => output.sort_by(|a, b| b.created.cmp(&a.created)),
            Some(SortBy::Subject) => output.sort_by(|a, b| a.subject.cmp(&b.subject)),
            None => {}
        }

        Ok(output)
    }
}

#[cfg(test)]
impl BackendCsv {
    pub fn list(&self) -> Arc<RwLock<Vec<Note>>> {
        self.list.clone()
    }
}
