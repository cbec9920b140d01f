use crate::eid::Eid;
use anyhow::{anyhow, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    sync::{Arc, RwLock},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Eid,
    pub name: String,
    pub created: DateTime<Utc>,
}

pub trait SubjectManager: Send + Sync {
    /// All subjects ordered by name.
    fn list(&self) -> anyhow::Result<Vec<Subject>>;
    /// Returns `None` when a subject with this name already exists.
    fn create(&self, name: &str) -> anyhow::Result<Option<Subject>>;
    fn delete(&self, id: &Eid) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct SubjectsCsv {
    list: Arc<RwLock<Vec<Subject>>>,
    path: String,
}

const CSV_HEADERS: [&str; 3] = ["id", "name", "created"];

impl SubjectsCsv {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if let Err(err) = std::fs::metadata(path) {
            match err.kind() {
                ErrorKind::NotFound => {
                    log::info!("Creating new subjects database at {path}");
                    let mut csv_wrt = csv::Writer::from_path(path)?;
                    csv_wrt.write_record(CSV_HEADERS)?;
                    csv_wrt.flush()?;
                }
                _ => Err(err)?,
            }
        }

        let mut csv_reader = csv::Reader::from_path(path)?;
        let mut subjects = vec![];
        for record in csv_reader.records() {
            let record = record?;
            let id = record.get(0).ok_or(anyhow!("couldnt get record id"))?;
            let name = record.get(1).ok_or(anyhow!("couldnt get record name"))?;
            let created = record
                .get(2)
                .ok_or(anyhow!("couldnt get record created"))?;

            subjects.push(Subject {
                id: Eid::from(id),
                name: name.to_string(),
                created: DateTime::parse_from_rfc3339(created)
                    .context("malformed created timestamp")?
                    .with_timezone(&Utc),
            });
        }

        Ok(SubjectsCsv {
            list: Arc::new(RwLock::new(subjects)),
            path: path.to_string(),
        })
    }

    fn save(&self, subjects: &[Subject]) -> anyhow::Result<()> {
        let temp_path = format!("{}-tmp", &self.path);
        let mut csv_wrt = csv::Writer::from_path(&temp_path)?;
        csv_wrt.write_record(CSV_HEADERS)?;
        for subject in subjects {
            csv_wrt.write_record([
                subject.id.as_str(),
                subject.name.as_str(),
                subject.created.to_rfc3339().as_str(),
            ])?;
        }
        csv_wrt.flush()?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl SubjectManager for SubjectsCsv {
    fn list(&self) -> anyhow::Result<Vec<Subject>> {
        let mut subjects = self.list.read().unwrap().clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    fn create(&self, name: &str) -> anyhow::Result<Option<Subject>> {
        let mut subjects = self.list.write().unwrap();
        if subjects.iter().any(|s| s.name == name) {
            return Ok(None);
        }

        let subject = Subject {
            id: Eid::new(),
            name: name.to_string(),
            created: Utc::now(),
        };

        subjects.push(subject.clone());
        self.save(&subjects)?;

        Ok(Some(subject))
    }

    fn delete(&self, id: &Eid) -> anyhow::Result<bool> {
        let mut subjects = self.list.write().unwrap();
        let Some(idx) = subjects.iter().position(|s| &s.id == id) else {
            return Ok(false);
        };

        subjects.remove(idx);
        self.save(&subjects)?;

        Ok(true)
    }
}
