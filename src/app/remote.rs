use anyhow::anyhow;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::{
    eid::Eid,
    notes::{Note, NoteCreate, NoteQuery, NoteUpdate},
    subjects::Subject,
};

use super::{backend::*, errors::AppError};

/// Backend talking to a running daemon's REST API.
pub struct AppRemote {
    remote_addr: String,
    client: reqwest::blocking::Client,
}

impl AppRemote {
    pub fn new(addr: &str) -> AppRemote {
        let remote_addr = addr.strip_suffix("/").unwrap_or(addr).to_string();

        AppRemote {
            remote_addr,
            client: reqwest::blocking::Client::new(),
        }
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::blocking::RequestBuilder {
        log::debug!("{method} {}{}", self.remote_addr, url);
        self.client
            .request(method, format!("{}{}", self.remote_addr, url))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum WebResponse<T> {
    Error { error: String },
    Data(T),
}

/// `what` names the resource in `NotFound` errors.
fn handle_response<T>(
    response: reqwest::blocking::Response,
    what: &'static str,
) -> anyhow::Result<T, AppError>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let text = response.text()?;

    if status == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(what));
    }

    let web_response = serde_json::from_str::<WebResponse<T>>(&text).map_err(|err| {
        log::error!("{err}. tried to parse: {text:?}");
        anyhow!(err)
    })?;

    match web_response {
        WebResponse::Data(data) if status.is_success() => Ok(data),
        WebResponse::Data(_) => Err(AppError::Other(anyhow!("unexpected status {status}"))),
        WebResponse::Error { error } if status == StatusCode::BAD_REQUEST => {
            Err(AppError::Invalid(error))
        }
        WebResponse::Error { error } => Err(AppError::Other(anyhow!(error))),
    }
}

impl AppBackend for AppRemote {
    fn search(&self, query: NoteQuery) -> anyhow::Result<Vec<Note>, AppError> {
        if let Some(id) = &query.id {
            return match self.get(id) {
                Ok(note) => Ok(vec![note]),
                Err(AppError::NotFound(_)) => Ok(vec![]),
                Err(err) => Err(err),
            };
        }

        let mut params = vec![];
        if let Some(sort_by) = query.sort_by {
            params.push(("sortBy", sort_by.as_str().to_string()));
        }
        if let Some(subject) = query.subject {
            params.push(("subject", subject));
        }
        if let Some(search) = query.search {
            params.push(("search", search));
        }

        let resp = self
            .request(reqwest::Method::GET, "/api/notes")
            .query(&params)
            .send()?;

        handle_response(resp, "Note")
    }

    fn get(&self, id: &Eid) -> anyhow::Result<Note, AppError> {
        let resp = self
            .request(reqwest::Method::GET, &format!("/api/notes/{id}"))
            .send()?;

        handle_response(resp, "Note")
    }

    fn create(&self, note_create: NoteCreate) -> anyhow::Result<Note, AppError> {
        let resp = self
            .request(reqwest::Method::POST, "/api/notes")
            .json(&note_create)
            .send()?;

        handle_response(resp, "Note")
    }

    fn update(&self, id: &Eid, note_update: NoteUpdate) -> anyhow::Result<Note, AppError> {
        let resp = self
            .request(reqwest::Method::PUT, &format!("/api/notes/{id}"))
            .json(&note_update)
            .send()?;

        handle_response(resp, "Note")
    }

    fn delete(&self, id: &Eid) -> anyhow::Result<(), AppError> {
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/api/notes/{id}"))
            .send()?;

        handle_response::<serde_json::Value>(resp, "Note").map(|_| ())
    }

    fn subjects(&self) -> anyhow::Result<Vec<Subject>, AppError> {
        let resp = self.request(reqwest::Method::GET, "/api/subjects").send()?;

        handle_response(resp, "Subject")
    }

    fn create_subject(&self, name: &str) -> anyhow::Result<Subject, AppError> {
        let resp = self
            .request(reqwest::Method::POST, "/api/subjects")
            .json(&json!({ "name": name }))
            .send()?;

        handle_response(resp, "Subject")
    }

    fn delete_subject(&self, id: &Eid) -> anyhow::Result<(), AppError> {
        let resp = self
            .request(reqwest::Method::DELETE, &format!("/api/subjects/{id}"))
            .send()?;

        handle_response::<serde_json::Value>(resp, "Subject").map(|_| ())
    }
}
