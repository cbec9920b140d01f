use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::app::create_service;
use crate::{
    config::Config,
    web::{router, SharedState},
};

fn app() -> (Router, tempfile::TempDir) {
    let (service, tmp) = create_service();
    (
        router(SharedState::new(service), &Config::default()),
        tmp,
    )
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

async fn seed(app: &Router) {
    for (name, content, subject) in [
        ("Calculus limits", "derivative rules", "Math"),
        ("Cell biology", "mitosis phases", "Science"),
    ] {
        let (status, _) = send(
            app,
            Method::POST,
            "/api/notes",
            Some(json!({"name": name, "content": content, "subject": subject})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn note_crud() {
    let (app, _tmp) = app();

    let (status, note) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(json!({"title": "Limits", "body": "epsilon delta"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(note["subject"], "Uncategorized");
    let id = note["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, Method::GET, &format!("/api/notes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Limits");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{id}"),
        Some(json!({"subject": "Math"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["subject"], "Math");
    assert_eq!(updated["body"], "epsilon delta");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/notes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Note deleted"}));

    let (status, body) = send(&app, Method::GET, &format!("/api/notes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Note not found"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_without_title_is_rejected() {
    let (app, _tmp) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(json!({"content": "no title"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Note title is required"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn update_with_blank_title_is_rejected() {
    let (app, _tmp) = app();

    let (_, note) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(json!({"title": "Real title"})),
    )
    .await;
    let id = note["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{id}"),
        Some(json!({"title": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Note title is required"}));

    let (_, stored) = send(&app, Method::GET, &format!("/api/notes/{id}"), None).await;
    assert_eq!(stored["title"], "Real title");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/notes/{id}"),
        Some(json!({"name": "  Renamed  "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Renamed");
}

#[tokio::test(flavor = "multi_thread")]
async fn list_filters_and_sorts() {
    let (app, _tmp) = app();
    seed(&app).await;

    let (status, notes) = send(&app, Method::GET, "/api/notes?sortBy=subject", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes.as_array().unwrap().len(), 2);
    assert_eq!(notes[0]["subject"], "Math");

    let (_, notes) = send(&app, Method::GET, "/api/notes?subject=Science", None).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);
    assert_eq!(notes[0]["title"], "Cell biology");

    let (_, notes) = send(&app, Method::GET, "/api/notes?search=MITOSIS&subject=all", None).await;
    assert_eq!(notes.as_array().unwrap().len(), 1);

    let (_, notes) = send(&app, Method::GET, "/api/notes?sortBy=nonsense", None).await;
    assert_eq!(notes[0]["title"], "Calculus limits");
}

#[tokio::test(flavor = "multi_thread")]
async fn suggest_endpoint() {
    let (app, _tmp) = app();
    seed(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notes/suggest",
        Some(json!({"title": "Derivative practice", "body": "limits and rules"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"subject": "Math"}));

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/notes/suggest",
        Some(json!({})),
    )
    .await;
    assert_eq!(body, json!({"subject": "Uncategorized"}));
}

#[tokio::test(flavor = "multi_thread")]
async fn recategorize_endpoint() {
    let (app, _tmp) = app();
    seed(&app).await;

    let (_, note) = send(
        &app,
        Method::POST,
        "/api/notes",
        Some(json!({"title": "Mitosis quiz"})),
    )
    .await;

    let (status, report) = send(&app, Method::POST, "/api/notes/recategorize", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report, json!({"scanned": 1, "updated": 1, "failed": 0}));

    let id = note["id"].as_str().unwrap();
    let (_, note) = send(&app, Method::GET, &format!("/api/notes/{id}"), None).await;
    assert_eq!(note["subject"], "Science");
}

#[tokio::test(flavor = "multi_thread")]
async fn subjects() {
    let (app, _tmp) = app();

    for name in ["Science", "Math"] {
        let (status, _) = send(&app, Method::POST, "/api/subjects", Some(json!({"name": name}))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::POST, "/api/subjects", Some(json!({"name": "Math"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Subject already exists"}));

    let (status, _) = send(&app, Method::POST, "/api/subjects", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, subjects) = send(&app, Method::GET, "/api/subjects", None).await;
    let names = subjects
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["Math", "Science"]);

    let id = subjects[0]["id"].as_str().unwrap();
    let (status, body) = send(&app, Method::DELETE, &format!("/api/subjects/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Subject deleted"}));

    let (status, _) = send(&app, Method::DELETE, &format!("/api/subjects/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
