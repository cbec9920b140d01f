use crate::{
    app::{AppError, AppService, RecategorizeReport},
    config::Config,
    eid::Eid,
    notes::{Note, NoteCreate, NoteQuery, NoteUpdate, SortBy},
    subjects::Subject,
};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};

#[derive(Clone)]
pub struct SharedState {
    app: Arc<AppService>,
}

impl SharedState {
    pub fn new(app: AppService) -> Self {
        Self { app: Arc::new(app) }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => log::error!("failed to install signal handler: {err}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("ignoring allowed origin {origin:?}: {err}");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn router(state: SharedState, config: &Config) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/suggest", post(suggest_subject))
        .route("/api/notes/recategorize", post(recategorize))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/subjects", get(list_subjects).post(create_subject))
        .route("/api/subjects/:id", axum::routing::delete(delete_subject))
        .layer(cors_layer(config))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(Arc::new(state))
}

async fn start_app(app: AppService, config: Config) -> anyhow::Result<()> {
    let router = router(SharedState::new(app), &config);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    log::info!("listening on {}", config.listen_addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(app: AppService, config: Config) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { start_app(app, config).await })
}

#[derive(Debug)]
struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Invalid(_) | AppError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AppError::Reqwest(_) | AppError::Other(_) => {
                log::error!("{self:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

type HandlerResult<T> = Result<T, HttpError>;

async fn index() -> Json<serde_json::Value> {
    Json(json!({"message": "classnotes API"}))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListNotesParams {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub subject: Option<String>,
    pub search: Option<String>,
}

async fn list_notes(
    State(state): State<Arc<SharedState>>,
    Query(params): Query<ListNotesParams>,
) -> HandlerResult<Json<Vec<Note>>> {
    log::debug!("params: {params:?}");

    let query = NoteQuery {
        id: None,
        subject: params.subject,
        search: params.search,
        sort_by: params.sort_by.as_deref().and_then(SortBy::parse),
    };

    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<Vec<Note>>> {
        Ok(Json(app.list_notes(query)?))
    })
}

async fn get_note(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<Eid>,
) -> HandlerResult<Json<Note>> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<Note>> {
        Ok(Json(app.get_note(&id)?))
    })
}

async fn create_note(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<NoteCreate>,
) -> HandlerResult<(StatusCode, Json<Note>)> {
    log::debug!("payload: {payload:?}");

    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<(StatusCode, Json<Note>)> {
        let note = app.backend().create(payload)?;
        Ok((StatusCode::CREATED, Json(note)))
    })
}

async fn update_note(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<Eid>,
    Json(payload): Json<NoteUpdate>,
) -> HandlerResult<Json<Note>> {
    log::debug!("payload: {payload:?}");

    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<Note>> {
        Ok(Json(app.backend().update(&id, payload)?))
    })
}

async fn delete_note(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<Eid>,
) -> HandlerResult<Json<serde_json::Value>> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<serde_json::Value>> {
        app.delete_note(&id)?;
        Ok(Json(json!({"message": "Note deleted"})))
    })
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SuggestRequest {
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default, alias = "content")]
    pub body: String,
    /// Id of the note being edited, so it does not vote for itself.
    #[serde(default)]
    pub id: Option<Eid>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SuggestResponse {
    pub subject: String,
}

async fn suggest_subject(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<SuggestRequest>,
) -> HandlerResult<Json<SuggestResponse>> {
    log::debug!("payload: {payload:?}");

    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<SuggestResponse>> {
        let subject = app.suggest_subject(&payload.title, &payload.body, payload.id.as_ref())?;
        Ok(Json(SuggestResponse { subject }))
    })
}

async fn recategorize(
    State(state): State<Arc<SharedState>>,
) -> HandlerResult<Json<RecategorizeReport>> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<RecategorizeReport>> {
        Ok(Json(app.recategorize_all()?))
    })
}

async fn list_subjects(
    State(state): State<Arc<SharedState>>,
) -> HandlerResult<Json<Vec<Subject>>> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<Vec<Subject>>> {
        Ok(Json(app.subjects()?))
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectCreateRequest {
    #[serde(default)]
    pub name: String,
}

async fn create_subject(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<SubjectCreateRequest>,
) -> HandlerResult<(StatusCode, Json<Subject>)> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<(StatusCode, Json<Subject>)> {
        let subject = app.create_subject(&payload.name)?;
        Ok((StatusCode::CREATED, Json(subject)))
    })
}

async fn delete_subject(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<Eid>,
) -> HandlerResult<Json<serde_json::Value>> {
    let app = state.app.clone();
    tokio::task::block_in_place(move || -> HandlerResult<Json<serde_json::Value>> {
        app.delete_subject(&id)?;
        Ok(Json(json!({"message": "Subject deleted"})))
    })
}
