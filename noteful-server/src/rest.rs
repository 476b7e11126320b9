use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::trace::TraceLayer;

use noteful_core::{Identified, ListParams, NameInput, NoteInput, NotefulError, Outcome};

use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route(
            "/api/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/folders", get(list_folders).post(create_folder))
        .route(
            "/api/folders/:id",
            get(get_folder).put(update_folder).delete(delete_folder),
        )
        .route("/api/tags", get(list_tags).post(create_tag))
        .route(
            "/api/tags/:id",
            get(get_tag).put(update_tag).delete(delete_tag),
        )
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors and replies
// ---------------------------------------------------------------------------

/// Error side of every handler: a core error or a body that failed to parse.
#[derive(Debug)]
pub enum ApiError {
    Core(NotefulError),
    BadBody(String),
}

impl From<NotefulError> for ApiError {
    fn from(err: NotefulError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadBody(message) => (StatusCode::BAD_REQUEST, message),
            Self::Core(err) => {
                let status = StatusCode::from_u16(err.status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(error = %err, "request failed");
                }
                (status, err.user_message())
            }
        };
        message_response(status, message)
    }
}

type ApiResult = Result<Response, ApiError>;

fn message_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "message": message.into() }))).into_response()
}

fn not_found() -> Response {
    message_response(StatusCode::NOT_FOUND, "Not Found")
}

fn reply<T: Serialize>(outcome: Outcome<T>) -> Response {
    match outcome {
        Outcome::Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Outcome::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Outcome::NoContent => StatusCode::NO_CONTENT.into_response(),
        Outcome::NotFound => not_found(),
    }
}

/// Like [`reply`], adding `Location: <request path>/<id>` to a 201.
fn reply_created<T: Serialize + Identified>(outcome: Outcome<T>, uri: &Uri) -> Response {
    match outcome {
        Outcome::Created(body) => {
            let location = format!("{}/{}", uri.path().trim_end_matches('/'), body.id());
            (StatusCode::CREATED, [(header::LOCATION, location)], Json(body)).into_response()
        }
        other => reply(other),
    }
}

async fn fallback() -> Response {
    not_found()
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

async fn list_notes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    Ok(reply(state.notes.list(&params).await?))
}

async fn get_note(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    Ok(reply(state.notes.get(&id).await?))
}

async fn create_note(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    Ok(reply_created(state.notes.create(input).await?, &uri))
}

async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<NoteInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    Ok(reply(state.notes.update(&id, input).await?))
}

async fn delete_note(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    Ok(reply(state.notes.delete(&id).await?))
}

// ---------------------------------------------------------------------------
// Folders
// ---------------------------------------------------------------------------

async fn list_folders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    Ok(reply(state.folders.list(&params).await?))
}

async fn get_folder(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    Ok(reply(state.folders.get(&id).await?))
}

async fn create_folder(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    body: Result<Json<NameInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    Ok(reply_created(state.folders.create(input).await?, &uri))
}

async fn update_folder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<NameInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    Ok(reply(state.folders.update(&id, input).await?))
}

async fn delete_folder(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    Ok(reply(state.folders.delete(&id).await?))
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    Ok(reply(state.tags.list(&params).await?))
}

async fn get_tag(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    Ok(reply(state.tags.get(&id).await?))
}

async fn create_tag(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    body: Result<Json<NameInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    Ok(reply_created(state.tags.create(input).await?, &uri))
}

async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<NameInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = body?;
    Ok(reply(state.tags.update(&id, input).await?))
}

async fn delete_tag(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    Ok(reply(state.tags.delete(&id).await?))
}
