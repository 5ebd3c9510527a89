//! Song CRUD handlers.
//!
//! Each handler translates one repository outcome into a status code and a
//! JSON body. Store failures never escape: they become a 500 with a generic
//! `{"error"}` body and the cause is logged.

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use songbook::{CreateOutcome, DeleteResult, RepositoryError, Song, SongDraft, UpdateResult};
use std::sync::Arc;

const INVALID_REQUEST: &str = "Invalid request format";

/// Response for `GET /song`
#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub songs: Vec<Song>,
}

/// Response for `POST /song`
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub inserted_id: String,
}

/// Response for `GET /count`
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// A non-integer id never matches a song route.
fn song_id(path: Result<Path<i64>, PathRejection>) -> ServerResult<i64> {
    path.map(|Path(id)| id).map_err(|_| ServerError::RouteNotFound)
}

fn song_draft(body: Result<Json<SongDraft>, JsonRejection>) -> ServerResult<SongDraft> {
    body.map(|Json(draft)| draft).map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected song body");
        ServerError::BadRequest(INVALID_REQUEST.to_string())
    })
}

/// Map repository failures, keeping validation apart from store errors.
fn repository_error(message: &'static str) -> impl FnOnce(RepositoryError) -> ServerError {
    move |err| match err {
        RepositoryError::Validation(reason) => {
            tracing::debug!(%reason, "song validation failed");
            ServerError::BadRequest(INVALID_REQUEST.to_string())
        }
        RepositoryError::Store(e) => ServerError::internal(message, e),
    }
}

/// `GET /count`
pub async fn count_songs(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let count = state
        .repository
        .count()
        .await
        .map_err(repository_error("Unable to fetch count"))?;

    Ok((StatusCode::OK, Json(CountResponse { count })).into_response())
}

/// `GET /song`
pub async fn list_songs(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let songs = state
        .repository
        .get_all()
        .await
        .map_err(repository_error("Unable to fetch songs"))?;

    Ok((StatusCode::OK, Json(SongListResponse { songs })).into_response())
}

/// `GET /song/{id}`
pub async fn get_song(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ServerResult<Response> {
    let id = song_id(path)?;
    let song = state
        .repository
        .get_by_id(id)
        .await
        .map_err(repository_error("Unable to fetch song"))?
        .ok_or_else(|| ServerError::NotFound(format!("Song with ID {id} not found")))?;

    Ok((StatusCode::OK, Json(song)).into_response())
}

/// `POST /song`
pub async fn create_song(
    State(state): State<Arc<ServerState>>,
    body: Result<Json<SongDraft>, JsonRejection>,
) -> ServerResult<Response> {
    let draft = song_draft(body)?;
    let outcome = state
        .repository
        .create(draft)
        .await
        .map_err(repository_error("Unable to create song"))?;

    match outcome {
        CreateOutcome::Created { inserted_id } => {
            tracing::info!(%inserted_id, "song created");
            Ok((StatusCode::CREATED, Json(CreatedResponse { inserted_id })).into_response())
        }
        CreateOutcome::Duplicate { id } => Err(ServerError::Duplicate(format!(
            "Song with id {id} already present"
        ))),
    }
}

/// `PUT /song/{id}`
pub async fn update_song(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SongDraft>, JsonRejection>,
) -> ServerResult<Response> {
    let id = song_id(path)?;
    let draft = song_draft(body)?;
    let outcome = state
        .repository
        .update(id, draft)
        .await
        .map_err(repository_error("Unable to update song"))?;

    match outcome {
        UpdateResult::Updated(song) => Ok((StatusCode::CREATED, Json(song)).into_response()),
        UpdateResult::Unchanged => Ok((
            StatusCode::OK,
            Json(json!({ "message": "song found, but nothing updated" })),
        )
            .into_response()),
        UpdateResult::NotFound => Err(ServerError::NotFound("Song not found".to_string())),
    }
}

/// `DELETE /song/{id}`
pub async fn delete_song(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<i64>, PathRejection>,
) -> ServerResult<Response> {
    let id = song_id(path)?;
    let outcome = state
        .repository
        .delete(id)
        .await
        .map_err(repository_error("Unable to delete song"))?;

    match outcome {
        DeleteResult::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteResult::NotFound => Err(ServerError::NotFound("song not found".to_string())),
    }
}
