//! Worklist management endpoints.
//!
//! `GET /api/worklists` returns the listing as a bare JSON array so that
//! clients can bind it directly; create and delete wrap their result in a
//! `success` envelope.

use crate::store::StoreError;
use crate::types::NewWorklistItem;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use tracing::{error, instrument};

#[rustfmt::skip]
pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/worklists", get(list_worklists).post(create_worklist))
		.route("/worklists/{filename}", delete(delete_worklist))
}

#[instrument(skip_all)]
async fn list_worklists(State(state): State<AppState>) -> Result<Response, ApiError> {
	let entries = state.store.lock().await.list().await?;
	Ok(Json(entries).into_response())
}

#[instrument(skip_all)]
async fn create_worklist(
	State(state): State<AppState>,
	Json(item): Json<NewWorklistItem>,
) -> Result<Response, ApiError> {
	let filename = state.store.lock().await.create(item).await?;
	Ok((
		StatusCode::CREATED,
		Json(json!({
			"success": true,
			"filename": filename,
			"message": "Worklist item created successfully",
		})),
	)
		.into_response())
}

#[instrument(skip_all)]
async fn delete_worklist(
	State(state): State<AppState>,
	Path(filename): Path<String>,
) -> Result<Response, ApiError> {
	state.store.lock().await.delete(&filename).await?;
	Ok(Json(json!({ "success": true })).into_response())
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
	Json(json!({
		"status": "healthy",
		"timestamp": Utc::now().to_rfc3339(),
		"worklistDir": state.config.storage.worklist_dir,
		"port": state.config.http.port,
	}))
}

/// Maps store failures onto HTTP statuses: rejected input is the client's
/// fault, everything touching the filesystem or the self-check is ours.
struct ApiError(StoreError);

impl From<StoreError> for ApiError {
	fn from(err: StoreError) -> Self {
		Self(err)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = match &self.0 {
			StoreError::Encode(_)
			| StoreError::Validation(_)
			| StoreError::InvalidAccessionNumber(_) => StatusCode::BAD_REQUEST,
			StoreError::NotFound(_) => StatusCode::NOT_FOUND,
			StoreError::RoundTrip(_) | StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};
		if status.is_server_error() {
			error!("Worklist request failed: {}", self.0);
		}
		(status, Json(json!({ "error": self.0.to_string() }))).into_response()
	}
}
