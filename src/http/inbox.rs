//! Inbox lookup and deletion by inbox id.

use crate::{app::AppState, db, http::error::ApiError, models::inbox::api_inbox::ApiInbox};
use axum::{
  Json,
  extract::{Path as AxumPath, State},
};
use serde_json::{Value, json};
use tracing::error;
use uuid::Uuid;

/// Fetch the full denormalized inbox record, bodies included.
pub async fn get_inbox(
  State(state): State<AppState>,
  AxumPath(inbox_id): AxumPath<Uuid>,
) -> Result<Json<ApiInbox>, ApiError> {
  let row = db::get_inbox_by_id(&state.db, inbox_id).await.map_err(|e| {
    error!("error getting inbox {inbox_id}: {e}");
    ApiError::Storage(e)
  })?;
  match row {
    Some(inbox) => Ok(Json(ApiInbox::from(inbox))),
    None => Err(ApiError::NotFound(
      "Inbox does not exist or has been deleted",
    )),
  }
}

/// Delete one inbox row. The parent email, its address rows, and any sibling
/// recipients' inboxes stay until the sweeper takes them.
pub async fn delete_inbox(
  State(state): State<AppState>,
  AxumPath(inbox_id): AxumPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
  let row = db::get_inbox_by_id(&state.db, inbox_id).await.map_err(|e| {
    error!("error getting inbox {inbox_id}: {e}");
    ApiError::Storage(e)
  })?;
  if row.is_none() {
    return Err(ApiError::NotFound(
      "Inbox does not exist or has been deleted already",
    ));
  }

  db::delete_inbox(&state.db, inbox_id).await.map_err(|e| {
    error!("error deleting inbox {inbox_id}: {e}");
    ApiError::DeleteFailed
  })?;
  Ok(Json(json!({ "success": true })))
}
