//! Message listing for one recipient address.

use crate::{app::AppState, db, http::error::ApiError, models::email::email_summary::EmailSummary};
use axum::{
  Json,
  extract::{Path as AxumPath, State},
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
pub struct EmailResponse {
  pub success: bool,
  pub data: Vec<EmailSummary>,
}

/// List messages addressed to one recipient, newest first. The address must
/// contain exactly one `@` and its domain must be allow-listed; both are
/// checked before the store is consulted.
pub async fn get_email(
  State(state): State<AppState>,
  AxumPath(email): AxumPath<String>,
) -> Result<Json<EmailResponse>, ApiError> {
  let domain = match email.split_once('@') {
    Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
      domain
    }
    _ => {
      warn!("invalid email address in request");
      return Err(ApiError::Validation("Invalid email address"));
    }
  };
  if !state.config.domains.iter().any(|d| d == domain) {
    warn!("address domain not in allowed domains: {domain}");
    return Err(ApiError::Validation(
      "Email address does not belong to allowed domains",
    ));
  }

  let rows = db::get_inboxes_for_address(&state.db, &email)
    .await
    .map_err(|e| {
      error!("error getting emails for {email}: {e}");
      ApiError::Storage(e)
    })?;
  if rows.is_empty() {
    return Err(ApiError::NotFound("No emails found for address"));
  }
  Ok(Json(EmailResponse {
    success: true,
    data: rows,
  }))
}
