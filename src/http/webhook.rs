//! Webhook ingestion: the MTA pushes each inbound message here as raw MIME.

use crate::{
  app::AppState,
  db::{self, IngestEmail},
  http::error::ApiError,
  util::{parse_address_list, parse_envelope},
};
use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
pub struct WebhookResponse {
  pub success: bool,
  pub data: i64,
}

/// Authenticate the push, decode the payload, and fan it out into one inbox
/// per recipient. Responds with the generated email id.
pub async fn receive_webhook(
  State(state): State<AppState>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
  authenticate(&headers, state.config.secret)?;

  let envelope = parse_envelope(&body).map_err(|e| {
    error!("error parsing email: {e}");
    ApiError::from(e)
  })?;

  let from_addresses = parse_address_list(&envelope.from);
  let to_addresses = parse_address_list(&envelope.to);
  if to_addresses.is_empty() {
    warn!("message has no resolvable recipients, storing without inboxes");
  }

  let email = IngestEmail {
    subject: envelope.subject,
    text_body: envelope.text_body,
    html_body: envelope.html_body,
    from_addresses,
    to_addresses,
  };
  let email_id = db::ingest_email(&state.db, &email, state.config.retention)
    .await
    .map_err(|e| {
      error!("error inserting email: {e}");
      ApiError::Storage(e)
    })?;

  info!(
    "stored email {} for {} recipient(s)",
    email_id,
    email.to_addresses.len()
  );
  Ok(Json(WebhookResponse {
    success: true,
    data: email_id,
  }))
}

/// The `Secret` header must parse as an integer equal to the configured
/// secret; anything else is rejected before the body is touched.
fn authenticate(headers: &HeaderMap, secret: i64) -> Result<(), ApiError> {
  let presented = headers
    .get("Secret")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.trim().parse::<i64>().ok());
  if presented != Some(secret) {
    warn!("webhook rejected: bad or missing secret");
    return Err(ApiError::Unauthorized);
  }
  Ok(())
}
