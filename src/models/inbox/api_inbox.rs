//! API representation of an inbox.

use super::db_inbox::DbInbox;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInbox {
  pub id: Uuid,
  pub text_content: String,
  pub html_content: String,
  pub subject: Option<String>,
  pub expires_at: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  pub from_address: Option<String>,
  pub to_address: String,
}

impl From<DbInbox> for ApiInbox {
  fn from(d: DbInbox) -> Self {
    ApiInbox {
      id: d.id,
      text_content: d.text_content,
      html_content: d.html_content,
      subject: d.subject,
      expires_at: d.expires_at,
      created_at: d.created_at,
      from_address: d.from_address,
      to_address: d.to_address,
    }
  }
}
