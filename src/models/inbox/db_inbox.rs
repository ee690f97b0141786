//! Database row for an inbox.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct DbInbox {
    pub id: Uuid,
    pub email_id: i64,
    pub address: String,
    pub text_content: String,
    pub html_content: String,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub from_address: Option<String>,
    pub to_address: String,
}
