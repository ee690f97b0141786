//! Listing entry for messages addressed to one recipient. No body content;
//! the full record comes from the inbox endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmailSummary {
    pub id: Uuid,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub from_address: Option<String>,
    pub to_address: String,
}
