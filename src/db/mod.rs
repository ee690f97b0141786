//! Database helpers: connection setup, migrations, and store operations.

use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::email::email_summary::EmailSummary;
use crate::models::inbox::db_inbox::DbInbox;

/// Open a connection pool with the pragmas the store relies on: enforced
/// foreign keys, WAL journaling, and NORMAL fsync durability.
pub async fn connect(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(opts)
        .await
}

/// Run SQLite migrations to create tables if absent. Safe on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS emails (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            subject TEXT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS email_addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email_id INTEGER NOT NULL REFERENCES emails(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            address TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS inboxes (
            id TEXT PRIMARY KEY,
            email_id INTEGER NOT NULL REFERENCES emails(id) ON DELETE CASCADE,
            address TEXT NOT NULL,
            text_content TEXT NOT NULL,
            html_content TEXT NOT NULL,
            subject TEXT NULL,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            from_address TEXT NULL,
            to_address TEXT NOT NULL
        )"#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_inboxes_address ON inboxes(address)")
        .execute(pool)
        .await?;
    Ok(())
}

/// Ensure SQLite file and parent folder exist for a given sqlx URL.
pub fn ensure_sqlite_path(db_url: &str) -> String {
    if !db_url.starts_with("sqlite:") {
        return db_url.to_string();
    }
    let path_part = db_url.trim_start_matches("sqlite://");
    if path_part == ":memory:" {
        return db_url.to_string();
    }
    let (path_only, _) = match path_part.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_part, None),
    };
    if !path_only.is_empty() {
        let p = Path::new(path_only);
        if let Some(parent) = p.parent() {
            if !parent.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(parent);
            }
        }
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(p);
    }
    db_url.to_string()
}

/// Role of an extracted address relative to its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    From,
    To,
}

impl AddressKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressKind::From => "from",
            AddressKind::To => "to",
        }
    }
}

/// Everything extracted from one accepted payload.
#[derive(Debug)]
pub struct IngestEmail {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub from_addresses: Vec<String>,
    pub to_addresses: Vec<String>,
}

/// Write one email and its fan-out as a single transaction: the email row,
/// one address row per extracted from/to address, and one inbox row per
/// recipient. Returns the generated email id. On failure nothing persists.
pub async fn ingest_email(
    pool: &SqlitePool,
    email: &IngestEmail,
    retention: Duration,
) -> Result<i64, sqlx::Error> {
    let created_at = Utc::now();
    let expires_at = created_at + retention;

    let mut tx = pool.begin().await?;

    let email_id =
        sqlx::query("INSERT INTO emails (subject, created_at, expires_at) VALUES (?, ?, ?)")
            .bind(&email.subject)
            .bind(created_at)
            .bind(expires_at)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

    let groups = [
        (AddressKind::From, &email.from_addresses),
        (AddressKind::To, &email.to_addresses),
    ];
    for (kind, addresses) in groups {
        for address in addresses.iter() {
            sqlx::query("INSERT INTO email_addresses (email_id, kind, address) VALUES (?, ?, ?)")
                .bind(email_id)
                .bind(kind.as_str())
                .bind(address)
                .execute(&mut *tx)
                .await?;
        }
    }

    let from_address = email.from_addresses.first().map(|a| a.as_str());
    for to_address in &email.to_addresses {
        sqlx::query(
            "INSERT INTO inboxes (id, email_id, address, text_content, html_content, subject, created_at, expires_at, from_address, to_address) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4())
        .bind(email_id)
        .bind(to_address)
        .bind(&email.text_body)
        .bind(&email.html_body)
        .bind(&email.subject)
        .bind(created_at)
        .bind(expires_at)
        .bind(from_address)
        .bind(to_address)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(email_id)
}

/// Fetch one inbox row by id.
pub async fn get_inbox_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<DbInbox>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, email_id, address, text_content, html_content, subject, created_at, expires_at, from_address, to_address FROM inboxes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// List summaries for a recipient address, newest first. The match is exact
/// and case-sensitive; no body content comes back.
pub async fn get_inboxes_for_address(
    pool: &SqlitePool,
    address: &str,
) -> Result<Vec<EmailSummary>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, subject, created_at, expires_at, from_address, to_address FROM inboxes WHERE address = ? ORDER BY created_at DESC",
    )
    .bind(address)
    .fetch_all(pool)
    .await
}

/// Delete a single inbox row. Returns the number of rows removed.
pub async fn delete_inbox(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM inboxes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Remove every email at or past its expiration; the schema's cascades take
/// the dependent address and inbox rows in the same statement. Returns the
/// number of emails removed. The current time is bound from chrono so the
/// comparison uses the same text encoding the writes do.
pub async fn sweep_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM emails WHERE expires_at <= ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
