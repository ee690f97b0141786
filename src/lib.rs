//! vapormail library entrypoint.
//!
//! Modules:
//! - `app`: startup, configuration, shared state
//! - `http`: Axum router and handlers
//! - `sweep`: periodic removal of expired messages
//! - `db`: migrations and SQLite store operations
//! - `models`: typed records used across layers
//! - `util`: MIME envelope and address-list parsing

pub mod app;
pub mod db;
pub mod http;
pub mod models;
pub mod sweep;
pub mod util;
