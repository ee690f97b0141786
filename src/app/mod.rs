//! Application setup and runtime.

use crate::{db, http, sweep};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Runtime configuration, read once at startup and shared read-only.
pub struct Config {
  /// Numeric shared secret the MTA presents in the `Secret` header.
  pub secret: i64,
  /// Recipient domains the read API serves.
  pub domains: Vec<String>,
  /// How long ingested messages are kept before the sweeper takes them.
  pub retention: chrono::Duration,
  /// Delay between expiration sweeps.
  pub sweep_period: Duration,
}

impl Config {
  /// Read configuration from `VAPORMAIL_*` environment variables.
  pub fn from_env() -> Result<Config, Box<dyn std::error::Error + Send + Sync>> {
    let secret = std::env::var("VAPORMAIL_SECRET")
      .map_err(|_| "VAPORMAIL_SECRET is not set")?
      .trim()
      .parse::<i64>()
      .map_err(|_| "VAPORMAIL_SECRET must be an integer")?;

    let domains: Vec<String> = std::env::var("VAPORMAIL_DOMAINS")
      .map_err(|_| "VAPORMAIL_DOMAINS is not set")?
      .split(',')
      .map(|d| d.trim().to_string())
      .filter(|d| !d.is_empty())
      .collect();
    if domains.is_empty() {
      return Err("VAPORMAIL_DOMAINS must list at least one domain".into());
    }

    let retention_hours: i64 = match std::env::var("VAPORMAIL_RETENTION_HOURS") {
      Ok(v) => v
        .parse()
        .map_err(|_| "VAPORMAIL_RETENTION_HOURS must be an integer")?,
      Err(_) => 72,
    };
    let sweep_minutes: u64 = match std::env::var("VAPORMAIL_SWEEP_MINUTES") {
      Ok(v) => v
        .parse()
        .map_err(|_| "VAPORMAIL_SWEEP_MINUTES must be an integer")?,
      Err(_) => 120,
    };

    Ok(Config {
      secret,
      domains,
      retention: chrono::Duration::hours(retention_hours),
      sweep_period: Duration::from_secs(sweep_minutes * 60),
    })
  }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
  pub db: SqlitePool,
  pub config: Arc<Config>,
}

/// Start the HTTP server and the expiration sweeper with configured environment.
pub async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  crate::util::init_tracing();

  let config = Arc::new(Config::from_env()?);

  let db_url =
    std::env::var("VAPORMAIL_DATABASE").unwrap_or_else(|_| "sqlite://vapormail.db".to_string());
  let db_url = db::ensure_sqlite_path(&db_url);
  let pool = db::connect(&db_url).await?;
  db::run_migrations(&pool).await?;

  let state = AppState {
    db: pool.clone(),
    config: config.clone(),
  };

  let app = http::build_router(state.clone());

  let addr: SocketAddr = std::env::var("VAPORMAIL_ADDR")
    .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
    .parse()?;

  info!("webhook endpoint:  POST http://{}/webhook", addr);
  info!("inbox endpoint:    GET http://{}/api/inbox/:inboxid", addr);
  info!(
    "retention {}h, sweep every {:?}",
    config.retention.num_hours(),
    config.sweep_period
  );

  // Start the sweeper in the background; it stops between ticks on shutdown
  let (shutdown_tx, shutdown_rx) = watch::channel(false);
  let sweeper = tokio::spawn(sweep::start_sweeper(
    state.clone(),
    config.sweep_period,
    shutdown_rx,
  ));

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  let _ = shutdown_tx.send(true);
  let _ = sweeper.await;
  Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    let _ = tokio::signal::ctrl_c().await;
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(_) => std::future::pending::<()>().await,
    }
  };
  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {}
    _ = terminate => {}
  }
}
