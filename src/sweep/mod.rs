//! Periodic expiration sweep.
//!
//! One background task deletes every email at or past its expiration on a
//! fixed period; the schema's cascades take the dependent address and inbox
//! rows in the same statement. A failed tick is logged and the next one runs
//! as scheduled.

use crate::{app::AppState, db};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

/// Run the sweep loop until the shutdown signal flips. The loop only stops
/// between ticks; an in-flight DELETE finishes as one atomic statement.
pub async fn start_sweeper(state: AppState, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first interval tick completes immediately; consume it so the
    // first sweep happens one full period after startup
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match db::sweep_expired(&state.db).await {
                    Ok(0) => {}
                    Ok(n) => info!("sweeper removed {n} expired email(s)"),
                    Err(e) => error!("sweep tick failed: {e}"),
                }
            }
            _ = shutdown.changed() => {
                info!("sweeper stopped");
                return;
            }
        }
    }
}
