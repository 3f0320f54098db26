use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::services::maintenance_service;

/// Runs the expiry cleanup every `period` until the runtime shuts down.
///
/// The first tick fires immediately, so a freshly started server also sweeps whatever
/// expired while it was down. A failed sweep is logged and retried on the next tick.
pub fn spawn_expiry_sweeper(db: Arc<DatabaseConnection>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(period_secs = period.as_secs(), "expiry sweeper started");
        loop {
            timer.tick().await;
            if let Err(e) = maintenance_service::cleanup_expired(&db, Utc::now()).await {
                tracing::warn!(error = %e, "expiry sweep failed");
            }
        }
    })
}
