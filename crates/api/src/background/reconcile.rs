//! Periodic reconciliation of campaign counter caches.
//!
//! `campaigns.opened_count` / `clicked_count` are bumped by the
//! tracking endpoints for cheap dashboard reads, but the recipient rows
//! and the click log are the source of truth. This task replays them on
//! a fixed interval so any drift (crashed handler between writes,
//! forged tracking requests) is bounded.

use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use palco_db::repositories::CampaignRepo;

/// How often the reconciliation runs by default.
const DEFAULT_INTERVAL_SECS: u64 = 3600; // 1 hour

/// Run the counter reconciliation loop until `cancel` is triggered.
pub async fn run(pool: PgPool, cancel: CancellationToken) {
    let interval_secs: u64 = std::env::var("RECONCILE_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INTERVAL_SECS);

    tracing::info!(interval_secs, "Counter reconciliation job started");

    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Counter reconciliation job stopping");
                break;
            }
            _ = interval.tick() => {
                match CampaignRepo::reconcile_counters(&pool).await {
                    Ok(corrected) => {
                        if corrected > 0 {
                            tracing::info!(corrected, "Counter reconciliation: corrected drifted campaigns");
                        } else {
                            tracing::debug!("Counter reconciliation: no drift");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Counter reconciliation failed");
                    }
                }
            }
        }
    }
}
