use std::sync::Arc;

use palco_mailer::SmtpCampaignSender;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: palco_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Campaign sender; `None` when SMTP is not configured, in which
    /// case send requests are rejected.
    pub sender: Option<Arc<SmtpCampaignSender>>,
}
