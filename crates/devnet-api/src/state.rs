//! Application state

use devnet_auth::JwtManager;
use devnet_db::Database;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
}

impl AppState {
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Self {
        Self { db, jwt }
    }
}
