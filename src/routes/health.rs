//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Collection sizes of the loaded dataset.
#[derive(Debug, Serialize)]
pub struct DatasetCounts {
    pub stats: usize,
    pub revenue: usize,
    pub orders: usize,
    pub users: usize,
    pub traffic: usize,
    pub profiles: usize,
}

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub dataset: DatasetCounts,
}

/// Liveness probe: always returns OK if the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: reports what the in-memory dataset holds.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let dataset = state.store.snapshot().await;
    let status = if dataset.stats.is_empty() {
        tracing::warn!("Dataset has no stats snapshots");
        "degraded"
    } else {
        "ok"
    };

    ApiResponse::success(HealthStatus {
        status: status.to_string(),
        dataset: DatasetCounts {
            stats: dataset.stats.len(),
            revenue: dataset.revenue.len(),
            orders: dataset.orders.len(),
            users: dataset.users.len(),
            traffic: dataset.traffic.len(),
            profiles: dataset.profiles.len(),
        },
    })
}
