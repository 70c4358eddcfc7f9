//! Dashboard data routes: KPI stats and the chart collections.
//!
//! These return bare JSON arrays (not the envelope) so existing chart clients
//! can consume them unchanged.

use axum::{
    extract::{Query, State},
    http::header::CACHE_CONTROL,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::middleware::auth::CurrentUser;
use crate::models::dashboard::DashboardFilters;
use crate::services::{dashboard as dashboard_service, stats as stats_service};
use crate::AppState;

/// Results are computed per request and must not be cached.
fn uncached<T: Serialize>(items: Vec<T>) -> impl IntoResponse {
    ([(CACHE_CONTROL, "no-store")], Json(items))
}

/// GET /api/stats: KPI snapshots, optionally for one period and recomputed per user segment.
pub async fn stats(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<DashboardFilters>,
) -> impl IntoResponse {
    let dataset = state.store.snapshot().await;
    let result = stats_service::list(&dataset, &filters);
    tracing::debug!(period = ?filters.period, user_type = ?filters.user_type, found = result.len(), "Stats served");
    uncached(result)
}

/// GET /api/revenue: revenue series filtered by period and userType.
pub async fn revenue(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<DashboardFilters>,
) -> impl IntoResponse {
    let dataset = state.store.snapshot().await;
    uncached(dashboard_service::list_revenue(&dataset, &filters))
}

/// GET /api/orders: order series filtered by period and userType.
pub async fn orders(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<DashboardFilters>,
) -> impl IntoResponse {
    let dataset = state.store.snapshot().await;
    uncached(dashboard_service::list_orders(&dataset, &filters))
}

/// GET /api/users: user distribution filtered by period.
pub async fn users(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<DashboardFilters>,
) -> impl IntoResponse {
    let dataset = state.store.snapshot().await;
    uncached(dashboard_service::list_users(&dataset, &filters))
}

/// GET /api/traffic: traffic sources filtered by period.
pub async fn traffic(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(filters): Query<DashboardFilters>,
) -> impl IntoResponse {
    let dataset = state.store.snapshot().await;
    uncached(dashboard_service::list_traffic(&dataset, &filters))
}
