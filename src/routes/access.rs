//! Page access routes: gate checks and role navigation for the UI shell.

use axum::{extract::Query, Json};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::{CurrentUser, MaybeUser};
use crate::models::navigation::{GateDecision, NavSection};
use crate::services::access as access_service;

#[derive(Debug, Deserialize)]
pub struct GateQuery {
    pub path: String,
}

/// GET /api/access/check?path=: decide whether a page may render or must redirect.
pub async fn check(
    MaybeUser(user): MaybeUser,
    Query(query): Query<GateQuery>,
) -> Result<Json<ApiResponse<GateDecision>>, AppError> {
    if !query.path.starts_with('/') {
        return Err(AppError::Validation("path must start with '/'".to_string()));
    }
    let decision = access_service::gate(&query.path, user.map(|u| u.role));
    Ok(ApiResponse::success(decision))
}

/// GET /api/access/navigation: sidebar sections for the caller's role.
pub async fn navigation(current_user: CurrentUser) -> Json<ApiResponse<Vec<NavSection>>> {
    ApiResponse::success(access_service::nav_items(current_user.role))
}
