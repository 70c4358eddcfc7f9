//! CSV export routes.

use axum::{
    extract::{Path, Query, State},
    http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
};

use crate::errors::AppError;
use crate::middleware::auth::CurrentUser;
use crate::models::dashboard::DashboardFilters;
use crate::services::export::{self as export_service, Report};
use crate::AppState;

/// GET /api/export/{report}: download a report as CSV.
pub async fn download(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(report): Path<String>,
    Query(filters): Query<DashboardFilters>,
) -> Result<impl IntoResponse, AppError> {
    let report: Report = report.parse()?;
    let dataset = state.store.snapshot().await;
    let csv = export_service::export(&dataset, report, current_user.role, &filters)?;

    tracing::info!(user_id = %current_user.id, file = %csv.filename, "CSV export");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv.filename),
            ),
            (CACHE_CONTROL, "no-store".to_string()),
        ],
        csv.body,
    ))
}
