//! Profile routes: admin listing and self-service updates.

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::header::CONTENT_TYPE,
    Json,
};
use serde::Deserialize;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::middleware::rbac::RequireAdmin;
use crate::models::user::{ProfileResponse, UpdateProfile};
use crate::services::profile::{self as profile_service, AvatarStorage, AvatarUpload};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileFilters {
    pub role: Option<String>,
}

/// GET /api/profiles: list profiles, optionally by role (admin only).
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filters): Query<ProfileFilters>,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    let dataset = state.store.snapshot().await;
    Ok(Json(profile_service::list(&dataset, filters.role.as_deref())?))
}

/// Collect text fields and an optional avatar file from a multipart form.
async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(UpdateProfile, Option<AvatarUpload>), AppError> {
    let mut fields = UpdateProfile::default();
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        let content_type = field.content_type().map(str::to_string);

        if name == "avatar" && is_file {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read avatar: {e}")))?;
            file = Some(AvatarUpload {
                content_type: content_type.unwrap_or_default(),
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read field {name}: {e}")))?;
        match name.as_str() {
            "name" => fields.name = Some(value),
            "contactNumber" => fields.contact_number = Some(value),
            "avatar" => fields.avatar = Some(value),
            _ => {}
        }
    }

    Ok((fields, file))
}

/// POST /api/profiles/update: update the caller's own profile (JSON or multipart).
pub async fn update(
    State(state): State<AppState>,
    current_user: CurrentUser,
    request: Request,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let (fields, file) = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        read_multipart(multipart).await?
    } else {
        let Json(fields) = Json::<UpdateProfile>::from_request(request, &state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        (fields, None)
    };

    let storage = AvatarStorage {
        uploads_dir: state.config.uploads_dir.clone(),
        max_bytes: state.config.avatar_max_bytes,
    };
    let profile =
        profile_service::update(&state.store, &storage, &current_user.id, fields, file).await?;

    Ok(ApiResponse::with_message(
        ProfileResponse::from(profile),
        "Profile updated",
    ))
}
