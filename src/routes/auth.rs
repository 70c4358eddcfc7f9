//! Authentication routes: login, logout, current user.

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::auth::CurrentUser;
use crate::models::user::UserInfo;
use crate::services::{access as access_service, auth as auth_service};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub redirect: Option<String>,
}

/// Login response body: the user plus where the client should navigate next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserInfo,
    pub redirect_to: String,
}

/// POST /api/auth/login: verify credentials and set the session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    body.validate()?;

    let dataset = state.store.snapshot().await;
    let profile = auth_service::login(&dataset, &body.email, &body.password)?;
    let token = auth_service::sign_token(
        &profile,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )?;

    tracing::info!(user_id = %profile.id, role = %profile.role, "Login successful");

    let response = LoginResponse {
        user: UserInfo::from(&profile),
        redirect_to: access_service::login_redirect(body.redirect.as_deref(), profile.role),
    };

    Ok((
        AppendHeaders([(
            SET_COOKIE,
            auth_service::session_cookie(&token, state.config.jwt_expiry_secs),
        )]),
        ApiResponse::with_message(response, "Login successful"),
    ))
}

/// POST /api/auth/logout: expire the session cookie.
pub async fn logout() -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, auth_service::clear_cookie())]),
        ApiResponse::with_message((), "Logged out successfully"),
    )
}

/// GET /api/auth/me: current user profile
pub async fn me(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<ApiResponse<UserInfo>>, AppError> {
    let dataset = state.store.snapshot().await;
    let profile = dataset
        .find_profile(&current_user.id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(ApiResponse::success(UserInfo::from(profile)))
}
