//! Authentication service: password hashing, JWT signing, cookies and login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::Dataset;
use crate::errors::AppError;
use crate::models::user::{Profile, Role};

/// Name of the cookie carrying the access token.
pub const COOKIE_NAME: &str = "access_token";

/// JWT claims embedded in the access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Whether a stored password is already an argon2 PHC string.
pub fn is_password_hash(stored: &str) -> bool {
    stored.starts_with("$argon2")
}

/// Sign an access token for a profile.
pub fn sign_token(profile: &Profile, jwt_secret: &str, expiry_secs: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: profile.id.clone(),
        name: profile.name.clone(),
        email: profile.email.clone(),
        role: profile.role,
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}

/// Validate a JWT and return the claims.
pub fn verify_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

/// Set-Cookie value for a fresh session.
pub fn session_cookie(token: &str, max_age_secs: i64) -> String {
    format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; Max-Age={max_age_secs}; SameSite=Lax")
}

/// Set-Cookie value that expires the session on logout.
pub fn clear_cookie() -> String {
    session_cookie("", 0)
}

/// Authenticate a profile by email and password.
pub fn login(dataset: &Dataset, email: &str, password: &str) -> Result<Profile, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let profile = dataset
        .profiles
        .iter()
        .find(|p| p.email == email)
        .ok_or_else(invalid)?;

    if !verify_password(password, &profile.password)? {
        tracing::info!(email = %email, "Login rejected: bad password");
        return Err(invalid());
    }

    Ok(profile.clone())
}
