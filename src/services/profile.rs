//! Profile listing and self-service profile updates, including avatar storage.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use base64::Engine;
use chrono::Utc;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};
use regex::Regex;
use validator::Validate;

use crate::db::{Dataset, Store};
use crate::errors::AppError;
use crate::models::user::{Profile, ProfileResponse, Role, UpdateProfile};

/// Avatars wider than this are scaled down.
const AVATAR_MAX_WIDTH: u32 = 1024;

const AVATAR_JPEG_QUALITY: u8 = 80;

const ALLOWED_AVATAR_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Uploaded avatar file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct AvatarUpload {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where and how avatars are written.
#[derive(Debug, Clone)]
pub struct AvatarStorage {
    pub uploads_dir: PathBuf,
    pub max_bytes: usize,
}

/// List profiles, optionally restricted to one role (matched case-insensitively).
pub fn list(dataset: &Dataset, role: Option<&str>) -> Result<Vec<ProfileResponse>, AppError> {
    let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => match Role::parse(raw) {
            Some(role) => Some(role),
            // Unknown roles match nothing rather than everything.
            None => return Ok(Vec::new()),
        },
        None => None,
    };

    Ok(dataset
        .profiles
        .iter()
        .filter(|p| role.map_or(true, |r| p.role == r))
        .cloned()
        .map(ProfileResponse::from)
        .collect())
}

/// Escape HTML-significant characters, drop control characters and trim.
pub fn sanitize_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.trim().chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn data_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^data:(image/\w+);base64,(.+)$").expect("data URL pattern is valid")
    })
}

/// Resize to at most [`AVATAR_MAX_WIDTH`] wide (never enlarging) and re-encode as JPEG.
pub fn process_avatar(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let img = if img.width() > AVATAR_MAX_WIDTH {
        img.resize(AVATAR_MAX_WIDTH, u32::MAX, FilterType::Lanczos3)
    } else {
        img
    };

    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Cursor::new(Vec::new());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, AVATAR_JPEG_QUALITY))?;
    Ok(out.into_inner())
}

/// `image/png` → `png`, falling back to `default`.
fn extension_for(mime: &str, default: &str) -> String {
    mime.split('/')
        .nth(1)
        .filter(|ext| !ext.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Write avatar bytes as `{user}-avatar-{millis}.{ext}` and return the public URL.
async fn save_avatar(
    uploads_dir: &Path,
    user_id: &str,
    ext: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    tokio::fs::create_dir_all(uploads_dir).await?;
    let filename = format!("{user_id}-avatar-{}.{ext}", Utc::now().timestamp_millis());
    tokio::fs::write(uploads_dir.join(&filename), bytes).await?;
    tracing::info!(user_id = %user_id, file = %filename, size = bytes.len(), "Avatar saved");
    Ok(format!("/uploads/{filename}"))
}

/// Validate, size-check and store an uploaded avatar file.
async fn store_uploaded_avatar(
    storage: &AvatarStorage,
    user_id: &str,
    upload: AvatarUpload,
) -> Result<Option<String>, AppError> {
    if upload.bytes.len() > storage.max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Avatar too large (max {}MB)",
            storage.max_bytes / (1024 * 1024)
        )));
    }
    if !ALLOWED_AVATAR_TYPES.contains(&upload.content_type.as_str()) {
        return Err(AppError::UnsupportedMedia(format!(
            "Unsupported image type: {}",
            upload.content_type
        )));
    }

    let original = upload.bytes;
    let processed = tokio::task::spawn_blocking({
        let bytes = original.clone();
        move || process_avatar(&bytes)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Avatar task failed: {e}")))?;

    let (bytes, ext) = match processed {
        Ok(jpeg) => (jpeg, "jpg".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Avatar processing failed, keeping original bytes");
            (original, extension_for(&upload.content_type, "jpg"))
        }
    };

    match save_avatar(&storage.uploads_dir, user_id, &ext, &bytes).await {
        Ok(url) => Ok(Some(url)),
        Err(e) => {
            tracing::error!(error = %e, "Avatar save failed");
            Ok(None)
        }
    }
}

/// Resolve a string avatar: data URLs are decoded to a file, anything else is kept as-is.
async fn store_text_avatar(
    storage: &AvatarStorage,
    user_id: &str,
    avatar: &str,
) -> Option<String> {
    let Some(caps) = data_url_regex().captures(avatar) else {
        return Some(avatar.to_string());
    };

    let ext = extension_for(&caps[1], "png");
    let bytes = match base64::engine::general_purpose::STANDARD.decode(&caps[2]) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Avatar data URL decode failed");
            return None;
        }
    };

    match save_avatar(&storage.uploads_dir, user_id, &ext, &bytes).await {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::error!(error = %e, "Avatar data URL save failed");
            None
        }
    }
}

/// Apply a self-service profile update for `user_id`.
pub async fn update(
    store: &Store,
    storage: &AvatarStorage,
    user_id: &str,
    fields: UpdateProfile,
    file: Option<AvatarUpload>,
) -> Result<Profile, AppError> {
    fields.validate()?;

    if store.snapshot().await.find_profile(user_id).is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let avatar = match (file, fields.avatar.as_deref()) {
        (Some(upload), _) => store_uploaded_avatar(storage, user_id, upload).await?,
        (None, Some(text)) if !text.is_empty() => store_text_avatar(storage, user_id, text).await,
        _ => None,
    };

    let name = fields
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(sanitize_string);
    let contact_number = fields
        .contact_number
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(sanitize_string);

    let updated = store
        .update_profile(user_id, |profile| {
            if let Some(avatar) = avatar {
                profile.avatar = Some(avatar);
            }
            if let Some(name) = name {
                profile.name = name;
            }
            if let Some(contact_number) = contact_number {
                profile.contact_number = Some(contact_number);
            }
        })
        .await?;

    tracing::info!(user_id = %user_id, "Profile updated");
    Ok(updated)
}
