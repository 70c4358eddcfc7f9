use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_path: PathBuf,
    pub public_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub frontend_url: String,
    pub simulate_latency: bool,
    pub simulate_errors: bool,
    pub avatar_max_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            data_path: PathBuf::from("server/db.json"),
            public_dir: PathBuf::from("public"),
            uploads_dir: PathBuf::from("public/uploads"),
            jwt_secret: "kpidash-dev-secret-change-me".to_string(),
            jwt_expiry_secs: 60 * 60 * 24 * 7,
            frontend_url: "http://localhost:3000".to_string(),
            simulate_latency: false,
            simulate_errors: false,
            avatar_max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let public_dir = env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.public_dir);
        let uploads_dir = env::var("UPLOADS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| public_dir.join("uploads"));

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            data_path: env::var("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            public_dir,
            uploads_dir,
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                tracing::warn!("JWT_SECRET not set, using development secret");
                defaults.jwt_secret
            }),
            jwt_expiry_secs: parse_var("JWT_EXPIRY_SECS", defaults.jwt_expiry_secs),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
            simulate_latency: parse_flag("SIMULATE_LATENCY"),
            simulate_errors: parse_flag("SIMULATE_ERRORS"),
            avatar_max_bytes: parse_var("AVATAR_MAX_BYTES", defaults.avatar_max_bytes),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}
