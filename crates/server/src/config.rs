//! Blog server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::token::TokenKeys;
use crate::auth::AuthManager;
use crate::posts::PostManager;

/// Secret used when `JWT_SECRET` is not set
pub const DEFAULT_JWT_SECRET: &str = "secretKey";

/// Longest token lifetime accepted from the environment
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Configuration for the blog server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// Secret used to sign and verify JWTs
    pub jwt_secret: String,
    /// Directory that uploaded images are written to and served from
    pub uploads_dir: PathBuf,
    /// Token lifetime in days
    pub token_ttl_days: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Max upload size in MB
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5555,
            database_url: "sqlite://blog.sqlite".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            uploads_dir: PathBuf::from("uploads"),
            token_ttl_days: 30,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            max_upload_mb: 10,
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.uploads_dir),
            token_ttl_days: lookup("TOKEN_TTL_DAYS")
                .and_then(|s| s.parse().ok())
                .filter(|days| (1..=MAX_TOKEN_TTL_DAYS).contains(days))
                .unwrap_or(defaults.token_ttl_days),
            bcrypt_cost: lookup("BCRYPT_COST")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.bcrypt_cost),
            max_upload_mb: lookup("MAX_UPLOAD_MB")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_mb),
        }
    }

    /// Create config rooted at a base directory (database and uploads inside it)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base = base_dir.into();
        Self {
            database_url: format!(
                "sqlite://{}",
                base.join("blog.sqlite").to_string_lossy().replace('\\', "/")
            ),
            uploads_dir: base.join("uploads"),
            ..Self::default()
        }
    }

    /// True when tokens would be signed with the publicly known default secret
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }

    /// Ensure all directories exist
    pub async fn ensure_dirs(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        Ok(())
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub keys: Arc<TokenKeys>,
    pub auth: Arc<AuthManager>,
    pub posts: Arc<PostManager>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.port, 5555);
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.token_ttl_days, 30);
    }

    #[test]
    fn test_env_overrides_and_bad_numbers() {
        let env: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("JWT_SECRET", "s3cret"),
            ("BCRYPT_COST", "not-a-number"),
            ("UPLOADS_DIR", "/tmp/blog-uploads"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
        assert_eq!(config.uploads_dir, PathBuf::from("/tmp/blog-uploads"));
    }

    #[test]
    fn test_out_of_range_ttl_falls_back_to_default() {
        for raw in ["100000000", "0", "-5", "3651"] {
            let config = ServerConfig::from_lookup(|key| {
                (key == "TOKEN_TTL_DAYS").then(|| raw.to_string())
            });
            assert_eq!(config.token_ttl_days, 30, "TOKEN_TTL_DAYS={raw}");
        }

        let config =
            ServerConfig::from_lookup(|key| (key == "TOKEN_TTL_DAYS").then(|| "3650".to_string()));
        assert_eq!(config.token_ttl_days, MAX_TOKEN_TTL_DAYS);
    }

    #[test]
    fn test_default_secret_is_detected() {
        assert!(ServerConfig::from_lookup(|_| None).uses_default_secret());

        let config =
            ServerConfig::from_lookup(|key| (key == "JWT_SECRET").then(|| "s3cret".to_string()));
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn test_with_base_dir() {
        let config = ServerConfig::with_base_dir("/data");
        assert_eq!(config.database_url, "sqlite:///data/blog.sqlite");
        assert_eq!(config.uploads_dir, PathBuf::from("/data/uploads"));
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
    }
}
