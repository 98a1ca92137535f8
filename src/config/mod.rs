use anyhow::{Result, bail};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where the caller's lookup key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    /// Client IP (forwarding headers first, then the socket peer)
    ClientIp,
    /// Server-issued session cookie
    Cookie,
}

impl FromStr for IdentitySource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ip" | "client_ip" => Ok(Self::ClientIp),
            "cookie" | "session" => Ok(Self::Cookie),
            other => bail!("unknown identity source '{}'", other),
        }
    }
}

/// Runtime configuration for the lottery service
#[derive(Debug, Clone)]
pub struct LotteryConfig {
    /// Database connection string (default: local SQLite file)
    pub database_url: String,

    /// Lowest number in the draw pool (default: 1)
    pub pool_min: i32,

    /// Highest number in the draw pool (default: 40)
    pub pool_max: i32,

    /// Maximum picture size in bytes (default: 10 MB)
    pub max_file_size: usize,

    /// Directory for the filesystem mirror of uploaded pictures (default: "uploads")
    pub upload_dir: PathBuf,

    /// Write uploaded pictures to `upload_dir` as well as the database (default: true)
    pub mirror_uploads: bool,

    /// Caller identity source: "ip" or "cookie" (default: "ip")
    pub identity_source: IdentitySource,

    /// Session cookie name (default: "lottery_session")
    pub session_cookie_name: String,

    /// Session cookie lifetime in seconds (default: one day)
    pub session_max_age_secs: u64,

    /// Owning-user label stored with each upload (default: "SomeUser")
    pub uploader_label: String,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://lottery.db?mode=rwc".to_string(),
            pool_min: 1,
            pool_max: 40,
            max_file_size: 10 * 1024 * 1024, // 10 MB
            upload_dir: PathBuf::from("uploads"),
            mirror_uploads: true,
            identity_source: IdentitySource::ClientIp,
            session_cookie_name: "lottery_session".to_string(),
            session_max_age_secs: 86400,
            uploader_label: "SomeUser".to_string(),
        }
    }
}

impl LotteryConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            pool_min: env::var("DRAW_POOL_MIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.pool_min),

            pool_max: env::var("DRAW_POOL_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.pool_max),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            mirror_uploads: env::var("MIRROR_UPLOADS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.mirror_uploads),

            identity_source: env::var("IDENTITY_SOURCE")
                .ok()
                .and_then(|v| match v.parse() {
                    Ok(source) => Some(source),
                    Err(e) => {
                        tracing::warn!("Ignoring IDENTITY_SOURCE: {}", e);
                        None
                    }
                })
                .unwrap_or(default.identity_source),

            session_cookie_name: env::var("SESSION_COOKIE_NAME")
                .unwrap_or(default.session_cookie_name),

            session_max_age_secs: env::var("SESSION_MAX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.session_max_age_secs),

            uploader_label: env::var("UPLOADER_LABEL").unwrap_or(default.uploader_label),
        }
    }

    /// Create config for development (in-memory database, no filesystem mirror)
    pub fn development() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            mirror_uploads: false,
            ..Self::default()
        }
    }

    /// Create config for production (session cookies, mirror enabled)
    pub fn production() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| Self::default().database_url),
            identity_source: IdentitySource::Cookie,
            mirror_uploads: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_min > self.pool_max {
            bail!(
                "draw pool is empty: DRAW_POOL_MIN ({}) > DRAW_POOL_MAX ({})",
                self.pool_min,
                self.pool_max
            );
        }
        if self.max_file_size == 0 {
            bail!("MAX_FILE_SIZE must be greater than zero");
        }
        if self.session_cookie_name.is_empty()
            || self
                .session_cookie_name
                .contains(|c: char| c == '=' || c == ';' || c.is_whitespace())
        {
            bail!("invalid SESSION_COOKIE_NAME '{}'", self.session_cookie_name);
        }
        Ok(())
    }
}
