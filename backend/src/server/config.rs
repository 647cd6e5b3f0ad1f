//! Application settings and the HTTP server configuration built from them.

use std::net::SocketAddr;

use chrono::FixedOffset;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use tutorhub::domain::DEFAULT_RETENTION_DAYS;
use tutorhub::inbound::ws::state::AllowedOrigins;
use tutorhub::outbound::persistence::{DbPool, PoolConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Indian Standard Time, the centre's local offset.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_WS_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Settings loaded from `TUTORHUB_*` environment variables, configuration
/// files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TUTORHUB")]
pub struct AppSettings {
    /// PostgreSQL connection string. Without it the server runs on fixtures.
    pub database_url: Option<String>,
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Offset from UTC, in minutes, used to derive month labels.
    pub utc_offset_minutes: Option<i32>,
    /// Days before a notification becomes eligible for purging.
    pub notification_retention_days: Option<u32>,
    pub pool_max_size: Option<u32>,
    /// Comma-separated origins allowed to open `/ws`.
    pub ws_allowed_origins: Option<String>,
}

/// A setting that is present but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr { value: String, message: String },
    #[error("UTC offset of {minutes} minutes is out of range")]
    UtcOffset { minutes: i32 },
    #[error("invalid WebSocket origins: {}", invalid.join(", "))]
    Origins { invalid: Vec<String> },
}

impl From<SettingsError> for std::io::Error {
    fn from(value: SettingsError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, value)
    }
}

impl AppSettings {
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::UtcOffset`] for offsets beyond a day.
    pub fn utc_offset(&self) -> Result<FixedOffset, SettingsError> {
        let minutes = self
            .utc_offset_minutes
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::UtcOffset { minutes })
    }

    pub fn notification_retention_days(&self) -> u32 {
        self.notification_retention_days
            .unwrap_or(DEFAULT_RETENTION_DAYS)
    }

    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url).with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
        })
    }

    /// # Errors
    ///
    /// Returns [`SettingsError::Origins`] listing every entry that is not an
    /// absolute URL.
    pub fn allowed_origins(&self) -> Result<AllowedOrigins, SettingsError> {
        let raw = self
            .ws_allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_WS_ALLOWED_ORIGINS);
        AllowedOrigins::parse(raw.split(',').filter(|entry| !entry.trim().is_empty()))
            .map_err(|invalid| SettingsError::Origins { invalid })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) utc_offset: FixedOffset,
    pub(crate) retention_days: u32,
    pub(crate) allowed_origins: AllowedOrigins,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from validated settings.
    ///
    /// # Errors
    ///
    /// Propagates the first invalid setting.
    pub fn from_settings(settings: &AppSettings) -> Result<Self, SettingsError> {
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            utc_offset: settings.utc_offset()?,
            retention_days: settings.notification_retention_days(),
            allowed_origins: settings.allowed_origins()?,
            db_pool: None,
        })
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without one, every port is served by its fixture implementation.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
