//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USERS_API_*` environment variables and
//! configuration files, in the precedence `ortho_config` applies. A `.env`
//! file, when present, seeds the environment first without overriding
//! variables that are already set.

use std::ffi::OsString;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::observability::logging::{LogFormat, LoggingConfig, LoggingError};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SERVICE_NAME: &str = "users-api";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Errors raised while loading or interpreting [`AppSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The configuration layers could not be merged.
    #[error("failed to load configuration: {0}")]
    Load(String),
    /// `host` is not an IP address.
    #[error("invalid host `{0}`")]
    Host(String),
    /// A `.env` file exists but could not be read or parsed.
    #[error("failed to load environment file: {0}")]
    EnvFile(String),
    /// The logging options are invalid.
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Result of looking for a `.env` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    /// Variables were loaded from this path.
    Loaded(PathBuf),
    /// No file was found; the environment is untouched.
    Missing,
}

fn env_file_outcome(result: dotenvy::Result<Option<PathBuf>>) -> Result<EnvFile, SettingsError> {
    match result {
        Ok(Some(path)) => Ok(EnvFile::Loaded(path)),
        Ok(None) => Ok(EnvFile::Missing),
        Err(err) if err.not_found() => Ok(EnvFile::Missing),
        Err(err) => Err(SettingsError::EnvFile(err.to_string())),
    }
}

/// Load `.env` from the working directory or its ancestors.
pub fn load_env_file() -> Result<EnvFile, SettingsError> {
    env_file_outcome(dotenvy::dotenv().map(Some))
}

/// Load a specific environment file.
pub fn load_env_file_from(path: &Path) -> Result<EnvFile, SettingsError> {
    env_file_outcome(dotenvy::from_path(path).map(|()| Some(path.to_path_buf())))
}

/// Runtime settings for the users service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS_API")]
pub struct AppSettings {
    /// Interface to bind. Defaults to all interfaces.
    pub host: Option<String>,
    #[ortho_config(default = 3000)]
    pub port: u16,
    /// PostgreSQL URL. Without it the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub database_connect_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving. Read through
    /// [`AppSettings::run_migrations`].
    pub run_migrations: Option<bool>,
    pub log_level: Option<String>,
    /// `json` or `pretty`.
    pub log_format: Option<String>,
    /// Also write JSON logs to this file.
    pub log_file: Option<PathBuf>,
    pub service_name: Option<String>,
}

impl AppSettings {
    /// Load settings from the process arguments and environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::load().map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Load settings from an explicit argument list.
    pub fn from_args<I>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::load_from_iter(args).map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Socket address the HTTP server binds to.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = match self.host.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_HOST,
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| SettingsError::Host(raw.to_owned()))?,
        };
        Ok(SocketAddr::new(host, self.port))
    }

    /// Whether embedded migrations run at startup. Off unless enabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(false)
    }

    /// Service name used for logs and metrics.
    pub fn service_name(&self) -> &str {
        self.service_name
            .as_deref()
            .unwrap_or(DEFAULT_SERVICE_NAME)
    }

    /// Logging options with defaults applied.
    pub fn logging_config(&self) -> Result<LoggingConfig, SettingsError> {
        let format = match self.log_format.as_deref() {
            Some(raw) => raw.parse::<LogFormat>()?,
            None => LogFormat::default(),
        };
        Ok(LoggingConfig {
            level: self
                .log_level
                .clone()
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            format,
            file: self.log_file.clone(),
        })
    }

    /// Pool options, or `None` when no database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref().map(str::trim)?;
        if url.is_empty() {
            return None;
        }
        let timeout = self
            .database_connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        Some(
            PoolConfig::new(url)
                .with_max_size(
                    self.database_max_connections
                        .unwrap_or(DEFAULT_MAX_CONNECTIONS),
                )
                .with_connect_timeout(Duration::from_secs(timeout)),
        )
    }
}
