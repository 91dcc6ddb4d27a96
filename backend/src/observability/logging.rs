//! Process-wide tracing subscriber setup.
//!
//! Events fan out to every configured sink: stdout (JSON or pretty) and,
//! optionally, a JSON file. `RUST_LOG` overrides the configured level.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Stdout rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(LoggingError::Format(other.to_owned())),
        }
    }
}

/// Logging options resolved from settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `users_api=debug`.
    pub level: String,
    pub format: LogFormat,
    /// Extra JSON sink appended to this file.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Json,
            file: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("unsupported log format `{0}` (expected `json` or `pretty`)")]
    Format(String),
    #[error("invalid log filter `{directive}`: {message}")]
    Filter { directive: String, message: String },
    #[error("failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

type Sink = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Build the level filter. A non-empty `RUST_LOG` wins over `level`.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.to_owned());
    EnvFilter::try_new(&directive).map_err(|err| LoggingError::Filter {
        directive,
        message: err.to_string(),
    })
}

fn build_sinks(config: &LoggingConfig) -> Result<Vec<Sink>, LoggingError> {
    let mut sinks: Vec<Sink> = Vec::with_capacity(2);
    sinks.push(match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
    });
    if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LoggingError::File {
                path: path.display().to_string(),
                source,
            })?;
        sinks.push(
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(Mutex::new(file))
                .boxed(),
        );
    }
    Ok(sinks)
}

/// Install the global subscriber.
///
/// Fails if another subscriber is already installed; callers usually log
/// the failure and carry on with whatever is in place.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = build_filter(&config.level)?;
    let sinks = build_sinks(config)?;
    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .map_err(|err| LoggingError::Install(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case("pretty", LogFormat::Pretty)]
    #[case("text", LogFormat::Pretty)]
    fn log_format_parses(#[case] raw: &str, #[case] expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().expect("known format"), expected);
    }

    #[rstest]
    fn unknown_log_format_is_rejected() {
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LoggingError::Format(format)) if format == "xml"
        ));
    }

    #[rstest]
    fn configured_level_applies_without_rust_log() {
        let _guard = env_lock::lock_env([("RUST_LOG", None::<String>)]);
        let filter = build_filter("warn").expect("valid filter");
        assert_eq!(filter.to_string(), "warn");
    }

    #[rstest]
    fn rust_log_overrides_configured_level() {
        let _guard = env_lock::lock_env([("RUST_LOG", Some("users_api=debug"))]);
        let filter = build_filter("warn").expect("valid filter");
        assert_eq!(filter.to_string(), "users_api=debug");
    }

    #[rstest]
    fn malformed_filter_is_reported() {
        let _guard = env_lock::lock_env([("RUST_LOG", None::<String>)]);
        assert!(matches!(
            build_filter("users_api=loud"),
            Err(LoggingError::Filter { .. })
        ));
    }

    #[rstest]
    fn file_sink_is_added_when_configured() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LoggingConfig {
            file: Some(dir.path().join("service.log")),
            ..LoggingConfig::default()
        };
        let sinks = build_sinks(&config).expect("sinks");
        assert_eq!(sinks.len(), 2);
        assert!(dir.path().join("service.log").exists());
    }

    #[rstest]
    fn unwritable_file_sink_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LoggingConfig {
            file: Some(dir.path().join("missing").join("service.log")),
            ..LoggingConfig::default()
        };
        assert!(matches!(
            build_sinks(&config),
            Err(LoggingError::File { .. })
        ));
    }
}
