//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter and the span
//! annotator both resolve statuses through [`STATUS_TABLE`], so a code maps
//! to the same status wherever it surfaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    BadRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// Well-formed input that violates a business rule.
    Unprocessable,
    /// An unexpected failure inside the service.
    Internal,
    /// A dependency the service relies on is unavailable.
    ServiceUnavailable,
}

/// One row of the code to status table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    /// Domain error code.
    pub code: ErrorCode,
    /// HTTP-equivalent status.
    pub status: u16,
    /// Canonical reason phrase for `status`.
    pub reason: &'static str,
}

const INTERNAL_MAPPING: StatusMapping = StatusMapping {
    code: ErrorCode::Internal,
    status: 500,
    reason: "Internal Server Error",
};

/// The single source of truth for code to status resolution.
pub const STATUS_TABLE: [StatusMapping; 7] = [
    StatusMapping {
        code: ErrorCode::BadRequest,
        status: 400,
        reason: "Bad Request",
    },
    StatusMapping {
        code: ErrorCode::Unauthorized,
        status: 401,
        reason: "Unauthorized",
    },
    StatusMapping {
        code: ErrorCode::Forbidden,
        status: 403,
        reason: "Forbidden",
    },
    StatusMapping {
        code: ErrorCode::NotFound,
        status: 404,
        reason: "Not Found",
    },
    StatusMapping {
        code: ErrorCode::Unprocessable,
        status: 422,
        reason: "Unprocessable Entity",
    },
    INTERNAL_MAPPING,
    StatusMapping {
        code: ErrorCode::ServiceUnavailable,
        status: 503,
        reason: "Service Unavailable",
    },
];

impl ErrorCode {
    /// Wire representation, e.g. `NOT_FOUND`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Unprocessable => "UNPROCESSABLE",
            Self::Internal => "INTERNAL",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Message used when an error is constructed with an empty one.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::Unprocessable => "Unprocessable entity",
            Self::Internal => "Internal server error",
            Self::ServiceUnavailable => "Service unavailable",
        }
    }

    /// Codes whose occurrences are operator-relevant and logged in full.
    pub const fn is_reportable(self) -> bool {
        matches!(self, Self::Internal | Self::ServiceUnavailable)
    }

    /// Table entry for this code.
    pub fn mapping(self) -> StatusMapping {
        STATUS_TABLE
            .iter()
            .copied()
            .find(|entry| entry.code == self)
            .unwrap_or(INTERNAL_MAPPING)
    }

    /// HTTP-equivalent status for this code.
    pub fn http_status(self) -> u16 {
        self.mapping().status
    }

    /// Reverse lookup: the code whose table status is exactly `status`.
    pub fn from_http_status(status: u16) -> Option<Self> {
        STATUS_TABLE
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing a code string that is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code `{0}`")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STATUS_TABLE
            .iter()
            .map(|entry| entry.code)
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

/// Status for an arbitrary code string; unknown codes resolve to 500.
pub fn status_for_code(code: &str) -> u16 {
    code.parse::<ErrorCode>()
        .map_or(INTERNAL_MAPPING.status, ErrorCode::http_status)
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is never empty: constructors substitute the code's default.
/// - `reportable` starts out true exactly for `INTERNAL` and
///   `SERVICE_UNAVAILABLE`.
///
/// # Examples
/// ```
/// use users_api::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "Not found");
/// assert_eq!(err.http_status(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Error {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    metadata: Map<String, Value>,
    #[serde(default)]
    reportable: bool,
}

impl Error {
    /// Create an error, falling back to the code's default message when
    /// `message` is blank.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            metadata: Map::new(),
            reportable: code.is_reportable(),
        }
    }

    /// Convenience constructor for [`ErrorCode::BadRequest`].
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Unprocessable`].
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unprocessable, message)
    }

    /// Convenience constructor for [`ErrorCode::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Structured diagnostic fields. Never sent to clients.
    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Whether this occurrence should be logged with full metadata.
    pub fn is_reportable(&self) -> bool {
        self.reportable
    }

    /// Status resolved through [`STATUS_TABLE`].
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Attach one metadata entry, replacing any previous value for `key`.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a whole metadata map into the error.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::Error;
    /// use serde_json::{Map, json};
    ///
    /// let mut extra = Map::new();
    /// extra.insert("email".into(), json!("ana@example.com"));
    /// let err = Error::unprocessable("Email already in use").with_metadata(extra);
    /// assert_eq!(err.metadata()["email"], "ana@example.com");
    /// ```
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Flag this occurrence for full logging regardless of its code.
    pub fn mark_reportable(mut self) -> Self {
        self.reportable = true;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for Error {}
