//! # Error Handling
//!
//! Error types for Pantry Core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Config Errors                                                     │
//! │  │   └── InvalidConfig         - Backend configuration rejected        │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   └── DatabaseError         - SQLite failure                        │
//! │  │                                                                      │
//! │  ├── Remote Errors                                                     │
//! │  │   ├── ConnectionFailed      - Backend unreachable                   │
//! │  │   ├── Timeout               - Request timed out                     │
//! │  │   ├── RpcUnavailable        - Procedure not deployed / failed       │
//! │  │   └── RemoteError           - Backend rejected the query            │
//! │  │                                                                      │
//! │  ├── Friend Errors                                                     │
//! │  │   ├── RequestPending        - Edge already exists (unique clash)   │
//! │  │   ├── CannotAddSelf         - Requester == addressee               │
//! │  │   ├── NoViewer              - No authenticated viewer              │
//! │  │   ├── InvalidIdentity       - Empty / reserved-char identity       │
//! │  │   └── InvalidProfile        - Profile field out of bounds          │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      ├── SerializationError                                            │
//! │      └── DeserializationError                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Read paths never surface these to a presentation layer: the data access
//! layer logs them and degrades to an empty list. Write paths fold them
//! into a [`RequestOutcome`](crate::friends::RequestOutcome).

use thiserror::Error;

/// Result type alias for Pantry Core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Postgres SQLSTATE for `unique_violation`
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Main error type for Pantry Core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Config Errors (100-199)
    // ========================================================================

    /// Backend configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Storage Errors (400-499)
    // ========================================================================

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ========================================================================
    // Remote Errors (500-599)
    // ========================================================================

    /// Failed to reach the backend
    #[error("Failed to connect to backend: {0}")]
    ConnectionFailed(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The expanded-friends procedure is missing or failed
    #[error("Remote procedure unavailable: {0}")]
    RpcUnavailable(String),

    /// The backend answered with an error body
    #[error("Backend error (HTTP {status}{}): {message}", code_suffix(.code))]
    RemoteError {
        /// HTTP status code
        status: u16,
        /// Backend error code (SQLSTATE for PostgREST)
        code: Option<String>,
        /// Backend message
        message: String,
    },

    // ========================================================================
    // Friend Errors (600-699)
    // ========================================================================

    /// A friendship edge between these two users already exists
    #[error("A friend request is already pending for this user.")]
    RequestPending,

    /// Cannot send request to self
    #[error("Cannot send a friend request to yourself.")]
    CannotAddSelf,

    /// No authenticated viewer
    #[error("No signed-in user.")]
    NoViewer,

    /// Identity is empty or unusable in a query
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Profile field failed validation
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

impl Error {
    /// Numeric error code, grouped by domain:
    /// - 100-199: Config
    /// - 400-499: Storage
    /// - 500-599: Remote
    /// - 600-699: Friends
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidConfig(_) => 100,

            Error::DatabaseError(_) => 400,

            Error::ConnectionFailed(_) => 500,
            Error::Timeout(_) => 501,
            Error::RpcUnavailable(_) => 502,
            Error::RemoteError { .. } => 503,

            Error::RequestPending => 600,
            Error::CannotAddSelf => 601,
            Error::NoViewer => 602,
            Error::InvalidIdentity(_) => 603,
            Error::InvalidProfile(_) => 604,

            Error::Internal(_) => 900,
            Error::SerializationError(_) => 901,
            Error::DeserializationError(_) => 902,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors can potentially be resolved by retrying,
    /// or, for the RPC, by switching to the direct-query strategy.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::ConnectionFailed(_) | Error::RpcUnavailable(_)
        )
    }

    /// Check if this error is a uniqueness conflict on insert
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::RequestPending)
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref()
        .map(|c| format!(", code {}", c))
        .unwrap_or_default()
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Io => Error::SerializationError(err.to_string()),
            Category::Syntax | Category::Data | Category::Eof => {
                Error::DeserializationError(err.to_string())
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_decode() {
            Error::DeserializationError(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Error::ConnectionFailed(err.to_string())
        } else {
            Error::RemoteError {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                code: None,
                message: err.to_string(),
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::InvalidConfig("x".into()).code(), 100);
        assert_eq!(Error::DatabaseError("x".into()).code(), 400);
        assert_eq!(Error::RpcUnavailable("x".into()).code(), 502);
        assert_eq!(Error::RequestPending.code(), 600);
        assert_eq!(Error::Internal("x".into()).code(), 900);
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(Error::Timeout("slow".into()).is_recoverable());
        assert!(Error::RpcUnavailable("404".into()).is_recoverable());
        assert!(!Error::RequestPending.is_recoverable());
        assert!(!Error::CannotAddSelf.is_recoverable());
    }

    #[test]
    fn test_remote_error_display() {
        let err = Error::RemoteError {
            status: 409,
            code: Some("23503".into()),
            message: "violates foreign key".into(),
        };
        let text = err.to_string();
        assert!(text.contains("HTTP 409"));
        assert!(text.contains("code 23503"));

        let bare = Error::RemoteError {
            status: 500,
            code: None,
            message: "boom".into(),
        };
        assert_eq!(bare.to_string(), "Backend error (HTTP 500): boom");
    }

    #[test]
    fn test_json_errors_are_classified() {
        let syntax = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        assert_eq!(Error::from(syntax).code(), 902);

        let data = serde_json::from_str::<Vec<i64>>(r#"["a"]"#).unwrap_err();
        assert!(matches!(Error::from(data), Error::DeserializationError(_)));

        let eof = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        assert!(matches!(Error::from(eof), Error::DeserializationError(_)));
    }

    #[test]
    fn test_conflict_detection() {
        assert!(Error::RequestPending.is_conflict());
        assert!(!Error::DatabaseError("locked".into()).is_conflict());
    }
}
