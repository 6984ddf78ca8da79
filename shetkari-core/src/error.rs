//! Error types for the Shetkari core library.
//!
//! This module provides a unified error handling system for the chat relay,
//! covering message persistence and the hosted advisory provider.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Database | Database connection, query, migration errors |
//! | E2001-E2099 | Advisory | Provider request, rate limiting, and timeout errors |

use thiserror::Error;
use tracing::{error, warn};

use crate::db::DatabaseError;

/// The main error type for the Shetkari core library.
#[derive(Debug, Error)]
pub enum ShetkariError {
    // ========================================================================
    // Database Errors (E1001-E1099)
    // ========================================================================
    /// Failed to establish database connection
    #[error("[E1001] Database connection failed: {0}")]
    DatabaseConnectionFailed(String),

    /// Database query execution failed
    #[error("[E1002] Database query failed: {0}")]
    DatabaseQueryFailed(String),

    /// Database migration failed
    #[error("[E1003] Database migration failed: {0}")]
    DatabaseMigrationFailed(String),

    /// Database pool exhausted or unavailable
    #[error("[E1004] Database pool unavailable: {0}")]
    DatabasePoolUnavailable(String),

    // ========================================================================
    // Advisory Provider Errors (E2001-E2099)
    // ========================================================================
    /// Provider request failed
    #[error("[E2001] Advisory request failed: {0}")]
    AdvisoryRequestFailed(String),

    /// Provider response could not be parsed
    #[error("[E2002] Failed to parse advisory response: {0}")]
    AdvisoryParseError(String),

    /// Provider rate limit exceeded
    #[error(
        "[E2003] Advisory rate limit exceeded for {service}, retry after {retry_after_secs} seconds"
    )]
    AdvisoryRateLimited {
        service: String,
        retry_after_secs: u64,
    },

    /// Provider rejected the API credential
    #[error("[E2004] Advisory authentication failed for {service}: {message}")]
    AdvisoryAuthFailed { service: String, message: String },

    /// Provider unreachable or returning 5xx
    #[error("[E2005] Advisory service unavailable: {0}")]
    AdvisoryUnavailable(String),

    /// Provider call timed out
    #[error("[E2006] Advisory request timed out after {0} seconds")]
    AdvisoryTimeout(u64),

    /// Provider answered but the reply carried no usable text
    #[error("[E2007] Advisory provider returned an empty reply")]
    EmptyAdvisoryReply,
}

/// Result type alias for Shetkari operations.
pub type ShetkariResult<T> = Result<T, ShetkariError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for ShetkariError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ShetkariError::AdvisoryTimeout(30)
        } else if err.is_connect() {
            ShetkariError::AdvisoryUnavailable(err.to_string())
        } else if err.is_status() {
            if let Some(status) = err.status() {
                if status.as_u16() == 429 {
                    return ShetkariError::AdvisoryRateLimited {
                        service: err
                            .url()
                            .map(|u| u.host_str().unwrap_or("unknown").to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                        retry_after_secs: 60,
                    };
                } else if status.as_u16() == 401 || status.as_u16() == 403 {
                    return ShetkariError::AdvisoryAuthFailed {
                        service: err
                            .url()
                            .map(|u| u.host_str().unwrap_or("unknown").to_string())
                            .unwrap_or_else(|| "unknown".to_string()),
                        message: status.to_string(),
                    };
                } else if status.is_server_error() {
                    return ShetkariError::AdvisoryUnavailable(err.to_string());
                }
            }
            ShetkariError::AdvisoryRequestFailed(err.to_string())
        } else if err.is_decode() {
            ShetkariError::AdvisoryParseError(err.to_string())
        } else {
            ShetkariError::AdvisoryRequestFailed(err.to_string())
        }
    }
}

impl From<DatabaseError> for ShetkariError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionFailed(message) => {
                ShetkariError::DatabaseConnectionFailed(message)
            }
            DatabaseError::QueryFailed(e) => match &e {
                sqlx::Error::PoolTimedOut => ShetkariError::DatabasePoolUnavailable(e.to_string()),
                sqlx::Error::PoolClosed => ShetkariError::DatabasePoolUnavailable(
                    "Connection pool is closed".to_string(),
                ),
                _ => ShetkariError::DatabaseQueryFailed(e.to_string()),
            },
            DatabaseError::MigrationFailed(e) => {
                ShetkariError::DatabaseMigrationFailed(e.to_string())
            }
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl ShetkariError {
    /// Returns true if this error is related to database operations.
    pub fn is_database_error(&self) -> bool {
        matches!(
            self,
            ShetkariError::DatabaseConnectionFailed(_)
                | ShetkariError::DatabaseQueryFailed(_)
                | ShetkariError::DatabaseMigrationFailed(_)
                | ShetkariError::DatabasePoolUnavailable(_)
        )
    }

    /// Returns true if this error came from the advisory provider.
    pub fn is_advisory_error(&self) -> bool {
        matches!(
            self,
            ShetkariError::AdvisoryRequestFailed(_)
                | ShetkariError::AdvisoryParseError(_)
                | ShetkariError::AdvisoryRateLimited { .. }
                | ShetkariError::AdvisoryAuthFailed { .. }
                | ShetkariError::AdvisoryUnavailable(_)
                | ShetkariError::AdvisoryTimeout(_)
                | ShetkariError::EmptyAdvisoryReply
        )
    }

    /// Returns true if this error is transient and the operation might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ShetkariError::DatabaseConnectionFailed(_)
                | ShetkariError::DatabasePoolUnavailable(_)
                | ShetkariError::AdvisoryRateLimited { .. }
                | ShetkariError::AdvisoryUnavailable(_)
                | ShetkariError::AdvisoryTimeout(_)
        )
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            ShetkariError::DatabaseConnectionFailed(_) => "E1001",
            ShetkariError::DatabaseQueryFailed(_) => "E1002",
            ShetkariError::DatabaseMigrationFailed(_) => "E1003",
            ShetkariError::DatabasePoolUnavailable(_) => "E1004",
            ShetkariError::AdvisoryRequestFailed(_) => "E2001",
            ShetkariError::AdvisoryParseError(_) => "E2002",
            ShetkariError::AdvisoryRateLimited { .. } => "E2003",
            ShetkariError::AdvisoryAuthFailed { .. } => "E2004",
            ShetkariError::AdvisoryUnavailable(_) => "E2005",
            ShetkariError::AdvisoryTimeout(_) => "E2006",
            ShetkariError::EmptyAdvisoryReply => "E2007",
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();

        if self.is_transient() {
            warn!(error_code = %code, "Transient error occurred: {}", self);
        } else {
            error!(error_code = %code, "Error occurred: {}", self);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
