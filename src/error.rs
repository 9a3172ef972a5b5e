// Catalog Sync - VRT NU catalog aggregation and favorites synchronization
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Error types for Catalog Sync
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Errors are categorized by domain (auth, remote writes, transport, cache, etc.)
//! so callers can decide between a soft skip, a user notification, or a fallback.
//!
//! ## Where each category is raised
//!
//! ### Authentication
//! - No usable token for a favorites write → `AuthenticationFailed`
//! - A missing roaming token during a favorites refresh is *not* raised; the
//!   refresh is skipped and the cached state is kept.
//!
//! ### Remote writes
//! - HTTP or transport failure while (un)following a program → `RemoteWriteFailed`
//!
//! ### Transport (catalog reads)
//! - Non-success HTTP status → `ApiRequestFailed`
//! - Connection problems → `NetworkError`
//! - These propagate to the caller untouched; the aggregator never swallows them.
//!
//! ### Response shape
//! - Body is not the JSON we expect → `InvalidApiResponse`
//! - `meta.pages` block missing or inconsistent during full aggregation → `MalformedPagination`
//!
//! ### Cache / configuration
//! - SQLite cache failures → `CacheError`, `MigrationFailed`, `SqlxError`
//! - Unreadable config file → `ConfigurationError`

use thiserror::Error;

/// Result type alias using our CatalogError type
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Main error type for Catalog Sync
#[derive(Error, Debug)]
pub enum CatalogError {
    // ===== Authentication Errors =====

    /// No usable token was available for an operation that requires one
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        /// Token name that could not be resolved (e.g. "X-VRT-Token")
        token_name: Option<String>,
    },

    // ===== Favorites Errors =====

    /// Following or unfollowing a program failed at the remote favorites service
    #[error("Failed to update favorite '{program}': {message}")]
    RemoteWriteFailed {
        program: String,
        message: String,
        /// HTTP status code if the server answered
        status_code: Option<u16>,
    },

    // ===== Transport Errors =====

    /// Generic API request failure
    #[error("API request failed: {message}")]
    ApiRequestFailed {
        message: String,
        /// HTTP status code if available
        status_code: Option<u16>,
        /// API endpoint that failed
        endpoint: Option<String>,
    },

    /// Network connectivity error
    #[error("Network error: {message}")]
    NetworkError {
        message: String,
        /// Whether this error might be transient
        is_transient: bool,
    },

    // ===== Response Errors =====

    /// API returned invalid or unexpected response format
    #[error("Invalid API response: {message}")]
    InvalidApiResponse {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    /// Pagination metadata is missing or contradicts itself
    #[error("Malformed pagination metadata: {0}")]
    MalformedPagination(String),

    // ===== Cache Errors =====

    /// Cache store could not read or write an entry
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Cache schema migration failed
    #[error("Cache migration failed: {0}")]
    MigrationFailed(String),

    // ===== Configuration/Input Errors =====

    /// Configuration file error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    InternalError(String),

    // ===== External Library Errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// Database driver error from sqlx
    #[error("Cache database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl From<std::string::FromUtf8Error> for CatalogError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        CatalogError::InternalError(format!("UTF-8 conversion error: {}", err))
    }
}

// Helper methods for creating common errors
impl CatalogError {
    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        CatalogError::InvalidInput(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        CatalogError::InternalError(message.into())
    }

    /// Create an AuthenticationFailed error
    pub fn auth_failed<S: Into<String>>(message: S, token_name: Option<String>) -> Self {
        CatalogError::AuthenticationFailed {
            message: message.into(),
            token_name,
        }
    }

    /// Create a RemoteWriteFailed error
    pub fn remote_write_failed<P: Into<String>, S: Into<String>>(
        program: P,
        message: S,
        status_code: Option<u16>,
    ) -> Self {
        CatalogError::RemoteWriteFailed {
            program: program.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Create an ApiRequestFailed error
    pub fn api_failed<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
    ) -> Self {
        CatalogError::ApiRequestFailed {
            message: message.into(),
            status_code,
            endpoint,
        }
    }

    /// Create a NetworkError
    pub fn network_error<S: Into<String>>(message: S, is_transient: bool) -> Self {
        CatalogError::NetworkError {
            message: message.into(),
            is_transient,
        }
    }

    /// Create an InvalidApiResponse error
    pub fn invalid_response<S: Into<String>>(message: S, response_body: Option<String>) -> Self {
        CatalogError::InvalidApiResponse {
            message: message.into(),
            response_body,
        }
    }

    /// HTTP status code carried by this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CatalogError::ApiRequestFailed { status_code, .. }
            | CatalogError::RemoteWriteFailed { status_code, .. } => *status_code,
            CatalogError::ReqwestError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if error is retryable (network errors, 5xx responses)
    ///
    /// Favorites writes are never retried automatically even when this returns
    /// `true`; the caller decides.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::NetworkError { is_transient: true, .. }
                | CatalogError::ApiRequestFailed { status_code: Some(500..=599), .. }
                | CatalogError::RemoteWriteFailed { status_code: Some(500..=599), .. }
        )
    }

    /// Check if error is due to a missing or rejected credential
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            CatalogError::AuthenticationFailed { .. }
                | CatalogError::ApiRequestFailed { status_code: Some(401 | 403), .. }
                | CatalogError::RemoteWriteFailed { status_code: Some(401 | 403), .. }
        )
    }

    /// Check if error came from talking to the remote catalog
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            CatalogError::ApiRequestFailed { .. }
                | CatalogError::NetworkError { .. }
                | CatalogError::ReqwestError(_)
        )
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            CatalogError::AuthenticationFailed { .. } => {
                "Failed to get a favorites token. Please check your credentials and try again.".to_string()
            }
            CatalogError::RemoteWriteFailed { program, .. } => {
                format!("Failed to (un)follow program '{}'. Please try again later.", program)
            }
            CatalogError::NetworkError { .. } | CatalogError::ReqwestError(_) => {
                "Could not reach the catalog service. Please check your connection.".to_string()
            }
            CatalogError::MalformedPagination(_) => {
                "The catalog returned an incomplete listing. Please try again later.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(CatalogError::network_error("timeout", true).is_retryable());
        assert!(!CatalogError::network_error("dns", false).is_retryable());
        assert!(CatalogError::api_failed("boom", Some(503), None).is_retryable());
        assert!(!CatalogError::api_failed("missing", Some(404), None).is_retryable());
    }

    #[test]
    fn test_auth_classification() {
        assert!(CatalogError::auth_failed("no token", Some("X-VRT-Token".into())).is_auth_error());
        assert!(CatalogError::remote_write_failed("thuis", "denied", Some(401)).is_auth_error());
        assert!(!CatalogError::remote_write_failed("thuis", "boom", Some(500)).is_auth_error());
    }

    #[test]
    fn test_user_message_names_program() {
        let err = CatalogError::remote_write_failed("de-ideale-wereld", "boom", Some(500));
        assert!(err.user_message().contains("de-ideale-wereld"));
        assert_eq!(err.status_code(), Some(500));
    }
}
