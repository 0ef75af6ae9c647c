//! Error types for rdbc-federation
//!
//! Classifies failures so callers can react correctly:
//! - Resolution failures (no provider pattern matched, never retriable)
//! - Connection failures raised by native drivers (retriable)
//! - Wrapper misuse (unsupported operations, programming errors)

use std::fmt;
use thiserror::Error;

/// Result type for rdbc-federation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// No best-provider pattern matched a connection string (not retriable:
    /// retrying without registry changes is futile)
    Resolution,
    /// Connection-related errors from a native driver (retriable)
    Connection,
    /// Configuration error
    Configuration,
    /// Operation not supported by the receiver (programming error)
    Unsupported,
    /// Unknown/other errors
    Other,
}

impl ErrorCategory {
    /// Whether errors in this category are generally retriable
    #[inline]
    pub const fn is_retriable(self) -> bool {
        matches!(self, Self::Connection)
    }
}

/// Main error type for rdbc-federation
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum Error {
    /// No registered provider services the connection string
    #[error("no providers registered for connection string \"{connection_string}\"")]
    NoProviderFound { connection_string: String },

    /// Connection failed
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Unsupported operation for this receiver
    #[error("unsupported: {message}")]
    Unsupported { message: String },

    /// Internal error
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NoProviderFound { .. } => ErrorCategory::Resolution,
            Self::Connection { .. } => ErrorCategory::Connection,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Unsupported { .. } => ErrorCategory::Unsupported,
            Self::Internal { .. } => ErrorCategory::Other,
        }
    }

    /// Whether this error is retriable
    #[inline]
    pub fn is_retriable(&self) -> bool {
        self.category().is_retriable()
    }

    /// Create a resolution error carrying the offending connection string
    pub fn no_provider(connection_string: impl Into<String>) -> Self {
        Self::NoProviderFound {
            connection_string: connection_string.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with source
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution => write!(f, "resolution"),
            Self::Connection => write!(f, "connection"),
            Self::Configuration => write!(f, "configuration"),
            Self::Unsupported => write!(f, "unsupported"),
            Self::Other => write!(f, "other"),
        }
    }
}
