//! Error types for the deviceiam client.
//!
//! Uses `thiserror` for library-style errors with automatic `Display` and `Error` implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IAM error: {0}")]
    Iam(#[from] IamError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Errors raised by the connection collaborator while exchanging a request.
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("Connection closed")]
    Closed,
}

impl From<reqwest::Error> for ConnectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err)
        }
    }
}

/// Reasons a listing payload could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("response carried no payload")]
    MissingPayload,

    #[error("payload is not valid CBOR: {0}")]
    Cbor(String),

    #[error("payload is not a CBOR array")]
    NotAnArray,

    #[error("{0} unexpected bytes after the CBOR array")]
    TrailingBytes(usize),

    #[error("entry {0} is not a text string")]
    NonStringEntry(usize),
}

/// Failure of a single IAM operation.
///
/// Every variant is terminal for the operation that produced it; nothing is retried.
#[derive(Error, Debug)]
pub enum IamError {
    #[error("{identifier:?} cannot be used as a user or role id")]
    UnusableIdentifier { identifier: String },

    #[error("Request to {path} was denied")]
    AccessDenied { path: String },

    #[error("Request to {path} returned error 500 (malformed user or role id?)")]
    InvalidIdentifier { path: String },

    #[error("Request to {path} returned response code {code}")]
    UnexpectedStatus { path: String, code: u16 },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: ConnectionError,
    },
}

impl IamError {
    /// Returns a user-friendly message for display.
    pub fn user_message(&self) -> &str {
        match self {
            Self::UnusableIdentifier { .. } => {
                "User and role ids must not be empty, \".\" or \"..\"."
            }
            Self::AccessDenied { .. } => "Access denied. Check the device's IAM policies.",
            Self::InvalidIdentifier { .. } => "The device rejected the user or role id.",
            Self::UnexpectedStatus { .. } => "Unexpected response from the device.",
            Self::Decode { .. } => "The device sent a response that could not be read.",
            Self::Transport { .. } => "Could not reach the device. Check your connection.",
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl AppError {
    /// Returns a user-friendly message for display.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Iam(e) => e.user_message(),
            Self::Config(_) => "Configuration error. Please check settings.",
            Self::Connection(ConnectionError::Timeout) => "The device did not answer in time.",
            Self::Connection(_) => "Network error. Check your connection.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = AppError::Iam(IamError::AccessDenied {
            path: "/iam/users".into(),
        });
        assert_eq!(
            err.user_message(),
            "Access denied. Check the device's IAM policies."
        );

        let err = AppError::Connection(ConnectionError::Timeout);
        assert_eq!(err.user_message(), "The device did not answer in time.");
    }

    #[test]
    fn test_iam_error_display() {
        let err = IamError::UnexpectedStatus {
            path: "/iam/users/alice".into(),
            code: 404,
        };
        assert_eq!(
            err.to_string(),
            "Request to /iam/users/alice returned response code 404"
        );

        let err = IamError::UnusableIdentifier {
            identifier: "..".into(),
        };
        assert_eq!(err.to_string(), "\"..\" cannot be used as a user or role id");
    }

    #[test]
    fn test_decode_error_display() {
        let err = IamError::Decode {
            path: "/iam/users".into(),
            source: DecodeError::NonStringEntry(2),
        };
        assert_eq!(
            err.to_string(),
            "Failed to decode response from /iam/users: entry 2 is not a text string"
        );
    }
}
