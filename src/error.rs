//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` used throughout the client.
//! Transport failures, server-reported HTTP errors, token decoding problems, storage
//! and configuration issues all funnel into it so callers can use the `?` operator.
//!
//! The session store never lets an `AppError` escape its actions: it converts errors
//! into its user-visible `error` field with [`AppError::server_message`], falling back
//! to a static message when the server did not provide one.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Represents all possible errors that can occur within the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The request never produced an HTTP response (connection refused, timeout, ...).
    Network(String),
    /// The server answered with a non-success status.
    /// `message` carries the server's `message` payload when one was present.
    Api { status: u16, message: Option<String> },
    /// A response or stored record could not be decoded.
    Decode(String),
    /// A JWT could not be decoded.
    Token(String),
    /// Reading or writing the persisted key-value storage failed.
    Storage(String),
    /// A path did not resolve to a known route, or guard redirects looped.
    Navigation(String),
    /// Missing or invalid configuration.
    Config(String),
}

impl AppError {
    /// Returns the message reported by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            AppError::Api {
                message: Some(msg), ..
            } => Some(msg.as_str()),
            _ => None,
        }
    }

    /// Returns the HTTP status for server-reported errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds an `Api` error from a status and the raw response body.
    ///
    /// The body's `message` may be a string or an array of strings (validation
    /// errors); arrays are joined with `", "`. Bodies that are not JSON, or carry
    /// no usable message, leave `message` empty.
    pub fn from_response(status: u16, body: &[u8]) -> AppError {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: Option<Value>,
        }

        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .and_then(|m| match m {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::Array(items) => {
                    let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                    if parts.is_empty() {
                        None
                    } else {
                        Some(parts.join(", "))
                    }
                }
                _ => None,
            });

        AppError::Api { status, message }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Network(msg) => write!(f, "Network Error: {}", msg),
            AppError::Api {
                status,
                message: Some(msg),
            } => write!(f, "API Error ({}): {}", status, msg),
            AppError::Api {
                status,
                message: None,
            } => write!(f, "API Error ({})", status),
            AppError::Decode(msg) => write!(f, "Decode Error: {}", msg),
            AppError::Token(msg) => write!(f, "Token Error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage Error: {}", msg),
            AppError::Navigation(msg) => write!(f, "Navigation Error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into `AppError`.
///
/// Errors that carry a status become `Api` errors; body decoding failures become
/// `Decode`; everything else is a transport failure.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        if let Some(status) = error.status() {
            AppError::Api {
                status: status.as_u16(),
                message: None,
            }
        } else if error.is_decode() {
            AppError::Decode(error.to_string())
        } else {
            AppError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> AppError {
        AppError::Decode(error.to_string())
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Token`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::Token(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> AppError {
        AppError::Storage(error.to_string())
    }
}
