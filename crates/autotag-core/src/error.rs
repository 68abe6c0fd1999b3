// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::error::Error as StdError;

/// Errors raised by a provider tagging capability.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// The provider answered and rejected the call (permission denied, missing resource,
    /// throttling, ...).
    #[error("{service} {operation} failed with status {status}: {code}: {message}")]
    Provider {
        service: &'static str,
        operation: &'static str,
        status: u16,
        code: String,
        message: String,
    },

    /// The call never produced a provider answer.
    #[error("{service} {operation} request failed: {source}")]
    Transport {
        service: &'static str,
        operation: &'static str,
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("{service} {operation} request could not be built: {reason}")]
    Request {
        service: &'static str,
        operation: &'static str,
        reason: String,
    },
}

impl TagError {
    /// Error code reported by the provider, if the provider answered.
    pub fn provider_code(&self) -> Option<&str> {
        match self {
            TagError::Provider { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Errors that end an invocation unsuccessfully.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Invalid event payload: {0}")]
    InvalidEvent(String),

    #[error("Tagging error: {0}")]
    Tagging(#[from] TagError),
}

impl DispatchError {
    /// Short classification reported back to the invoking event source.
    pub fn error_type(&self) -> &'static str {
        match self {
            DispatchError::InvalidEvent(_) => "InvalidEvent",
            DispatchError::Tagging(TagError::Provider { .. }) => "ProviderError",
            DispatchError::Tagging(_) => "TaggingError",
        }
    }
}

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
}
