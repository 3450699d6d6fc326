// SPDX-FileCopyrightText: 2026 Murshid Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Murshid chat client.

use thiserror::Error;

/// The primary error type used across the Murshid workspace.
#[derive(Debug, Error)]
pub enum MurshidError {
    /// The backend rejected the session (HTTP 401 equivalent).
    ///
    /// Never retried: the session sets its unauthorized flag and an outer
    /// collaborator redirects to login.
    #[error("unauthorized")]
    Unauthorized,

    /// The active stream was cancelled on request.
    ///
    /// Not a failure from the user's perspective: fragments already
    /// yielded remain valid and no error is surfaced.
    #[error("stream aborted")]
    Aborted,

    /// The prompt stream endpoint returned a non-success response with no
    /// usable body.
    #[error("chat stream request failed with status {status}")]
    StreamRequest { status: u16 },

    /// REST backend errors (transport failure, error status, undecodable body).
    #[error("api error: {message}")]
    Api {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MurshidError {
    /// Shorthand for an [`MurshidError::Api`] without an underlying source.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            source: None,
        }
    }

    /// True when the error is the distinguished unauthorized signal.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// True when the error is a user-requested cancellation.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
