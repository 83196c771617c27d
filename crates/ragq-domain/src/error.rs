//! Error handling types.
//!
//! A single enum carries the full taxonomy from the error-handling design:
//! one variant per failure class, each reachable from the HTTP layer and the
//! worker's `fail()` path without re-deriving the mapping in either place.

use thiserror::Error;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain error taxonomy.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or empty question, or an unknown `searchMode`.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of what was invalid.
        message: String,
    },

    /// Unknown job id, or a file not owned by the requesting user.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that could not be located.
        resource: String,
    },

    /// Redis is unreachable. Callers at the HTTP surface turn this into a
    /// synchronous fallback rather than surfacing it to the client.
    #[error("queue unavailable: {message}")]
    UnavailableQueue {
        /// Description of the connectivity failure.
        message: String,
    },

    /// The embedding service is unhealthy or returned a malformed response.
    #[error("embedding service unavailable: {message}")]
    UnavailableEmbed {
        /// Description of the failure.
        message: String,
    },

    /// The vector store is unreachable or returned a transport/5xx error.
    #[error("vector store unavailable: {message}")]
    UnavailableVector {
        /// Description of the failure.
        message: String,
    },

    /// The LLM service is unreachable or returned a transport/5xx error.
    #[error("llm service unavailable: {message}")]
    UnavailableLlm {
        /// Description of the failure.
        message: String,
    },

    /// A per-request timeout elapsed (embedding, vector search, or LLM call).
    #[error("timed out: {message}")]
    Timeout {
        /// Description of which operation timed out.
        message: String,
    },

    /// An invariant was violated: wrong vector dimension, malformed Redis
    /// payload, or similar "should never happen" conditions.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the violated invariant.
        message: String,
    },
}

impl Error {
    /// Short machine-readable code, used in HTTP error envelopes and worker
    /// `fail()` messages so both surfaces agree on vocabulary.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UnavailableQueue { .. } => "UNAVAILABLE_QUEUE",
            Self::UnavailableEmbed { .. } => "UNAVAILABLE_EMBED",
            Self::UnavailableVector { .. } => "UNAVAILABLE_VECTOR",
            Self::UnavailableLlm { .. } => "UNAVAILABLE_LLM",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal { .. } => "INTERNAL",
        }
    }

    /// Construct an [`Error::InvalidInput`].
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Construct an [`Error::NotFound`].
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Construct an [`Error::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
