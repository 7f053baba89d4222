//! Domain error taxonomy shared by every layer above `ragate-domain`.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The gateway's error taxonomy (spec §7).
///
/// Each variant is constructed through an associated function rather
/// than built directly by callers, so call sites read as intent
/// (`Error::validation("top_k", "must be between 1 and 100")`) instead
/// of struct literals.
#[derive(Debug, Error)]
pub enum Error {
    /// Input failed a schema or range check.
    #[error("validation failed for '{field}': {detail}")]
    Validation {
        /// Name of the offending request field.
        field: String,
        /// Human-readable explanation.
        detail: String,
    },

    /// Missing or invalid auth token.
    #[error("authentication failed: {detail}")]
    Auth {
        /// Human-readable explanation.
        detail: String,
    },

    /// Unknown collection referenced by name.
    #[error("{what} not found: {name}")]
    NotFound {
        /// What kind of thing was missing, e.g. "collection".
        what: String,
        /// The name that was looked up.
        name: String,
    },

    /// Missing API key, unresolved provider name, or bad config shape.
    #[error("configuration error: {detail}")]
    Config {
        /// Human-readable explanation, naming the offending key/var.
        detail: String,
    },

    /// An embedder, reranker, or vector store returned 4xx/5xx or timed out.
    #[error("{source_name} returned an error: {detail}")]
    Remote {
        /// Name of the remote collaborator, e.g. "openai-embedder".
        source_name: String,
        /// Human-readable explanation.
        detail: String,
    },

    /// Upstream response did not conform to the expected schema.
    #[error("{source_name} returned an unexpected response: {detail}")]
    Format {
        /// Name of the remote collaborator.
        source_name: String,
        /// Human-readable explanation.
        detail: String,
    },

    /// The memory backend's `max_docs` cap was exceeded.
    #[error("capacity exceeded: attempted {attempted}, limit {limit}")]
    Capacity {
        /// Configured limit.
        limit: usize,
        /// Size that would have resulted.
        attempted: usize,
    },

    /// Filesystem error while reading config or state at startup.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Builds a [`Error::Validation`].
    pub fn validation(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Builds a [`Error::Auth`].
    pub fn auth(detail: impl Into<String>) -> Self {
        Self::Auth {
            detail: detail.into(),
        }
    }

    /// Builds a [`Error::NotFound`].
    pub fn not_found(what: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            what: what.into(),
            name: name.into(),
        }
    }

    /// Builds a [`Error::Config`].
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Builds a [`Error::Remote`].
    pub fn remote(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Remote {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Builds a [`Error::Format`].
    pub fn format(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Format {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Builds a [`Error::Capacity`].
    pub fn capacity(limit: usize, attempted: usize) -> Self {
        Self::Capacity { limit, attempted }
    }

    /// True for errors the query pipeline should swallow (rerank,
    /// context expansion) rather than fail the request with.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::Remote { .. } | Self::Format { .. })
    }
}
