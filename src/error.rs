// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for address-space operations.
//!
//! All client, scanner and resolver operations return [`Result`] instead of
//! panicking. Lookup failures inside data-type resolution degrade to an
//! `Unknown` classification rather than surfacing here; what does surface is
//! categorized so callers can decide between retrying, fixing their input,
//! or giving up.
//!
//! # Error Categories
//!
//! ```text
//! Error
//! ├── NotConnected     - Operation attempted without an active session
//! ├── NodeNotFound     - Node id did not resolve on the server
//! ├── WrongNodeClass   - Node resolved but has an unexpected class
//! ├── ParentNotFound   - Referenced parent node missing
//! ├── UnsupportedType  - Data-type name lookup failure
//! ├── WriteRejected    - Server rejected one or more writes
//! ├── Transport        - Failure surfaced from the underlying session
//! ├── Format           - Serialization shape/discriminator violation
//! ├── Validation       - Invalid caller input
//! └── Cancelled        - Cooperative cancellation observed
//! ```

use thiserror::Error;
use tracing::Level;

use crate::types::NodeClass;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Error
// =============================================================================

/// The error type for address-space client, scanner and resolver operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No active session; connect first.
    #[error("client is not connected")]
    NotConnected,

    /// The node id did not resolve to a node on the server.
    #[error("node '{node_id}' was not found")]
    NodeNotFound {
        /// The node id that failed to resolve.
        node_id: String,
    },

    /// The node resolved but has a different node class than required.
    #[error("node '{node_id}' has class {actual}, expected {expected}")]
    WrongNodeClass {
        /// The node id that was read.
        node_id: String,
        /// The node class the operation required.
        expected: NodeClass,
        /// The node class the server reported.
        actual: NodeClass,
    },

    /// A referenced parent node is missing.
    #[error("parent node '{node_id}' was not found")]
    ParentNotFound {
        /// The parent node id.
        node_id: String,
    },

    /// A data-type name did not match any entry in the static type table.
    #[error("unsupported data type name '{name}'")]
    UnsupportedType {
        /// The name that failed to match.
        name: String,
    },

    /// The server rejected a write, or the write failed in transit.
    #[error("write rejected: {detail}")]
    WriteRejected {
        /// Server-reported status text or the underlying failure message.
        detail: String,
    },

    /// Any failure surfaced from the underlying session capability.
    #[error("transport failure: {detail}")]
    Transport {
        /// Description of the underlying failure.
        detail: String,
    },

    /// A serialized node tree violated the tagged-union contract.
    #[error("format error: {detail}")]
    Format {
        /// Description of the shape violation.
        detail: String,
    },

    /// Caller input failed validation before any network call.
    #[error("validation error: {detail}")]
    Validation {
        /// Description of the invalid input.
        detail: String,
    },

    /// The operation observed a cancellation request between units of work.
    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    /// Creates a node-not-found error.
    pub fn node_not_found(node_id: impl Into<String>) -> Self {
        Self::NodeNotFound {
            node_id: node_id.into(),
        }
    }

    /// Creates a wrong-node-class error.
    pub fn wrong_node_class(
        node_id: impl Into<String>,
        expected: NodeClass,
        actual: NodeClass,
    ) -> Self {
        Self::WrongNodeClass {
            node_id: node_id.into(),
            expected,
            actual,
        }
    }

    /// Creates an unsupported-type error.
    pub fn unsupported_type(name: impl Into<String>) -> Self {
        Self::UnsupportedType { name: name.into() }
    }

    /// Creates a write-rejected error.
    pub fn write_rejected(detail: impl Into<String>) -> Self {
        Self::WriteRejected {
            detail: detail.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    /// Creates a format error.
    pub fn format(detail: impl Into<String>) -> Self {
        Self::Format {
            detail: detail.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    /// Returns the error category for logging and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::NodeNotFound { .. } => "node_not_found",
            Self::WrongNodeClass { .. } => "wrong_node_class",
            Self::ParentNotFound { .. } => "parent_not_found",
            Self::UnsupportedType { .. } => "unsupported_type",
            Self::WriteRejected { .. } => "write_rejected",
            Self::Transport { .. } => "transport",
            Self::Format { .. } => "format",
            Self::Validation { .. } => "validation",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` if retrying the operation may succeed.
    ///
    /// Transport failures and missing connections are transient; everything
    /// else requires a change in input or server state.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotConnected | Self::Transport { .. })
    }

    /// Returns the tracing level appropriate for this error.
    pub fn tracing_level(&self) -> Level {
        match self {
            Self::Transport { .. } | Self::WriteRejected { .. } => Level::ERROR,
            Self::Cancelled => Level::DEBUG,
            _ => Level::WARN,
        }
    }

    /// Logs this error with its category and retryability.
    pub fn log(&self, context: &str) {
        match self.tracing_level() {
            Level::ERROR => tracing::error!(
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
            _ => tracing::debug!(
                category = self.category(),
                context = context,
                retryable = self.is_retryable(),
                "{self}"
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
