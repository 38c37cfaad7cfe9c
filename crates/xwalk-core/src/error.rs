//! # Error Taxonomy
//!
//! The three error classes shared across the Crosswalk Stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - `NotFound` carries the entity kind and the offending identifier, so a
//!   caller handed an unknown id can report exactly what was missing.
//! - `InvalidTransition` carries the current state, attempted target, and
//!   rejection reason.
//! - `Validation` is raised at construction boundaries (out-of-range
//!   percentages, empty identifiers) — never deep inside a computation pass.
//!
//! Heuristic classifiers (severity inference, keyword matching) are
//! best-effort and never produce errors; an unmatched case falls back to
//! the lowest-severity default.

use thiserror::Error;

/// Top-level error type for the Crosswalk Stack.
#[derive(Error, Debug)]
pub enum CoreError {
    /// An identifier was presented that does not resolve to an entity.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. "framework version" or "drift record".
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// An operation was attempted against an entity in the wrong state.
    #[error("invalid state transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Current state name.
        from: String,
        /// Attempted target state name.
        to: String,
        /// Reason the transition was rejected.
        reason: String,
    },

    /// A value failed boundary validation.
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Shorthand for an `InvalidTransition` error.
    pub fn invalid_transition(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Percentages and weights are integers by construction.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

impl From<CanonicalizationError> for CoreError {
    fn from(e: CanonicalizationError) -> Self {
        CoreError::Validation(e.to_string())
    }
}
