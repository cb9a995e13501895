//! Error types for calltap.
//!
//! - [`CallbackError`] - Every failure a registry or dispatcher call reports
//! - [`BoxError`] - The failure type callables themselves return

use crate::kind::ChannelKind;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by registry and dispatch operations.
///
/// Removing a callable that is not registered is not an error; it is a
/// silent no-op so teardown paths stay idempotent.
#[derive(Error, Debug)]
pub enum CallbackError {
    /// A scripted registration named a channel outside the closed set.
    #[error("invalid channel kind: {0}")]
    InvalidChannelKind(String),

    /// A payload was dispatched on a channel that does not accept it.
    #[error("{payload} payload cannot be dispatched on the {kind} channel")]
    PayloadMismatch {
        /// The channel the caller asked for.
        kind: ChannelKind,
        /// The payload variant that was supplied.
        payload: &'static str,
    },

    /// A registered callable failed. The error is the callable's own.
    #[error(transparent)]
    Callback(BoxError),
}

impl CallbackError {
    /// Build an [`CallbackError::InvalidChannelKind`] from any displayable raw kind.
    pub fn invalid_kind(raw: impl std::fmt::Display) -> Self {
        CallbackError::InvalidChannelKind(raw.to_string())
    }

    /// Returns `true` if this error came from inside a registered callable.
    pub fn is_callback_failure(&self) -> bool {
        matches!(self, CallbackError::Callback(_))
    }
}

impl From<BoxError> for CallbackError {
    fn from(err: BoxError) -> Self {
        CallbackError::Callback(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug, Error)]
    #[error("solver exploded")]
    struct Inner(#[source] std::fmt::Error);

    #[test]
    fn callback_failure_is_transparent() {
        let err = CallbackError::from(Box::new(Inner(std::fmt::Error)) as BoxError);
        assert!(err.is_callback_failure());
        assert_eq!(err.to_string(), "solver exploded");
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_kind_renders_raw_value() {
        let err = CallbackError::invalid_kind(7u32);
        assert_eq!(err.to_string(), "invalid channel kind: 7");
        assert!(!err.is_callback_failure());
    }
}
