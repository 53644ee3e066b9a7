//! Error taxonomy for call dispatch
//!
//! Recoverable conditions (`StrictNotSatisfied`, `RootUnavailable`) surface
//! as variants; handler and root failures travel through unchanged as
//! [`CallError::Handler`]. Cursor bookkeeping corruption is not an error
//! value at all: it panics, because execution cannot safely continue past
//! corrupted relay state.

use crate::call::MethodId;
use thiserror::Error;

/// Error raised while dispatching a call through the redirect pipeline.
#[derive(Error, Debug)]
pub enum CallError {
    /// Strict mode is enabled and no qualifying redirect exists for the call.
    /// Raised before any handler runs.
    #[error("strict mode enabled and no redirect is configured to handle call to '{0}'")]
    StrictNotSatisfied(MethodId),

    /// The handler chain was exhausted and the proxy has no root
    /// implementation to fall back to.
    #[error("no root implementation available for call to '{0}'")]
    RootUnavailable(MethodId),

    /// A failure raised by a handler or by the root implementation. The
    /// engine never wraps or swallows these; they reach the original caller
    /// as-is.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl CallError {
    /// Shorthand for wrapping an arbitrary handler failure.
    pub fn handler(err: impl Into<anyhow::Error>) -> Self {
        CallError::Handler(err.into())
    }
}
