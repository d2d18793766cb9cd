//! Interception layer errors.
//!
//! All variants use the `INTERCEPT_` prefix.
//!
//! The invoker adds nothing of its own to failures: an error raised
//! by an interceptor body or by the terminal operation unwinds
//! through every still-active wrapping interceptor unchanged, exactly
//! like ordinary call-stack unwinding. No retries, no suppression,
//! no wrapping.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_types::ErrorCode;

/// Error raised during chain execution.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum InterceptError {
    /// An interceptor body or the terminal operation failed.
    ///
    /// This is the pass-through variant: the engine propagates it to
    /// the outer caller without modification.
    ///
    /// **Recoverable** - whether a retry helps is the application's
    /// call, not the engine's.
    #[error("interception failed: {0}")]
    Failed(String),

    /// A phase that requires a live target instance ran without one.
    ///
    /// Raised by terminal glue when, e.g., an around-invoke chain is
    /// executed with no target set. This is a wiring mistake.
    ///
    /// **Not recoverable** - fix the glue.
    #[error("no target instance for phase '{phase}'")]
    MissingTarget {
        /// The phase that was executing.
        phase: String,
    },
}

impl ErrorCode for InterceptError {
    fn code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "INTERCEPT_FAILED",
            Self::MissingTarget { .. } => "INTERCEPT_MISSING_TARGET",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
