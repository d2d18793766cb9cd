//! Context layer errors.
//!
//! All variants use the `CONTEXT_` prefix. Illegal lifecycle
//! transitions surface to the caller immediately; the engine never
//! retries or silently tolerates them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_types::{ErrorCode, ScopeKind};

/// Error raised by context operations.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ContextError {
    /// The scope's context is required but not active.
    ///
    /// Raised when resolving a bean of an inactive scope, and when
    /// deactivating or terminating a context that has no active
    /// claim.
    ///
    /// **Recoverable** - activate the context (or resume a captured
    /// one) and retry.
    #[error("context for scope '{scope}' is not active")]
    NotActive {
        /// The scope whose context was required.
        scope: ScopeKind,
    },

    /// The scope's context already has an active claim.
    ///
    /// Double activation is a programming error: a context store has
    /// exactly one logical owner.
    ///
    /// **Not recoverable** - fix the activation discipline.
    #[error("context for scope '{scope}' is already active")]
    AlreadyActive {
        /// The scope that was activated twice.
        scope: ScopeKind,
    },
}

impl ContextError {
    /// The scope the error concerns.
    #[must_use]
    pub fn scope(&self) -> ScopeKind {
        match self {
            Self::NotActive { scope } | Self::AlreadyActive { scope } => *scope,
        }
    }
}

impl ErrorCode for ContextError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotActive { .. } => "CONTEXT_NOT_ACTIVE",
            Self::AlreadyActive { .. } => "CONTEXT_ALREADY_ACTIVE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotActive { .. })
    }
}
