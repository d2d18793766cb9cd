//! Container layer errors.
//!
//! Two enums live here: [`ResolveError`] for typed/qualified lookup
//! failures (`RESOLVE_` codes) and [`ContainerError`] for everything
//! the container surface can raise (`CONTAINER_` codes, with wrapped
//! lower-layer errors keeping their own codes).
//!
//! Nothing is retried or swallowed: resolution and lifecycle errors
//! surface to the caller immediately.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trellis_context::ContextError;
use trellis_intercept::InterceptError;
use trellis_types::{ErrorCode, Qualifier, ScopeKind, TypeKey};

/// Typed/qualified lookup failure.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ResolveError {
    /// No bean matches the requested type and qualifiers.
    ///
    /// **Not recoverable** - the metadata graph is static; the same
    /// request cannot start matching later.
    #[error("no bean matches type '{ty}' with qualifiers {qualifiers:?}")]
    Unsatisfied {
        /// The requested type.
        ty: TypeKey,
        /// The requested qualifiers.
        qualifiers: Vec<Qualifier>,
    },

    /// More than one bean matches the requested type and qualifiers.
    ///
    /// **Not recoverable** - narrow the request with qualifiers.
    #[error("ambiguous resolution for type '{ty}': candidates {candidates:?}")]
    Ambiguous {
        /// The requested type.
        ty: TypeKey,
        /// Names of all matching beans.
        candidates: Vec<String>,
    },
}

impl ErrorCode for ResolveError {
    fn code(&self) -> &'static str {
        match self {
            Self::Unsatisfied { .. } => "RESOLVE_UNSATISFIED",
            Self::Ambiguous { .. } => "RESOLVE_AMBIGUOUS",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Error raised by container operations.
///
/// Lower-layer errors pass through with their original codes; the
/// `CONTAINER_`-coded variants are the container's own.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum ContainerError {
    /// A context operation failed (inactive scope, double activation).
    #[error(transparent)]
    Context(#[from] ContextError),

    /// A typed/qualified lookup failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// An interceptor body or business operation failed. Passed
    /// through unchanged from wherever it was raised.
    #[error(transparent)]
    Intercept(#[from] InterceptError),

    /// A bean id does not exist in the metadata graph.
    #[error("unknown bean '{0}'")]
    UnknownBean(String),

    /// A bean in the graph has no strategy bound.
    #[error("no strategy bound for bean '{0}'")]
    MissingStrategy(String),

    /// A resolved chain references an interceptor with no body bound.
    #[error("no body bound for interceptor '{0}'")]
    MissingInterceptorBody(String),

    /// An observer in the graph has no body bound.
    #[error("no body bound for observer '{0}'")]
    MissingObserverBody(String),

    /// A declared operation has no method glue in the bean strategy.
    #[error("no method glue for operation '{operation}' of bean '{bean}'")]
    MissingMethod {
        /// The declaring bean.
        bean: String,
        /// The operation signature.
        operation: String,
    },

    /// An invoked operation name is not declared by the bean.
    #[error("bean '{bean}' has no operation named '{operation}'")]
    UnknownOperation {
        /// The target bean.
        bean: String,
        /// The requested operation name.
        operation: String,
    },

    /// A dependent handle was used after its explicit destroy.
    #[error("instance handle for bean '{0}' was already destroyed")]
    HandleDestroyed(String),

    /// Explicit destroy was requested for a non-dependent bean.
    #[error("explicit destroy is only valid for dependent beans; '{bean}' is {scope}")]
    NotDependent {
        /// The target bean.
        bean: String,
        /// Its actual scope.
        scope: ScopeKind,
    },

    /// The container has been shut down.
    #[error("container is stopped")]
    Stopped,
}

impl ErrorCode for ContainerError {
    fn code(&self) -> &'static str {
        match self {
            Self::Context(inner) => inner.code(),
            Self::Resolve(inner) => inner.code(),
            Self::Intercept(inner) => inner.code(),
            Self::UnknownBean(_) => "CONTAINER_UNKNOWN_BEAN",
            Self::MissingStrategy(_) => "CONTAINER_MISSING_STRATEGY",
            Self::MissingInterceptorBody(_) => "CONTAINER_MISSING_INTERCEPTOR_BODY",
            Self::MissingObserverBody(_) => "CONTAINER_MISSING_OBSERVER_BODY",
            Self::MissingMethod { .. } => "CONTAINER_MISSING_METHOD",
            Self::UnknownOperation { .. } => "CONTAINER_UNKNOWN_OPERATION",
            Self::HandleDestroyed(_) => "CONTAINER_HANDLE_DESTROYED",
            Self::NotDependent { .. } => "CONTAINER_NOT_DEPENDENT",
            Self::Stopped => "CONTAINER_STOPPED",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            Self::Context(inner) => inner.is_recoverable(),
            Self::Resolve(inner) => inner.is_recoverable(),
            Self::Intercept(inner) => inner.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_types::assert_error_codes;

    fn own_variants() -> Vec<ContainerError> {
        vec![
            ContainerError::UnknownBean("b".into()),
            ContainerError::MissingStrategy("b".into()),
            ContainerError::MissingInterceptorBody("i".into()),
            ContainerError::MissingObserverBody("o".into()),
            ContainerError::MissingMethod {
                bean: "b".into(),
                operation: "run()".into(),
            },
            ContainerError::UnknownOperation {
                bean: "b".into(),
                operation: "run".into(),
            },
            ContainerError::HandleDestroyed("b".into()),
            ContainerError::NotDependent {
                bean: "b".into(),
                scope: ScopeKind::Singleton,
            },
            ContainerError::Stopped,
        ]
    }

    #[test]
    fn resolve_error_codes_valid() {
        assert_error_codes(
            &[
                ResolveError::Unsatisfied {
                    ty: TypeKey::of("Svc"),
                    qualifiers: vec![],
                },
                ResolveError::Ambiguous {
                    ty: TypeKey::of("Svc"),
                    candidates: vec!["a".into(), "b".into()],
                },
            ],
            "RESOLVE_",
        );
    }

    #[test]
    fn own_error_codes_valid() {
        assert_error_codes(&own_variants(), "CONTAINER_");
    }

    #[test]
    fn wrapped_errors_keep_their_codes() {
        let ctx: ContainerError = ContextError::NotActive {
            scope: ScopeKind::Request,
        }
        .into();
        assert_eq!(ctx.code(), "CONTEXT_NOT_ACTIVE");
        assert!(ctx.is_recoverable());

        let intercept: ContainerError = InterceptError::Failed("boom".into()).into();
        assert_eq!(intercept.code(), "INTERCEPT_FAILED");

        let resolve: ContainerError = ResolveError::Unsatisfied {
            ty: TypeKey::of("Svc"),
            qualifiers: vec![],
        }
        .into();
        assert_eq!(resolve.code(), "RESOLVE_UNSATISFIED");
        assert!(!resolve.is_recoverable());
    }

    #[test]
    fn own_variants_are_not_recoverable() {
        for err in own_variants() {
            assert!(!err.is_recoverable(), "{err}");
        }
    }

    #[test]
    fn ambiguous_display_lists_candidates() {
        let err = ResolveError::Ambiguous {
            ty: TypeKey::of("Svc"),
            candidates: vec!["alpha".into(), "beta".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("alpha"));
        assert!(msg.contains("beta"));
    }
}
