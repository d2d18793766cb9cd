//! Invocation glue — the generated-code stand-ins bound to the graph.
//!
//! The metadata graph declares *that* a bean exists; the glue bound
//! here says *how* to construct it, inject it, call its operations,
//! and tear it down. In the original architecture these closures are
//! emitted by a build-time generator; the engine only ever sees them
//! as opaque callables keyed by graph ids.

use crate::{Container, ContainerError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use trellis_context::CreationalContext;
use trellis_intercept::InterceptError;
use trellis_metadata::OperationKey;
use trellis_types::{instance_of, InstanceRef};

/// Constructs a raw instance. Runs as the terminal of the
/// around-construct chain; may resolve dependencies through the
/// container and register dependent objects on the creational
/// context.
pub type ConstructFn = Arc<
    dyn Fn(&Container, &CreationalContext) -> Result<InstanceRef, InterceptError> + Send + Sync,
>;

/// Performs field/setter injection on a constructed instance, after
/// the around-construct chain and before the post-construct chain.
pub type InjectFn = Arc<
    dyn Fn(&Container, &InstanceRef, &CreationalContext) -> Result<(), InterceptError>
        + Send
        + Sync,
>;

/// A lifecycle callback (post-construct or pre-destroy) on the
/// instance itself. Runs as the terminal of its phase's chain.
pub type LifecycleFn = Arc<dyn Fn(&InstanceRef) -> Result<(), InterceptError> + Send + Sync>;

/// A business-method body: target instance plus parameters to result.
/// Runs as the terminal of the around-invoke chain.
pub type MethodFn =
    Arc<dyn Fn(&InstanceRef, &Value) -> Result<Value, InterceptError> + Send + Sync>;

/// An observer body, called with the fired event payload.
pub type ObserverFn = Arc<dyn Fn(&Value) -> Result<(), InterceptError> + Send + Sync>;

// Lower-layer glue raises `InterceptError`; container failures inside
// glue (e.g. a dependency resolution) collapse into the pass-through
// variant so chains propagate them unchanged.
impl From<ContainerError> for InterceptError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::Intercept(inner) => inner,
            other => InterceptError::Failed(other.to_string()),
        }
    }
}

/// Everything the container needs to drive one bean: construct,
/// inject, lifecycle callbacks, and method bodies.
///
/// # Example
///
/// ```
/// use trellis_container::BeanStrategy;
///
/// let strategy = BeanStrategy::producing(|| String::from("hello"));
/// ```
#[derive(Clone)]
pub struct BeanStrategy {
    pub(crate) construct: ConstructFn,
    pub(crate) inject: Option<InjectFn>,
    pub(crate) post_construct: Option<LifecycleFn>,
    pub(crate) pre_destroy: Option<LifecycleFn>,
    pub(crate) methods: HashMap<OperationKey, MethodFn>,
}

impl BeanStrategy {
    /// Creates a strategy from a construct function.
    #[must_use]
    pub fn new(construct: ConstructFn) -> Self {
        Self {
            construct,
            inject: None,
            post_construct: None,
            pre_destroy: None,
            methods: HashMap::new(),
        }
    }

    /// Convenience for beans whose construction needs no container
    /// access: wraps a plain value producer.
    #[must_use]
    pub fn producing<T, F>(producer: F) -> Self
    where
        T: std::any::Any + Send + Sync,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::new(Arc::new(move |_container, _creational| {
            Ok(instance_of(producer()))
        }))
    }

    /// Sets the injection step.
    #[must_use]
    pub fn with_inject(mut self, inject: InjectFn) -> Self {
        self.inject = Some(inject);
        self
    }

    /// Sets the post-construct callback.
    #[must_use]
    pub fn with_post_construct(mut self, callback: LifecycleFn) -> Self {
        self.post_construct = Some(callback);
        self
    }

    /// Sets the pre-destroy callback.
    #[must_use]
    pub fn with_pre_destroy(mut self, callback: LifecycleFn) -> Self {
        self.pre_destroy = Some(callback);
        self
    }

    /// Binds a method body to an operation.
    #[must_use]
    pub fn with_method(mut self, key: OperationKey, method: MethodFn) -> Self {
        self.methods.insert(key, method);
        self
    }
}

impl std::fmt::Debug for BeanStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanStrategy")
            .field("has_inject", &self.inject.is_some())
            .field("has_post_construct", &self.post_construct.is_some())
            .field("has_pre_destroy", &self.pre_destroy.is_some())
            .field("methods", &self.methods.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_context::ContextError;
    use trellis_types::{instance_as, ScopeKind};

    #[test]
    fn producing_wraps_a_value() {
        let strategy = BeanStrategy::producing(|| 41_u32 + 1);
        assert!(strategy.inject.is_none());
        assert!(strategy.methods.is_empty());
        // The construct closure itself is exercised through the
        // container in integration tests; here we only check shape.
        assert!(!format!("{strategy:?}").contains("has_inject: true"));
    }

    #[test]
    fn container_error_collapses_into_intercept_failed() {
        let err: InterceptError = ContainerError::Stopped.into();
        match err {
            InterceptError::Failed(reason) => assert!(reason.contains("stopped")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn wrapped_intercept_error_unwraps_unchanged() {
        let original = InterceptError::Failed("business error".into());
        let wrapped = ContainerError::Intercept(original.clone());
        let back: InterceptError = wrapped.into();
        match back {
            InterceptError::Failed(reason) => assert_eq!(reason, "business error"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn context_error_keeps_its_message() {
        let err: InterceptError = ContainerError::Context(ContextError::NotActive {
            scope: ScopeKind::Request,
        })
        .into();
        assert!(err.to_string().contains("request"));
    }

    #[test]
    fn instance_of_roundtrip() {
        let strategy = BeanStrategy::producing(|| String::from("hello"));
        let _ = &strategy;
        let instance = instance_of(String::from("hello"));
        assert_eq!(
            instance_as::<String>(&instance).map(String::as_str),
            Some("hello")
        );
    }
}
