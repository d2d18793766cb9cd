//! The container — resolution, invocation, events, shutdown.

use crate::{
    BeanStrategy, ContainerError, InstanceHandle, ObserverFn, RequestContext, ResolveError,
    Selection,
};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use trellis_context::{ContextInstanceHandle, CreationalContext, ManagedContext};
use trellis_intercept::{InterceptError, InterceptionChain, TerminalFn};
use trellis_metadata::{BeanDef, InterceptionPhase, MetadataGraph, OperationKey};
use trellis_types::{BeanId, InstanceRef, Qualifier, ScopeKind, TypeKey};

pub(crate) type ChainKey = (BeanId, Option<OperationKey>, InterceptionPhase);

pub(crate) struct ContainerInner {
    pub(crate) graph: MetadataGraph,
    pub(crate) strategies: HashMap<BeanId, BeanStrategy>,
    pub(crate) observer_bodies: HashMap<trellis_types::ObserverId, ObserverFn>,
    pub(crate) chains: HashMap<ChainKey, InterceptionChain>,
    pub(crate) singleton_ctx: ManagedContext,
    pub(crate) application_ctx: ManagedContext,
    pub(crate) request_ctx: ManagedContext,
    pub(crate) resolution_cache: RwLock<HashMap<(TypeKey, Vec<Qualifier>), Result<BeanId, ResolveError>>>,
    pub(crate) stopped: AtomicBool,
}

/// The Trellis container.
///
/// A cheap cloneable handle over shared state — there is no global
/// singleton; pass the handle to whoever needs it. Clones share the
/// same contexts, caches, and lifecycle.
///
/// # Surfaces
///
/// | Operation | Purpose |
/// |-----------|---------|
/// | [`instance`](Self::instance) | exactly-one typed resolution |
/// | [`select`](Self::select) | lazy/tolerant resolution |
/// | [`instance_by_name`](Self::instance_by_name) | tolerant named lookup |
/// | [`request_context`](Self::request_context) | activatable scope control |
/// | [`fire`](Self::fire) | event observer notification |
/// | [`shutdown`](Self::shutdown) | orderly teardown |
///
/// # Example
///
/// ```
/// use trellis_container::{BeanStrategy, Container};
/// use trellis_metadata::{BeanDef, ClassDef, MetadataGraph};
/// use trellis_types::{instance_as, ScopeKind};
///
/// let graph = MetadataGraph::builder()
///     .add_class(ClassDef::new("Greeter"))
///     .add_bean(
///         BeanDef::new("greeter", "Greeter")
///             .with_scope(ScopeKind::Application)
///             .with_type("GreetingService"),
///     )
///     .build()
///     .expect("valid graph");
///
/// let container = Container::builder(graph)
///     .bean("greeter", BeanStrategy::producing(|| String::from("hello")))
///     .build()
///     .expect("complete glue");
///
/// let handle = container.instance("GreetingService", &[]).expect("one match");
/// let instance = handle.get().expect("creation succeeds");
/// assert_eq!(instance_as::<String>(&instance).map(String::as_str), Some("hello"));
/// # container.shutdown().expect("clean shutdown");
/// ```
#[derive(Clone)]
pub struct Container {
    pub(crate) inner: Arc<ContainerInner>,
}

impl Container {
    /// Starts assembling a container over a frozen metadata graph.
    #[must_use]
    pub fn builder(graph: MetadataGraph) -> crate::ContainerBuilder {
        crate::ContainerBuilder::new(graph)
    }

    /// The metadata graph this container runs.
    #[must_use]
    pub fn graph(&self) -> &MetadataGraph {
        &self.inner.graph
    }

    /// Returns `true` until [`shutdown`](Self::shutdown) completes.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.inner.stopped.load(Ordering::SeqCst)
    }

    pub(crate) fn ensure_running(&self) -> Result<(), ContainerError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(ContainerError::Stopped)
        }
    }

    // ── Resolution ───────────────────────────────────────────

    /// Resolves exactly one bean by type and qualifiers and returns a
    /// handle to it.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Unsatisfied`] when nothing matches,
    /// [`ResolveError::Ambiguous`] when more than one bean matches,
    /// [`ContainerError::Stopped`] after shutdown.
    pub fn instance(
        &self,
        ty: impl Into<TypeKey>,
        qualifiers: &[Qualifier],
    ) -> Result<InstanceHandle, ContainerError> {
        self.ensure_running()?;
        let bean = self.resolve_bean(&ty.into(), qualifiers)?;
        Ok(self.handle_for(bean))
    }

    /// Returns a lazy selection for the given type and qualifiers.
    ///
    /// Resolution failures are deferred to the selection's accessors,
    /// so probing for an optional bean does not error eagerly.
    #[must_use]
    pub fn select(&self, ty: impl Into<TypeKey>, qualifiers: &[Qualifier]) -> Selection {
        Selection::new(self.clone(), ty.into(), qualifiers.to_vec())
    }

    /// Tolerant lookup by declared bean name.
    ///
    /// Returns `None` when no bean — or more than one — declares the
    /// name, mirroring the tolerant named-lookup contract.
    #[must_use]
    pub fn instance_by_name(&self, name: &str) -> Option<InstanceHandle> {
        if !self.is_running() {
            return None;
        }
        let mut matching = self.inner.graph.beans_by_name(name);
        let first = matching.next()?;
        if matching.next().is_some() {
            tracing::debug!(name, "ambiguous bean name, returning no handle");
            return None;
        }
        Some(self.handle_for(first.id.clone()))
    }

    fn handle_for(&self, bean: BeanId) -> InstanceHandle {
        let scope = self
            .inner
            .graph
            .bean(&bean)
            .map(BeanDef::scope)
            .unwrap_or(ScopeKind::Dependent);
        InstanceHandle::new(self.clone(), bean, scope)
    }

    pub(crate) fn resolve_bean(
        &self,
        ty: &TypeKey,
        qualifiers: &[Qualifier],
    ) -> Result<BeanId, ResolveError> {
        let key = (ty.clone(), qualifiers.to_vec());
        if let Some(cached) = self.inner.resolution_cache.read().get(&key) {
            return cached.clone();
        }

        let matching: Vec<&BeanDef> = self
            .inner
            .graph
            .beans_by_type(ty)
            .filter(|b| Qualifier::set_matches(qualifiers, &b.qualifiers))
            .collect();

        let result = match matching.as_slice() {
            [] => Err(ResolveError::Unsatisfied {
                ty: ty.clone(),
                qualifiers: qualifiers.to_vec(),
            }),
            [bean] => Ok(bean.id.clone()),
            many => Err(ResolveError::Ambiguous {
                ty: ty.clone(),
                candidates: many.iter().map(|b| b.id.name().to_string()).collect(),
            }),
        };

        self.inner
            .resolution_cache
            .write()
            .insert(key, result.clone());
        result
    }

    /// Resolves a dependency on behalf of glue that is constructing
    /// another bean.
    ///
    /// Shared-scope beans resolve through their context as usual;
    /// dependent beans are created fresh and registered under the
    /// *calling* creational context, so they are released with their
    /// owner.
    ///
    /// # Errors
    ///
    /// Resolution and creation errors, verbatim.
    pub fn resolve_into(
        &self,
        creational: &CreationalContext,
        ty: impl Into<TypeKey>,
        qualifiers: &[Qualifier],
    ) -> Result<InstanceRef, ContainerError> {
        self.ensure_running()?;
        let bean = self.resolve_bean(&ty.into(), qualifiers)?;
        let def = self.bean_def(&bean)?;
        if def.scope() == ScopeKind::Dependent {
            let handle = self.build_bean(&bean)?;
            creational.track(
                bean,
                handle.instance().clone(),
                handle.creational().clone(),
            );
            Ok(handle.instance().clone())
        } else {
            Ok(self.contextual_instance(&bean)?.instance().clone())
        }
    }

    // ── Contextual instances ─────────────────────────────────

    pub(crate) fn bean_def(&self, bean: &BeanId) -> Result<&BeanDef, ContainerError> {
        self.inner
            .graph
            .bean(bean)
            .ok_or_else(|| ContainerError::UnknownBean(bean.name().to_string()))
    }

    pub(crate) fn strategy(&self, bean: &BeanId) -> Result<&BeanStrategy, ContainerError> {
        self.inner
            .strategies
            .get(bean)
            .ok_or_else(|| ContainerError::MissingStrategy(bean.name().to_string()))
    }

    pub(crate) fn chain(
        &self,
        bean: &BeanId,
        operation: Option<OperationKey>,
        phase: InterceptionPhase,
    ) -> InterceptionChain {
        self.inner
            .chains
            .get(&(bean.clone(), operation, phase))
            .cloned()
            .unwrap_or_else(InterceptionChain::empty)
    }

    /// Returns the stored instance for a shared-scope bean, creating
    /// it under the per-(bean, context) creation guard on miss.
    pub(crate) fn contextual_instance(
        &self,
        bean: &BeanId,
    ) -> Result<ContextInstanceHandle, ContainerError> {
        let def = self.bean_def(bean)?;
        let context = match def.scope() {
            ScopeKind::Singleton => &self.inner.singleton_ctx,
            ScopeKind::Application => &self.inner.application_ctx,
            ScopeKind::Request => &self.inner.request_ctx,
            ScopeKind::Dependent => {
                // Dependent beans never live in a shared store.
                return self.build_bean(bean);
            }
        };
        let store = context.active_store()?;
        store.get_or_create(bean, || self.build_bean(bean))
    }

    // ── Invocation ───────────────────────────────────────────

    pub(crate) fn invoke_operation(
        &self,
        bean: &BeanId,
        instance: InstanceRef,
        operation: &str,
        args: Value,
    ) -> Result<Value, ContainerError> {
        self.ensure_running()?;
        let def = self.bean_def(bean)?;
        let op = def
            .operations
            .iter()
            .find(|o| o.name == operation)
            .ok_or_else(|| ContainerError::UnknownOperation {
                bean: bean.name().to_string(),
                operation: operation.to_string(),
            })?;
        let strategy = self.strategy(bean)?;
        let method = strategy
            .methods
            .get(&op.key)
            .ok_or_else(|| ContainerError::MissingMethod {
                bean: bean.name().to_string(),
                operation: op.signature.clone(),
            })?
            .clone();

        let terminal: TerminalFn = Arc::new(move |ctx| {
            let target = ctx
                .target
                .clone()
                .ok_or_else(|| InterceptError::MissingTarget {
                    phase: InterceptionPhase::AroundInvoke.as_str().to_string(),
                })?;
            (method)(&target, &ctx.parameters)
        });

        let chain = self.chain(bean, Some(op.key), InterceptionPhase::AroundInvoke);
        tracing::trace!(bean = %bean, operation, chain_len = chain.len(), "invoking operation");
        let mut ctx = chain
            .invocation(InterceptionPhase::AroundInvoke, bean.clone(), terminal)
            .with_operation(op.key)
            .with_target(instance)
            .with_parameters(args);
        Ok(ctx.proceed()?)
    }

    // ── Events ───────────────────────────────────────────────

    /// Fires an event: notifies every observer whose observed type
    /// matches and whose required qualifiers are all present on the
    /// fired event, synchronously, ascending priority order.
    ///
    /// # Errors
    ///
    /// The first observer failure propagates immediately; later
    /// observers are not notified.
    pub fn fire(
        &self,
        ty: impl Into<TypeKey>,
        qualifiers: &[Qualifier],
        payload: &Value,
    ) -> Result<(), ContainerError> {
        self.ensure_running()?;
        let ty = ty.into();
        let mut matching: Vec<_> = self
            .inner
            .graph
            .observers()
            .iter()
            .filter(|o| o.observed == ty)
            .filter(|o| Qualifier::set_matches(&o.qualifiers, qualifiers))
            .collect();
        // Stable sort: equal priorities keep registration order.
        matching.sort_by_key(|o| o.priority);

        tracing::debug!(event = %ty, observers = matching.len(), "firing event");
        for observer in matching {
            let body = self
                .inner
                .observer_bodies
                .get(&observer.id)
                .ok_or_else(|| {
                    ContainerError::MissingObserverBody(observer.id.name().to_string())
                })?;
            body(payload)?;
        }
        Ok(())
    }

    // ── Scope control & shutdown ─────────────────────────────

    /// Control surface for the activatable request scope.
    #[must_use]
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.clone())
    }

    /// Shuts the container down: terminates the request context if
    /// one is active, then the application context, then the
    /// singleton context, destroying every stored instance exactly
    /// once. Idempotent — a second call is a no-op.
    ///
    /// # Errors
    ///
    /// Individual destroy failures are logged and do not stop the
    /// teardown; the first context-level failure is returned after
    /// the teardown completes.
    pub fn shutdown(&self) -> Result<(), ContainerError> {
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            tracing::debug!("container already stopped");
            return Ok(());
        }

        if self.inner.request_ctx.is_active() {
            self.terminate_context(&self.inner.request_ctx);
        }
        self.terminate_context(&self.inner.application_ctx);
        self.terminate_context(&self.inner.singleton_ctx);

        self.inner.resolution_cache.write().clear();
        tracing::debug!("container shut down");
        Ok(())
    }

    fn terminate_context(&self, context: &ManagedContext) {
        match context.terminate() {
            Ok(handles) => {
                for handle in handles {
                    if let Err(err) = self.destroy_bean(&handle) {
                        tracing::warn!(
                            bean = %handle.bean(),
                            error = %err,
                            "pre-destroy failed during shutdown"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!(scope = %context.scope(), error = %err, "context termination failed");
            }
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("beans", &self.inner.graph.beans().len())
            .field("running", &self.is_running())
            .finish()
    }
}
