//! Container assembly — binding glue to the graph and precomputing
//! chains.

use crate::container::{ChainKey, ContainerInner};
use crate::{BeanStrategy, Container, ContainerError, ObserverFn};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use trellis_context::ManagedContext;
use trellis_intercept::{ChainEntry, ChainResolver, InterceptionChain, InterceptorFn};
use trellis_metadata::{BeanDef, InterceptionPhase, MetadataGraph};
use trellis_types::{InterceptorId, ObserverId, ScopeKind};

/// Assembles a [`Container`] from a frozen graph plus invocation
/// glue.
///
/// [`build`](Self::build) validates completeness — every bean needs a
/// strategy, every declared operation a method body, every resolved
/// chain member and every observer a bound body — and precomputes all
/// interceptor chains, so nothing is resolved per call at runtime.
///
/// # Example
///
/// ```
/// use trellis_container::{BeanStrategy, Container};
/// use trellis_metadata::{BeanDef, ClassDef, MetadataGraph};
/// use trellis_types::ScopeKind;
///
/// let graph = MetadataGraph::builder()
///     .add_class(ClassDef::new("Clock"))
///     .add_bean(BeanDef::new("clock", "Clock").with_scope(ScopeKind::Singleton))
///     .build()
///     .expect("valid graph");
///
/// let container = Container::builder(graph)
///     .bean("clock", BeanStrategy::producing(|| 0_u64))
///     .build()
///     .expect("complete glue");
/// # container.shutdown().expect("clean shutdown");
/// ```
pub struct ContainerBuilder {
    graph: MetadataGraph,
    strategies: HashMap<trellis_types::BeanId, BeanStrategy>,
    interceptor_bodies: HashMap<InterceptorId, InterceptorFn>,
    observer_bodies: HashMap<ObserverId, ObserverFn>,
}

impl ContainerBuilder {
    pub(crate) fn new(graph: MetadataGraph) -> Self {
        Self {
            graph,
            strategies: HashMap::new(),
            interceptor_bodies: HashMap::new(),
            observer_bodies: HashMap::new(),
        }
    }

    /// Binds a strategy to the bean declared with `bean_name`.
    #[must_use]
    pub fn bean(mut self, bean_name: &str, strategy: BeanStrategy) -> Self {
        self.strategies
            .insert(trellis_types::BeanId::named(bean_name), strategy);
        self
    }

    /// Binds a body to the interceptor declared with
    /// `interceptor_name`.
    #[must_use]
    pub fn interceptor(mut self, interceptor_name: &str, body: InterceptorFn) -> Self {
        self.interceptor_bodies
            .insert(InterceptorId::named(interceptor_name), body);
        self
    }

    /// Binds a body to the observer declared with `observer_name`.
    #[must_use]
    pub fn observer(mut self, observer_name: &str, body: ObserverFn) -> Self {
        self.observer_bodies
            .insert(ObserverId::named(observer_name), body);
        self
    }

    /// Validates glue completeness, precomputes every interceptor
    /// chain, activates the always-on contexts, and starts the
    /// container.
    ///
    /// # Errors
    ///
    /// `CONTAINER_MISSING_STRATEGY`, `CONTAINER_MISSING_METHOD`,
    /// `CONTAINER_MISSING_INTERCEPTOR_BODY`, or
    /// `CONTAINER_MISSING_OBSERVER_BODY` on incomplete glue.
    pub fn build(self) -> Result<Container, ContainerError> {
        let resolver = ChainResolver::new(&self.graph);
        let mut chains: HashMap<ChainKey, InterceptionChain> = HashMap::new();

        for bean in self.graph.beans() {
            let strategy = self
                .strategies
                .get(&bean.id)
                .ok_or_else(|| ContainerError::MissingStrategy(bean.id.name().to_string()))?;
            for op in &bean.operations {
                if !strategy.methods.contains_key(&op.key) {
                    return Err(ContainerError::MissingMethod {
                        bean: bean.id.name().to_string(),
                        operation: op.signature.clone(),
                    });
                }
            }

            for phase in [
                InterceptionPhase::AroundConstruct,
                InterceptionPhase::PostConstruct,
                InterceptionPhase::PreDestroy,
            ] {
                let chain = self.chain_for(&resolver, bean, None, phase)?;
                if !chain.is_empty() {
                    chains.insert((bean.id.clone(), None, phase), chain);
                }
            }
            for op in &bean.operations {
                let chain =
                    self.chain_for(&resolver, bean, Some(op), InterceptionPhase::AroundInvoke)?;
                if !chain.is_empty() {
                    chains.insert(
                        (bean.id.clone(), Some(op.key), InterceptionPhase::AroundInvoke),
                        chain,
                    );
                }
            }
        }

        for observer in self.graph.observers() {
            if !self.observer_bodies.contains_key(&observer.id) {
                return Err(ContainerError::MissingObserverBody(
                    observer.id.name().to_string(),
                ));
            }
        }

        let singleton_ctx = ManagedContext::new(ScopeKind::Singleton);
        let application_ctx = ManagedContext::new(ScopeKind::Application);
        singleton_ctx.activate()?;
        application_ctx.activate()?;

        tracing::debug!(
            beans = self.graph.beans().len(),
            interceptors = self.graph.interceptors().len(),
            chains = chains.len(),
            "container started"
        );

        Ok(Container {
            inner: Arc::new(ContainerInner {
                graph: self.graph,
                strategies: self.strategies,
                observer_bodies: self.observer_bodies,
                chains,
                singleton_ctx,
                application_ctx,
                request_ctx: ManagedContext::new(ScopeKind::Request),
                resolution_cache: RwLock::new(HashMap::new()),
                stopped: AtomicBool::new(false),
            }),
        })
    }

    fn chain_for(
        &self,
        resolver: &ChainResolver<'_>,
        bean: &BeanDef,
        operation: Option<&trellis_metadata::OperationDef>,
        phase: InterceptionPhase,
    ) -> Result<InterceptionChain, ContainerError> {
        let ids = resolver.resolve(bean, operation, phase);
        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            let body = self.interceptor_bodies.get(&id).ok_or_else(|| {
                ContainerError::MissingInterceptorBody(id.name().to_string())
            })?;
            entries.push(ChainEntry::new(id, body.clone()));
        }
        Ok(InterceptionChain::new(entries))
    }
}

impl std::fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("beans_bound", &self.strategies.len())
            .field("interceptors_bound", &self.interceptor_bodies.len())
            .field("observers_bound", &self.observer_bodies.len())
            .finish()
    }
}
