//! Chain resolution — which interceptors apply, in which order.
//!
//! Resolution is pure: it reads the frozen metadata graph and
//! produces ordered interceptor ids. Binding bodies are attached
//! elsewhere; this module never executes anything.

use trellis_metadata::{
    BeanDef, Binding, InterceptionPhase, MetadataGraph, OperationDef,
};
use trellis_types::InterceptorId;

/// Resolves interceptor chains against a metadata graph.
///
/// # Algorithm
///
/// 1. Compute the *effective binding set* for (bean, operation):
///    bindings declared on the operation, on the bean, and on the bean
///    class itself; bindings on ancestor classes whose binding type is
///    `inherited`; and bindings contributed by stereotypes applied on
///    the bean class (always, regardless of the `inherited` flag).
/// 2. An interceptor applies iff its bound set is non-empty, every
///    one of its bindings (in canonical, non-binding-members-stripped
///    form) is in the effective set, and it declares the phase.
/// 3. Order ascending by priority; equal priorities keep graph
///    registration order (the sort is stable over the registration-
///    ordered interceptor list).
///
/// # Example
///
/// ```
/// use trellis_intercept::ChainResolver;
/// use trellis_metadata::{
///     BeanDef, Binding, BindingTypeDef, ClassDef, InterceptionPhase, InterceptorDef,
///     MetadataGraph, PhaseSet,
/// };
///
/// let graph = MetadataGraph::builder()
///     .add_binding_type(BindingTypeDef::new("Logged"))
///     .add_class(ClassDef::new("Greeter"))
///     .add_bean(BeanDef::new("greeter", "Greeter").with_binding(Binding::of("Logged")))
///     .add_interceptor(
///         InterceptorDef::new("logging")
///             .bound_to(Binding::of("Logged"))
///             .with_phases(PhaseSet::AROUND_INVOKE),
///     )
///     .build()
///     .expect("valid graph");
///
/// let resolver = ChainResolver::new(&graph);
/// let bean = &graph.beans()[0];
/// let chain = resolver.resolve(bean, None, InterceptionPhase::AroundInvoke);
/// assert_eq!(chain.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ChainResolver<'g> {
    graph: &'g MetadataGraph,
}

impl<'g> ChainResolver<'g> {
    /// Creates a resolver over the given graph.
    #[must_use]
    pub fn new(graph: &'g MetadataGraph) -> Self {
        Self { graph }
    }

    /// Computes the effective binding set for a bean and optional
    /// operation, in canonical form.
    ///
    /// Shared by every phase: chains for different phases differ only
    /// in phase applicability, never in the binding computation.
    #[must_use]
    pub fn effective_bindings(
        &self,
        bean: &BeanDef,
        operation: Option<&OperationDef>,
    ) -> Vec<Binding> {
        let mut effective: Vec<Binding> = Vec::new();

        if let Some(op) = operation {
            for binding in &op.bindings {
                push_unique(&mut effective, self.graph.normalize(binding));
            }
        }

        for binding in &bean.bindings {
            push_unique(&mut effective, self.graph.normalize(binding));
        }

        for (depth, class) in self.graph.hierarchy(&bean.class).iter().enumerate() {
            for binding in &class.bindings {
                // The bean class's own bindings are direct; ancestor
                // bindings apply only when the binding type inherits.
                let applies = depth == 0
                    || self
                        .graph
                        .binding_type(&binding.binding_type)
                        .is_some_and(|def| def.inherited);
                if applies {
                    push_unique(&mut effective, self.graph.normalize(binding));
                }
            }
        }

        for name in &bean.stereotypes {
            if let Some(stereotype) = self.graph.stereotype(name) {
                for binding in &stereotype.bindings {
                    push_unique(&mut effective, self.graph.normalize(binding));
                }
            }
        }

        effective
    }

    /// Resolves the ordered chain for (bean, operation, phase).
    ///
    /// Returns interceptor ids outermost-first. An empty result means
    /// the terminal runs unwrapped.
    #[must_use]
    pub fn resolve(
        &self,
        bean: &BeanDef,
        operation: Option<&OperationDef>,
        phase: InterceptionPhase,
    ) -> Vec<InterceptorId> {
        let effective = self.effective_bindings(bean, operation);
        if effective.is_empty() {
            return Vec::new();
        }

        let mut applying: Vec<_> = self
            .graph
            .interceptors()
            .iter()
            .filter(|i| i.phases.declares(phase))
            .filter(|i| {
                !i.bindings.is_empty()
                    && i.bindings
                        .iter()
                        .all(|b| effective.contains(&self.graph.normalize(b)))
            })
            .collect();

        // Stable sort: equal priorities keep registration order.
        applying.sort_by_key(|i| i.priority);

        let chain: Vec<InterceptorId> = applying.into_iter().map(|i| i.id.clone()).collect();
        tracing::trace!(
            bean = %bean.id,
            phase = %phase,
            chain_len = chain.len(),
            "resolved interceptor chain"
        );
        chain
    }
}

fn push_unique(set: &mut Vec<Binding>, binding: Binding) {
    if !set.contains(&binding) {
        set.push(binding);
    }
}
