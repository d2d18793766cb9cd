//! Bean, interceptor, and observer descriptors.
//!
//! Descriptors are pure data: the create/destroy strategies and the
//! interceptor/observer bodies they reference are bound separately, by
//! id, when the container is assembled. The graph never holds code.

use crate::{Binding, OperationDef, PhaseSet};
use serde::{Deserialize, Serialize};
use trellis_types::{BeanId, InterceptorId, ObserverId, Qualifier, ScopeKind, TypeKey};

/// Descriptor of a managed bean.
///
/// Immutable once the graph is built. The declared scope may be
/// omitted, in which case the graph builder resolves it from the
/// bean's stereotypes (first one declaring a default) or falls back
/// to [`ScopeKind::Dependent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanDef {
    /// Bean identity.
    pub id: BeanId,
    /// Optional name for tolerant by-name lookup.
    pub name: Option<String>,
    /// Declared scope; `None` until resolved by the graph builder.
    pub scope: Option<ScopeKind>,
    /// Types this bean is resolvable by.
    pub types: Vec<TypeKey>,
    /// Declared qualifiers.
    pub qualifiers: Vec<Qualifier>,
    /// The bean class (root of its declared hierarchy).
    pub class: String,
    /// Directly-declared interceptor bindings, in declaration order.
    pub bindings: Vec<Binding>,
    /// Stereotypes applied on the bean class.
    pub stereotypes: Vec<String>,
    /// Business operations, canonicalized by the graph builder.
    pub operations: Vec<OperationDef>,
}

impl BeanDef {
    /// Declares a bean of the given class. The bean id derives from
    /// the declared bean name.
    #[must_use]
    pub fn new(bean_name: &str, class: impl Into<String>) -> Self {
        Self {
            id: BeanId::named(bean_name),
            name: None,
            scope: None,
            types: Vec::new(),
            qualifiers: Vec::new(),
            class: class.into(),
            bindings: Vec::new(),
            stereotypes: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Sets the EL-style name for by-name lookup.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the declared scope.
    #[must_use]
    pub fn with_scope(mut self, scope: ScopeKind) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Adds a resolvable type.
    #[must_use]
    pub fn with_type(mut self, ty: impl Into<TypeKey>) -> Self {
        self.types.push(ty.into());
        self
    }

    /// Adds a declared qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Adds a directly-declared binding.
    #[must_use]
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Applies a stereotype.
    #[must_use]
    pub fn with_stereotype(mut self, stereotype: impl Into<String>) -> Self {
        self.stereotypes.push(stereotype.into());
        self
    }

    /// Declares a business operation. Declarations sharing a canonical
    /// key (diamond routes) are merged by the graph builder.
    #[must_use]
    pub fn with_operation(mut self, operation: OperationDef) -> Self {
        self.operations.push(operation);
        self
    }

    /// The resolved scope.
    ///
    /// Only meaningful after graph build; defaults to `Dependent`
    /// when nothing was declared.
    #[must_use]
    pub fn scope(&self) -> ScopeKind {
        self.scope.unwrap_or(ScopeKind::Dependent)
    }
}

/// Descriptor of an interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterceptorDef {
    /// Interceptor identity.
    pub id: InterceptorId,
    /// The bindings this interceptor is bound to.
    pub bindings: Vec<Binding>,
    /// Numeric priority; lower value runs outermost.
    pub priority: i32,
    /// Phases this interceptor declares.
    pub phases: PhaseSet,
}

impl InterceptorDef {
    /// Declares an interceptor with default priority 100 and no
    /// phases.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: InterceptorId::named(name),
            bindings: Vec::new(),
            priority: 100,
            phases: PhaseSet::empty(),
        }
    }

    /// Adds a bound binding.
    #[must_use]
    pub fn bound_to(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Declares applicable phases.
    #[must_use]
    pub fn with_phases(mut self, phases: PhaseSet) -> Self {
        self.phases |= phases;
        self
    }
}

/// Descriptor of an event observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverDef {
    /// Observer identity.
    pub id: ObserverId,
    /// The event type this observer receives.
    pub observed: TypeKey,
    /// Qualifiers the fired event must carry for this observer to be
    /// notified. Empty = notified for any event of the type.
    pub qualifiers: Vec<Qualifier>,
    /// Numeric priority; lower value notified first.
    pub priority: i32,
}

impl ObserverDef {
    /// Declares an observer of the given event type.
    #[must_use]
    pub fn new(name: &str, observed: impl Into<TypeKey>) -> Self {
        Self {
            id: ObserverId::named(name),
            observed: observed.into(),
            qualifiers: Vec::new(),
            priority: 100,
        }
    }

    /// Adds a required qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InterceptionPhase;

    #[test]
    fn bean_def_builders() {
        let bean = BeanDef::new("greeter", "Greeter")
            .named("greeter")
            .with_scope(ScopeKind::Application)
            .with_type("GreetingService")
            .with_qualifier(Qualifier::new("Premium"))
            .with_binding(Binding::of("Logged"))
            .with_stereotype("WebService");

        assert_eq!(bean.id, BeanId::named("greeter"));
        assert_eq!(bean.name.as_deref(), Some("greeter"));
        assert_eq!(bean.scope(), ScopeKind::Application);
        assert_eq!(bean.types, vec![TypeKey::of("GreetingService")]);
        assert_eq!(bean.stereotypes, vec!["WebService".to_string()]);
    }

    #[test]
    fn bean_scope_defaults_to_dependent() {
        let bean = BeanDef::new("helper", "Helper");
        assert_eq!(bean.scope(), ScopeKind::Dependent);
    }

    #[test]
    fn interceptor_def_defaults() {
        let def = InterceptorDef::new("logging");
        assert_eq!(def.priority, 100);
        assert!(def.phases.is_empty());
    }

    #[test]
    fn interceptor_def_builders() {
        let def = InterceptorDef::new("logging")
            .bound_to(Binding::of("Logged"))
            .with_priority(10)
            .with_phases(PhaseSet::AROUND_INVOKE | PhaseSet::PRE_DESTROY);
        assert_eq!(def.priority, 10);
        assert!(def.phases.declares(InterceptionPhase::AroundInvoke));
        assert!(def.phases.declares(InterceptionPhase::PreDestroy));
        assert!(!def.phases.declares(InterceptionPhase::PostConstruct));
    }

    #[test]
    fn observer_def_builders() {
        let def = ObserverDef::new("audit", "OrderPlaced")
            .with_qualifier(Qualifier::new("Priority"))
            .with_priority(5);
        assert_eq!(def.observed, TypeKey::of("OrderPlaced"));
        assert_eq!(def.priority, 5);
        assert_eq!(def.qualifiers.len(), 1);
    }
}
