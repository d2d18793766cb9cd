//! The immutable metadata graph and its builder.
//!
//! The graph is the container's entire world-knowledge: binding
//! types, stereotypes, class hierarchies, beans, interceptors, and
//! observers, produced once by an external build step and consumed
//! read-only. Validation happens at [`MetadataGraphBuilder::build`];
//! a frozen graph can be trusted not to dangle.

use crate::{
    BeanDef, Binding, BindingTypeDef, ClassDef, GraphError, InterceptorDef, ObserverDef,
    StereotypeDef,
};
use std::collections::{HashMap, HashSet};
use trellis_types::{BeanId, TypeKey};

/// Immutable, validated metadata graph.
///
/// # Ordering Guarantees
///
/// Beans, interceptors, and observers keep their registration order.
/// Interceptor registration order is the documented tie-break for
/// equal priorities, so it is part of the graph's contract.
///
/// # Example
///
/// ```
/// use trellis_metadata::{BeanDef, ClassDef, MetadataGraph};
/// use trellis_types::ScopeKind;
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
/// assert_eq!(graph.beans().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MetadataGraph {
    binding_types: HashMap<String, BindingTypeDef>,
    stereotypes: HashMap<String, StereotypeDef>,
    classes: HashMap<String, ClassDef>,
    beans: Vec<BeanDef>,
    beans_by_id: HashMap<BeanId, usize>,
    interceptors: Vec<InterceptorDef>,
    observers: Vec<ObserverDef>,
}

impl MetadataGraph {
    /// Starts building a graph.
    #[must_use]
    pub fn builder() -> MetadataGraphBuilder {
        MetadataGraphBuilder::new()
    }

    /// All beans, in registration order.
    #[must_use]
    pub fn beans(&self) -> &[BeanDef] {
        &self.beans
    }

    /// Looks up a bean by id.
    #[must_use]
    pub fn bean(&self, id: &BeanId) -> Option<&BeanDef> {
        self.beans_by_id.get(id).map(|&i| &self.beans[i])
    }

    /// Beans resolvable by the given type, in registration order.
    pub fn beans_by_type<'a>(&'a self, ty: &'a TypeKey) -> impl Iterator<Item = &'a BeanDef> {
        self.beans.iter().filter(move |b| b.types.contains(ty))
    }

    /// Beans declaring the given name, in registration order.
    pub fn beans_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a BeanDef> {
        self.beans
            .iter()
            .filter(move |b| b.name.as_deref() == Some(name))
    }

    /// All interceptors, in registration order (the priority
    /// tie-break order).
    #[must_use]
    pub fn interceptors(&self) -> &[InterceptorDef] {
        &self.interceptors
    }

    /// All observers, in registration order.
    #[must_use]
    pub fn observers(&self) -> &[ObserverDef] {
        &self.observers
    }

    /// Looks up a binding type declaration.
    #[must_use]
    pub fn binding_type(&self, name: &str) -> Option<&BindingTypeDef> {
        self.binding_types.get(name)
    }

    /// Looks up a stereotype declaration.
    #[must_use]
    pub fn stereotype(&self, name: &str) -> Option<&StereotypeDef> {
        self.stereotypes.get(name)
    }

    /// Looks up a class declaration.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    /// The class hierarchy starting at `class`, root class first,
    /// then each superclass in order. Unknown names yield an empty
    /// hierarchy (a frozen graph never dangles; this tolerates probe
    /// lookups).
    #[must_use]
    pub fn hierarchy(&self, class: &str) -> Vec<&ClassDef> {
        let mut chain = Vec::new();
        let mut current = self.classes.get(class);
        while let Some(def) = current {
            chain.push(def);
            current = def
                .superclass
                .as_deref()
                .and_then(|name| self.classes.get(name));
        }
        chain
    }

    /// Returns the binding in canonical form: member values excluded
    /// by its binding type's non-binding list are stripped.
    #[must_use]
    pub fn normalize(&self, binding: &Binding) -> Binding {
        match self.binding_types.get(&binding.binding_type) {
            Some(def) => binding.normalized(&def.non_binding_members),
            None => binding.clone(),
        }
    }
}

/// Builder for [`MetadataGraph`].
///
/// Collects declarations in any order; all cross-references are
/// checked at [`build`](Self::build).
#[derive(Debug, Default)]
pub struct MetadataGraphBuilder {
    binding_types: Vec<BindingTypeDef>,
    stereotypes: Vec<StereotypeDef>,
    classes: Vec<ClassDef>,
    beans: Vec<BeanDef>,
    interceptors: Vec<InterceptorDef>,
    observers: Vec<ObserverDef>,
}

impl MetadataGraphBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a binding type.
    #[must_use]
    pub fn add_binding_type(mut self, def: BindingTypeDef) -> Self {
        self.binding_types.push(def);
        self
    }

    /// Declares a stereotype.
    #[must_use]
    pub fn add_stereotype(mut self, def: StereotypeDef) -> Self {
        self.stereotypes.push(def);
        self
    }

    /// Declares a class.
    #[must_use]
    pub fn add_class(mut self, def: ClassDef) -> Self {
        self.classes.push(def);
        self
    }

    /// Declares a bean.
    #[must_use]
    pub fn add_bean(mut self, def: BeanDef) -> Self {
        self.beans.push(def);
        self
    }

    /// Declares an interceptor.
    #[must_use]
    pub fn add_interceptor(mut self, def: InterceptorDef) -> Self {
        self.interceptors.push(def);
        self
    }

    /// Declares an observer.
    #[must_use]
    pub fn add_observer(mut self, def: ObserverDef) -> Self {
        self.observers.push(def);
        self
    }

    /// Validates all declarations and freezes the graph.
    ///
    /// # Errors
    ///
    /// Returns the first [`GraphError`] encountered: duplicate ids or
    /// names, dangling class/stereotype/binding-type references, or a
    /// superclass cycle.
    pub fn build(self) -> Result<MetadataGraph, GraphError> {
        let mut binding_types = HashMap::new();
        for def in self.binding_types {
            let name = def.name.clone();
            if binding_types.insert(name.clone(), def).is_some() {
                return Err(GraphError::DuplicateBindingType(name));
            }
        }

        let mut classes: HashMap<String, ClassDef> = HashMap::new();
        for def in self.classes {
            let name = def.name.clone();
            if classes.insert(name.clone(), def).is_some() {
                return Err(GraphError::DuplicateClass(name));
            }
        }

        let mut stereotypes: HashMap<String, StereotypeDef> = HashMap::new();
        for def in self.stereotypes {
            let name = def.name.clone();
            if stereotypes.insert(name.clone(), def).is_some() {
                return Err(GraphError::DuplicateStereotype(name));
            }
        }

        // Superclass edges must resolve and must not loop.
        for class in classes.values() {
            if let Some(superclass) = class.superclass.as_deref() {
                if !classes.contains_key(superclass) {
                    return Err(GraphError::UnknownSuperclass {
                        class: class.name.clone(),
                        superclass: superclass.to_string(),
                    });
                }
            }
            let mut seen = HashSet::new();
            let mut cursor = Some(class);
            while let Some(def) = cursor {
                if !seen.insert(def.name.as_str()) {
                    return Err(GraphError::ClassCycle(def.name.clone()));
                }
                cursor = def.superclass.as_deref().and_then(|n| classes.get(n));
            }
        }

        for class in classes.values() {
            check_bindings(&class.bindings, &class.name, &binding_types)?;
        }
        for stereotype in stereotypes.values() {
            check_bindings(&stereotype.bindings, &stereotype.name, &binding_types)?;
        }

        let mut interceptors = Vec::with_capacity(self.interceptors.len());
        let mut interceptor_ids = HashSet::new();
        for def in self.interceptors {
            if !interceptor_ids.insert(def.id.clone()) {
                return Err(GraphError::DuplicateInterceptor(def.id.name().to_string()));
            }
            check_bindings(&def.bindings, def.id.name(), &binding_types)?;
            interceptors.push(def);
        }

        let mut beans = Vec::with_capacity(self.beans.len());
        let mut beans_by_id = HashMap::new();
        for mut bean in self.beans {
            if beans_by_id.contains_key(&bean.id) {
                return Err(GraphError::DuplicateBean(bean.id.name().to_string()));
            }
            if !classes.contains_key(&bean.class) {
                return Err(GraphError::UnknownClass {
                    bean: bean.id.name().to_string(),
                    class: bean.class.clone(),
                });
            }
            for stereotype in &bean.stereotypes {
                if !stereotypes.contains_key(stereotype) {
                    return Err(GraphError::UnknownStereotype {
                        bean: bean.id.name().to_string(),
                        stereotype: stereotype.clone(),
                    });
                }
            }
            check_bindings(&bean.bindings, bean.id.name(), &binding_types)?;
            for op in &bean.operations {
                check_bindings(&op.bindings, bean.id.name(), &binding_types)?;
            }

            // Resolve the effective scope: explicit declaration wins,
            // then the first stereotype declaring a default.
            if bean.scope.is_none() {
                bean.scope = bean
                    .stereotypes
                    .iter()
                    .filter_map(|s| stereotypes.get(s))
                    .find_map(|s| s.default_scope);
            }

            // Collapse operation declarations sharing a canonical key
            // (diamond default-method routes) into one.
            let mut merged: Vec<crate::OperationDef> = Vec::with_capacity(bean.operations.len());
            for op in std::mem::take(&mut bean.operations) {
                match merged.iter_mut().find(|m| m.key == op.key) {
                    Some(existing) => existing.merge(op),
                    None => merged.push(op),
                }
            }
            bean.operations = merged;

            beans_by_id.insert(bean.id.clone(), beans.len());
            beans.push(bean);
        }

        let mut observers = Vec::with_capacity(self.observers.len());
        let mut observer_ids = HashSet::new();
        for def in self.observers {
            if !observer_ids.insert(def.id.clone()) {
                return Err(GraphError::DuplicateObserver(def.id.name().to_string()));
            }
            observers.push(def);
        }

        Ok(MetadataGraph {
            binding_types,
            stereotypes,
            classes,
            beans,
            beans_by_id,
            interceptors,
            observers,
        })
    }
}

fn check_bindings(
    bindings: &[Binding],
    owner: &str,
    binding_types: &HashMap<String, BindingTypeDef>,
) -> Result<(), GraphError> {
    for binding in bindings {
        if !binding_types.contains_key(&binding.binding_type) {
            return Err(GraphError::UnknownBindingType {
                owner: owner.to_string(),
                binding_type: binding.binding_type.clone(),
            });
        }
    }
    Ok(())
}
