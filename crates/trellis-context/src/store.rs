//! Context stores — per-scope instance maps with creation exclusion.

use crate::CreationalContext;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use trellis_types::{BeanId, InstanceRef};

/// A stored contextual instance: the live object plus the creational
/// context that tracks its dependents.
///
/// Handles clone cheaply and share the underlying instance; identity
/// is pointer equality on the instance.
#[derive(Clone)]
pub struct ContextInstanceHandle {
    bean: BeanId,
    instance: InstanceRef,
    creational: CreationalContext,
}

impl ContextInstanceHandle {
    /// Creates a handle for a fully constructed instance.
    #[must_use]
    pub fn new(bean: BeanId, instance: InstanceRef, creational: CreationalContext) -> Self {
        Self {
            bean,
            instance,
            creational,
        }
    }

    /// The owning bean.
    #[must_use]
    pub fn bean(&self) -> &BeanId {
        &self.bean
    }

    /// The live instance.
    #[must_use]
    pub fn instance(&self) -> &InstanceRef {
        &self.instance
    }

    /// The creational context tracking this instance's dependents.
    #[must_use]
    pub fn creational(&self) -> &CreationalContext {
        &self.creational
    }

    /// Returns `true` if both handles refer to the same allocation.
    #[must_use]
    pub fn same_instance(&self, other: &ContextInstanceHandle) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

impl std::fmt::Debug for ContextInstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextInstanceHandle")
            .field("bean", &self.bean)
            .finish()
    }
}

/// Instance storage for one context activation.
///
/// # Single-Instance Guarantee
///
/// [`get_or_create`](Self::get_or_create) is mutually exclusive per
/// bean id: when several threads race to create the same bean, one
/// winner runs the creation closure and every other caller blocks on
/// that bean's guard, then receives the winner's handle. Creations of
/// *different* beans never contend, and no store-wide lock is held
/// while a creation closure runs — creation glue is free to resolve
/// other beans from the same store.
pub struct ContextStore {
    instances: RwLock<HashMap<BeanId, ContextInstanceHandle>>,
    // One guard per bean id; bounded by the number of beans.
    creation_guards: Mutex<HashMap<BeanId, Arc<Mutex<()>>>>,
}

impl ContextStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            instances: RwLock::new(HashMap::new()),
            creation_guards: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a store holding previously captured handles.
    #[must_use]
    pub fn with_handles(handles: Vec<ContextInstanceHandle>) -> Self {
        let store = Self::new();
        {
            let mut instances = store.instances.write();
            for handle in handles {
                instances.insert(handle.bean().clone(), handle);
            }
        }
        store
    }

    /// Looks up a stored instance without creating.
    #[must_use]
    pub fn get(&self, bean: &BeanId) -> Option<ContextInstanceHandle> {
        self.instances.read().get(bean).cloned()
    }

    /// Returns the stored handle for `bean`, creating it with
    /// `create` if absent.
    ///
    /// The creation closure runs outside every store-wide lock, under
    /// a per-bean guard. If the closure fails, nothing is published
    /// and the error is returned to the caller that ran it; callers
    /// that were blocked on the guard re-check and may attempt their
    /// own creation.
    pub fn get_or_create<E, F>(&self, bean: &BeanId, create: F) -> Result<ContextInstanceHandle, E>
    where
        F: FnOnce() -> Result<ContextInstanceHandle, E>,
    {
        if let Some(handle) = self.get(bean) {
            return Ok(handle);
        }

        let guard = {
            let mut guards = self.creation_guards.lock();
            guards.entry(bean.clone()).or_default().clone()
        };
        let _creating = guard.lock();

        // Re-check: another caller may have won the race while we
        // waited on the guard.
        if let Some(handle) = self.get(bean) {
            return Ok(handle);
        }

        let handle = create()?;
        tracing::debug!(bean = %bean, "publishing contextual instance");
        self.instances
            .write()
            .insert(bean.clone(), handle.clone());
        Ok(handle)
    }

    /// Removes one stored instance.
    pub fn remove(&self, bean: &BeanId) -> Option<ContextInstanceHandle> {
        self.instances.write().remove(bean)
    }

    /// A snapshot of all stored handles. Does not mutate the store —
    /// this is the capture half of context propagation.
    #[must_use]
    pub fn handles(&self) -> Vec<ContextInstanceHandle> {
        self.instances.read().values().cloned().collect()
    }

    /// Removes and returns all stored handles.
    #[must_use]
    pub fn drain(&self) -> Vec<ContextInstanceHandle> {
        self.instances.write().drain().map(|(_, h)| h).collect()
    }

    /// Number of stored instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}

impl Default for ContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextStore")
            .field("instances", &self.len())
            .finish()
    }
}
