//! Creational contexts — dependent-object ownership tracking.

use parking_lot::Mutex;
use std::sync::Arc;
use trellis_types::{BeanId, InstanceRef};

/// A dependent instance tracked by a creational context.
#[derive(Clone)]
pub struct DependentRecord {
    /// The dependent bean.
    pub bean: BeanId,
    /// The live instance.
    pub instance: InstanceRef,
    /// The dependent's own creational context (its sub-dependents).
    pub creational: CreationalContext,
}

impl std::fmt::Debug for DependentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependentRecord")
            .field("bean", &self.bean)
            .finish()
    }
}

/// Tracks the dependent-scoped instances created on behalf of one
/// owning instance.
///
/// Every bean creation runs under a creational context. Dependent
/// beans resolved during that creation are registered here; when the
/// owner is destroyed, its dependents are released with it, in
/// reverse creation order. Dependent instances are never stored in a
/// shared context store — this is their only owner.
///
/// Cloning is shallow: clones share the same tracking list, so a
/// creational context can travel with its instance handle.
///
/// # Example
///
/// ```
/// use trellis_context::CreationalContext;
/// use trellis_types::{instance_of, BeanId};
///
/// let ctx = CreationalContext::new();
/// ctx.track(BeanId::named("helper"), instance_of(1_u8), CreationalContext::new());
/// assert_eq!(ctx.dependent_count(), 1);
///
/// let drained = ctx.drain();
/// assert_eq!(drained.len(), 1);
/// assert_eq!(ctx.dependent_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct CreationalContext {
    dependents: Arc<Mutex<Vec<DependentRecord>>>,
}

impl CreationalContext {
    /// Creates an empty creational context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dependent instance under this owner.
    pub fn track(&self, bean: BeanId, instance: InstanceRef, creational: CreationalContext) {
        tracing::trace!(bean = %bean, "tracking dependent instance");
        self.dependents.lock().push(DependentRecord {
            bean,
            instance,
            creational,
        });
    }

    /// Number of directly tracked dependents.
    #[must_use]
    pub fn dependent_count(&self) -> usize {
        self.dependents.lock().len()
    }

    /// Removes and returns all tracked dependents, most recently
    /// created first — the order they must be destroyed in.
    ///
    /// The caller (the lifecycle controller) runs each dependent's
    /// pre-destroy chain and recurses into its creational context.
    #[must_use]
    pub fn drain(&self) -> Vec<DependentRecord> {
        let mut dependents = std::mem::take(&mut *self.dependents.lock());
        dependents.reverse();
        dependents
    }
}

impl std::fmt::Debug for CreationalContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationalContext")
            .field("dependents", &self.dependent_count())
            .finish()
    }
}
