//! The activation state machine for one scope.

use crate::{ContextError, ContextInstanceHandle, ContextStore};
use parking_lot::RwLock;
use std::sync::Arc;
use trellis_types::ScopeKind;

/// Activation/deactivation/termination state machine for one scope's
/// context.
///
/// # Ownership Contract
///
/// An active context store has exactly one logical owner: the claim
/// that activated it. To move a logical context across threads,
/// capture its handles ([`captured_handles`](Self::captured_handles)),
/// deactivate here, and resume on the other thread with
/// [`activate_with`](Self::activate_with). Nothing is derived from
/// thread identity — propagation is explicit message passing of the
/// captured snapshot.
///
/// # Transitions
///
/// | From | Operation | To | Instances |
/// |------|-----------|----|-----------|
/// | Inactive | `activate` | Active (fresh store) | — |
/// | Inactive | `activate_with` | Active (captured store) | reused |
/// | Active | `deactivate` | Inactive | untouched |
/// | Active | `terminate` | Inactive | returned for destruction |
/// | Active | `activate*` | error | — |
/// | Inactive | `deactivate`/`terminate` | error | — |
///
/// # Example
///
/// ```
/// use trellis_context::ManagedContext;
/// use trellis_types::ScopeKind;
///
/// let ctx = ManagedContext::new(ScopeKind::Request);
/// assert!(!ctx.is_active());
///
/// ctx.activate().expect("first activation");
/// assert!(ctx.is_active());
/// assert!(ctx.activate().is_err()); // double activation is illegal
///
/// let captured = ctx.captured_handles().expect("active context");
/// ctx.deactivate().expect("deactivation");
/// ctx.activate_with(captured).expect("resume");
/// ```
pub struct ManagedContext {
    scope: ScopeKind,
    // None = inactive. The Arc lets resolution hold the store while
    // creation glue runs without keeping this lock.
    store: RwLock<Option<Arc<ContextStore>>>,
}

impl ManagedContext {
    /// Creates an inactive context for the given scope.
    #[must_use]
    pub fn new(scope: ScopeKind) -> Self {
        Self {
            scope,
            store: RwLock::new(None),
        }
    }

    /// The scope this context manages.
    #[must_use]
    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    /// Returns `true` if a claim is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.store.read().is_some()
    }

    /// Activates with a fresh, empty store.
    ///
    /// # Errors
    ///
    /// [`ContextError::AlreadyActive`] if a claim is already active.
    pub fn activate(&self) -> Result<(), ContextError> {
        self.install(Arc::new(ContextStore::new()))
    }

    /// Activates with previously captured handles, resuming a logical
    /// context — typically on a different thread than the one that
    /// captured it. No instances are re-created.
    ///
    /// # Errors
    ///
    /// [`ContextError::AlreadyActive`] if a claim is already active.
    pub fn activate_with(&self, handles: Vec<ContextInstanceHandle>) -> Result<(), ContextError> {
        self.install(Arc::new(ContextStore::with_handles(handles)))
    }

    fn install(&self, store: Arc<ContextStore>) -> Result<(), ContextError> {
        let mut slot = self.store.write();
        if slot.is_some() {
            return Err(ContextError::AlreadyActive { scope: self.scope });
        }
        tracing::debug!(scope = %self.scope, instances = store.len(), "context activated");
        *slot = Some(store);
        Ok(())
    }

    /// The active store, for resolution.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] if no claim is active.
    pub fn active_store(&self) -> Result<Arc<ContextStore>, ContextError> {
        self.store.read().clone().ok_or(ContextError::NotActive {
            scope: self.scope,
        })
    }

    /// A snapshot of the current store's handles. State is not
    /// mutated — this is the capture half of the propagation
    /// contract.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] if no claim is active.
    pub fn captured_handles(&self) -> Result<Vec<ContextInstanceHandle>, ContextError> {
        Ok(self.active_store()?.handles())
    }

    /// Releases the active claim WITHOUT destroying instances.
    ///
    /// Instances not captured beforehand become unreachable; capture
    /// with [`captured_handles`](Self::captured_handles) first if they
    /// are to survive.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] if no claim is active.
    pub fn deactivate(&self) -> Result<(), ContextError> {
        let mut slot = self.store.write();
        match slot.take() {
            Some(store) => {
                tracing::debug!(scope = %self.scope, instances = store.len(), "context deactivated");
                Ok(())
            }
            None => Err(ContextError::NotActive { scope: self.scope }),
        }
    }

    /// Deactivates and returns every stored handle for destruction.
    ///
    /// The caller owns the returned handles and must run each one's
    /// pre-destroy sequence; this type has no access to destroy glue.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotActive`] if no claim is active.
    pub fn terminate(&self) -> Result<Vec<ContextInstanceHandle>, ContextError> {
        let mut slot = self.store.write();
        match slot.take() {
            Some(store) => {
                let handles = store.drain();
                tracing::debug!(
                    scope = %self.scope,
                    instances = handles.len(),
                    "context terminated"
                );
                Ok(handles)
            }
            None => Err(ContextError::NotActive { scope: self.scope }),
        }
    }
}

impl std::fmt::Debug for ManagedContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedContext")
            .field("scope", &self.scope)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreationalContext;
    use std::convert::Infallible;
    use trellis_types::{instance_of, BeanId};

    fn request_context() -> ManagedContext {
        ManagedContext::new(ScopeKind::Request)
    }

    fn store_one(ctx: &ManagedContext, name: &str) -> ContextInstanceHandle {
        let bean = BeanId::named(name);
        ctx.active_store()
            .expect("active context")
            .get_or_create::<Infallible, _>(&bean, || {
                Ok(ContextInstanceHandle::new(
                    bean.clone(),
                    instance_of(0_u32),
                    CreationalContext::new(),
                ))
            })
            .expect("creation succeeds")
    }

    // ── Transitions ──────────────────────────────────────────

    #[test]
    fn activate_then_deactivate() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        assert!(ctx.is_active());
        ctx.deactivate().expect("deactivation");
        assert!(!ctx.is_active());
    }

    #[test]
    fn double_activate_is_an_error() {
        let ctx = request_context();
        ctx.activate().expect("first activation");
        let err = ctx.activate().expect_err("second activation must fail");
        assert!(matches!(err, ContextError::AlreadyActive { .. }));
        // The active claim is untouched.
        assert!(ctx.is_active());
    }

    #[test]
    fn activate_with_on_active_context_is_an_error() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        let err = ctx
            .activate_with(Vec::new())
            .expect_err("resume over active claim must fail");
        assert!(matches!(err, ContextError::AlreadyActive { .. }));
    }

    #[test]
    fn deactivate_inactive_is_an_error() {
        let ctx = request_context();
        let err = ctx.deactivate().expect_err("deactivate inactive");
        assert!(matches!(err, ContextError::NotActive { .. }));
    }

    #[test]
    fn terminate_inactive_is_an_error() {
        let ctx = request_context();
        let err = ctx.terminate().expect_err("terminate inactive");
        assert!(matches!(err, ContextError::NotActive { .. }));
    }

    #[test]
    fn store_access_requires_active_claim() {
        let ctx = request_context();
        assert!(ctx.active_store().is_err());
        assert!(ctx.captured_handles().is_err());
    }

    // ── Capture & resume ─────────────────────────────────────

    #[test]
    fn deactivate_does_not_destroy() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        let original = store_one(&ctx, "greeter");

        let captured = ctx.captured_handles().expect("capture");
        ctx.deactivate().expect("deactivation");

        // The captured handle still refers to the live instance.
        assert_eq!(captured.len(), 1);
        assert!(captured[0].same_instance(&original));
    }

    #[test]
    fn resume_returns_the_exact_captured_instance() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        let original = store_one(&ctx, "greeter");
        let captured = ctx.captured_handles().expect("capture");
        ctx.deactivate().expect("deactivation");

        ctx.activate_with(captured).expect("resume");
        let resumed = ctx
            .active_store()
            .expect("active context")
            .get(original.bean())
            .expect("instance present after resume");
        assert!(resumed.same_instance(&original));
    }

    #[test]
    fn resume_on_another_thread() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        let original = store_one(&ctx, "greeter");
        let captured = ctx.captured_handles().expect("capture");
        ctx.deactivate().expect("deactivation");

        std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    ctx.activate_with(captured).expect("resume on new thread");
                    let resumed = ctx
                        .active_store()
                        .expect("active context")
                        .get(original.bean())
                        .expect("instance present");
                    assert!(resumed.same_instance(&original));
                    ctx.deactivate().expect("deactivate on new thread");
                })
                .join()
                .expect("hop thread must not panic");
        });
        assert!(!ctx.is_active());
    }

    #[test]
    fn terminate_returns_each_handle_exactly_once() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        store_one(&ctx, "a");
        store_one(&ctx, "b");

        let handles = ctx.terminate().expect("termination");
        assert_eq!(handles.len(), 2);
        assert!(!ctx.is_active());

        // A fresh activation starts empty.
        ctx.activate().expect("re-activation");
        assert!(ctx
            .active_store()
            .expect("active context")
            .is_empty());
    }

    #[test]
    fn capture_does_not_mutate_state() {
        let ctx = request_context();
        ctx.activate().expect("activation");
        store_one(&ctx, "greeter");

        let first = ctx.captured_handles().expect("first capture");
        let second = ctx.captured_handles().expect("second capture");
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert!(ctx.is_active());
    }
}
