//! Request-scope control surface.

use crate::{Container, ContainerError};
use trellis_context::ContextInstanceHandle;

/// Control handle for the activatable request scope.
///
/// Wraps the container's request [`ManagedContext`] so that
/// [`terminate`](Self::terminate) can run the pre-destroy sequence —
/// the raw state machine has no access to destroy glue.
///
/// Cheap to clone and `Send`: capture handles, move the
/// `RequestContext` (or another clone of the container) to the target
/// thread, and resume there.
///
/// [`ManagedContext`]: trellis_context::ManagedContext
///
/// # Example
///
/// ```
/// use trellis_container::Container;
/// use trellis_metadata::MetadataGraph;
///
/// let container = Container::builder(
///     MetadataGraph::builder().build().expect("empty graph"),
/// )
/// .build()
/// .expect("no glue needed");
///
/// let request = container.request_context();
/// request.activate().expect("activation");
/// let captured = request.captured_handles().expect("capture");
/// request.deactivate().expect("non-destructive release");
/// request.activate_with(captured).expect("resume");
/// request.terminate().expect("destructive teardown");
/// # container.shutdown().expect("clean shutdown");
/// ```
#[derive(Clone)]
pub struct RequestContext {
    container: Container,
}

impl RequestContext {
    pub(crate) fn new(container: Container) -> Self {
        Self { container }
    }

    /// Returns `true` if a claim is currently active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.container.inner.request_ctx.is_active()
    }

    /// Activates the request scope with a fresh, empty store.
    ///
    /// # Errors
    ///
    /// `CONTEXT_ALREADY_ACTIVE` if a claim is already active;
    /// `CONTAINER_STOPPED` after shutdown.
    pub fn activate(&self) -> Result<(), ContainerError> {
        self.container.ensure_running()?;
        Ok(self.container.inner.request_ctx.activate()?)
    }

    /// Resumes a previously captured logical context — typically on a
    /// different thread than the one that captured it. No instances
    /// are re-created.
    ///
    /// # Errors
    ///
    /// `CONTEXT_ALREADY_ACTIVE` if a claim is already active;
    /// `CONTAINER_STOPPED` after shutdown.
    pub fn activate_with(
        &self,
        handles: Vec<ContextInstanceHandle>,
    ) -> Result<(), ContainerError> {
        self.container.ensure_running()?;
        Ok(self.container.inner.request_ctx.activate_with(handles)?)
    }

    /// Captures the current store's handles without mutating state.
    ///
    /// # Errors
    ///
    /// `CONTEXT_NOT_ACTIVE` if no claim is active.
    pub fn captured_handles(&self) -> Result<Vec<ContextInstanceHandle>, ContainerError> {
        Ok(self.container.inner.request_ctx.captured_handles()?)
    }

    /// Releases the active claim WITHOUT destroying instances.
    /// Capture first if they are to survive.
    ///
    /// # Errors
    ///
    /// `CONTEXT_NOT_ACTIVE` if no claim is active.
    pub fn deactivate(&self) -> Result<(), ContainerError> {
        Ok(self.container.inner.request_ctx.deactivate()?)
    }

    /// Destructive teardown: deactivates, then runs the pre-destroy
    /// sequence for every stored instance exactly once and releases
    /// their dependents.
    ///
    /// # Errors
    ///
    /// `CONTEXT_NOT_ACTIVE` if no claim is active. Individual destroy
    /// failures are logged and do not stop the teardown of the
    /// remaining instances.
    pub fn terminate(&self) -> Result<(), ContainerError> {
        let handles = self.container.inner.request_ctx.terminate()?;
        for handle in handles {
            if let Err(err) = self.container.destroy_bean(&handle) {
                tracing::warn!(
                    bean = %handle.bean(),
                    error = %err,
                    "pre-destroy failed during request termination"
                );
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("active", &self.is_active())
            .finish()
    }
}
