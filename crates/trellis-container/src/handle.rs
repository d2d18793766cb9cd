//! Instance handles and lazy selections.

use crate::{Container, ContainerError};
use parking_lot::Mutex;
use serde_json::Value;
use trellis_context::ContextInstanceHandle;
use trellis_types::{BeanId, InstanceRef, Qualifier, ScopeKind, TypeKey};

enum DependentState {
    NotCreated,
    Created(ContextInstanceHandle),
    Destroyed,
}

/// A handle to one resolved bean.
///
/// # Scope Semantics
///
/// - **Shared scopes** (singleton, application, request):
///   [`get`](Self::get) resolves through the scope's context — every
///   handle sees the same contextual instance, created at most once
///   per active context. [`destroy`](Self::destroy) is invalid.
/// - **Dependent**: the handle owns its instance. The first
///   [`get`](Self::get) creates it; later calls return the same one;
///   [`destroy`](Self::destroy) runs the pre-destroy sequence and
///   releases tracked dependents. Destroy is idempotent.
pub struct InstanceHandle {
    container: Container,
    bean: BeanId,
    scope: ScopeKind,
    dependent: Mutex<DependentState>,
}

impl InstanceHandle {
    pub(crate) fn new(container: Container, bean: BeanId, scope: ScopeKind) -> Self {
        Self {
            container,
            bean,
            scope,
            dependent: Mutex::new(DependentState::NotCreated),
        }
    }

    /// The resolved bean.
    #[must_use]
    pub fn bean_id(&self) -> &BeanId {
        &self.bean
    }

    /// The resolved bean's scope.
    #[must_use]
    pub fn scope(&self) -> ScopeKind {
        self.scope
    }

    /// Returns the contextual instance, creating it if needed.
    ///
    /// A new instance only becomes visible here after its full
    /// construction + injection + post-construct sequence completes.
    ///
    /// # Errors
    ///
    /// `CONTEXT_NOT_ACTIVE` when the bean's scope is inactive;
    /// construction failures verbatim; `CONTAINER_STOPPED` after
    /// shutdown.
    pub fn get(&self) -> Result<InstanceRef, ContainerError> {
        self.container.ensure_running()?;
        if self.scope == ScopeKind::Dependent {
            return self.dependent_instance();
        }
        Ok(self
            .container
            .contextual_instance(&self.bean)?
            .instance()
            .clone())
    }

    fn dependent_instance(&self) -> Result<InstanceRef, ContainerError> {
        let mut state = self.dependent.lock();
        match &*state {
            DependentState::Created(handle) => Ok(handle.instance().clone()),
            DependentState::Destroyed => Err(ContainerError::HandleDestroyed(
                self.bean.name().to_string(),
            )),
            DependentState::NotCreated => {
                let handle = self.container.build_bean(&self.bean)?;
                let instance = handle.instance().clone();
                *state = DependentState::Created(handle);
                Ok(instance)
            }
        }
    }

    /// Invokes a business operation through its around-invoke chain.
    ///
    /// # Errors
    ///
    /// `CONTAINER_UNKNOWN_OPERATION` for an undeclared operation
    /// name; otherwise whatever the chain or method body raises.
    pub fn invoke(&self, operation: &str, args: Value) -> Result<Value, ContainerError> {
        let instance = self.get()?;
        self.container
            .invoke_operation(&self.bean, instance, operation, args)
    }

    /// Explicitly releases a dependent instance: pre-destroy chain,
    /// then dependent release. Idempotent; destroying a handle that
    /// never created anything just marks it spent.
    ///
    /// # Errors
    ///
    /// `CONTAINER_NOT_DEPENDENT` for shared-scope beans; pre-destroy
    /// failures verbatim.
    pub fn destroy(&self) -> Result<(), ContainerError> {
        if self.scope != ScopeKind::Dependent {
            return Err(ContainerError::NotDependent {
                bean: self.bean.name().to_string(),
                scope: self.scope,
            });
        }
        let mut state = self.dependent.lock();
        match std::mem::replace(&mut *state, DependentState::Destroyed) {
            DependentState::Created(handle) => self.container.destroy_bean(&handle),
            DependentState::NotCreated => Ok(()),
            DependentState::Destroyed => {
                tracing::debug!(bean = %self.bean, "handle already destroyed");
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for InstanceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("bean", &self.bean)
            .field("scope", &self.scope)
            .finish()
    }
}

/// A lazy, tolerant selection.
///
/// Unlike [`Container::instance`], building a selection never fails:
/// unsatisfied or ambiguous resolution surfaces when the selection is
/// actually used.
pub struct Selection {
    container: Container,
    ty: TypeKey,
    qualifiers: Vec<Qualifier>,
}

impl Selection {
    pub(crate) fn new(container: Container, ty: TypeKey, qualifiers: Vec<Qualifier>) -> Self {
        Self {
            container,
            ty,
            qualifiers,
        }
    }

    /// The selected type.
    #[must_use]
    pub fn type_key(&self) -> &TypeKey {
        &self.ty
    }

    /// Returns `true` if exactly one bean matches.
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        self.container
            .resolve_bean(&self.ty, &self.qualifiers)
            .is_ok()
    }

    /// Resolves now and returns a handle.
    ///
    /// # Errors
    ///
    /// The deferred resolution failure, if any.
    pub fn handle(&self) -> Result<InstanceHandle, ContainerError> {
        self.container.instance(self.ty.clone(), &self.qualifiers)
    }

    /// Resolves and gets in one step.
    ///
    /// # Errors
    ///
    /// The deferred resolution failure or any creation failure.
    pub fn get(&self) -> Result<InstanceRef, ContainerError> {
        self.handle()?.get()
    }
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("type", &self.ty)
            .field("qualifiers", &self.qualifiers)
            .finish()
    }
}
