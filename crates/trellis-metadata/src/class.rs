//! Class hierarchy descriptors and canonical operation identities.

use crate::Binding;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::{uuid, Uuid};

/// Namespace UUID for operation-identity derivation.
const OPERATION_NAMESPACE: Uuid = uuid!("b4d7a9e3-2c61-48f5-8e0a-6f93d1c45b72");

/// Descriptor of one class in a bean's hierarchy.
///
/// Only what binding resolution needs survives distillation into the
/// graph: the class name, its superclass edge, and the bindings
/// declared at class level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Class name.
    pub name: String,
    /// Direct superclass, if any.
    pub superclass: Option<String>,
    /// Bindings declared directly on this class.
    pub bindings: Vec<Binding>,
}

impl ClassDef {
    /// Declares a class with no superclass and no bindings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            bindings: Vec::new(),
        }
    }

    /// Sets the superclass.
    #[must_use]
    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Adds a class-level binding.
    #[must_use]
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }
}

/// Canonical identity of a business operation.
///
/// Derived once, at graph construction, from the owning class and the
/// resolved method signature — NOT from the interface a caller happens
/// to name. A concrete operation reachable through several unrelated
/// ancestor interfaces (default-method diamond) therefore collapses to
/// a single key, and its interceptor chain is built and invoked
/// exactly once per call.
///
/// # Example
///
/// ```
/// use trellis_metadata::OperationKey;
///
/// let via_left = OperationKey::resolve("EchoService", "echo(String)");
/// let via_right = OperationKey::resolve("EchoService", "echo(String)");
/// assert_eq!(via_left, via_right);
///
/// let other = OperationKey::resolve("EchoService", "echo(String,int)");
/// assert_ne!(via_left, other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationKey(Uuid);

impl OperationKey {
    /// Derives the canonical key for a resolved method signature on a
    /// concrete class.
    #[must_use]
    pub fn resolve(class: &str, signature: &str) -> Self {
        Self(Uuid::new_v5(
            &OPERATION_NAMESPACE,
            format!("{class}#{signature}").as_bytes(),
        ))
    }

    /// The backing UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for OperationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "op:{}", self.0)
    }
}

/// A business operation declared by a bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDef {
    /// Canonical identity.
    pub key: OperationKey,
    /// Method name.
    pub name: String,
    /// Resolved signature the key was derived from.
    pub signature: String,
    /// Types (interfaces, the class itself) the operation is reachable
    /// through. Purely informational; identity is the key.
    pub reachable_via: BTreeSet<String>,
    /// Method-level bindings.
    pub bindings: Vec<Binding>,
}

impl OperationDef {
    /// Declares an operation on the given class.
    ///
    /// `signature` is the resolved method signature (name plus
    /// parameter types), e.g. `"greet(String)"`.
    #[must_use]
    pub fn new(class: &str, name: impl Into<String>, signature: impl Into<String>) -> Self {
        let signature = signature.into();
        Self {
            key: OperationKey::resolve(class, &signature),
            name: name.into(),
            signature,
            reachable_via: BTreeSet::from([class.to_string()]),
            bindings: Vec::new(),
        }
    }

    /// Records a type the operation is reachable through.
    #[must_use]
    pub fn reachable_through(mut self, ty: impl Into<String>) -> Self {
        self.reachable_via.insert(ty.into());
        self
    }

    /// Adds a method-level binding.
    #[must_use]
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Merges another declaration of the same operation (same key):
    /// unions reachability and appends bindings not already present.
    pub(crate) fn merge(&mut self, other: OperationDef) {
        debug_assert_eq!(self.key, other.key);
        self.reachable_via.extend(other.reachable_via);
        for binding in other.bindings {
            if !self.bindings.contains(&binding) {
                self.bindings.push(binding);
            }
        }
    }
}
