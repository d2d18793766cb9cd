//! Identifier types for Trellis.
//!
//! All identifiers are UUID-based. Components of the metadata graph
//! (beans, interceptors, observers) use deterministic UUID v5 so that
//! the same declared name always produces the same identifier across
//! processes — the graph is built ahead of time and consumed as plain
//! data, so ids must be stable without coordination.

use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

/// Trellis namespace UUID for deterministic UUID v5 generation.
///
/// Used as the namespace for deriving bean/interceptor/observer ids
/// from their declared names via UUID v5 (SHA-1 based).
const TRELLIS_NAMESPACE: Uuid = uuid!("7c9e4b21-5a83-4f6d-9d02-3b1c8e5a7f40");

/// Identifier for a bean in the metadata graph.
///
/// A bean is a unit of managed, creatable/destroyable state with a
/// declared scope. Bean ids are derived from the declared bean name,
/// so two graphs declaring the same bean name agree on the id.
///
/// # Equality Semantics
///
/// `PartialEq`/`Hash` cover all fields including the UUID, so a
/// `BeanId` is usable directly as a map key in context stores.
///
/// # Example
///
/// ```
/// use trellis_types::BeanId;
///
/// let a = BeanId::named("greeter");
/// let b = BeanId::named("greeter");
/// assert_eq!(a, b);                    // deterministic
/// assert_eq!(a.name(), "greeter");
///
/// let c = BeanId::named("mailer");
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeanId {
    uuid: Uuid,
    name: String,
}

impl BeanId {
    /// Creates a bean id derived deterministically from the bean name.
    ///
    /// Same name always produces the same UUID; different names produce
    /// different UUIDs.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&TRELLIS_NAMESPACE, format!("bean:{name}").as_bytes()),
            name,
        }
    }

    /// Creates a bean id with a random UUID v4.
    ///
    /// Use for synthetic beans that must never collide with declared
    /// ones (e.g., per-test throwaways).
    #[must_use]
    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// The declared bean name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl std::fmt::Display for BeanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bean:{}@{}", self.name, self.uuid)
    }
}

/// Identifier for an interceptor in the metadata graph.
///
/// Derived deterministically from the interceptor name, like
/// [`BeanId`].
///
/// # Example
///
/// ```
/// use trellis_types::InterceptorId;
///
/// let a = InterceptorId::named("logging");
/// let b = InterceptorId::named("logging");
/// assert_eq!(a, b);
/// assert_eq!(a.name(), "logging");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterceptorId {
    uuid: Uuid,
    name: String,
}

impl InterceptorId {
    /// Creates an interceptor id derived from the interceptor name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&TRELLIS_NAMESPACE, format!("interceptor:{name}").as_bytes()),
            name,
        }
    }

    /// The declared interceptor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl std::fmt::Display for InterceptorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "interceptor:{}@{}", self.name, self.uuid)
    }
}

/// Identifier for an event observer in the metadata graph.
///
/// # Example
///
/// ```
/// use trellis_types::ObserverId;
///
/// let a = ObserverId::named("audit");
/// assert_eq!(a, ObserverId::named("audit"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId {
    uuid: Uuid,
    name: String,
}

impl ObserverId {
    /// Creates an observer id derived from the observer name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&TRELLIS_NAMESPACE, format!("observer:{name}").as_bytes()),
            name,
        }
    }

    /// The declared observer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The backing UUID.
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer:{}@{}", self.name, self.uuid)
    }
}
