//! Type keys and qualifiers for bean resolution.
//!
//! The metadata graph is static: bean types are declared as plain data,
//! not discovered through reflection. A [`TypeKey`] names one exposed
//! bean type; a [`Qualifier`] narrows resolution among beans sharing a
//! type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of a bean type in the metadata graph.
///
/// A bean declares one or more type keys it is resolvable by (its own
/// class plus any interfaces the build step decided to expose).
///
/// # Example
///
/// ```
/// use trellis_types::TypeKey;
///
/// let key = TypeKey::of("GreetingService");
/// assert_eq!(key.as_str(), "GreetingService");
/// assert_eq!(key, TypeKey::of("GreetingService"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(String);

impl TypeKey {
    /// Creates a type key from a type name.
    #[must_use]
    pub fn of(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TypeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeKey {
    fn from(s: &str) -> Self {
        Self::of(s)
    }
}

/// A resolution qualifier: an annotation-like marker narrowing which
/// bean satisfies a typed lookup.
///
/// A qualifier has a name and optional member values. Two qualifiers
/// match when the name and every member value agree.
///
/// # Matching Rule
///
/// Resolution requests carry a (possibly empty) qualifier set:
///
/// - An **empty** requested set matches any bean of the type
///   (the "default" lookup).
/// - A **non-empty** requested set matches a bean iff every requested
///   qualifier appears among the bean's declared qualifiers.
///
/// # Example
///
/// ```
/// use trellis_types::Qualifier;
///
/// let plain = Qualifier::new("Premium");
/// let tagged = Qualifier::new("Tier").with_member("level", "gold");
///
/// assert_eq!(plain, Qualifier::new("Premium"));
/// assert_ne!(tagged, Qualifier::new("Tier").with_member("level", "silver"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Qualifier {
    /// Qualifier name (the annotation-type identity).
    pub name: String,
    /// Member values, ordered for stable equality and hashing.
    pub members: BTreeMap<String, String>,
}

impl Qualifier {
    /// Creates a qualifier with no members.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }

    /// Adds a member value.
    #[must_use]
    pub fn with_member(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.members.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if `requested` is satisfied by `declared`:
    /// every requested qualifier is present in the declared set.
    /// An empty request always matches.
    #[must_use]
    pub fn set_matches(requested: &[Qualifier], declared: &[Qualifier]) -> bool {
        requested.iter().all(|q| declared.contains(q))
    }
}

impl std::fmt::Display for Qualifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.members.is_empty() {
            write!(f, "@{}", self.name)
        } else {
            let members: Vec<String> = self
                .members
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "@{}({})", self.name, members.join(", "))
        }
    }
}
