//! Interceptor bindings and stereotypes.
//!
//! A binding is an annotation-like marker connecting beans (or their
//! operations) to the interceptors bound to the same marker. The
//! binding *type* carries resolution policy: whether it is inherited
//! down class hierarchies, and which of its members are excluded from
//! binding comparisons.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Declaration of a binding annotation type.
///
/// # Inheritance
///
/// A binding whose type is declared `inherited` applies to subclasses
/// of the class it is declared on. A non-inherited binding does not —
/// unless it reaches the bean through a stereotype applied directly on
/// the bean class, in which case it always applies.
///
/// # Non-binding Members
///
/// Members listed in `non_binding_members` are ignored when comparing
/// two bindings of this type: `@Timed(unit = "ms")` and
/// `@Timed(unit = "s")` are the same binding when `unit` is
/// non-binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingTypeDef {
    /// Annotation-type identity.
    pub name: String,
    /// Whether the binding applies to subclasses of its declaring class.
    pub inherited: bool,
    /// Member names excluded from binding comparisons.
    pub non_binding_members: BTreeSet<String>,
}

impl BindingTypeDef {
    /// Declares a binding type. Bindings are non-inherited by default,
    /// matching the host annotation model.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inherited: false,
            non_binding_members: BTreeSet::new(),
        }
    }

    /// Marks the binding type as inherited down class hierarchies.
    #[must_use]
    pub fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    /// Excludes a member from binding comparisons.
    #[must_use]
    pub fn with_non_binding_member(mut self, member: impl Into<String>) -> Self {
        self.non_binding_members.insert(member.into());
        self
    }
}

/// A concrete binding: a binding-type name plus member values.
///
/// # Example
///
/// ```
/// use trellis_metadata::Binding;
///
/// let plain = Binding::of("Logged");
/// let timed = Binding::of("Timed").with_member("unit", "ms");
/// assert_eq!(plain, Binding::of("Logged"));
/// assert_ne!(timed, Binding::of("Timed"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Binding {
    /// Name of the binding type.
    pub binding_type: String,
    /// Concrete member values, ordered for stable comparison.
    pub members: BTreeMap<String, String>,
}

impl Binding {
    /// Creates a binding with no member values.
    #[must_use]
    pub fn of(binding_type: impl Into<String>) -> Self {
        Self {
            binding_type: binding_type.into(),
            members: BTreeMap::new(),
        }
    }

    /// Adds a member value.
    #[must_use]
    pub fn with_member(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.members.insert(key.into(), value.into());
        self
    }

    /// Returns this binding with the given non-binding members
    /// stripped, producing the canonical form used for comparisons.
    #[must_use]
    pub fn normalized(&self, non_binding: &BTreeSet<String>) -> Binding {
        if non_binding.is_empty() {
            return self.clone();
        }
        Binding {
            binding_type: self.binding_type.clone(),
            members: self
                .members
                .iter()
                .filter(|(k, _)| !non_binding.contains(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.members.is_empty() {
            write!(f, "@{}", self.binding_type)
        } else {
            let members: Vec<String> = self
                .members
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            write!(f, "@{}({})", self.binding_type, members.join(", "))
        }
    }
}

/// A stereotype: a reusable bundle of bindings plus an optional
/// default scope, applicable to a bean as a single declaration.
///
/// Bindings contributed by a stereotype applied on the bean class
/// always apply to that bean, regardless of the binding type's
/// `inherited` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StereotypeDef {
    /// Stereotype name.
    pub name: String,
    /// Bindings the stereotype contributes.
    pub bindings: Vec<Binding>,
    /// Default scope for beans that declare none of their own.
    pub default_scope: Option<trellis_types::ScopeKind>,
}

impl StereotypeDef {
    /// Declares a stereotype with no bindings and no default scope.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: Vec::new(),
            default_scope: None,
        }
    }

    /// Adds a contributed binding.
    #[must_use]
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    /// Sets the default scope.
    #[must_use]
    pub fn with_default_scope(mut self, scope: trellis_types::ScopeKind) -> Self {
        self.default_scope = Some(scope);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_types::ScopeKind;

    #[test]
    fn binding_type_defaults() {
        let def = BindingTypeDef::new("Logged");
        assert!(!def.inherited);
        assert!(def.non_binding_members.is_empty());
    }

    #[test]
    fn binding_type_builders() {
        let def = BindingTypeDef::new("Timed")
            .inherited()
            .with_non_binding_member("unit");
        assert!(def.inherited);
        assert!(def.non_binding_members.contains("unit"));
    }

    #[test]
    fn binding_equality_includes_members() {
        let ms = Binding::of("Timed").with_member("unit", "ms");
        let s = Binding::of("Timed").with_member("unit", "s");
        assert_ne!(ms, s);
    }

    #[test]
    fn normalized_strips_non_binding_members() {
        let non_binding: BTreeSet<String> = ["unit".to_string()].into();
        let ms = Binding::of("Timed")
            .with_member("unit", "ms")
            .with_member("name", "db");
        let s = Binding::of("Timed")
            .with_member("unit", "s")
            .with_member("name", "db");
        assert_eq!(ms.normalized(&non_binding), s.normalized(&non_binding));

        let other = Binding::of("Timed")
            .with_member("unit", "ms")
            .with_member("name", "http");
        assert_ne!(ms.normalized(&non_binding), other.normalized(&non_binding));
    }

    #[test]
    fn normalized_noop_without_exclusions() {
        let binding = Binding::of("Timed").with_member("unit", "ms");
        assert_eq!(binding.normalized(&BTreeSet::new()), binding);
    }

    #[test]
    fn binding_display() {
        assert_eq!(format!("{}", Binding::of("Logged")), "@Logged");
        let timed = Binding::of("Timed").with_member("unit", "ms");
        assert_eq!(format!("{timed}"), "@Timed(unit=ms)");
    }

    #[test]
    fn stereotype_builders() {
        let st = StereotypeDef::new("WebService")
            .with_binding(Binding::of("Logged"))
            .with_default_scope(ScopeKind::Request);
        assert_eq!(st.name, "WebService");
        assert_eq!(st.bindings.len(), 1);
        assert_eq!(st.default_scope, Some(ScopeKind::Request));
    }

    #[test]
    fn serde_roundtrip() {
        let def = BindingTypeDef::new("Timed")
            .inherited()
            .with_non_binding_member("unit");
        let json = serde_json::to_string(&def).expect("BindingTypeDef should serialize");
        let restored: BindingTypeDef =
            serde_json::from_str(&json).expect("BindingTypeDef should deserialize");
        assert_eq!(restored, def);
    }
}
