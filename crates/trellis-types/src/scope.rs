//! Scope kinds — lifetime policies for contextual instances.

use serde::{Deserialize, Serialize};

/// The lifetime policy of a bean.
///
/// A scope kind decides which context owns a bean's instances and how
/// long they live.
///
/// # Scope Properties
///
/// | Kind | Shared store | Activatable | Instance lifetime |
/// |------|--------------|-------------|-------------------|
/// | `Singleton` | Yes | No (always active) | Container |
/// | `Application` | Yes | No (always active) | Container |
/// | `Request` | Yes | Yes | One activation claim |
/// | `Dependent` | No | — | Owning creational context |
///
/// # Example
///
/// ```
/// use trellis_types::ScopeKind;
///
/// assert!(ScopeKind::Singleton.is_shared());
/// assert!(ScopeKind::Request.is_activatable());
/// assert!(!ScopeKind::Dependent.is_shared());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// One instance per container, created on first resolution.
    Singleton,
    /// One instance per container; semantically the application scope.
    ///
    /// Kept distinct from `Singleton` so the two stores can be torn
    /// down in a fixed order at shutdown.
    Application,
    /// One instance per activation claim of the request context.
    Request,
    /// A fresh instance per resolution, owned by whichever creational
    /// context caused the creation. Never stored in a shared store.
    Dependent,
}

impl ScopeKind {
    /// Returns `true` if instances are stored in a shared context
    /// store (at most one instance per active context).
    #[must_use]
    pub fn is_shared(&self) -> bool {
        !matches!(self, Self::Dependent)
    }

    /// Returns `true` if the scope's context must be explicitly
    /// activated before beans of this scope can be resolved.
    #[must_use]
    pub fn is_activatable(&self) -> bool {
        matches!(self, Self::Request)
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Application => "application",
            Self::Request => "request",
            Self::Dependent => "dependent",
        }
    }
}

impl std::fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScopeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleton" => Ok(Self::Singleton),
            "application" => Ok(Self::Application),
            "request" => Ok(Self::Request),
            "dependent" => Ok(Self::Dependent),
            other => Err(format!("unknown scope kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_KINDS: &[ScopeKind] = &[
        ScopeKind::Singleton,
        ScopeKind::Application,
        ScopeKind::Request,
        ScopeKind::Dependent,
    ];

    #[test]
    fn shared_kinds() {
        assert!(ScopeKind::Singleton.is_shared());
        assert!(ScopeKind::Application.is_shared());
        assert!(ScopeKind::Request.is_shared());
        assert!(!ScopeKind::Dependent.is_shared());
    }

    #[test]
    fn only_request_is_activatable() {
        for &kind in ALL_KINDS {
            assert_eq!(kind.is_activatable(), kind == ScopeKind::Request, "{kind}");
        }
    }

    #[test]
    fn from_str_roundtrip_all() {
        for &kind in ALL_KINDS {
            let s = kind.to_string();
            let parsed: ScopeKind = s.parse().unwrap_or_else(|e| {
                panic!("failed to parse '{s}': {e}");
            });
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn from_str_unknown() {
        assert!("session".parse::<ScopeKind>().is_err());
        assert!("".parse::<ScopeKind>().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        for &kind in ALL_KINDS {
            let json = serde_json::to_string(&kind).expect("ScopeKind should serialize");
            let restored: ScopeKind =
                serde_json::from_str(&json).expect("ScopeKind should deserialize");
            assert_eq!(restored, kind);
        }
    }
}
