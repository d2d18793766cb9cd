//! Interception phases.
//!
//! Every point in a bean's life where an interceptor chain can run.
//! Phases are categorized as "construction" (wrap instance creation),
//! "invocation" (wrap a business operation), or "destruction" (wrap
//! the destroy callback).

use crate::GraphError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single interception phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterceptionPhase {
    /// Wraps the actual construction of the instance.
    AroundConstruct,
    /// Runs after construction and injection complete, before the
    /// instance becomes visible to other callers.
    PostConstruct,
    /// Wraps a business-operation invocation.
    AroundInvoke,
    /// Runs before the instance is discarded.
    PreDestroy,
}

impl InterceptionPhase {
    /// Returns `true` for phases that run during instance creation.
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::AroundConstruct | Self::PostConstruct)
    }

    /// Returns `true` for the operation-invocation phase.
    #[must_use]
    pub fn is_invocation(&self) -> bool {
        matches!(self, Self::AroundInvoke)
    }

    /// Returns `true` for the destruction phase.
    #[must_use]
    pub fn is_destruction(&self) -> bool {
        matches!(self, Self::PreDestroy)
    }

    /// Returns the canonical string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AroundConstruct => "around_construct",
            Self::PostConstruct => "post_construct",
            Self::AroundInvoke => "around_invoke",
            Self::PreDestroy => "pre_destroy",
        }
    }

    /// All phases, in lifecycle order.
    pub const ALL: &'static [InterceptionPhase] = &[
        InterceptionPhase::AroundConstruct,
        InterceptionPhase::PostConstruct,
        InterceptionPhase::AroundInvoke,
        InterceptionPhase::PreDestroy,
    ];
}

impl FromStr for InterceptionPhase {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "around_construct" => Ok(Self::AroundConstruct),
            "post_construct" => Ok(Self::PostConstruct),
            "around_invoke" => Ok(Self::AroundInvoke),
            "pre_destroy" => Ok(Self::PreDestroy),
            _ => Err(GraphError::UnknownPhase(s.to_string())),
        }
    }
}

impl fmt::Display for InterceptionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// The set of phases an interceptor declares itself applicable to.
    ///
    /// # Example
    ///
    /// ```
    /// use trellis_metadata::{InterceptionPhase, PhaseSet};
    ///
    /// let lifecycle = PhaseSet::POST_CONSTRUCT | PhaseSet::PRE_DESTROY;
    /// assert!(lifecycle.declares(InterceptionPhase::PostConstruct));
    /// assert!(!lifecycle.declares(InterceptionPhase::AroundInvoke));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PhaseSet: u8 {
        /// Applicable to [`InterceptionPhase::AroundConstruct`].
        const AROUND_CONSTRUCT = 1 << 0;
        /// Applicable to [`InterceptionPhase::PostConstruct`].
        const POST_CONSTRUCT = 1 << 1;
        /// Applicable to [`InterceptionPhase::AroundInvoke`].
        const AROUND_INVOKE = 1 << 2;
        /// Applicable to [`InterceptionPhase::PreDestroy`].
        const PRE_DESTROY = 1 << 3;
    }
}

impl PhaseSet {
    /// Returns `true` if this set declares the given phase.
    #[must_use]
    pub fn declares(&self, phase: InterceptionPhase) -> bool {
        self.contains(PhaseSet::from(phase))
    }
}

impl From<InterceptionPhase> for PhaseSet {
    fn from(phase: InterceptionPhase) -> Self {
        match phase {
            InterceptionPhase::AroundConstruct => PhaseSet::AROUND_CONSTRUCT,
            InterceptionPhase::PostConstruct => PhaseSet::POST_CONSTRUCT,
            InterceptionPhase::AroundInvoke => PhaseSet::AROUND_INVOKE,
            InterceptionPhase::PreDestroy => PhaseSet::PRE_DESTROY,
        }
    }
}

// Serialized as raw bits; unknown bits are dropped on the way in so
// a newer graph stays readable by an older runtime.
impl Serialize for PhaseSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PhaseSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Ok(PhaseSet::from_bits_truncate(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_variants_count() {
        assert_eq!(InterceptionPhase::ALL.len(), 4);
    }

    #[test]
    fn from_str_roundtrip_all() {
        for &phase in InterceptionPhase::ALL {
            let s = phase.to_string();
            let parsed: InterceptionPhase = s.parse().unwrap_or_else(|e| {
                panic!("failed to parse '{s}': {e}");
            });
            assert_eq!(parsed, phase);
        }
    }

    #[test]
    fn from_str_unknown() {
        let result = "around_destroy".parse::<InterceptionPhase>();
        assert!(matches!(result, Err(GraphError::UnknownPhase(_))));
    }

    #[test]
    fn every_phase_in_exactly_one_category() {
        for &phase in InterceptionPhase::ALL {
            let cats = [
                phase.is_construction(),
                phase.is_invocation(),
                phase.is_destruction(),
            ];
            assert_eq!(
                cats.iter().filter(|&&v| v).count(),
                1,
                "{phase} should be in exactly 1 category"
            );
        }
    }

    #[test]
    fn phase_set_declares() {
        let set = PhaseSet::AROUND_INVOKE | PhaseSet::PRE_DESTROY;
        assert!(set.declares(InterceptionPhase::AroundInvoke));
        assert!(set.declares(InterceptionPhase::PreDestroy));
        assert!(!set.declares(InterceptionPhase::AroundConstruct));
        assert!(!set.declares(InterceptionPhase::PostConstruct));
    }

    #[test]
    fn phase_set_all_covers_every_phase() {
        for &phase in InterceptionPhase::ALL {
            assert!(PhaseSet::all().declares(phase));
            assert!(!PhaseSet::empty().declares(phase));
        }
    }

    #[test]
    fn serde_roundtrip() {
        for &phase in InterceptionPhase::ALL {
            let json = serde_json::to_string(&phase).expect("phase should serialize");
            let restored: InterceptionPhase =
                serde_json::from_str(&json).expect("phase should deserialize");
            assert_eq!(restored, phase);
        }
    }

    #[test]
    fn phase_set_serde_roundtrip() {
        let set = PhaseSet::AROUND_INVOKE | PhaseSet::PRE_DESTROY;
        let json = serde_json::to_string(&set).expect("PhaseSet should serialize");
        let restored: PhaseSet = serde_json::from_str(&json).expect("PhaseSet should deserialize");
        assert_eq!(restored, set);
    }

    #[test]
    fn phase_set_deserialize_drops_unknown_bits() {
        let restored: PhaseSet = serde_json::from_str("255").expect("bits should deserialize");
        assert_eq!(restored, PhaseSet::all());
    }
}
