//! Metadata graph errors.
//!
//! All variants use the `GRAPH_` code prefix. Graph errors are
//! declaration mistakes: none are recoverable at runtime.

use thiserror::Error;
use trellis_types::ErrorCode;

/// Error raised while building or validating a metadata graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A phase string did not name a known interception phase.
    #[error("unknown interception phase: {0}")]
    UnknownPhase(String),

    /// Two beans were registered with the same id.
    #[error("duplicate bean: {0}")]
    DuplicateBean(String),

    /// Two interceptors were registered with the same id.
    #[error("duplicate interceptor: {0}")]
    DuplicateInterceptor(String),

    /// Two observers were registered with the same id.
    #[error("duplicate observer: {0}")]
    DuplicateObserver(String),

    /// Two classes were registered with the same name.
    #[error("duplicate class: {0}")]
    DuplicateClass(String),

    /// Two binding types were registered with the same name.
    #[error("duplicate binding type: {0}")]
    DuplicateBindingType(String),

    /// Two stereotypes were registered with the same name.
    #[error("duplicate stereotype: {0}")]
    DuplicateStereotype(String),

    /// A bean referenced a class missing from the graph.
    #[error("bean '{bean}' references unknown class '{class}'")]
    UnknownClass {
        /// The referencing bean.
        bean: String,
        /// The missing class.
        class: String,
    },

    /// A class referenced a superclass missing from the graph.
    #[error("class '{class}' references unknown superclass '{superclass}'")]
    UnknownSuperclass {
        /// The referencing class.
        class: String,
        /// The missing superclass.
        superclass: String,
    },

    /// A superclass chain loops back on itself.
    #[error("superclass cycle through class '{0}'")]
    ClassCycle(String),

    /// A bean referenced a stereotype missing from the graph.
    #[error("bean '{bean}' references unknown stereotype '{stereotype}'")]
    UnknownStereotype {
        /// The referencing bean.
        bean: String,
        /// The missing stereotype.
        stereotype: String,
    },

    /// A binding referenced a binding type missing from the graph.
    #[error("'{owner}' uses unknown binding type '{binding_type}'")]
    UnknownBindingType {
        /// The declaring bean/class/stereotype/interceptor.
        owner: String,
        /// The missing binding type.
        binding_type: String,
    },
}

impl ErrorCode for GraphError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownPhase(_) => "GRAPH_UNKNOWN_PHASE",
            Self::DuplicateBean(_) => "GRAPH_DUPLICATE_BEAN",
            Self::DuplicateInterceptor(_) => "GRAPH_DUPLICATE_INTERCEPTOR",
            Self::DuplicateObserver(_) => "GRAPH_DUPLICATE_OBSERVER",
            Self::DuplicateClass(_) => "GRAPH_DUPLICATE_CLASS",
            Self::DuplicateBindingType(_) => "GRAPH_DUPLICATE_BINDING_TYPE",
            Self::DuplicateStereotype(_) => "GRAPH_DUPLICATE_STEREOTYPE",
            Self::UnknownClass { .. } => "GRAPH_UNKNOWN_CLASS",
            Self::UnknownSuperclass { .. } => "GRAPH_UNKNOWN_SUPERCLASS",
            Self::ClassCycle(_) => "GRAPH_CLASS_CYCLE",
            Self::UnknownStereotype { .. } => "GRAPH_UNKNOWN_STEREOTYPE",
            Self::UnknownBindingType { .. } => "GRAPH_UNKNOWN_BINDING_TYPE",
        }
    }

    fn is_recoverable(&self) -> bool {
        // Every graph error is a declaration mistake.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_types::assert_error_codes;

    fn all_variants() -> Vec<GraphError> {
        vec![
            GraphError::UnknownPhase("x".into()),
            GraphError::DuplicateBean("x".into()),
            GraphError::DuplicateInterceptor("x".into()),
            GraphError::DuplicateObserver("x".into()),
            GraphError::DuplicateClass("x".into()),
            GraphError::DuplicateBindingType("x".into()),
            GraphError::DuplicateStereotype("x".into()),
            GraphError::UnknownClass {
                bean: "b".into(),
                class: "c".into(),
            },
            GraphError::UnknownSuperclass {
                class: "c".into(),
                superclass: "s".into(),
            },
            GraphError::ClassCycle("c".into()),
            GraphError::UnknownStereotype {
                bean: "b".into(),
                stereotype: "s".into(),
            },
            GraphError::UnknownBindingType {
                owner: "o".into(),
                binding_type: "t".into(),
            },
        ]
    }

    #[test]
    fn all_error_codes_valid() {
        assert_error_codes(&all_variants(), "GRAPH_");
    }

    #[test]
    fn nothing_is_recoverable() {
        for err in all_variants() {
            assert!(!err.is_recoverable(), "{err}");
        }
    }

    #[test]
    fn display_names_the_reference() {
        let err = GraphError::UnknownClass {
            bean: "greeter".into(),
            class: "Greeter".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("greeter"));
        assert!(msg.contains("Greeter"));
    }
}
