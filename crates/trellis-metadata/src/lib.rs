//! Static metadata graph for the Trellis runtime.
//!
//! This crate describes *what exists*: beans, interceptors, observers,
//! binding types, stereotypes, and class hierarchies — all as plain,
//! serializable data. It holds no code and no live state: create and
//! destroy strategies, interceptor bodies, and observer bodies are
//! bound to these descriptors by id when the container is assembled.
//!
//! # Why a Static Graph
//!
//! The runtime core never scans, reflects, or generates code. An
//! external build step produces one [`MetadataGraph`] ahead of time;
//! the graph is validated once, frozen, and then consumed read-only
//! for the life of the process. Anything ambiguous about a
//! declaration fails at [`MetadataGraphBuilder::build`], not at
//! resolution time.
//!
//! # Core Concepts
//!
//! - [`BeanDef`] — a managed bean: scope, types, qualifiers, bindings,
//!   stereotypes, operations.
//! - [`BindingTypeDef`] / [`Binding`] — interceptor-binding
//!   annotations and their concrete uses, with `inherited` and
//!   non-binding-member policy.
//! - [`StereotypeDef`] — a reusable bundle of bindings and default
//!   scope.
//! - [`ClassDef`] — one class in a bean's declared hierarchy.
//! - [`OperationKey`] / [`OperationDef`] — canonical operation
//!   identity; diamond default-method routes collapse at build time.
//! - [`InterceptorDef`] / [`ObserverDef`] — interception and event
//!   observation descriptors.
//! - [`InterceptionPhase`] / [`PhaseSet`] — where a chain runs.
//!
//! # Example
//!
//! ```
//! use trellis_metadata::{
//!     BeanDef, Binding, BindingTypeDef, ClassDef, InterceptorDef, MetadataGraph, PhaseSet,
//! };
//! use trellis_types::ScopeKind;
//!
//! let graph = MetadataGraph::builder()
//!     .add_binding_type(BindingTypeDef::new("Logged"))
//!     .add_class(ClassDef::new("Greeter").with_binding(Binding::of("Logged")))
//!     .add_bean(
//!         BeanDef::new("greeter", "Greeter")
//!             .with_scope(ScopeKind::Application)
//!             .with_type("GreetingService"),
//!     )
//!     .add_interceptor(
//!         InterceptorDef::new("logging")
//!             .bound_to(Binding::of("Logged"))
//!             .with_priority(10)
//!             .with_phases(PhaseSet::AROUND_INVOKE),
//!     )
//!     .build()
//!     .expect("valid graph");
//!
//! assert_eq!(graph.beans().len(), 1);
//! assert_eq!(graph.interceptors().len(), 1);
//! ```

mod binding;
mod class;
mod descriptor;
mod error;
mod graph;
mod phase;

pub use binding::{Binding, BindingTypeDef, StereotypeDef};
pub use class::{ClassDef, OperationDef, OperationKey};
pub use descriptor::{BeanDef, InterceptorDef, ObserverDef};
pub use error::GraphError;
pub use graph::{MetadataGraph, MetadataGraphBuilder};
pub use phase::{InterceptionPhase, PhaseSet};
