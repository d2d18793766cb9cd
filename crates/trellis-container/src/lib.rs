//! The Trellis container runtime.
//!
//! Brings the layers together: resolution over the static metadata
//! graph, contextual instance lifecycles, interceptor chains, and
//! event observers — all behind one cheap cloneable [`Container`]
//! handle.
//!
//! # Assembly
//!
//! A container is assembled from two inputs:
//!
//! 1. A frozen [`MetadataGraph`](trellis_metadata::MetadataGraph) —
//!    pure data from an external build step.
//! 2. Invocation glue — [`BeanStrategy`] closures, interceptor
//!    bodies, and observer bodies, bound by declared name. The glue
//!    stands in for generated invokers; the engine never reflects.
//!
//! [`ContainerBuilder::build`] validates that the glue covers the
//! graph and precomputes every interceptor chain.
//!
//! # Lifecycle Guarantees
//!
//! - A shared-scope bean is created at most once per active context;
//!   concurrent resolutions of the same bean produce one winner and
//!   everyone receives its instance.
//! - An instance becomes visible only after construction, injection,
//!   and the post-construct chain all complete.
//! - `deactivate` never destroys; `terminate` destroys exactly once.
//! - Dependent instances belong to whoever caused their creation and
//!   are released with that owner.
//!
//! # Example
//!
//! ```
//! use trellis_container::{BeanStrategy, Container};
//! use trellis_metadata::{BeanDef, ClassDef, MetadataGraph};
//! use trellis_types::{instance_as, ScopeKind};
//!
//! let graph = MetadataGraph::builder()
//!     .add_class(ClassDef::new("Greeter"))
//!     .add_bean(
//!         BeanDef::new("greeter", "Greeter")
//!             .with_scope(ScopeKind::Application)
//!             .with_type("GreetingService"),
//!     )
//!     .build()
//!     .expect("valid graph");
//!
//! let container = Container::builder(graph)
//!     .bean("greeter", BeanStrategy::producing(|| String::from("hello")))
//!     .build()
//!     .expect("complete glue");
//!
//! // Two resolutions inside the same context: one instance.
//! let a = container.instance("GreetingService", &[]).expect("resolves");
//! let b = container.instance("GreetingService", &[]).expect("resolves");
//! let first = a.get().expect("created");
//! let second = b.get().expect("cached");
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! assert_eq!(instance_as::<String>(&first).map(String::as_str), Some("hello"));
//!
//! container.shutdown().expect("clean shutdown");
//! ```

mod builder;
mod container;
mod error;
mod glue;
mod handle;
mod lifecycle;
mod request;

pub use builder::ContainerBuilder;
pub use container::Container;
pub use error::{ContainerError, ResolveError};
pub use glue::{BeanStrategy, ConstructFn, InjectFn, LifecycleFn, MethodFn, ObserverFn};
pub use handle::{InstanceHandle, Selection};
pub use request::RequestContext;
