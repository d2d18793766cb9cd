//! Contextual instance storage for the Trellis runtime.
//!
//! This crate owns live state: which instances exist, which context
//! activation owns them, and which dependent objects each instance is
//! responsible for. It knows nothing about *how* instances are
//! created or destroyed — that glue lives in the container layer.
//!
//! # Core Concepts
//!
//! - [`ContextStore`] — per-activation map of bean id → instance,
//!   with a per-bean creation guard giving the at-most-one-winner
//!   guarantee under concurrent resolution.
//! - [`ContextInstanceHandle`] — a stored instance plus its
//!   [`CreationalContext`].
//! - [`CreationalContext`] — tracks dependent-scoped objects created
//!   on behalf of an owner, released with it in reverse creation
//!   order.
//! - [`ManagedContext`] — the activation state machine for one scope,
//!   with explicit capture/resume for cross-thread propagation.
//!
//! # Cross-Thread Propagation
//!
//! The engine never guesses which context is active from thread
//! identity. Moving a logical context is explicit:
//!
//! ```
//! use trellis_context::ManagedContext;
//! use trellis_types::ScopeKind;
//!
//! let ctx = ManagedContext::new(ScopeKind::Request);
//! ctx.activate().expect("activation");
//!
//! let captured = ctx.captured_handles().expect("capture");
//! ctx.deactivate().expect("non-destructive release");
//!
//! // ... hand `captured` to another thread ...
//! ctx.activate_with(captured).expect("resume");
//! # ctx.deactivate().expect("cleanup");
//! ```

mod creational;
mod error;
mod manager;
mod store;

pub use creational::{CreationalContext, DependentRecord};
pub use error::ContextError;
pub use manager::ManagedContext;
pub use store::{ContextInstanceHandle, ContextStore};
