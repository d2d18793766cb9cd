//! Core types for the Trellis contextual-lifecycle runtime.
//!
//! This crate provides the foundational identifier, type-key, and
//! scope types shared by every Trellis layer.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Metadata Layer                            │
//! │  (Static data, built ahead of time, immutable)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  trellis-types    : ids, TypeKey, Qualifier, ScopeKind ◄HERE │
//! │  trellis-metadata : bean/interceptor/observer descriptors    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Engine Layer                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  trellis-intercept : chains, invocation contexts             │
//! │  trellis-context   : stores, creational contexts, claims     │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runtime Layer                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  trellis-container : resolution, lifecycle, events           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identifier Design
//!
//! Graph identifiers ([`BeanId`], [`InterceptorId`], [`ObserverId`])
//! are UUID v5, derived from declared names: the metadata graph is
//! produced once ahead of time and consumed as plain data, so the same
//! declaration must yield the same id in every process without
//! coordination.
//!
//! # Example
//!
//! ```
//! use trellis_types::{BeanId, Qualifier, ScopeKind, TypeKey};
//!
//! let id = BeanId::named("greeter");
//! assert_eq!(id, BeanId::named("greeter"));
//!
//! let ty = TypeKey::of("GreetingService");
//! let q = Qualifier::new("Premium");
//! assert!(Qualifier::set_matches(&[], &[q]));
//!
//! assert!(ScopeKind::Request.is_activatable());
//! ```

mod error;
mod id;
mod instance;
mod key;
mod scope;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{BeanId, InterceptorId, ObserverId};
pub use instance::{instance_as, instance_of, InstanceRef};
pub use key::{Qualifier, TypeKey};
pub use scope::ScopeKind;
