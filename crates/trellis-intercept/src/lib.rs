//! Interceptor machinery for the Trellis runtime.
//!
//! This crate resolves and executes interceptor chains. It sits
//! between the metadata layer (which declares what exists) and the
//! container (which owns instances and binds bodies to descriptors):
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  trellis-types / trellis-metadata                           │
//! │  (ids, descriptors, phases — pure data)                     │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕ reads the graph, produces ordered chains
//! ┌─────────────────────────────────────────────────────────────┐
//! │  trellis-intercept                               ◄── HERE   │
//! │  ChainResolver, InterceptionChain, InvocationContext        │
//! └─────────────────────────────────────────────────────────────┘
//!           ↕ chains are bound to bodies and executed by
//! ┌─────────────────────────────────────────────────────────────┐
//! │  trellis-container                                          │
//! │  (lifecycle controller, resolution, events)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Concepts
//!
//! - [`ChainResolver`] — computes effective binding sets (inheritance
//!   and stereotype rules included) and orders applying interceptors.
//! - [`InterceptionChain`] — a frozen, ordered list of bound
//!   interceptor bodies for one (bean, operation, phase).
//! - [`InvocationContext`] — the single-use continuation passed
//!   through a chain; [`proceed`](InvocationContext::proceed) runs
//!   the next interceptor or the terminal operation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::{json, Value};
//! use trellis_intercept::{ChainEntry, InterceptionChain};
//! use trellis_metadata::InterceptionPhase;
//! use trellis_types::{BeanId, InterceptorId};
//!
//! let chain = InterceptionChain::new(vec![ChainEntry::new(
//!     InterceptorId::named("greeting"),
//!     Arc::new(|ctx| {
//!         let inner = ctx.proceed()?;
//!         Ok(json!(format!("greeting: {}", inner.as_str().unwrap_or_default())))
//!     }),
//! )]);
//!
//! let result = chain.run(
//!     InterceptionPhase::AroundInvoke,
//!     BeanId::named("greeter"),
//!     Value::Null,
//!     Arc::new(|_ctx| Ok(json!("hello"))),
//! );
//! assert_eq!(result.expect("chain succeeds"), json!("greeting: hello"));
//! ```

mod chain;
mod context;
mod error;
mod resolver;

pub use chain::{ChainEntry, InterceptionChain};
pub use context::{InterceptorFn, InvocationContext, TerminalFn};
pub use error::InterceptError;
pub use resolver::ChainResolver;

// Re-export testing utilities
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    //! Test utilities for the interception layer.
    //!
    //! Provides [`MockInterceptor`] and [`fixed_terminal`] for tests.
    pub use crate::chain::testing::{fixed_terminal, MockInterceptor};
}
