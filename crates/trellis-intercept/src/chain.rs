//! Interception chains — ordered interceptor bodies plus execution.

use crate::{InterceptError, InterceptorFn, InvocationContext, TerminalFn};
use serde_json::Value;
use std::sync::Arc;
use trellis_metadata::InterceptionPhase;
use trellis_types::{BeanId, InterceptorId};

/// One interceptor in a chain: identity plus bound body.
#[derive(Clone)]
pub struct ChainEntry {
    /// The interceptor this entry executes.
    pub id: InterceptorId,
    /// The bound body.
    pub body: InterceptorFn,
}

impl ChainEntry {
    /// Pairs an interceptor id with its body.
    #[must_use]
    pub fn new(id: InterceptorId, body: InterceptorFn) -> Self {
        Self { id, body }
    }
}

impl std::fmt::Debug for ChainEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEntry").field("id", &self.id).finish()
    }
}

/// An ordered, immutable interceptor chain for one (bean, operation,
/// phase) triple.
///
/// Chains are resolved and ordered once, ahead of time; execution
/// shares the same frozen entry list across calls. An empty chain is
/// valid and runs the terminal directly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use trellis_intercept::{ChainEntry, InterceptionChain};
/// use trellis_metadata::InterceptionPhase;
/// use trellis_types::{BeanId, InterceptorId};
///
/// let chain = InterceptionChain::new(vec![ChainEntry::new(
///     InterceptorId::named("shout"),
///     Arc::new(|ctx| {
///         let inner = ctx.proceed()?;
///         Ok(json!(format!("{}!", inner.as_str().unwrap_or_default())))
///     }),
/// )]);
///
/// let mut ctx = chain.invocation(
///     InterceptionPhase::AroundInvoke,
///     BeanId::named("greeter"),
///     Arc::new(|_ctx| Ok(json!("hello"))),
/// );
/// assert_eq!(ctx.proceed().expect("chain succeeds"), json!("hello!"));
/// ```
#[derive(Clone, Debug)]
pub struct InterceptionChain {
    entries: Arc<[ChainEntry]>,
}

impl InterceptionChain {
    /// Builds a chain from ordered entries (outermost first).
    #[must_use]
    pub fn new(entries: Vec<ChainEntry>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    /// A chain with no interceptors.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new().into(),
        }
    }

    /// Number of interceptors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no interceptor applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The interceptor ids in execution order.
    pub fn interceptor_ids(&self) -> impl Iterator<Item = &InterceptorId> {
        self.entries.iter().map(|e| &e.id)
    }

    /// Creates a fresh single-use invocation context for this chain.
    #[must_use]
    pub fn invocation(
        &self,
        phase: InterceptionPhase,
        bean: BeanId,
        terminal: TerminalFn,
    ) -> InvocationContext {
        InvocationContext::new(phase, bean, self.entries.clone(), terminal)
    }

    /// Convenience: builds a context with the given parameters and
    /// runs it to completion.
    ///
    /// # Errors
    ///
    /// Whatever an interceptor or the terminal raises, verbatim.
    pub fn run(
        &self,
        phase: InterceptionPhase,
        bean: BeanId,
        parameters: Value,
        terminal: TerminalFn,
    ) -> Result<Value, InterceptError> {
        self.invocation(phase, bean, terminal)
            .with_parameters(parameters)
            .proceed()
    }
}

/// Test utilities for the interception layer.
#[cfg(any(test, feature = "test-utils"))]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A mock interceptor body for tests.
    ///
    /// Tracks invocation count via `call_count` and delegates to a
    /// fixed behavior.
    pub struct MockInterceptor {
        /// Interceptor identity.
        pub id: InterceptorId,
        /// Number of times the body has run.
        pub call_count: Arc<AtomicUsize>,
        body: InterceptorFn,
    }

    impl MockInterceptor {
        /// A body that proceeds and passes the inner result through.
        #[must_use]
        pub fn pass_through(name: &str) -> Self {
            let id = InterceptorId::named(name);
            let call_count = Arc::new(AtomicUsize::new(0));
            let count = call_count.clone();
            let body: InterceptorFn = Arc::new(move |ctx| {
                count.fetch_add(1, Ordering::SeqCst);
                ctx.proceed()
            });
            Self {
                id,
                call_count,
                body,
            }
        }

        /// A body that prefixes the inner string result with
        /// `"<name>: "` — chains of these make execution order
        /// visible in the final value.
        #[must_use]
        pub fn prefixer(name: &str) -> Self {
            let prefix = format!("{name}: ");
            let id = InterceptorId::named(name);
            let call_count = Arc::new(AtomicUsize::new(0));
            let count = call_count.clone();
            let body: InterceptorFn = Arc::new(move |ctx| {
                count.fetch_add(1, Ordering::SeqCst);
                let inner = ctx.proceed()?;
                Ok(Value::String(format!(
                    "{prefix}{}",
                    inner.as_str().unwrap_or_default()
                )))
            });
            Self {
                id,
                call_count,
                body,
            }
        }

        /// A body that never proceeds and returns the given value.
        #[must_use]
        pub fn short_circuit(name: &str, value: Value) -> Self {
            let id = InterceptorId::named(name);
            let call_count = Arc::new(AtomicUsize::new(0));
            let count = call_count.clone();
            let body: InterceptorFn = Arc::new(move |_ctx| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(value.clone())
            });
            Self {
                id,
                call_count,
                body,
            }
        }

        /// A body that fails without proceeding.
        #[must_use]
        pub fn failing(name: &str, reason: &str) -> Self {
            let id = InterceptorId::named(name);
            let reason = reason.to_string();
            let call_count = Arc::new(AtomicUsize::new(0));
            let count = call_count.clone();
            let body: InterceptorFn = Arc::new(move |_ctx| {
                count.fetch_add(1, Ordering::SeqCst);
                Err(InterceptError::Failed(reason.clone()))
            });
            Self {
                id,
                call_count,
                body,
            }
        }

        /// Number of times this body has executed.
        #[must_use]
        pub fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Converts into a chain entry.
        #[must_use]
        pub fn entry(&self) -> ChainEntry {
            ChainEntry::new(self.id.clone(), self.body.clone())
        }
    }

    /// A terminal returning a fixed string value.
    #[must_use]
    pub fn fixed_terminal(value: &str) -> TerminalFn {
        let value = Value::String(value.to_string());
        Arc::new(move |_ctx| Ok(value.clone()))
    }
}
