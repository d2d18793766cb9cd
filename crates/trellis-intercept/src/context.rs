//! Invocation context — the continuation passed through a chain.

use crate::{ChainEntry, InterceptError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use trellis_metadata::{InterceptionPhase, OperationKey};
use trellis_types::{BeanId, InstanceRef};

/// An interceptor body: receives the invocation context, may call
/// [`InvocationContext::proceed`] zero, one, or several times, and
/// returns the (possibly replaced) result.
pub type InterceptorFn =
    Arc<dyn Fn(&mut InvocationContext) -> Result<Value, InterceptError> + Send + Sync>;

/// The terminal of a chain: the real business operation, constructor
/// glue, or destroy callback that runs when `proceed()` is called
/// past the last interceptor.
pub type TerminalFn =
    Arc<dyn Fn(&mut InvocationContext) -> Result<Value, InterceptError> + Send + Sync>;

/// Per-call state threaded through an interceptor chain.
///
/// Single-use: one context per call; create a fresh one for the next
/// call.
///
/// # Proceed Semantics
///
/// [`proceed`](Self::proceed) runs the next interceptor in the chain
/// or, past the last one, the terminal operation. The chain cursor is
/// restored after every nested call, so an interceptor may proceed
/// more than once (retry semantics) or not at all (short-circuit).
///
/// # Thread Hops
///
/// The context is `Send`. An interceptor may hand the remainder of
/// the chain to another thread — e.g. via `std::thread::scope` — and
/// call `proceed()` there. Any execution context the downstream chain
/// depends on (an active request context, say) must be explicitly
/// captured before the hop and resumed on the new thread; nothing is
/// re-derived from the calling thread.
pub struct InvocationContext {
    /// The phase this chain is executing.
    pub phase: InterceptionPhase,
    /// The bean the chain wraps.
    pub bean: BeanId,
    /// The invoked operation; `None` for lifecycle phases.
    pub operation: Option<OperationKey>,
    /// The target instance. For around-construct chains this is
    /// `None` until the terminal constructs it.
    pub target: Option<InstanceRef>,
    /// Call parameters.
    pub parameters: Value,
    /// Cross-interceptor data bag, carried for the duration of the
    /// call.
    pub data: HashMap<String, Value>,
    entries: Arc<[ChainEntry]>,
    terminal: TerminalFn,
    cursor: usize,
}

impl InvocationContext {
    /// Creates a context positioned before the first interceptor.
    #[must_use]
    pub fn new(
        phase: InterceptionPhase,
        bean: BeanId,
        entries: Arc<[ChainEntry]>,
        terminal: TerminalFn,
    ) -> Self {
        Self {
            phase,
            bean,
            operation: None,
            target: None,
            parameters: Value::Null,
            data: HashMap::new(),
            entries,
            terminal,
            cursor: 0,
        }
    }

    /// Sets the invoked operation.
    #[must_use]
    pub fn with_operation(mut self, operation: OperationKey) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Sets the target instance.
    #[must_use]
    pub fn with_target(mut self, target: InstanceRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the call parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Continues to the next interceptor, or to the terminal
    /// operation past the last one.
    ///
    /// # Errors
    ///
    /// Whatever the next interceptor or the terminal raises, verbatim.
    pub fn proceed(&mut self) -> Result<Value, InterceptError> {
        let pos = self.cursor;
        let result = match self.entries.get(pos).cloned() {
            Some(entry) => {
                self.cursor = pos + 1;
                tracing::trace!(
                    interceptor = %entry.id,
                    phase = %self.phase,
                    position = pos,
                    "proceed: entering interceptor"
                );
                (entry.body)(self)
            }
            None => {
                tracing::trace!(bean = %self.bean, phase = %self.phase, "proceed: terminal");
                let terminal = self.terminal.clone();
                (terminal)(self)
            }
        };
        // Restore so the frame that called us may proceed again.
        self.cursor = pos;
        result
    }

    /// Number of interceptors remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor)
    }
}

impl std::fmt::Debug for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationContext")
            .field("phase", &self.phase)
            .field("bean", &self.bean)
            .field("operation", &self.operation)
            .field("has_target", &self.target.is_some())
            .field("cursor", &self.cursor)
            .field("chain_len", &self.entries.len())
            .finish()
    }
}
