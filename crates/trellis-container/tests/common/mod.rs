//! Shared fixtures for container integration tests.
//!
//! Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trellis_intercept::InterceptorFn;
use trellis_metadata::InterceptionPhase;

/// Initializes test logging once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Per-phase invocation counters for one tracked bean.
#[derive(Default)]
pub struct LifecycleCounters {
    pub around_construct: AtomicUsize,
    pub post_construct: AtomicUsize,
    pub around_invoke: AtomicUsize,
    pub pre_destroy: AtomicUsize,
}

impl LifecycleCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Counter values as (around_construct, post_construct,
    /// around_invoke, pre_destroy).
    pub fn snapshot(&self) -> (usize, usize, usize, usize) {
        (
            self.around_construct.load(Ordering::SeqCst),
            self.post_construct.load(Ordering::SeqCst),
            self.around_invoke.load(Ordering::SeqCst),
            self.pre_destroy.load(Ordering::SeqCst),
        )
    }

    fn bump(&self, phase: InterceptionPhase) {
        let counter = match phase {
            InterceptionPhase::AroundConstruct => &self.around_construct,
            InterceptionPhase::PostConstruct => &self.post_construct,
            InterceptionPhase::AroundInvoke => &self.around_invoke,
            InterceptionPhase::PreDestroy => &self.pre_destroy,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// An interceptor body that bumps the counter for the executing
/// phase, then proceeds.
pub fn counting_body(counters: Arc<LifecycleCounters>) -> InterceptorFn {
    Arc::new(move |ctx| {
        counters.bump(ctx.phase);
        ctx.proceed()
    })
}

/// An interceptor body that bumps a bare counter, then proceeds.
pub fn bare_counting_body(counter: Arc<AtomicUsize>) -> InterceptorFn {
    Arc::new(move |ctx| {
        counter.fetch_add(1, Ordering::SeqCst);
        ctx.proceed()
    })
}

/// An interceptor body that prefixes the inner string result with
/// `"<label>: "`.
pub fn prefixing_body(label: &str) -> InterceptorFn {
    let prefix = format!("{label}: ");
    Arc::new(move |ctx| {
        let inner = ctx.proceed()?;
        Ok(serde_json::Value::String(format!(
            "{prefix}{}",
            inner.as_str().unwrap_or_default()
        )))
    })
}
