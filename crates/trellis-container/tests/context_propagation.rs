//! Request-scope propagation and interception-ordering tests:
//! capture/resume across threads, deactivate-vs-terminate semantics,
//! priority order across a thread hop, and diamond operation
//! identity.

mod common;

use common::{bare_counting_body, init_tracing, prefixing_body};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trellis_container::{BeanStrategy, Container};
use trellis_metadata::{
    BeanDef, Binding, BindingTypeDef, ClassDef, InterceptorDef, MetadataGraph, OperationDef,
    OperationKey, PhaseSet,
};
use trellis_types::{ErrorCode, ScopeKind};

fn request_graph() -> MetadataGraph {
    MetadataGraph::builder()
        .add_class(ClassDef::new("Session"))
        .add_bean(
            BeanDef::new("session", "Session")
                .with_scope(ScopeKind::Request)
                .with_type("Session"),
        )
        .build()
        .expect("valid graph")
}

fn request_container(destroys: &Arc<AtomicUsize>) -> Container {
    let destroy_counter = destroys.clone();
    Container::builder(request_graph())
        .bean(
            "session",
            BeanStrategy::producing(|| String::from("state")).with_pre_destroy(Arc::new(
                move |_instance| {
                    destroy_counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
            )),
        )
        .build()
        .expect("complete glue")
}

// ── Activation requirements ──────────────────────────────────

#[test]
fn inactive_request_scope_rejects_resolution() {
    init_tracing();
    let destroys = Arc::new(AtomicUsize::new(0));
    let container = request_container(&destroys);

    let handle = container.instance("Session", &[]).expect("resolves");
    let err = handle.get().expect_err("no active request context");
    assert_eq!(err.code(), "CONTEXT_NOT_ACTIVE");
    assert!(err.is_recoverable());

    // Activating makes the same handle usable.
    let request = container.request_context();
    request.activate().expect("activation");
    assert!(handle.get().is_ok());
    request.terminate().expect("termination");

    container.shutdown().expect("clean shutdown");
}

#[test]
fn double_activation_is_rejected() {
    init_tracing();
    let destroys = Arc::new(AtomicUsize::new(0));
    let container = request_container(&destroys);
    let request = container.request_context();

    request.activate().expect("first activation");
    let err = request.activate().expect_err("second activation");
    assert_eq!(err.code(), "CONTEXT_ALREADY_ACTIVE");

    request.terminate().expect("termination");
    container.shutdown().expect("clean shutdown");
}

// ── Deactivate vs terminate ──────────────────────────────────

#[test]
fn deactivate_never_destroys_terminate_destroys_exactly_once() {
    init_tracing();
    let destroys = Arc::new(AtomicUsize::new(0));
    let container = request_container(&destroys);
    let request = container.request_context();

    request.activate().expect("activation");
    let _ = container
        .instance("Session", &[])
        .expect("resolves")
        .get()
        .expect("created");

    let captured = request.captured_handles().expect("capture");
    request.deactivate().expect("deactivation");
    // Deactivation must not run the destroy callback.
    assert_eq!(destroys.load(Ordering::SeqCst), 0);

    // Resume and terminate: destroy runs exactly once per instance.
    request.activate_with(captured).expect("resume");
    request.terminate().expect("termination");
    assert_eq!(destroys.load(Ordering::SeqCst), 1);

    container.shutdown().expect("clean shutdown");
    // Shutdown must not destroy the already-terminated instance again.
    assert_eq!(destroys.load(Ordering::SeqCst), 1);
}

#[test]
fn terminate_destroys_every_stored_instance() {
    init_tracing();
    let destroys = Arc::new(AtomicUsize::new(0));
    let destroy_counter = destroys.clone();
    let graph = MetadataGraph::builder()
        .add_class(ClassDef::new("A"))
        .add_class(ClassDef::new("B"))
        .add_bean(
            BeanDef::new("a", "A")
                .with_scope(ScopeKind::Request)
                .with_type("A"),
        )
        .add_bean(
            BeanDef::new("b", "B")
                .with_scope(ScopeKind::Request)
                .with_type("B"),
        )
        .build()
        .expect("valid graph");
    let shared_destroy: trellis_container::LifecycleFn = Arc::new(move |_instance| {
        destroy_counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let container = Container::builder(graph)
        .bean(
            "a",
            BeanStrategy::producing(|| 1_u8).with_pre_destroy(shared_destroy.clone()),
        )
        .bean(
            "b",
            BeanStrategy::producing(|| 2_u8).with_pre_destroy(shared_destroy),
        )
        .build()
        .expect("complete glue");

    let request = container.request_context();
    request.activate().expect("activation");
    let _ = container.instance("A", &[]).expect("resolves").get();
    let _ = container.instance("B", &[]).expect("resolves").get();
    request.terminate().expect("termination");

    assert_eq!(destroys.load(Ordering::SeqCst), 2);
    container.shutdown().expect("clean shutdown");
}

// ── Cross-thread propagation ─────────────────────────────────

#[test]
fn resumed_context_returns_the_exact_captured_instance() {
    init_tracing();
    let destroys = Arc::new(AtomicUsize::new(0));
    let container = request_container(&destroys);
    let request = container.request_context();

    request.activate().expect("activation");
    let original = container
        .instance("Session", &[])
        .expect("resolves")
        .get()
        .expect("created");
    let captured = request.captured_handles().expect("capture");
    request.deactivate().expect("deactivation");

    // Resume the logical context on a different thread and resolve
    // there: the exact captured instance, no re-creation.
    std::thread::scope(|scope| {
        let container = container.clone();
        let original = original.clone();
        scope
            .spawn(move || {
                let request = container.request_context();
                request.activate_with(captured).expect("resume");
                let resumed = container
                    .instance("Session", &[])
                    .expect("resolves")
                    .get()
                    .expect("present");
                assert!(Arc::ptr_eq(&original, &resumed));
                request.deactivate().expect("release on hop thread");
            })
            .join()
            .expect("hop thread must not panic");
    });

    assert_eq!(destroys.load(Ordering::SeqCst), 0);
    container.shutdown().expect("clean shutdown");
}

// ── Priority order across a thread hop ───────────────────────

#[test]
fn interceptors_fire_in_priority_order_across_a_thread_hop() {
    init_tracing();
    let graph = MetadataGraph::builder()
        .add_binding_type(BindingTypeDef::new("Wrapped"))
        .add_class(ClassDef::new("Echo"))
        .add_bean(
            BeanDef::new("echo", "Echo")
                .with_scope(ScopeKind::Application)
                .with_type("Echo")
                .with_binding(Binding::of("Wrapped"))
                .with_operation(OperationDef::new("Echo", "say", "say()")),
        )
        .add_interceptor(
            InterceptorDef::new("first")
                .bound_to(Binding::of("Wrapped"))
                .with_priority(1)
                .with_phases(PhaseSet::AROUND_INVOKE),
        )
        .add_interceptor(
            InterceptorDef::new("second")
                .bound_to(Binding::of("Wrapped"))
                .with_priority(2)
                .with_phases(PhaseSet::AROUND_INVOKE),
        )
        .add_interceptor(
            InterceptorDef::new("third")
                .bound_to(Binding::of("Wrapped"))
                .with_priority(3)
                .with_phases(PhaseSet::AROUND_INVOKE),
        )
        .build()
        .expect("valid graph");

    let container = Container::builder(graph)
        .bean(
            "echo",
            BeanStrategy::producing(|| ()).with_method(
                OperationKey::resolve("Echo", "say()"),
                Arc::new(|_target, _args| Ok(json!("hello"))),
            ),
        )
        .interceptor("first", prefixing_body("first"))
        .interceptor(
            "second",
            // Offloads the remaining chain to another thread; the
            // result must still read in strict priority order.
            Arc::new(|ctx| {
                std::thread::scope(|scope| {
                    scope
                        .spawn(|| {
                            let inner = ctx.proceed()?;
                            Ok(Value::String(format!(
                                "second: {}",
                                inner.as_str().unwrap_or_default()
                            )))
                        })
                        .join()
                        .expect("hop thread must not panic")
                })
            }),
        )
        .interceptor("third", prefixing_body("third"))
        .build()
        .expect("complete glue");

    let handle = container.instance("Echo", &[]).expect("resolves");
    let result = handle.invoke("say", Value::Null).expect("invocation");
    assert_eq!(result, json!("first: second: third: hello"));

    container.shutdown().expect("clean shutdown");
}

// ── Diamond operation identity ───────────────────────────────

#[test]
fn diamond_reachable_operation_is_intercepted_once_per_call() {
    init_tracing();
    // The operation is reachable through two unrelated interfaces;
    // the graph collapses both declarations into one identity, so
    // one call builds and runs one chain.
    let graph = MetadataGraph::builder()
        .add_binding_type(BindingTypeDef::new("Counted"))
        .add_class(ClassDef::new("EchoService"))
        .add_bean(
            BeanDef::new("echo", "EchoService")
                .with_scope(ScopeKind::Application)
                .with_type("LeftPort")
                .with_type("RightPort")
                .with_binding(Binding::of("Counted"))
                .with_operation(
                    OperationDef::new("EchoService", "echo", "echo(String)")
                        .reachable_through("LeftPort"),
                )
                .with_operation(
                    OperationDef::new("EchoService", "echo", "echo(String)")
                        .reachable_through("RightPort"),
                ),
        )
        .add_interceptor(
            InterceptorDef::new("call-counter")
                .bound_to(Binding::of("Counted"))
                .with_phases(PhaseSet::AROUND_INVOKE),
        )
        .build()
        .expect("valid graph");

    let calls = Arc::new(AtomicUsize::new(0));
    let container = Container::builder(graph)
        .bean(
            "echo",
            BeanStrategy::producing(|| ()).with_method(
                OperationKey::resolve("EchoService", "echo(String)"),
                Arc::new(|_target, args| Ok(args.clone())),
            ),
        )
        .interceptor("call-counter", bare_counting_body(calls.clone()))
        .build()
        .expect("complete glue");

    // The bean declares ONE logical operation.
    let bean = &container.graph().beans()[0];
    assert_eq!(bean.operations.len(), 1);

    // Resolution through either exposed type reaches the same bean;
    // one call increments the chain counter by exactly 1.
    let via_left = container.instance("LeftPort", &[]).expect("resolves");
    let result = via_left
        .invoke("echo", json!("ping"))
        .expect("invocation");
    assert_eq!(result, json!("ping"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let via_right = container.instance("RightPort", &[]).expect("resolves");
    let _ = via_right.invoke("echo", json!("pong")).expect("invocation");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    container.shutdown().expect("clean shutdown");
}
