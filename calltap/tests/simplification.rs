//! Fold-transform dispatch on the simplification channel.

use calltap::{
    ChannelKind, DispatchOrder, SimplificationCallback,
    testing::{CallLog, Expr, RecordingBridge, TestNode, TestScript, expr},
};
use std::sync::Arc;

mod common;
use common::{Native, Scripted, drop_add_zero, serial, take_fn_log, x_plus_zero};

#[test]
fn test_callables_chain_in_order() {
    let log = CallLog::new();
    let mut callbacks = Native::new();
    let c1_out = expr::constant(1);
    let c3_out = expr::constant(3);

    callbacks.add_callback(log.simplification("c1", Some(c1_out.clone())));
    callbacks.add_callback(log.simplification("c2", None));
    let seen = Arc::new(std::sync::Mutex::new(None));
    let seen_by_c3 = seen.clone();
    let c3 = c3_out.clone();
    callbacks.add_simplification(move |node: TestNode| {
        *seen_by_c3.lock().unwrap() = Some(node);
        Ok(c3.clone())
    });

    let out = callbacks.dispatcher().simplify(expr::var("n")).unwrap();

    assert_eq!(log.entries(), vec!["c1", "c2"]);
    let seen = seen.lock().unwrap().take().unwrap();
    assert!(Arc::ptr_eq(&seen, &c1_out), "c3 receives c1's output");
    assert!(Arc::ptr_eq(&out, &c3_out));
}

#[test]
fn test_nothing_registered_returns_input() {
    let callbacks = Scripted::new();
    let bridge = RecordingBridge::new();
    let node = x_plus_zero();

    let out = callbacks
        .dispatcher_with(&bridge)
        .simplify(node.clone())
        .unwrap();
    assert!(Arc::ptr_eq(&node, &out));
}

#[test]
fn test_all_declining_returns_input() {
    let log = CallLog::new();
    let bridge = RecordingBridge::with_log(log.clone());
    let mut callbacks = Scripted::new();
    callbacks.add_callback(log.simplification("native", None));
    callbacks
        .add_scripted(
            TestScript::noop("script"),
            ChannelKind::SymbolicSimplification,
        )
        .unwrap();

    let node = expr::var("y");
    let out = callbacks
        .dispatcher_with(&bridge)
        .simplify(node.clone())
        .unwrap();

    assert!(Arc::ptr_eq(&node, &out));
    assert_eq!(log.entries(), vec!["native", "script"]);
}

fn mixed(order: DispatchOrder, log: &CallLog) -> Scripted {
    let mut callbacks = Scripted::builder()
        .dispatch_order(order)
        .scripted(
            TestScript::noop("script-1"),
            ChannelKind::SymbolicSimplification,
        )
        .unwrap()
        .callback(log.simplification("native-1", None))
        .scripted(TestScript::noop("script-2"), 2u32)
        .unwrap()
        .build();
    callbacks.add_callback(log.simplification("native-2", None));
    callbacks
}

#[test]
fn test_natives_run_before_scripted_by_default() {
    let log = CallLog::new();
    let bridge = RecordingBridge::with_log(log.clone());
    let callbacks = mixed(DispatchOrder::default(), &log);

    callbacks
        .dispatcher_with(&bridge)
        .simplify(expr::var("z"))
        .unwrap();

    assert_eq!(
        log.entries(),
        vec!["native-1", "native-2", "script-1", "script-2"]
    );
}

#[test]
fn test_registration_order_interleaves_origins() {
    let log = CallLog::new();
    let bridge = RecordingBridge::with_log(log.clone());
    let callbacks = mixed(DispatchOrder::Registration, &log);

    callbacks
        .dispatcher_with(&bridge)
        .simplify(expr::var("z"))
        .unwrap();

    assert_eq!(
        log.entries(),
        vec!["script-1", "native-1", "script-2", "native-2"]
    );
}

#[test]
fn test_scripted_output_feeds_next_script() {
    let bridge = RecordingBridge::new();
    let mut callbacks = Scripted::new();
    let replaced = expr::constant(42);
    callbacks
        .add_scripted(
            TestScript::replace("to-42", replaced.clone()),
            ChannelKind::SymbolicSimplification,
        )
        .unwrap();
    callbacks
        .add_scripted(
            TestScript::noop("observer"),
            ChannelKind::SymbolicSimplification,
        )
        .unwrap();

    let out = callbacks
        .dispatcher_with(&bridge)
        .simplify(expr::var("a"))
        .unwrap();

    assert!(Arc::ptr_eq(&out, &replaced));
    assert_eq!(bridge.call_count(), 2);
}

#[test]
fn test_fn_pointer_simplification() {
    let _guard = serial();
    let mut callbacks = Native::new();
    callbacks.add_callback(SimplificationCallback::from_fn(drop_add_zero));

    let out = callbacks.dispatcher().simplify(x_plus_zero()).unwrap();

    assert_eq!(*out, Expr::Var("x".to_string()));
    assert_eq!(take_fn_log(), vec!["drop_add_zero"]);
}

#[test]
fn test_failure_stops_fold() {
    let log = CallLog::new();
    let bridge = RecordingBridge::with_log(log.clone());
    let mut callbacks = Scripted::new();
    callbacks.add_simplification(|_| Err("solver timeout".into()));
    callbacks
        .add_scripted(
            TestScript::noop("after"),
            ChannelKind::SymbolicSimplification,
        )
        .unwrap();

    let err = callbacks
        .dispatcher_with(&bridge)
        .simplify(expr::var("q"))
        .unwrap_err();

    assert_eq!(err.to_string(), "solver timeout");
    assert!(log.entries().is_empty());
}
