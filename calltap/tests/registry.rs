//! Registration, removal and the defined flag.

use calltap::{
    CallbackError, ChannelKind, ChannelSet, MemoryCallback, RegisterCallback, SimplificationCallback,
    testing::{TestPayloads, TestScript},
};
use std::sync::Arc;

mod common;
use common::{Native, Scripted, drop_add_zero, zero_fill};

#[test]
fn test_defined_matches_total_count() {
    let mut callbacks = Scripted::new();
    let scripts: Vec<_> = (0..3).map(|i| TestScript::noop(format!("s{i}"))).collect();
    let mut natives = Vec::new();

    for (i, script) in scripts.iter().enumerate() {
        callbacks
            .add_scripted(script.clone(), ChannelKind::ALL[i])
            .unwrap();
        natives.push(callbacks.add_register(|_| Ok(())));
        assert_eq!(callbacks.is_defined(), callbacks.len() > 0);
    }
    assert_eq!(callbacks.len(), 6);

    for (i, script) in scripts.iter().enumerate() {
        callbacks
            .remove_scripted(script, ChannelKind::ALL[i])
            .unwrap();
        assert_eq!(callbacks.is_defined(), callbacks.len() > 0);
    }
    for native in natives {
        assert!(callbacks.is_defined());
        callbacks.remove_callback(native);
        assert_eq!(callbacks.is_defined(), callbacks.len() > 0);
    }
    assert!(!callbacks.is_defined());
}

#[test]
fn test_remove_twice_is_idempotent() {
    let mut callbacks = Native::new();
    let target = callbacks.add_simplification(Ok);
    let other = callbacks.add_simplification(Ok);

    assert!(callbacks.remove_callback(target.clone()));
    assert!(!callbacks.remove_callback(target.clone()));

    assert_eq!(callbacks.count(ChannelKind::SymbolicSimplification), 1);
    assert!(callbacks.contains(other));
    assert!(!callbacks.contains(target));
}

#[test]
fn test_removing_unregistered_callable_is_noop() {
    let mut callbacks = Native::new();
    callbacks.add_memory(|_| Ok(()));

    let stranger = RegisterCallback::new(|_: &mut calltap::testing::TestRegister| Ok(()));
    assert!(!callbacks.remove_callback(stranger));
    assert_eq!(callbacks.len(), 1);
    assert!(callbacks.is_defined());
}

#[test]
fn test_invalid_scripted_kind_is_rejected() {
    let mut callbacks = Scripted::new();
    callbacks.add_memory(|_| Ok(()));
    let before: Vec<usize> = ChannelKind::ALL.map(|k| callbacks.count(k)).to_vec();

    let script = TestScript::noop("bad");
    for result in [
        callbacks.add_scripted(script.clone(), 3u32),
        callbacks.add_scripted(script.clone(), -2i64),
        callbacks.add_scripted(script.clone(), "GET_CONCRETE_FLAG_VALUE"),
    ] {
        assert!(matches!(result, Err(CallbackError::InvalidChannelKind(_))));
    }

    let after: Vec<usize> = ChannelKind::ALL.map(|k| callbacks.count(k)).to_vec();
    assert_eq!(before, after);
    assert_eq!(Arc::strong_count(&script), 1);
}

#[test]
fn test_fn_pointers_remove_by_address() {
    let mut callbacks = Native::new();
    callbacks.add_callback(MemoryCallback::from_fn(zero_fill));
    callbacks.add_callback(MemoryCallback::from_fn(zero_fill));
    callbacks.add_callback(SimplificationCallback::from_fn(drop_add_zero));

    assert!(callbacks.remove_callback(MemoryCallback::from_fn(zero_fill)));
    assert_eq!(callbacks.count(ChannelKind::ConcreteMemoryValue), 1);

    assert!(callbacks.remove_callback(SimplificationCallback::from_fn(drop_add_zero)));
    assert_eq!(callbacks.defined_channels(), ChannelSet::MEMORY);
}

#[test]
fn test_callable_stays_on_its_channel() {
    let mut callbacks = Scripted::new();
    callbacks.add_memory(|_| Ok(()));
    callbacks
        .add_scripted(TestScript::noop("reg"), "GET_CONCRETE_REGISTER_VALUE")
        .unwrap();

    for kind in ChannelKind::ALL {
        assert!(callbacks.store(kind).iter().all(|c| c.kind() == kind));
    }
    assert_eq!(callbacks.count(ChannelKind::SymbolicSimplification), 0);
}

#[test]
fn test_dropping_registry_releases_handles() {
    let script = TestScript::noop("held");
    {
        let mut callbacks = calltap::Callbacks::<TestPayloads, _>::new();
        callbacks
            .add_scripted(script.clone(), ChannelKind::ConcreteMemoryValue)
            .unwrap();
        callbacks
            .add_scripted(script.clone(), ChannelKind::SymbolicSimplification)
            .unwrap();
        assert_eq!(Arc::strong_count(&script), 3);

        callbacks
            .remove_scripted(&script, ChannelKind::ConcreteMemoryValue)
            .unwrap();
        assert_eq!(Arc::strong_count(&script), 2);
    }
    assert_eq!(Arc::strong_count(&script), 1);
}
