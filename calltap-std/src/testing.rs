//! Testing utilities for calltap.
//!
//! This module provides payload types and doubles that make testing
//! registries and dispatchers easier without a real engine.
//!
//! # Features
//!
//! - [`TestPayloads`]: Memory, register and expression types for tests
//! - [`TestScript`]: A scripted callable with a fixed behavior
//! - [`RecordingBridge`]: A bridge that runs [`TestScript`]s and records them
//! - [`CallLog`]: A shared, ordered log of invocations

use calltap_core::{
    BoxError, ChannelKind, MemoryAccess, MemoryCallback, Payloads, RegisterAccess,
    RegisterCallback, ScriptBridge, SimplificationCallback,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Payloads
// ============================================================================

/// Payload types used throughout the tests.
#[derive(Debug)]
pub struct TestPayloads;

impl Payloads for TestPayloads {
    type Memory = TestMemory;
    type Register = TestRegister;
    type Node = TestNode;
}

/// A memory access descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMemory {
    /// Address of the access.
    pub address: u64,
    /// Size in bytes.
    pub size: usize,
    /// Concrete value set by callbacks.
    pub value: Option<u64>,
}

impl TestMemory {
    /// Create an unresolved access.
    pub fn new(address: u64, size: usize) -> Self {
        Self {
            address,
            size,
            value: None,
        }
    }
}

impl MemoryAccess for TestMemory {
    type Value = u64;

    fn address(&self) -> u64 {
        self.address
    }

    fn size(&self) -> usize {
        self.size
    }

    fn set_concrete_value(&mut self, value: u64) {
        self.value = Some(value);
    }
}

/// A register descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRegister {
    /// Register name.
    pub name: String,
    /// Size in bytes.
    pub size: usize,
    /// Concrete value set by callbacks.
    pub value: Option<u64>,
}

impl TestRegister {
    /// Create an unresolved register.
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
            value: None,
        }
    }
}

impl RegisterAccess for TestRegister {
    type Value = u64;

    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.size
    }

    fn set_concrete_value(&mut self, value: u64) {
        self.value = Some(value);
    }
}

/// A minimal expression tree.
#[derive(Debug, PartialEq, Eq)]
pub enum Expr {
    /// A symbolic variable.
    Var(String),
    /// A constant.
    Const(u64),
    /// Addition.
    Add(TestNode, TestNode),
}

/// Expression nodes are shared; identity tells "unchanged" apart from "replaced".
pub type TestNode = Arc<Expr>;

/// Node constructors.
pub mod expr {
    use super::{Expr, TestNode};
    use std::sync::Arc;

    /// `name`
    pub fn var(name: &str) -> TestNode {
        Arc::new(Expr::Var(name.to_string()))
    }

    /// `value`
    pub fn constant(value: u64) -> TestNode {
        Arc::new(Expr::Const(value))
    }

    /// `lhs + rhs`
    pub fn add(lhs: TestNode, rhs: TestNode) -> TestNode {
        Arc::new(Expr::Add(lhs, rhs))
    }
}

// ============================================================================
// Call Log
// ============================================================================

/// A shared, ordered log of callable invocations.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// callbacks.add_callback(log.memory("first", 1));
///
/// callbacks.dispatcher().concrete_memory(&mut mem)?;
/// assert_eq!(log.entries(), vec!["first"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    /// Get a copy of the entries in invocation order.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }

    /// A memory callable that logs `id` and sets `value`.
    pub fn memory(&self, id: &'static str, value: u64) -> MemoryCallback<TestMemory> {
        let log = self.clone();
        MemoryCallback::new(move |mem: &mut TestMemory| {
            log.push(id);
            mem.set_concrete_value(value);
            Ok(())
        })
    }

    /// A register callable that logs `id` and sets `value`.
    pub fn register(&self, id: &'static str, value: u64) -> RegisterCallback<TestRegister> {
        let log = self.clone();
        RegisterCallback::new(move |reg: &mut TestRegister| {
            log.push(id);
            reg.set_concrete_value(value);
            Ok(())
        })
    }

    /// A simplification callable that logs `id` and returns `replacement`,
    /// or its input unchanged when `replacement` is `None`.
    pub fn simplification(
        &self,
        id: &'static str,
        replacement: Option<TestNode>,
    ) -> SimplificationCallback<TestNode> {
        let log = self.clone();
        SimplificationCallback::new(move |node: TestNode| {
            log.push(id);
            Ok(replacement.clone().unwrap_or(node))
        })
    }
}

// ============================================================================
// Scripted Callables
// ============================================================================

/// What a [`TestScript`] does when called.
#[derive(Debug, Clone)]
pub enum ScriptAction {
    /// Nothing; simplification returns its input.
    Noop,
    /// Set the descriptor's concrete value.
    SetValue(u64),
    /// Return this node from simplification.
    Replace(TestNode),
    /// Raise an error with this message.
    Fail(String),
}

/// A scripted callable for [`RecordingBridge`].
#[derive(Debug)]
pub struct TestScript {
    /// Name recorded on every call.
    pub name: String,
    /// Behavior.
    pub action: ScriptAction,
}

/// Scripted handles compare by `Arc` identity, not by name.
pub type TestHandle = Arc<TestScript>;

impl TestScript {
    /// Create a handle with `action`.
    pub fn handle(name: impl Into<String>, action: ScriptAction) -> TestHandle {
        Arc::new(Self {
            name: name.into(),
            action,
        })
    }

    /// A script that does nothing.
    pub fn noop(name: impl Into<String>) -> TestHandle {
        Self::handle(name, ScriptAction::Noop)
    }

    /// A script that sets `value` on descriptors.
    pub fn set_value(name: impl Into<String>, value: u64) -> TestHandle {
        Self::handle(name, ScriptAction::SetValue(value))
    }

    /// A script that replaces every node with `node`.
    pub fn replace(name: impl Into<String>, node: TestNode) -> TestHandle {
        Self::handle(name, ScriptAction::Replace(node))
    }

    /// A script that always fails.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> TestHandle {
        Self::handle(name, ScriptAction::Fail(message.into()))
    }
}

// ============================================================================
// Recording Bridge
// ============================================================================

/// A bridge that runs [`TestScript`]s and records each call.
///
/// Script names are also pushed to the shared [`CallLog`], so native and
/// scripted invocations can be checked against one ordering.
#[derive(Debug, Clone, Default)]
pub struct RecordingBridge {
    log: CallLog,
    calls: Arc<Mutex<Vec<(String, ChannelKind)>>>,
}

impl RecordingBridge {
    /// Create a bridge with its own log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bridge that writes to `log`.
    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            calls: Arc::default(),
        }
    }

    /// Get recorded `(script name, channel)` pairs.
    pub fn calls(&self) -> Vec<(String, ChannelKind)> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the number of scripted calls.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, script: &TestScript, kind: ChannelKind) -> Result<(), BoxError> {
        self.calls.lock().unwrap().push((script.name.clone(), kind));
        self.log.push(script.name.clone());
        match &script.action {
            ScriptAction::Fail(message) => Err(message.clone().into()),
            _ => Ok(()),
        }
    }
}

impl ScriptBridge<TestPayloads> for RecordingBridge {
    type Handle = TestHandle;

    fn concrete_memory(&self, handle: &TestHandle, mem: &mut TestMemory) -> Result<(), BoxError> {
        self.record(handle, ChannelKind::ConcreteMemoryValue)?;
        if let ScriptAction::SetValue(value) = handle.action {
            mem.set_concrete_value(value);
        }
        Ok(())
    }

    fn concrete_register(
        &self,
        handle: &TestHandle,
        reg: &mut TestRegister,
    ) -> Result<(), BoxError> {
        self.record(handle, ChannelKind::ConcreteRegisterValue)?;
        if let ScriptAction::SetValue(value) = handle.action {
            reg.set_concrete_value(value);
        }
        Ok(())
    }

    fn simplify(&self, handle: &TestHandle, node: TestNode) -> Result<TestNode, BoxError> {
        self.record(handle, ChannelKind::SymbolicSimplification)?;
        match &handle.action {
            ScriptAction::Replace(replacement) => Ok(Arc::clone(replacement)),
            _ => Ok(node),
        }
    }
}
