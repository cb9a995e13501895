//! Scripting boundary.
//!
//! The registry never calls into a scripting environment itself. It stores
//! opaque [`ScriptHandle`]s and, at dispatch time, hands each one to a
//! [`ScriptBridge`] supplied by the embedding.

use crate::{error::BoxError, payload::Payloads};
use std::{rc::Rc, sync::Arc};

/// An opaque, reference-counted handle to a scripted callable.
///
/// Handles are compared by identity. Cloning one must take a new reference
/// on the underlying callable and dropping it must release that reference.
pub trait ScriptHandle: Clone {
    /// Returns `true` if both handles refer to the same scripted callable.
    fn same_handle(&self, other: &Self) -> bool;
}

impl<T: ?Sized> ScriptHandle for Arc<T> {
    fn same_handle(&self, other: &Self) -> bool {
        std::ptr::eq(Arc::as_ptr(self) as *const (), Arc::as_ptr(other) as *const ())
    }
}

impl<T: ?Sized> ScriptHandle for Rc<T> {
    fn same_handle(&self, other: &Self) -> bool {
        std::ptr::eq(Rc::as_ptr(self) as *const (), Rc::as_ptr(other) as *const ())
    }
}

/// The handle type of registries built without a scripting embedding.
///
/// It has no values, so such registries can only ever hold native callables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoScript {}

impl ScriptHandle for NoScript {
    fn same_handle(&self, _other: &Self) -> bool {
        match *self {}
    }
}

/// Invokes scripted callables on behalf of a dispatcher.
///
/// The bridge performs the call into the scripting environment and marshals
/// the result back. Failures raised by the script are returned as-is and the
/// dispatcher propagates them verbatim.
pub trait ScriptBridge<P: Payloads> {
    /// The handle type this bridge knows how to call.
    type Handle: ScriptHandle;

    /// Call a [`ChannelKind::ConcreteMemoryValue`](crate::ChannelKind) script.
    fn concrete_memory(&self, handle: &Self::Handle, mem: &mut P::Memory)
    -> Result<(), BoxError>;

    /// Call a [`ChannelKind::ConcreteRegisterValue`](crate::ChannelKind) script.
    fn concrete_register(
        &self,
        handle: &Self::Handle,
        reg: &mut P::Register,
    ) -> Result<(), BoxError>;

    /// Call a [`ChannelKind::SymbolicSimplification`](crate::ChannelKind) script.
    ///
    /// Ownership of `node` passes to the script; the returned node is owned by
    /// the caller.
    fn simplify(&self, handle: &Self::Handle, node: P::Node) -> Result<P::Node, BoxError>;
}

/// The bridge used when no scripting environment is embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBridge;

impl<P: Payloads> ScriptBridge<P> for NoBridge {
    type Handle = NoScript;

    fn concrete_memory(&self, handle: &NoScript, _mem: &mut P::Memory) -> Result<(), BoxError> {
        match *handle {}
    }

    fn concrete_register(
        &self,
        handle: &NoScript,
        _reg: &mut P::Register,
    ) -> Result<(), BoxError> {
        match *handle {}
    }

    fn simplify(&self, handle: &NoScript, _node: P::Node) -> Result<P::Node, BoxError> {
        match *handle {}
    }
}
