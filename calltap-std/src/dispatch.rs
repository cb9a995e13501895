//! Callback dispatch.
//!
//! Two protocols run over a channel's callables:
//!
//! - **Broadcast** (memory and register channels): every callable runs
//!   against the same mutable descriptor. Nothing short-circuits, so when
//!   several callables set a value the last writer wins.
//! - **Fold-transform** (simplification channel): each callable receives the
//!   node returned by the previous one and the final node is returned. With
//!   nothing registered, or when every callable declines, the input node comes
//!   back unchanged.
//!
//! Both protocols follow the registry's [`DispatchOrder`]: by default natives
//! run first in registration order, then scripted callables in registration
//! order.
//!
//! A failure raised by a callable stops dispatch and is returned verbatim as
//! [`CallbackError::Callback`]. Panics unwind through untouched.

use crate::{
    registry::{Callbacks, DispatchOrder},
    store::ChannelStore,
};
use calltap_core::{
    BoxError, Callable, CallbackError, ChannelKind, NativeCallable, NoBridge, NoScript, Payload,
    Payloads, ScriptBridge,
};
#[cfg(feature = "tracing")]
use calltap_core::{MemoryAccess, RegisterAccess};

/// Runs a registry's callables against engine payloads.
///
/// Borrowing both the registry and the bridge keeps registration and
/// dispatch from overlapping.
pub struct Dispatcher<'a, P: Payloads, B: ScriptBridge<P>> {
    callbacks: &'a Callbacks<P, B::Handle>,
    bridge: &'a B,
}

impl<'a, P: Payloads, B: ScriptBridge<P>> Dispatcher<'a, P, B> {
    /// Create a dispatcher over `callbacks` that calls scripts through `bridge`.
    pub fn new(callbacks: &'a Callbacks<P, B::Handle>, bridge: &'a B) -> Self {
        Self { callbacks, bridge }
    }

    /// Broadcast a memory access to every [`ChannelKind::ConcreteMemoryValue`] callable.
    pub fn concrete_memory(&self, mem: &mut P::Memory) -> Result<(), CallbackError> {
        let kind = ChannelKind::ConcreteMemoryValue;
        let store = self.callbacks.store(kind);
        if store.is_empty() {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            %kind,
            callbacks = store.len(),
            order = ?self.callbacks.dispatch_order(),
            address = mem.address(),
            size = mem.size(),
            "dispatching"
        );

        for callable in self.ordered(store) {
            let result = match callable {
                Callable::Native(NativeCallable::Memory(cb)) => cb.call(mem),
                Callable::Scripted(script) => self.bridge.concrete_memory(script.handle(), mem),
                Callable::Native(other) => misfiled(kind, other.kind()),
            };
            result.map_err(|err| failed(kind, err))?;
        }
        Ok(())
    }

    /// Broadcast a register to every [`ChannelKind::ConcreteRegisterValue`] callable.
    pub fn concrete_register(&self, reg: &mut P::Register) -> Result<(), CallbackError> {
        let kind = ChannelKind::ConcreteRegisterValue;
        let store = self.callbacks.store(kind);
        if store.is_empty() {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            %kind,
            callbacks = store.len(),
            order = ?self.callbacks.dispatch_order(),
            register = reg.name(),
            size = reg.size(),
            "dispatching"
        );

        for callable in self.ordered(store) {
            let result = match callable {
                Callable::Native(NativeCallable::Register(cb)) => cb.call(reg),
                Callable::Scripted(script) => self.bridge.concrete_register(script.handle(), reg),
                Callable::Native(other) => misfiled(kind, other.kind()),
            };
            result.map_err(|err| failed(kind, err))?;
        }
        Ok(())
    }

    /// Fold `node` through every [`ChannelKind::SymbolicSimplification`] callable.
    ///
    /// Ownership of `node` moves into the first callable, and each returned
    /// node moves into the next. The dispatcher never drops a node a callable
    /// returned, except by handing it on.
    pub fn simplify(&self, node: P::Node) -> Result<P::Node, CallbackError> {
        let store = self.callbacks.store(ChannelKind::SymbolicSimplification);
        if store.is_empty() {
            return Ok(node);
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(
            kind = %ChannelKind::SymbolicSimplification,
            callbacks = store.len(),
            order = ?self.callbacks.dispatch_order(),
            "dispatching"
        );

        self.ordered(store)
            .try_fold(node, |acc, callable| self.simplify_one(callable, acc))
    }

    /// The store's callables in the registry's [`DispatchOrder`].
    fn ordered(
        &self,
        store: &'a ChannelStore<P, B::Handle>,
    ) -> Box<dyn Iterator<Item = &'a Callable<P, B::Handle>> + 'a> {
        match self.callbacks.dispatch_order() {
            DispatchOrder::NativeFirst => Box::new(store.natives().chain(store.scripted())),
            DispatchOrder::Registration => Box::new(store.iter()),
        }
    }

    fn simplify_one(
        &self,
        callable: &Callable<P, B::Handle>,
        node: P::Node,
    ) -> Result<P::Node, CallbackError> {
        let kind = ChannelKind::SymbolicSimplification;
        let result = match callable {
            Callable::Native(NativeCallable::Simplification(cb)) => cb.call(node),
            Callable::Scripted(script) => self.bridge.simplify(script.handle(), node),
            Callable::Native(other) => misfiled(kind, other.kind()),
        };
        result.map_err(|err| failed(kind, err))
    }

    /// Kind-checked entry point.
    ///
    /// Returns the simplified node for [`Payload::Node`] and `None` for the
    /// broadcast channels. Fails with [`CallbackError::PayloadMismatch`] when
    /// `payload` does not belong on `kind`.
    pub fn process(
        &self,
        kind: ChannelKind,
        payload: Payload<'_, P>,
    ) -> Result<Option<P::Node>, CallbackError> {
        if payload.channel() != kind {
            return Err(CallbackError::PayloadMismatch {
                kind,
                payload: payload.label(),
            });
        }
        match payload {
            Payload::Memory(mem) => self.concrete_memory(mem).map(|()| None),
            Payload::Register(reg) => self.concrete_register(reg).map(|()| None),
            Payload::Node(node) => self.simplify(node).map(Some),
        }
    }
}

impl<P: Payloads, B: ScriptBridge<P>> Clone for Dispatcher<'_, P, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Payloads, B: ScriptBridge<P>> Copy for Dispatcher<'_, P, B> {}

impl<P: Payloads> Callbacks<P, NoScript> {
    /// A dispatcher for a registry without a scripting embedding.
    pub fn dispatcher(&self) -> Dispatcher<'_, P, NoBridge> {
        Dispatcher::new(self, &NoBridge)
    }
}

impl<P: Payloads, H> Callbacks<P, H> {
    /// A dispatcher that calls scripted handles through `bridge`.
    pub fn dispatcher_with<'a, B>(&'a self, bridge: &'a B) -> Dispatcher<'a, P, B>
    where
        B: ScriptBridge<P, Handle = H>,
    {
        Dispatcher::new(self, bridge)
    }
}

fn failed(kind: ChannelKind, err: BoxError) -> CallbackError {
    #[cfg(feature = "tracing")]
    tracing::debug!(%kind, error = %err, "callback failed");
    #[cfg(not(feature = "tracing"))]
    let _ = kind;
    CallbackError::Callback(err)
}

// The registry routes every callable to the store of its own kind; see
// `ChannelStore`.
fn misfiled<T>(store: ChannelKind, callable: ChannelKind) -> T {
    unreachable!("{callable} callable found in the {store} store")
}
