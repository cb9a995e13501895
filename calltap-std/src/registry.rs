//! The callback registry.
//!
//! [`Callbacks`] owns one [`ChannelStore`] per channel and tracks which
//! channels have at least one callable so engines can skip dispatch entirely
//! on their hot paths.

use crate::store::ChannelStore;
use calltap_core::{
    BoxError, Callable, CallbackError, ChannelKind, ChannelSet, IntoChannelKind, MemoryCallback,
    NoScript, Payloads, RegisterCallback, ScriptHandle, Scripted, SimplificationCallback,
};
use std::fmt;

/// How every channel orders native and scripted callables during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchOrder {
    /// Natives in registration order, then scripted callables in
    /// registration order.
    #[default]
    NativeFirst,
    /// Strict registration order regardless of origin.
    Registration,
}

/// A registry of concretization and simplification callbacks.
///
/// Cloning produces an independent registry holding the same callables in
/// the same order. The callables themselves are shared, not duplicated.
///
/// # Example
/// ```ignore
/// let mut callbacks = Callbacks::<Engine>::new();
/// let hook = callbacks.add_memory(|mem| {
///     mem.set_concrete_value(read_target(mem.address(), mem.size()));
///     Ok(())
/// });
/// assert!(callbacks.is_defined());
///
/// callbacks.remove_callback(hook);
/// assert!(!callbacks.is_defined());
/// ```
pub struct Callbacks<P: Payloads, H = NoScript> {
    memory: ChannelStore<P, H>,
    register: ChannelStore<P, H>,
    simplification: ChannelStore<P, H>,
    defined: ChannelSet,
    order: DispatchOrder,
}

impl<P: Payloads, H> Callbacks<P, H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            memory: ChannelStore::new(ChannelKind::ConcreteMemoryValue),
            register: ChannelStore::new(ChannelKind::ConcreteRegisterValue),
            simplification: ChannelStore::new(ChannelKind::SymbolicSimplification),
            defined: ChannelSet::empty(),
            order: DispatchOrder::default(),
        }
    }

    /// Start building a registry.
    pub fn builder() -> CallbacksBuilder<P, H> {
        CallbacksBuilder::new()
    }

    /// True if at least one callable of any channel is registered.
    ///
    /// Dispatching with nothing registered is still correct; this only lets
    /// callers skip the dispatch path.
    #[inline]
    pub fn is_defined(&self) -> bool {
        !self.defined.is_empty()
    }

    /// True if at least one callable is registered for `kind`.
    #[inline]
    pub fn is_defined_for(&self, kind: ChannelKind) -> bool {
        self.defined.has(kind)
    }

    /// The channels that currently have callables.
    pub fn defined_channels(&self) -> ChannelSet {
        self.defined
    }

    /// The store for `kind`.
    pub fn store(&self, kind: ChannelKind) -> &ChannelStore<P, H> {
        match kind {
            ChannelKind::ConcreteMemoryValue => &self.memory,
            ChannelKind::ConcreteRegisterValue => &self.register,
            ChannelKind::SymbolicSimplification => &self.simplification,
        }
    }

    fn store_mut(&mut self, kind: ChannelKind) -> &mut ChannelStore<P, H> {
        match kind {
            ChannelKind::ConcreteMemoryValue => &mut self.memory,
            ChannelKind::ConcreteRegisterValue => &mut self.register,
            ChannelKind::SymbolicSimplification => &mut self.simplification,
        }
    }

    /// Number of callables registered for `kind`.
    pub fn count(&self, kind: ChannelKind) -> usize {
        self.store(kind).len()
    }

    /// Number of callables registered across all channels.
    pub fn len(&self) -> usize {
        ChannelKind::ALL.into_iter().map(|kind| self.count(kind)).sum()
    }

    /// Check if no callable is registered.
    pub fn is_empty(&self) -> bool {
        !self.is_defined()
    }

    /// The ordering policy used by every channel.
    pub fn dispatch_order(&self) -> DispatchOrder {
        self.order
    }

    /// Change the ordering policy used by every channel.
    pub fn set_dispatch_order(&mut self, order: DispatchOrder) {
        self.order = order;
    }

    /// Register a callable on the channel its kind names.
    ///
    /// Native callables carry their channel in their type.
    pub fn add_callback(&mut self, callable: impl Into<Callable<P, H>>) {
        let callable = callable.into();
        let kind = callable.kind();
        #[cfg(feature = "tracing")]
        let native = callable.is_native();
        self.store_mut(kind).push(callable);
        self.refresh();
        #[cfg(feature = "tracing")]
        tracing::debug!(%kind, native, count = self.count(kind), "callback added");
    }

    /// Register a scripted handle for the channel named by `kind`.
    ///
    /// Fails with [`CallbackError::InvalidChannelKind`], leaving the registry
    /// untouched, if `kind` is not one of the three channels.
    pub fn add_scripted(
        &mut self,
        handle: H,
        kind: impl IntoChannelKind,
    ) -> Result<(), CallbackError> {
        let kind = checked_kind(kind)?;
        self.add_callback(Callable::Scripted(Scripted::new(handle, kind)));
        Ok(())
    }

    /// Register a memory closure, returning the handle that removes it.
    pub fn add_memory<F>(&mut self, f: F) -> MemoryCallback<P::Memory>
    where
        F: Fn(&mut P::Memory) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let cb = MemoryCallback::new(f);
        self.add_callback(cb.clone());
        cb
    }

    /// Register a register closure, returning the handle that removes it.
    pub fn add_register<F>(&mut self, f: F) -> RegisterCallback<P::Register>
    where
        F: Fn(&mut P::Register) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let cb = RegisterCallback::new(f);
        self.add_callback(cb.clone());
        cb
    }

    /// Register a simplification closure, returning the handle that removes it.
    pub fn add_simplification<F>(&mut self, f: F) -> SimplificationCallback<P::Node>
    where
        F: Fn(P::Node) -> Result<P::Node, BoxError> + Send + Sync + 'static,
    {
        let cb = SimplificationCallback::new(f);
        self.add_callback(cb.clone());
        cb
    }

    /// Remove every callable from every channel.
    ///
    /// Scripted handles are dropped, releasing the registry's references.
    pub fn remove_all(&mut self) {
        for kind in ChannelKind::ALL {
            self.store_mut(kind).clear();
        }
        self.refresh();
        #[cfg(feature = "tracing")]
        tracing::debug!("all callbacks removed");
    }

    /// Recompute the defined-channel set from the stores.
    fn refresh(&mut self) {
        self.defined = ChannelKind::ALL
            .into_iter()
            .filter(|&kind| !self.store(kind).is_empty())
            .collect();
    }
}

impl<P: Payloads, H: ScriptHandle> Callbacks<P, H> {
    /// Remove the first registration identical to `callable`.
    ///
    /// Removing something that is not registered is a silent no-op; the
    /// return value only reports whether anything was removed.
    pub fn remove_callback(&mut self, callable: impl Into<Callable<P, H>>) -> bool {
        let callable = callable.into();
        let kind = callable.kind();
        let removed = self.store_mut(kind).remove(&callable);
        self.refresh();
        #[cfg(feature = "tracing")]
        tracing::debug!(%kind, removed, count = self.count(kind), "callback removed");
        removed
    }

    /// Remove the first registration of `handle` on the channel named by `kind`.
    ///
    /// Fails with [`CallbackError::InvalidChannelKind`] if `kind` is not one
    /// of the three channels. A handle registered under a different channel
    /// is not touched.
    pub fn remove_scripted(
        &mut self,
        handle: &H,
        kind: impl IntoChannelKind,
    ) -> Result<bool, CallbackError> {
        let kind = checked_kind(kind)?;
        Ok(self.remove_callback(Callable::Scripted(Scripted::new(handle.clone(), kind))))
    }

    /// Check whether a callable identical to `callable` is registered.
    pub fn contains(&self, callable: impl Into<Callable<P, H>>) -> bool {
        let callable = callable.into();
        self.store(callable.kind()).contains(&callable)
    }
}

fn checked_kind(kind: impl IntoChannelKind) -> Result<ChannelKind, CallbackError> {
    let result = kind.into_channel_kind();
    #[cfg(feature = "tracing")]
    {
        if let Err(err) = &result {
            tracing::warn!(%err, "rejected scripted callback");
        }
    }
    result
}

impl<P: Payloads, H> Default for Callbacks<P, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payloads, H: Clone> Clone for Callbacks<P, H> {
    fn clone(&self) -> Self {
        Self {
            memory: self.memory.clone(),
            register: self.register.clone(),
            simplification: self.simplification.clone(),
            defined: self.defined,
            order: self.order,
        }
    }
}

impl<P: Payloads, H> fmt::Debug for Callbacks<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("memory", &self.memory.len())
            .field("register", &self.register.len())
            .field("simplification", &self.simplification.len())
            .field("order", &self.order)
            .finish()
    }
}

// ============================================================================
// CallbacksBuilder
// ============================================================================

/// Builder for constructing a [`Callbacks`] registry.
///
/// # Example
/// ```ignore
/// let callbacks = Callbacks::<Engine, PyHandle>::builder()
///     .dispatch_order(DispatchOrder::Registration)
///     .callback(SimplificationCallback::from_fn(fold_constants))
///     .scripted(py_simplifier, "SYMBOLIC_SIMPLIFICATION")?
///     .build();
/// ```
pub struct CallbacksBuilder<P: Payloads, H = NoScript> {
    callbacks: Callbacks<P, H>,
}

impl<P: Payloads, H> CallbacksBuilder<P, H> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            callbacks: Callbacks::new(),
        }
    }

    /// Set the dispatch ordering policy.
    pub fn dispatch_order(mut self, order: DispatchOrder) -> Self {
        self.callbacks.set_dispatch_order(order);
        self
    }

    /// Register a callable.
    pub fn callback(mut self, callable: impl Into<Callable<P, H>>) -> Self {
        self.callbacks.add_callback(callable);
        self
    }

    /// Register a scripted handle.
    pub fn scripted(
        mut self,
        handle: H,
        kind: impl IntoChannelKind,
    ) -> Result<Self, CallbackError> {
        self.callbacks.add_scripted(handle, kind)?;
        Ok(self)
    }

    /// Build the registry.
    pub fn build(self) -> Callbacks<P, H> {
        self.callbacks
    }
}

impl<P: Payloads, H> Default for CallbacksBuilder<P, H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestHandle, TestNode, TestPayloads, TestScript};

    type Registry = Callbacks<TestPayloads, TestHandle>;

    #[test]
    fn starts_empty() {
        let callbacks = Registry::new();
        assert!(!callbacks.is_defined());
        assert!(callbacks.is_empty());
        assert_eq!(callbacks.len(), 0);
        assert_eq!(
            callbacks.dispatch_order(),
            DispatchOrder::NativeFirst
        );
    }

    #[test]
    fn defined_tracks_every_mutation() {
        let mut callbacks = Registry::new();
        let mem = callbacks.add_memory(|_| Ok(()));
        assert!(callbacks.is_defined());
        assert!(callbacks.is_defined_for(ChannelKind::ConcreteMemoryValue));
        assert!(!callbacks.is_defined_for(ChannelKind::ConcreteRegisterValue));

        let script = TestScript::noop("reg");
        callbacks
            .add_scripted(script.clone(), ChannelKind::ConcreteRegisterValue)
            .unwrap();
        assert_eq!(
            callbacks.defined_channels(),
            ChannelSet::MEMORY | ChannelSet::REGISTER
        );

        assert!(callbacks.remove_callback(mem));
        assert!(callbacks.is_defined());
        assert!(
            callbacks
                .remove_scripted(&script, ChannelKind::ConcreteRegisterValue)
                .unwrap()
        );
        assert!(!callbacks.is_defined());
    }

    #[test]
    fn invalid_kind_leaves_stores_untouched() {
        let mut callbacks = Registry::new();
        let err = callbacks
            .add_scripted(TestScript::noop("bad"), 42u32)
            .unwrap_err();
        assert!(matches!(err, CallbackError::InvalidChannelKind(_)));
        assert!(callbacks.is_empty());

        let err = callbacks
            .remove_scripted(&TestScript::noop("bad"), "GET_CONCRETE_VALUE")
            .unwrap_err();
        assert!(matches!(err, CallbackError::InvalidChannelKind(_)));
    }

    #[test]
    fn scripted_removal_requires_matching_kind() {
        let mut callbacks = Registry::new();
        let script = TestScript::noop("both");
        callbacks
            .add_scripted(script.clone(), ChannelKind::ConcreteMemoryValue)
            .unwrap();

        assert!(
            !callbacks
                .remove_scripted(&script, ChannelKind::SymbolicSimplification)
                .unwrap()
        );
        assert_eq!(callbacks.count(ChannelKind::ConcreteMemoryValue), 1);
    }

    #[test]
    fn remove_all_releases_scripted_handles() {
        let mut callbacks = Registry::new();
        let script = TestScript::noop("held");
        callbacks.add_scripted(script.clone(), 2u32).unwrap();
        assert_eq!(std::sync::Arc::strong_count(&script), 2);

        callbacks.remove_all();
        assert!(!callbacks.is_defined());
        assert_eq!(std::sync::Arc::strong_count(&script), 1);
    }

    #[test]
    fn builder_applies_order_and_callbacks() {
        let callbacks = Registry::builder()
            .dispatch_order(DispatchOrder::Registration)
            .callback(SimplificationCallback::new(Ok::<TestNode, BoxError>))
            .scripted(TestScript::noop("s"), "SYMBOLIC_SIMPLIFICATION")
            .unwrap()
            .build();

        assert_eq!(
            callbacks.dispatch_order(),
            DispatchOrder::Registration
        );
        assert_eq!(callbacks.count(ChannelKind::SymbolicSimplification), 2);
        assert_eq!(callbacks.defined_channels(), ChannelSet::SIMPLIFICATION);
    }
}
