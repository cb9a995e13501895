//! Callables: the things a registry stores.
//!
//! A [`Callable`] is either a native function value, whose channel is fixed
//! by its signature, or a scripted handle tagged with the channel it was
//! registered for. Equality is identity, never structural.

use crate::{
    error::BoxError,
    kind::ChannelKind,
    payload::Payloads,
    script::ScriptHandle,
};
use std::{fmt, sync::Arc};

/// Signature of a [`ChannelKind::ConcreteMemoryValue`] native callable.
pub type MemoryFn<M> = dyn Fn(&mut M) -> Result<(), BoxError> + Send + Sync;

/// Signature of a [`ChannelKind::ConcreteRegisterValue`] native callable.
pub type RegisterFn<R> = dyn Fn(&mut R) -> Result<(), BoxError> + Send + Sync;

/// Signature of a [`ChannelKind::SymbolicSimplification`] native callable.
pub type SimplificationFn<N> = dyn Fn(N) -> Result<N, BoxError> + Send + Sync;

/// A shared function value plus the key it is compared by.
struct NativeFn<F: ?Sized> {
    func: Arc<F>,
    id: usize,
}

impl<F: ?Sized> NativeFn<F> {
    fn shared(func: Arc<F>) -> Self {
        let id = Arc::as_ptr(&func) as *const () as usize;
        Self { func, id }
    }
}

impl<F: ?Sized> Clone for NativeFn<F> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            id: self.id,
        }
    }
}

impl<F: ?Sized> PartialEq for NativeFn<F> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<F: ?Sized> Eq for NativeFn<F> {}

impl<F: ?Sized> fmt::Debug for NativeFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.id)
    }
}

/// A native [`ChannelKind::ConcreteMemoryValue`] callable.
///
/// Clones share the function and compare equal. Two callables built with
/// [`from_fn`](Self::from_fn) from the same function also compare equal;
/// callables built with [`new`](Self::new) are only equal to their clones.
pub struct MemoryCallback<M>(NativeFn<MemoryFn<M>>);

impl<M: 'static> MemoryCallback<M> {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut M) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let func: Arc<MemoryFn<M>> = Arc::new(f);
        Self(NativeFn::shared(func))
    }

    /// Wrap a plain function, identified by its address.
    pub fn from_fn(f: fn(&mut M) -> Result<(), BoxError>) -> Self {
        let func: Arc<MemoryFn<M>> = Arc::new(f);
        Self(NativeFn { func, id: f as usize })
    }

    /// Invoke the callable.
    pub fn call(&self, mem: &mut M) -> Result<(), BoxError> {
        (self.0.func)(mem)
    }
}

/// A native [`ChannelKind::ConcreteRegisterValue`] callable.
///
/// Identity rules match [`MemoryCallback`].
pub struct RegisterCallback<R>(NativeFn<RegisterFn<R>>);

impl<R: 'static> RegisterCallback<R> {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut R) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let func: Arc<RegisterFn<R>> = Arc::new(f);
        Self(NativeFn::shared(func))
    }

    /// Wrap a plain function, identified by its address.
    pub fn from_fn(f: fn(&mut R) -> Result<(), BoxError>) -> Self {
        let func: Arc<RegisterFn<R>> = Arc::new(f);
        Self(NativeFn { func, id: f as usize })
    }

    /// Invoke the callable.
    pub fn call(&self, reg: &mut R) -> Result<(), BoxError> {
        (self.0.func)(reg)
    }
}

/// A native [`ChannelKind::SymbolicSimplification`] callable.
///
/// The callable owns the node it receives and returns the node that replaces
/// it. Returning the input unchanged means "no simplification applied".
/// Identity rules match [`MemoryCallback`].
pub struct SimplificationCallback<N>(NativeFn<SimplificationFn<N>>);

impl<N: 'static> SimplificationCallback<N> {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(N) -> Result<N, BoxError> + Send + Sync + 'static,
    {
        let func: Arc<SimplificationFn<N>> = Arc::new(f);
        Self(NativeFn::shared(func))
    }

    /// Wrap a plain function, identified by its address.
    pub fn from_fn(f: fn(N) -> Result<N, BoxError>) -> Self {
        let func: Arc<SimplificationFn<N>> = Arc::new(f);
        Self(NativeFn { func, id: f as usize })
    }

    /// Invoke the callable.
    pub fn call(&self, node: N) -> Result<N, BoxError> {
        (self.0.func)(node)
    }
}

macro_rules! native_identity {
    ($($name:ident),* $(,)?) => {$(
        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                Self(self.0.clone())
            }
        }

        impl<T> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                self.0 == other.0
            }
        }

        impl<T> Eq for $name<T> {}

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.0).finish()
            }
        }
    )*};
}

native_identity!(MemoryCallback, RegisterCallback, SimplificationCallback);

/// A native callable of any channel.
pub enum NativeCallable<P: Payloads> {
    /// See [`MemoryCallback`].
    Memory(MemoryCallback<P::Memory>),
    /// See [`RegisterCallback`].
    Register(RegisterCallback<P::Register>),
    /// See [`SimplificationCallback`].
    Simplification(SimplificationCallback<P::Node>),
}

impl<P: Payloads> NativeCallable<P> {
    /// The channel implied by the callable's signature.
    pub fn kind(&self) -> ChannelKind {
        match self {
            NativeCallable::Memory(_) => ChannelKind::ConcreteMemoryValue,
            NativeCallable::Register(_) => ChannelKind::ConcreteRegisterValue,
            NativeCallable::Simplification(_) => ChannelKind::SymbolicSimplification,
        }
    }
}

impl<P: Payloads> Clone for NativeCallable<P> {
    fn clone(&self) -> Self {
        match self {
            NativeCallable::Memory(cb) => NativeCallable::Memory(cb.clone()),
            NativeCallable::Register(cb) => NativeCallable::Register(cb.clone()),
            NativeCallable::Simplification(cb) => NativeCallable::Simplification(cb.clone()),
        }
    }
}

impl<P: Payloads> PartialEq for NativeCallable<P> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeCallable::Memory(a), NativeCallable::Memory(b)) => a == b,
            (NativeCallable::Register(a), NativeCallable::Register(b)) => a == b,
            (NativeCallable::Simplification(a), NativeCallable::Simplification(b)) => a == b,
            _ => false,
        }
    }
}

impl<P: Payloads> fmt::Debug for NativeCallable<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeCallable::Memory(cb) => f.debug_tuple("Memory").field(cb).finish(),
            NativeCallable::Register(cb) => f.debug_tuple("Register").field(cb).finish(),
            NativeCallable::Simplification(cb) => {
                f.debug_tuple("Simplification").field(cb).finish()
            }
        }
    }
}

/// A scripted handle and the channel it was registered for.
///
/// The handle is opaque: it is stored, compared by identity and handed to a
/// [`ScriptBridge`](crate::ScriptBridge). Dropping it releases the
/// registry's reference.
#[derive(Clone, Debug)]
pub struct Scripted<H> {
    handle: H,
    kind: ChannelKind,
}

impl<H> Scripted<H> {
    /// Tag `handle` with an already-validated channel.
    pub fn new(handle: H, kind: ChannelKind) -> Self {
        Self { handle, kind }
    }

    /// The scripted handle.
    pub fn handle(&self) -> &H {
        &self.handle
    }

    /// The channel it was registered for.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }
}

impl<H: ScriptHandle> PartialEq for Scripted<H> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.handle.same_handle(&other.handle)
    }
}

/// Anything a registry can store: native or scripted.
pub enum Callable<P: Payloads, H> {
    /// A native function value.
    Native(NativeCallable<P>),
    /// A scripted handle tagged with its channel.
    Scripted(Scripted<H>),
}

impl<P: Payloads, H> Callable<P, H> {
    /// The channel this callable belongs to.
    pub fn kind(&self) -> ChannelKind {
        match self {
            Callable::Native(native) => native.kind(),
            Callable::Scripted(scripted) => scripted.kind(),
        }
    }

    /// Returns `true` for native callables.
    pub fn is_native(&self) -> bool {
        matches!(self, Callable::Native(_))
    }
}

impl<P: Payloads, H: Clone> Clone for Callable<P, H> {
    fn clone(&self) -> Self {
        match self {
            Callable::Native(native) => Callable::Native(native.clone()),
            Callable::Scripted(scripted) => Callable::Scripted(scripted.clone()),
        }
    }
}

impl<P: Payloads, H: ScriptHandle> PartialEq for Callable<P, H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => a == b,
            (Callable::Scripted(a), Callable::Scripted(b)) => a == b,
            _ => false,
        }
    }
}

impl<P: Payloads, H: fmt::Debug> fmt::Debug for Callable<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => f.debug_tuple("Native").field(native).finish(),
            Callable::Scripted(scripted) => f.debug_tuple("Scripted").field(scripted).finish(),
        }
    }
}

impl<P: Payloads, H> From<MemoryCallback<P::Memory>> for Callable<P, H> {
    fn from(cb: MemoryCallback<P::Memory>) -> Self {
        Callable::Native(NativeCallable::Memory(cb))
    }
}

impl<P: Payloads, H> From<RegisterCallback<P::Register>> for Callable<P, H> {
    fn from(cb: RegisterCallback<P::Register>) -> Self {
        Callable::Native(NativeCallable::Register(cb))
    }
}

impl<P: Payloads, H> From<SimplificationCallback<P::Node>> for Callable<P, H> {
    fn from(cb: SimplificationCallback<P::Node>) -> Self {
        Callable::Native(NativeCallable::Simplification(cb))
    }
}

impl<P: Payloads, H> From<NativeCallable<P>> for Callable<P, H> {
    fn from(native: NativeCallable<P>) -> Self {
        Callable::Native(native)
    }
}
