//! Per-channel callable storage.

use calltap_core::{Callable, ChannelKind, Payloads, ScriptHandle};
use std::fmt;

/// The ordered callables of one channel.
///
/// Insertion order is registration order. Duplicates are allowed; removal
/// takes out the first identical entry only.
///
/// A store only ever holds callables whose kind is the store's own: the
/// registry is the only writer and routes each callable by
/// [`Callable::kind`]. The dispatcher relies on this and treats a misfiled
/// callable as unreachable.
pub struct ChannelStore<P: Payloads, H> {
    kind: ChannelKind,
    entries: Vec<Callable<P, H>>,
}

impl<P: Payloads, H> ChannelStore<P, H> {
    /// Create an empty store for `kind`.
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// The channel this store belongs to.
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Append a callable. The caller guarantees it belongs to this channel.
    pub(crate) fn push(&mut self, callable: Callable<P, H>) {
        debug_assert_eq!(callable.kind(), self.kind);
        self.entries.push(callable);
    }

    /// Remove every callable, releasing any scripted handles.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over callables in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Callable<P, H>> {
        self.entries.iter()
    }

    /// Iterate over native callables in registration order.
    pub fn natives(&self) -> impl Iterator<Item = &Callable<P, H>> {
        self.entries.iter().filter(|c| c.is_native())
    }

    /// Iterate over scripted callables in registration order.
    pub fn scripted(&self) -> impl Iterator<Item = &Callable<P, H>> {
        self.entries.iter().filter(|c| !c.is_native())
    }

    /// Number of registered callables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store has no callables.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Payloads, H: ScriptHandle> ChannelStore<P, H> {
    /// Remove the first callable identical to `callable`.
    ///
    /// Returns `false`, without error, if there was none.
    pub(crate) fn remove(&mut self, callable: &Callable<P, H>) -> bool {
        match self.entries.iter().position(|c| c == callable) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Check whether a callable identical to `callable` is registered.
    pub fn contains(&self, callable: &Callable<P, H>) -> bool {
        self.entries.iter().any(|c| c == callable)
    }
}

impl<P: Payloads, H: Clone> Clone for ChannelStore<P, H> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            entries: self.entries.clone(),
        }
    }
}

impl<P: Payloads, H: fmt::Debug> fmt::Debug for ChannelStore<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelStore")
            .field("kind", &self.kind)
            .field("entries", &self.entries)
            .finish()
    }
}
