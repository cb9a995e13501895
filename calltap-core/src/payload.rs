//! Payload types exchanged with the engine.
//!
//! Descriptors and expression nodes belong to the engine. The registry only
//! names them through [`Payloads`] and reads descriptor metadata through
//! [`MemoryAccess`] and [`RegisterAccess`].

use crate::kind::ChannelKind;

/// Binds the engine's concrete payload types together.
///
/// # Example
///
/// ```rust,ignore
/// struct X86;
///
/// impl Payloads for X86 {
///     type Memory = MemoryAccess;
///     type Register = Register;
///     type Node = Arc<AstNode>;
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not describe an engine's payload types",
    label = "missing `Payloads` implementation",
    note = "Implement `Payloads` to name the memory, register and node types callbacks receive."
)]
pub trait Payloads: 'static {
    /// Mutable descriptor handed to [`ChannelKind::ConcreteMemoryValue`] callables.
    type Memory: MemoryAccess + 'static;
    /// Mutable descriptor handed to [`ChannelKind::ConcreteRegisterValue`] callables.
    type Register: RegisterAccess + 'static;
    /// Expression-tree node threaded through [`ChannelKind::SymbolicSimplification`] callables.
    ///
    /// Each callable takes ownership of the node it receives and hands
    /// ownership of its result to the next one.
    type Node: 'static;
}

/// A memory access whose concrete value a callback may resolve.
pub trait MemoryAccess {
    /// The engine's concrete value type.
    type Value;

    /// Address of the first byte accessed.
    fn address(&self) -> u64;

    /// Access size in bytes.
    fn size(&self) -> usize;

    /// Record the concrete value for this access.
    fn set_concrete_value(&mut self, value: Self::Value);
}

/// A register whose concrete value a callback may resolve.
pub trait RegisterAccess {
    /// The engine's concrete value type.
    type Value;

    /// Register name, e.g. `"rax"`.
    fn name(&self) -> &str;

    /// Register size in bytes.
    fn size(&self) -> usize;

    /// Record the concrete value for this register.
    fn set_concrete_value(&mut self, value: Self::Value);
}

/// A payload for the kind-checked entry point `Dispatcher::process`.
pub enum Payload<'a, P: Payloads> {
    /// A memory access to concretize.
    Memory(&'a mut P::Memory),
    /// A register to concretize.
    Register(&'a mut P::Register),
    /// An expression root to simplify.
    Node(P::Node),
}

impl<P: Payloads> Payload<'_, P> {
    /// The only channel this payload may be dispatched on.
    pub fn channel(&self) -> ChannelKind {
        match self {
            Payload::Memory(_) => ChannelKind::ConcreteMemoryValue,
            Payload::Register(_) => ChannelKind::ConcreteRegisterValue,
            Payload::Node(_) => ChannelKind::SymbolicSimplification,
        }
    }

    /// Short label used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Payload::Memory(_) => "memory",
            Payload::Register(_) => "register",
            Payload::Node(_) => "node",
        }
    }
}
