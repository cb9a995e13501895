//! # calltap - Typed Callback Dispatch for Analysis Engines
//!
//! `calltap` lets outside code observe or influence three engine decisions
//! without the engine depending on that code:
//!
//! - resolving the concrete value of a memory location,
//! - resolving the concrete value of a register,
//! - simplifying an expression tree before it is committed as an assignment.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use calltap::{Callbacks, MemoryAccess};
//!
//! let mut callbacks = Callbacks::<Engine>::new();
//! callbacks.add_memory(|mem| {
//!     mem.set_concrete_value(debugger.read(mem.address(), mem.size())?);
//!     Ok(())
//! });
//!
//! // On the engine's hot path:
//! if callbacks.is_defined() {
//!     callbacks.dispatcher().concrete_memory(&mut access)?;
//! }
//! ```
//!
//! ## Scripted Callables
//!
//! Embeddings register opaque handles with [`Callbacks::add_scripted`] and
//! call them through a [`ScriptBridge`] passed to
//! [`Callbacks::dispatcher_with`].
//!
//! ## Feature Flags
//!
//! - `tracing` (default): emit registry and dispatch events via `tracing`.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Channels
pub use calltap_core::{ChannelKind, ChannelSet, IntoChannelKind};

// Payloads
pub use calltap_core::{MemoryAccess, Payload, Payloads, RegisterAccess};

// Callables
pub use calltap_core::{
    Callable, MemoryCallback, MemoryFn, NativeCallable, RegisterCallback, RegisterFn, Scripted,
    SimplificationCallback, SimplificationFn,
};

// Scripting boundary
pub use calltap_core::{NoBridge, NoScript, ScriptBridge, ScriptHandle};

// Errors
pub use calltap_core::{BoxError, CallbackError};

// Registry and dispatch
pub use calltap_std::{
    dispatch::Dispatcher,
    registry::{Callbacks, CallbacksBuilder, DispatchOrder},
    store::ChannelStore,
};

/// Testing utilities.
pub mod testing {
    pub use calltap_std::testing::{
        CallLog, Expr, RecordingBridge, ScriptAction, TestHandle, TestMemory, TestNode,
        TestPayloads, TestRegister, TestScript, expr,
    };
}
