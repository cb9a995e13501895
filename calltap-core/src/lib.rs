//! # calltap-core
//!
//! Core types for the calltap callback registry.
//!
//! An analysis engine exposes three decision points to outside code without
//! depending on it: resolving a memory location's concrete value, resolving
//! a register's concrete value, and simplifying an expression tree before it
//! is committed. This crate defines the vocabulary shared by the registry,
//! the dispatcher and the engine:
//!
//! - [`ChannelKind`] / [`ChannelSet`] - the closed set of decision points
//! - [`Payloads`], [`MemoryAccess`], [`RegisterAccess`] - the engine's payload types
//! - [`Callable`] - a native function value or a scripted handle
//! - [`ScriptHandle`], [`ScriptBridge`] - the optional scripting boundary
//!
//! # Error Types
//!
//! - [`CallbackError`] - Registry and dispatch failures
//! - [`BoxError`] - Failures raised by callables themselves

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod callable;
mod error;
mod kind;
mod payload;
mod script;

// Re-exports
pub use callable::{
    Callable, MemoryCallback, MemoryFn, NativeCallable, RegisterCallback, RegisterFn, Scripted,
    SimplificationCallback, SimplificationFn,
};
pub use error::{BoxError, CallbackError};
pub use kind::{ChannelKind, ChannelSet, IntoChannelKind};
pub use payload::{MemoryAccess, Payload, Payloads, RegisterAccess};
pub use script::{NoBridge, NoScript, ScriptBridge, ScriptHandle};
