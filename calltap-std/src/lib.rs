//! # calltap-std
//!
//! Registry and dispatcher implementations for calltap.
//!
//! This crate provides:
//! - **Storage**: [`ChannelStore`], one ordered list of callables per channel
//! - **Registry**: [`Callbacks`], [`CallbacksBuilder`], [`DispatchOrder`]
//! - **Dispatch**: [`Dispatcher`], running the broadcast and fold-transform protocols
//! - **Testing**: payload types and doubles in [`testing`]
//!
//! The registry is not internally synchronized. Registration and dispatch
//! run to completion on the calling thread; an engine that shares a registry
//! across threads must serialize access itself.
//!
//! [`ChannelStore`]: store::ChannelStore
//! [`Callbacks`]: registry::Callbacks
//! [`CallbacksBuilder`]: registry::CallbacksBuilder
//! [`DispatchOrder`]: registry::DispatchOrder
//! [`Dispatcher`]: dispatch::Dispatcher

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use calltap_core;

// Modules
pub mod dispatch;
pub mod registry;
pub mod store;
pub mod testing;
