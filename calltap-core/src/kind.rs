//! Channel kinds.
//!
//! The set of channels is closed: an engine exposes exactly three decision
//! points to callbacks, and adding a fourth is a design change rather than
//! configuration.

use crate::error::CallbackError;
use bitflags::bitflags;
use std::{fmt, str::FromStr};

/// One of the three decision points callbacks can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Resolve the concrete value of a memory location.
    ConcreteMemoryValue,
    /// Resolve the concrete value of a register.
    ConcreteRegisterValue,
    /// Rewrite an expression tree before it is committed as an assignment.
    SymbolicSimplification,
}

impl ChannelKind {
    /// Every channel, in discriminant order.
    pub const ALL: [ChannelKind; 3] = [
        ChannelKind::ConcreteMemoryValue,
        ChannelKind::ConcreteRegisterValue,
        ChannelKind::SymbolicSimplification,
    ];

    /// The stable upper-snake name scripting embeddings use for this channel.
    pub const fn name(self) -> &'static str {
        match self {
            ChannelKind::ConcreteMemoryValue => "GET_CONCRETE_MEMORY_VALUE",
            ChannelKind::ConcreteRegisterValue => "GET_CONCRETE_REGISTER_VALUE",
            ChannelKind::SymbolicSimplification => "SYMBOLIC_SIMPLIFICATION",
        }
    }

    /// The raw discriminant exposed to scripting embeddings.
    pub const fn as_raw(self) -> u32 {
        match self {
            ChannelKind::ConcreteMemoryValue => 0,
            ChannelKind::ConcreteRegisterValue => 1,
            ChannelKind::SymbolicSimplification => 2,
        }
    }

    /// The single-channel [`ChannelSet`] for this kind.
    pub const fn as_set(self) -> ChannelSet {
        match self {
            ChannelKind::ConcreteMemoryValue => ChannelSet::MEMORY,
            ChannelKind::ConcreteRegisterValue => ChannelSet::REGISTER,
            ChannelKind::SymbolicSimplification => ChannelSet::SIMPLIFICATION,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u32> for ChannelKind {
    type Error = CallbackError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        ChannelKind::ALL
            .into_iter()
            .find(|kind| kind.as_raw() == raw)
            .ok_or_else(|| CallbackError::invalid_kind(raw))
    }
}

impl FromStr for ChannelKind {
    type Err = CallbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChannelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| CallbackError::invalid_kind(s))
    }
}

/// Anything a scripted registration may name its channel with.
///
/// Typed kinds always convert; raw integers and names are checked against
/// the closed set and fail with [`CallbackError::InvalidChannelKind`].
pub trait IntoChannelKind {
    /// Resolve to a member of the closed set.
    fn into_channel_kind(self) -> Result<ChannelKind, CallbackError>;
}

impl IntoChannelKind for ChannelKind {
    fn into_channel_kind(self) -> Result<ChannelKind, CallbackError> {
        Ok(self)
    }
}

impl IntoChannelKind for u32 {
    fn into_channel_kind(self) -> Result<ChannelKind, CallbackError> {
        ChannelKind::try_from(self)
    }
}

impl IntoChannelKind for i64 {
    fn into_channel_kind(self) -> Result<ChannelKind, CallbackError> {
        u32::try_from(self)
            .map_err(|_| CallbackError::invalid_kind(self))
            .and_then(ChannelKind::try_from)
    }
}

impl IntoChannelKind for &str {
    fn into_channel_kind(self) -> Result<ChannelKind, CallbackError> {
        self.parse()
    }
}

bitflags! {
    /// A set of channels, used to track which channels have callables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelSet: u8 {
        /// [`ChannelKind::ConcreteMemoryValue`]
        const MEMORY = 1 << 0;
        /// [`ChannelKind::ConcreteRegisterValue`]
        const REGISTER = 1 << 1;
        /// [`ChannelKind::SymbolicSimplification`]
        const SIMPLIFICATION = 1 << 2;
    }
}

impl ChannelSet {
    /// Check whether `kind` is a member.
    pub fn has(self, kind: ChannelKind) -> bool {
        self.contains(kind.as_set())
    }
}

impl From<ChannelKind> for ChannelSet {
    fn from(kind: ChannelKind) -> Self {
        kind.as_set()
    }
}

impl FromIterator<ChannelKind> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = ChannelKind>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ChannelSet::empty(), |set, kind| set | kind.as_set())
    }
}
