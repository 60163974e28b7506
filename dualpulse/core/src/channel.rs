//! Compare channel identifiers and per-channel state

use core::fmt;

/// One of the two compare-match channels sharing the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// Fixed-period channel (1000us on the reference platform)
    A,
    /// Runtime-configurable channel
    B,
}

impl ChannelId {
    /// Both channels, in interrupt-vector priority order.
    pub const ALL: [ChannelId; 2] = [ChannelId::A, ChannelId::B];

    /// Dense index, usable for per-channel arrays.
    pub const fn index(self) -> usize {
        match self {
            ChannelId::A => 0,
            ChannelId::B => 1,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::A => write!(f, "A"),
            ChannelId::B => write!(f, "B"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelId {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ChannelId::A => defmt::write!(fmt, "A"),
            ChannelId::B => defmt::write!(fmt, "B"),
        }
    }
}

/// Point-in-time view of one channel's scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSnapshot {
    /// Ticks between consecutive matches
    pub delta: u8,
    /// Counter value of the next match
    pub match_register: u8,
    /// Whether the match interrupt is enabled
    pub enabled: bool,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelSnapshot {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "delta={} match={} enabled={}",
            self.delta,
            self.match_register,
            self.enabled
        );
    }
}
