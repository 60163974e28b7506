#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # DualPulse Core
//!
//! Shared building blocks for generating two independent periodic interrupts
//! from a single 8-bit timer/compare unit whose counter is already owned by the
//! host (typically as its millisecond/overflow time base).
//!
//! This crate is hardware-agnostic. It provides:
//! - [`ChannelId`] naming the two compare channels,
//! - [`PulseConfig`] describing the counter's tick rate and channel A's fixed period,
//! - the period encoder ([`encode`], [`try_encode`]) turning microseconds into tick deltas,
//! - the [`CompareUnit`] trait that a hardware port implements.

use core::fmt;

pub mod channel;
pub mod compare;
pub mod config;
pub mod period;

pub use channel::*;
pub use compare::*;
pub use config::*;
pub use period::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type used throughout dualpulse
pub type PulseResult<T> = Result<T, PulseError>;

/// Configuration and validation errors.
///
/// The runtime path (start, stop, retune, interrupt handling) is infallible;
/// these only surface while building a [`PulseConfig`] or from the strict
/// [`try_encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseError {
    /// CPU clock and prescaler do not give a whole-microsecond tick in range
    InvalidTickRate { cpu_hz: u32, prescaler: u16 },
    /// Tick length outside `1..=MAX_TICK_US` microseconds
    TickOutOfRange { tick_us: u16 },
    /// Channel A's period is not an exact 8-bit tick count
    PeriodAUnrepresentable { period_us: u16, tick_us: u16 },
    /// Requested channel B period lies outside the supported range
    PeriodOutOfRange { requested: u16 },
}

impl fmt::Display for PulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PulseError::InvalidTickRate { cpu_hz, prescaler } => write!(
                f,
                "{cpu_hz} Hz / {prescaler} does not give a whole-microsecond tick"
            ),
            PulseError::TickOutOfRange { tick_us } => {
                write!(f, "tick of {tick_us}us outside 1..={MAX_TICK_US}us")
            }
            PulseError::PeriodAUnrepresentable { period_us, tick_us } => write!(
                f,
                "channel A period {period_us}us is not an 8-bit multiple of {tick_us}us ticks"
            ),
            PulseError::PeriodOutOfRange { requested } => write!(
                f,
                "period {requested}us outside {MIN_PERIOD_US}..={MAX_PERIOD_US}us"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PulseError {}

#[cfg(feature = "defmt")]
impl defmt::Format for PulseError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PulseError::InvalidTickRate { cpu_hz, prescaler } => {
                defmt::write!(fmt, "InvalidTickRate({}Hz/{})", cpu_hz, prescaler)
            }
            PulseError::TickOutOfRange { tick_us } => {
                defmt::write!(fmt, "TickOutOfRange({}us)", tick_us)
            }
            PulseError::PeriodAUnrepresentable { period_us, tick_us } => {
                defmt::write!(fmt, "PeriodAUnrepresentable({}us @ {}us)", period_us, tick_us)
            }
            PulseError::PeriodOutOfRange { requested } => {
                defmt::write!(fmt, "PeriodOutOfRange({}us)", requested)
            }
        }
    }
}

#[cfg(all(test, not(feature = "std")))]
extern crate std;
