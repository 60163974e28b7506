#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

//! # DualPulse Scheduler
//!
//! Runs two independent periodic events off one 8-bit compare unit:
//! channel A at a fixed period and channel B at a period that can be retuned
//! while running.
//!
//! [`DualPulse`] is the single owner of the [`CompareUnit`]. Its state sits
//! behind a [`critical_section::Mutex`], so foreground calls
//! ([`DualPulse::start`], [`DualPulse::stop`], [`DualPulse::set_period_b`]) and
//! the compare-match handler ([`DualPulse::on_compare`]) never observe each
//! other's partial updates.
//!
//! A port wires it up roughly as:
//!
//! ```rust,ignore
//! static PULSE: DualPulse<Timer0> = DualPulse::new(Timer0::new(), PulseConfig::DEFAULT);
//!
//! #[interrupt]
//! fn TIMER0_COMPA() {
//!     PULSE.on_compare(ChannelId::A);
//! }
//! ```

#[cfg(all(test, not(feature = "std")))]
extern crate std;

pub mod activation;
pub mod scheduler;

pub use dualpulse_core::*;
pub use scheduler::{DualPulse, Handler};
