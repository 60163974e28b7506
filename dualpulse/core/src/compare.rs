//! Compare unit abstraction
//!
//! The host has already configured the timer (prescaler, waveform mode, overflow
//! interrupt). Implementations of [`CompareUnit`] must only touch the compare
//! registers, the compare match flags and the compare interrupt-enable bits
//! named here; everything else on the unit belongs to the host.

use crate::ChannelId;

/// Two-channel output compare unit on an 8-bit counter
pub trait CompareUnit {
    /// Current counter value
    fn counter(&self) -> u8;

    /// Read a channel's compare target
    fn match_register(&self, channel: ChannelId) -> u8;

    /// Program a channel's compare target
    fn set_match_register(&mut self, channel: ChannelId, value: u8);

    /// Clear a latched compare match flag so it cannot fire once enabled
    fn clear_pending(&mut self, channel: ChannelId);

    /// Enable the channel's compare match interrupt
    fn enable_interrupt(&mut self, channel: ChannelId);

    /// Disable the channel's compare match interrupt
    fn disable_interrupt(&mut self, channel: ChannelId);

    /// Check whether the channel's compare match interrupt is enabled
    fn interrupt_enabled(&self, channel: ChannelId) -> bool;
}
