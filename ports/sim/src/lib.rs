#![no_std]
#![forbid(unsafe_code)]

//! Host-side model of an AVR-style Timer0 with two output compare channels.
//!
//! The model advances one counter tick at a time and reproduces the parts of
//! the hardware dualpulse depends on:
//! - the counter free-runs and wraps at 256, counting overflows for the host,
//! - a compare flag latches when the counter steps onto a match register,
//!   whether or not the interrupt is enabled,
//! - a latched flag is serviced (cleared, then the ISR runs) only while its
//!   interrupt is enabled and global interrupts are not masked,
//! - channel A is serviced before channel B when both are due.
//!
//! Register state lives in [`Cell`]s so the ISR closure passed to
//! [`SimTimer0::advance`] can re-arm the unit while the model is stepping.

use core::cell::{Cell, RefCell};

use dualpulse_core::{ChannelId, CompareUnit};
use heapless::{HistoryBuffer, Vec};

/// Number of recent fires retained
pub const HISTORY_LEN: usize = 64;

/// One serviced compare match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fire {
    /// Ticks elapsed since the model was created
    pub at: u32,
    pub channel: ChannelId,
}

/// Simulated 8-bit timer with compare channels A and B.
pub struct SimTimer0 {
    counter: Cell<u8>,
    match_registers: [Cell<u8>; 2],
    pending: [Cell<bool>; 2],
    enabled: [Cell<bool>; 2],
    overflow_interrupt: Cell<bool>,
    overflows: Cell<u32>,
    elapsed: Cell<u32>,
    masked: Cell<bool>,
    fire_counts: [Cell<u32>; 2],
    history: RefCell<HistoryBuffer<Fire, HISTORY_LEN>>,
}

impl SimTimer0 {
    /// Timer as left by the host: counting from zero with its overflow
    /// interrupt enabled and both compare interrupts off.
    pub const fn new() -> Self {
        Self::with_counter(0)
    }

    /// Same as [`SimTimer0::new`] with the counter at `start`.
    pub const fn with_counter(start: u8) -> Self {
        Self {
            counter: Cell::new(start),
            match_registers: [Cell::new(0), Cell::new(0)],
            pending: [Cell::new(false), Cell::new(false)],
            enabled: [Cell::new(false), Cell::new(false)],
            overflow_interrupt: Cell::new(true),
            overflows: Cell::new(0),
            elapsed: Cell::new(0),
            masked: Cell::new(false),
            fire_counts: [Cell::new(0), Cell::new(0)],
            history: RefCell::new(HistoryBuffer::new()),
        }
    }

    /// Advance the counter by `ticks`, servicing due compare interrupts through `isr`.
    pub fn advance<F>(&self, ticks: u32, mut isr: F)
    where
        F: FnMut(ChannelId),
    {
        for _ in 0..ticks {
            self.step(&mut isr);
        }
    }

    /// Advance until `channel` has fired `count` more times or `limit` ticks pass.
    ///
    /// Returns the number of ticks advanced.
    pub fn advance_until_fired<F>(&self, channel: ChannelId, count: u32, limit: u32, mut isr: F) -> u32
    where
        F: FnMut(ChannelId),
    {
        let target = self.fire_count(channel) + count;
        let mut ticks = 0;
        while self.fire_count(channel) < target && ticks < limit {
            self.step(&mut isr);
            ticks += 1;
        }
        ticks
    }

    fn step<F>(&self, isr: &mut F)
    where
        F: FnMut(ChannelId),
    {
        self.elapsed.set(self.elapsed.get().wrapping_add(1));
        let counter = self.counter.get().wrapping_add(1);
        self.counter.set(counter);
        if counter == 0 {
            self.overflows.set(self.overflows.get().wrapping_add(1));
        }

        for channel in ChannelId::ALL {
            if counter == self.match_registers[channel.index()].get() {
                self.pending[channel.index()].set(true);
            }
        }

        if !self.masked.get() {
            self.service(isr);
        }
    }

    fn service<F>(&self, isr: &mut F)
    where
        F: FnMut(ChannelId),
    {
        for channel in ChannelId::ALL {
            let idx = channel.index();
            if self.pending[idx].get() && self.enabled[idx].get() {
                self.pending[idx].set(false);
                self.fire_counts[idx].set(self.fire_counts[idx].get() + 1);
                self.history.borrow_mut().write(Fire {
                    at: self.elapsed.get(),
                    channel,
                });
                isr(channel);
            }
        }
    }

    /// Suspend interrupt delivery, as if the CPU were in a long critical section.
    pub fn mask_interrupts(&self) {
        self.masked.set(true);
    }

    /// Resume interrupt delivery, servicing anything latched while masked.
    pub fn unmask_interrupts<F>(&self, mut isr: F)
    where
        F: FnMut(ChannelId),
    {
        self.masked.set(false);
        self.service(&mut isr);
    }

    /// Ticks elapsed since creation
    pub fn elapsed(&self) -> u32 {
        self.elapsed.get()
    }

    /// Counter overflows seen by the host time base
    pub fn overflows(&self) -> u32 {
        self.overflows.get()
    }

    /// Host-owned overflow interrupt enable
    pub fn overflow_interrupt_enabled(&self) -> bool {
        self.overflow_interrupt.get()
    }

    /// Whether a compare match is latched but not yet serviced
    pub fn is_pending(&self, channel: ChannelId) -> bool {
        self.pending[channel.index()].get()
    }

    /// Total times `channel` has been serviced
    pub fn fire_count(&self, channel: ChannelId) -> u32 {
        self.fire_counts[channel.index()].get()
    }

    /// Timestamps of the retained fires of `channel`, oldest first
    pub fn fires_of(&self, channel: ChannelId) -> Vec<u32, HISTORY_LEN> {
        self.history
            .borrow()
            .oldest_ordered()
            .filter(|fire| fire.channel == channel)
            .map(|fire| fire.at)
            .collect()
    }

    /// Most recent fire of any channel
    pub fn last_fire(&self) -> Option<Fire> {
        self.history.borrow().recent().copied()
    }

    /// Forget recorded fires, keeping register state
    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }
}

impl Default for SimTimer0 {
    fn default() -> Self {
        Self::new()
    }
}

impl CompareUnit for &SimTimer0 {
    fn counter(&self) -> u8 {
        self.counter.get()
    }

    fn match_register(&self, channel: ChannelId) -> u8 {
        self.match_registers[channel.index()].get()
    }

    fn set_match_register(&mut self, channel: ChannelId, value: u8) {
        self.match_registers[channel.index()].set(value);
    }

    fn clear_pending(&mut self, channel: ChannelId) {
        self.pending[channel.index()].set(false);
    }

    fn enable_interrupt(&mut self, channel: ChannelId) {
        self.enabled[channel.index()].set(true);
    }

    fn disable_interrupt(&mut self, channel: ChannelId) {
        self.enabled[channel.index()].set(false);
    }

    fn interrupt_enabled(&self, channel: ChannelId) -> bool {
        self.enabled[channel.index()].get()
    }
}

#[cfg(test)]
extern crate std;
