#![no_std]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

//! ATmega328P port: two periodic interrupts from Timer0's compare channels.
//!
//! The Arduino core runs Timer0 in fast PWM mode with a /64 prescaler and uses
//! its overflow interrupt for `millis()`. This port leaves `TCCR0A`, `TCCR0B`
//! and `TOIE0` exactly as found and only drives `OCR0A`/`OCR0B`, the `OCF0A`/
//! `OCF0B` flags and the `OCIE0A`/`OCIE0B` enables:
//!
//! - compare A fires every 1000us,
//! - compare B fires every N us, N in 20..=1000 rounded to the 4us tick.
//!
//! ```rust,ignore
//! fn on_fast_tick() { /* every 100us */ }
//!
//! dualpulse_avr::set_handler(ChannelId::B, on_fast_tick);
//! dualpulse_avr::start(100);
//! unsafe { avr_device::interrupt::enable() };
//! ```
//!
//! Handlers run in interrupt context with global interrupts disabled.

use avr_device::atmega328p::{tc0, TC0};
use dualpulse_sched::{ChannelId, CompareUnit, DualPulse, Handler, PulseConfig};

#[cfg(feature = "cpu-8mhz")]
pub const CPU_HZ: u32 = 8_000_000;
#[cfg(not(feature = "cpu-8mhz"))]
pub const CPU_HZ: u32 = 16_000_000;

/// Timer0 prescaler selected by the Arduino core
pub const PRESCALER: u16 = 64;

/// Tick rate and channel A period derived from the board clock
pub const CONFIG: PulseConfig = match PulseConfig::from_clock(CPU_HZ, PRESCALER) {
    Ok(config) => config,
    Err(_) => panic!("Timer0 clock does not give a whole-microsecond tick"),
};

static PULSE: DualPulse<Timer0> = DualPulse::new(Timer0::new(), CONFIG);

/// Compare half of Timer0.
///
/// Only one instance exists, owned by the port's scheduler, and it is only
/// used inside that scheduler's critical sections.
pub struct Timer0 {
    _private: (),
}

impl Timer0 {
    const fn new() -> Self {
        Self { _private: () }
    }

    fn regs(&self) -> &'static tc0::RegisterBlock {
        // SAFETY: the register block is memory-mapped for the whole program.
        // The host owns the control and overflow bits; this type only touches
        // the compare registers, compare flags and compare enables, and every
        // access happens with interrupts disabled.
        unsafe { &*TC0::ptr() }
    }
}

impl CompareUnit for Timer0 {
    fn counter(&self) -> u8 {
        self.regs().tcnt0.read().bits()
    }

    fn match_register(&self, channel: ChannelId) -> u8 {
        match channel {
            ChannelId::A => self.regs().ocr0a.read().bits(),
            ChannelId::B => self.regs().ocr0b.read().bits(),
        }
    }

    fn set_match_register(&mut self, channel: ChannelId, value: u8) {
        match channel {
            ChannelId::A => self.regs().ocr0a.write(|w| w.bits(value)),
            ChannelId::B => self.regs().ocr0b.write(|w| w.bits(value)),
        }
    }

    fn clear_pending(&mut self, channel: ChannelId) {
        // write-one-to-clear; zero bits leave TOV0 alone
        match channel {
            ChannelId::A => self.regs().tifr0.write(|w| w.ocf0a().set_bit()),
            ChannelId::B => self.regs().tifr0.write(|w| w.ocf0b().set_bit()),
        }
    }

    fn enable_interrupt(&mut self, channel: ChannelId) {
        match channel {
            ChannelId::A => self.regs().timsk0.modify(|_, w| w.ocie0a().set_bit()),
            ChannelId::B => self.regs().timsk0.modify(|_, w| w.ocie0b().set_bit()),
        }
    }

    fn disable_interrupt(&mut self, channel: ChannelId) {
        match channel {
            ChannelId::A => self.regs().timsk0.modify(|_, w| w.ocie0a().clear_bit()),
            ChannelId::B => self.regs().timsk0.modify(|_, w| w.ocie0b().clear_bit()),
        }
    }

    fn interrupt_enabled(&self, channel: ChannelId) -> bool {
        let timsk0 = self.regs().timsk0.read();
        match channel {
            ChannelId::A => timsk0.ocie0a().bit_is_set(),
            ChannelId::B => timsk0.ocie0b().bit_is_set(),
        }
    }
}

#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPA() {
    PULSE.on_compare(ChannelId::A);
}

#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPB() {
    PULSE.on_compare(ChannelId::B);
}

/// Start both schedules; returns the applied channel B period in microseconds.
pub fn start(period_b_us: u16) -> u16 {
    PULSE.start(period_b_us)
}

/// Stop both schedules, keeping the Arduino overflow time base intact.
pub fn stop() {
    PULSE.stop();
}

/// Set channel B's period (20..=1000us, rounded down to 4us).
/// Returns the period actually applied.
pub fn set_period_b(period_us: u16) -> u16 {
    PULSE.set_period_b(period_us)
}

pub fn set_handler(channel: ChannelId, handler: Handler) {
    PULSE.set_handler(channel, handler);
}

pub fn clear_handler(channel: ChannelId) {
    PULSE.clear_handler(channel);
}

pub fn is_running() -> bool {
    PULSE.is_running()
}

/// The port's scheduler, for status queries
pub fn pulse() -> &'static DualPulse<Timer0> {
    &PULSE
}
