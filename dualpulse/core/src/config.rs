//! Timer configuration
//!
//! The counter's prescaler and mode are owned by the host; dualpulse only needs
//! to know how long one tick lasts and how many ticks make up channel A's fixed
//! period.

use crate::{PulseError, PulseResult, MAX_PERIOD_US, MIN_TICKS};

/// Microseconds per tick on the reference platform (16 MHz, prescaler 64)
pub const DEFAULT_TICK_US: u16 = 4;

/// Channel A's nominal period in microseconds
pub const DEFAULT_PERIOD_A_US: u16 = 1000;

/// Longest tick for which the minimum tick count still fits the period range
pub const MAX_TICK_US: u16 = MAX_PERIOD_US / MIN_TICKS as u16;

/// Validated tick rate and channel A delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseConfig {
    tick_us: u16,
    period_a_us: u16,
    delta_a: u8,
}

impl PulseConfig {
    /// Arduino Uno defaults: 4us ticks, channel A every 250 ticks.
    pub const DEFAULT: Self = Self {
        tick_us: DEFAULT_TICK_US,
        period_a_us: DEFAULT_PERIOD_A_US,
        delta_a: (DEFAULT_PERIOD_A_US / DEFAULT_TICK_US) as u8,
    };

    /// Build a configuration from an explicit tick length.
    ///
    /// `period_a_us` must be an exact multiple of `tick_us` and span at most
    /// 255 ticks, since channel A's delta is an 8-bit counter increment.
    pub const fn new(tick_us: u16, period_a_us: u16) -> PulseResult<Self> {
        if tick_us == 0 || tick_us > MAX_TICK_US {
            return Err(PulseError::TickOutOfRange { tick_us });
        }
        let ticks = period_a_us / tick_us;
        if period_a_us % tick_us != 0 || ticks == 0 || ticks > u8::MAX as u16 {
            return Err(PulseError::PeriodAUnrepresentable {
                period_us: period_a_us,
                tick_us,
            });
        }
        Ok(Self {
            tick_us,
            period_a_us,
            delta_a: ticks as u8,
        })
    }

    /// Derive the tick length from the CPU clock and the timer prescaler the
    /// host already selected, keeping channel A at [`DEFAULT_PERIOD_A_US`].
    pub const fn from_clock(cpu_hz: u32, prescaler: u16) -> PulseResult<Self> {
        let scaled = prescaler as u64 * 1_000_000;
        if cpu_hz == 0 || prescaler == 0 || scaled % cpu_hz as u64 != 0 {
            return Err(PulseError::InvalidTickRate { cpu_hz, prescaler });
        }
        let tick_us = scaled / cpu_hz as u64;
        if tick_us > MAX_TICK_US as u64 {
            return Err(PulseError::InvalidTickRate { cpu_hz, prescaler });
        }
        Self::new(tick_us as u16, DEFAULT_PERIOD_A_US)
    }

    /// Microseconds per counter tick
    pub const fn tick_us(&self) -> u16 {
        self.tick_us
    }

    /// Channel A period in microseconds
    pub const fn period_a_us(&self) -> u16 {
        self.period_a_us
    }

    /// Channel A delta in ticks
    pub const fn delta_a(&self) -> u8 {
        self.delta_a
    }
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_uno_timer0() {
        let cfg = PulseConfig::from_clock(16_000_000, 64).unwrap();
        assert_eq!(cfg, PulseConfig::DEFAULT);
        assert_eq!(cfg.tick_us(), 4);
        assert_eq!(cfg.delta_a(), 250);
        assert_eq!(cfg.period_a_us(), 1000);
    }

    #[test]
    fn eight_megahertz_doubles_the_tick() {
        let cfg = PulseConfig::from_clock(8_000_000, 64).unwrap();
        assert_eq!(cfg.tick_us(), 8);
        assert_eq!(cfg.delta_a(), 125);
    }

    #[test]
    fn fractional_tick_is_rejected() {
        assert_eq!(
            PulseConfig::from_clock(16_000_000, 8),
            Err(PulseError::InvalidTickRate { cpu_hz: 16_000_000, prescaler: 8 })
        );
        assert!(PulseConfig::from_clock(0, 64).is_err());
    }

    #[test]
    fn tick_longer_than_range_allows_is_rejected() {
        assert_eq!(
            PulseConfig::from_clock(1_000_000, 1024),
            Err(PulseError::InvalidTickRate { cpu_hz: 1_000_000, prescaler: 1024 })
        );
        assert_eq!(
            PulseConfig::new(0, 1000),
            Err(PulseError::TickOutOfRange { tick_us: 0 })
        );
    }

    #[test]
    fn period_a_must_fit_eight_bits() {
        // 1000us at 2us/tick would need 500 ticks
        assert_eq!(
            PulseConfig::new(2, 1000),
            Err(PulseError::PeriodAUnrepresentable { period_us: 1000, tick_us: 2 })
        );
        assert!(PulseConfig::new(3, 1000).is_err());
        assert_eq!(PulseConfig::new(5, 1000).unwrap().delta_a(), 200);
    }
}
