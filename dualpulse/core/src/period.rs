//! Channel B period encoding
//!
//! A requested period goes through three steps, in this order:
//! 1. clamp to [`MIN_PERIOD_US`]..=[`MAX_PERIOD_US`],
//! 2. round down to a whole number of ticks,
//! 3. clamp the tick count to [`MIN_TICKS`]..=[`MAX_TICKS`].
//!
//! The second clamp matters whenever the tick length does not divide the
//! microsecond bounds evenly. At 8us/tick the 20us floor rounds to 2 ticks and is
//! lifted back to 5 (40us). At 3us/tick the 1000us ceiling becomes 333 ticks and
//! is cut to 250 (750us).

use core::fmt;

use crate::{PulseConfig, PulseError, PulseResult};

/// Shortest channel B period in microseconds
pub const MIN_PERIOD_US: u16 = 20;

/// Longest channel B period in microseconds
pub const MAX_PERIOD_US: u16 = 1000;

/// Smallest channel B delta in ticks
pub const MIN_TICKS: u8 = 5;

/// Largest channel B delta in ticks
pub const MAX_TICKS: u8 = 250;

/// Channel B period used until the first retune or start
pub const DEFAULT_PERIOD_B_US: u16 = 200;

/// A period converted to counter ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    /// Delta programmed into the channel
    pub ticks: u8,
    /// Period actually produced, `ticks * tick_us`
    pub applied_us: u16,
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us ({} ticks)", self.applied_us, self.ticks)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Encoded {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}us ({} ticks)", self.applied_us, self.ticks);
    }
}

/// Convert a requested period into a tick delta, silently clamping.
///
/// Never fails. The returned [`Encoded::applied_us`] may differ from the
/// request and is the value callers should rely on.
pub const fn encode(config: &PulseConfig, requested_us: u16) -> Encoded {
    let tick_us = config.tick_us();
    let clamped = if requested_us < MIN_PERIOD_US {
        MIN_PERIOD_US
    } else if requested_us > MAX_PERIOD_US {
        MAX_PERIOD_US
    } else {
        requested_us
    };

    // integer division rounds down to a whole tick
    let mut ticks = clamped / tick_us;
    if ticks < MIN_TICKS as u16 {
        ticks = MIN_TICKS as u16;
    } else if ticks > MAX_TICKS as u16 {
        ticks = MAX_TICKS as u16;
    }

    Encoded {
        ticks: ticks as u8,
        applied_us: ticks * tick_us,
    }
}

/// Like [`encode`], but rejects requests outside the period range instead of
/// clamping them. Rounding to whole ticks still applies.
pub fn try_encode(config: &PulseConfig, requested_us: u16) -> PulseResult<Encoded> {
    if !(MIN_PERIOD_US..=MAX_PERIOD_US).contains(&requested_us) {
        return Err(PulseError::PeriodOutOfRange {
            requested: requested_us,
        });
    }
    Ok(encode(config, requested_us))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uno() -> PulseConfig {
        PulseConfig::DEFAULT
    }

    #[test]
    fn in_range_multiple_of_tick_is_exact() {
        let enc = encode(&uno(), 100);
        assert_eq!(enc, Encoded { ticks: 25, applied_us: 100 });
    }

    #[test]
    fn rounds_down_to_whole_ticks() {
        assert_eq!(encode(&uno(), 103).applied_us, 100);
        assert_eq!(encode(&uno(), 999).applied_us, 996);
        assert_eq!(encode(&uno(), 21).ticks, 5);
    }

    #[test]
    fn below_floor_clamps_before_rounding() {
        // 17 would round to 16 on its own; the value clamp lifts it to 20 first
        assert_eq!(encode(&uno(), 17), Encoded { ticks: 5, applied_us: 20 });
        assert_eq!(encode(&uno(), 0).applied_us, 20);
    }

    #[test]
    fn above_ceiling_clamps() {
        assert_eq!(encode(&uno(), 1001), Encoded { ticks: 250, applied_us: 1000 });
        assert_eq!(encode(&uno(), u16::MAX).applied_us, 1000);
    }

    #[test]
    fn tick_clamp_lifts_floor_for_long_ticks() {
        let cfg = PulseConfig::new(8, 1000).unwrap();
        assert_eq!(encode(&cfg, 20), Encoded { ticks: 5, applied_us: 40 });
    }

    #[test]
    fn tick_clamp_caps_ceiling_for_short_ticks() {
        let cfg = PulseConfig::new(3, 750).unwrap();
        assert_eq!(encode(&cfg, 1000), Encoded { ticks: 250, applied_us: 750 });
    }

    #[test]
    fn strict_encoding_rejects_out_of_range() {
        assert_eq!(
            try_encode(&uno(), 19),
            Err(PulseError::PeriodOutOfRange { requested: 19 })
        );
        assert_eq!(
            try_encode(&uno(), 1001),
            Err(PulseError::PeriodOutOfRange { requested: 1001 })
        );
        assert_eq!(try_encode(&uno(), 1000).unwrap().ticks, 250);
        assert_eq!(try_encode(&uno(), 23).unwrap().applied_us, 20);
    }
}
