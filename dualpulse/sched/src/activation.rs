//! Start, stop and retune
//!
//! Each operation runs as one critical section, so an interrupt never sees
//! one channel primed and the other stale, or a delta paired with a target
//! computed from the previous delta.

use log::{debug, warn};

use dualpulse_core::{ChannelId, CompareUnit, Encoded, MAX_PERIOD_US, MIN_PERIOD_US};

use crate::scheduler::DualPulse;

impl<U: CompareUnit> DualPulse<U> {
    /// Start both channels: A at its fixed period, B at `period_b_us`.
    ///
    /// Stale compare flags are cleared first so nothing fires before a full
    /// period has elapsed. Calling this while running restarts both schedules
    /// from the current counter value. Returns the applied B period.
    pub fn start(&self, period_b_us: u16) -> u16 {
        let encoded = critical_section::with(|cs| {
            let mut guard = self.inner.borrow_ref_mut(cs);
            let inner = &mut *guard;
            for channel in ChannelId::ALL {
                inner.unit.clear_pending(channel);
            }

            let delta_a = inner.config.delta_a();
            inner.set_delta(ChannelId::A, delta_a);
            let encoded = inner.retune_b(period_b_us);
            inner.prime(ChannelId::A);

            for channel in ChannelId::ALL {
                inner.unit.enable_interrupt(channel);
            }
            encoded
        });

        report_adjustment(period_b_us, encoded);
        debug!(
            "dual pulse started: A every {}us, B every {}us",
            self.period_us(ChannelId::A),
            encoded.applied_us
        );
        encoded.applied_us
    }

    /// Disable both compare interrupts. The counter and its overflow
    /// interrupt keep running untouched. Does nothing when already stopped.
    pub fn stop(&self) {
        let was_running = critical_section::with(|cs| {
            let mut guard = self.inner.borrow_ref_mut(cs);
            let inner = &mut *guard;
            let was_running = inner.is_running();
            for channel in ChannelId::ALL {
                inner.unit.disable_interrupt(channel);
            }
            was_running
        });

        if was_running {
            debug!("dual pulse stopped");
        }
    }

    /// Retune channel B, running or not, and return the applied period.
    ///
    /// The request is clamped and rounded rather than rejected. The new
    /// schedule starts from the current counter value instead of waiting for
    /// the previously programmed match.
    pub fn set_period_b(&self, period_us: u16) -> u16 {
        let encoded =
            critical_section::with(|cs| self.inner.borrow_ref_mut(cs).retune_b(period_us));

        report_adjustment(period_us, encoded);
        debug!("channel B retuned to {}", encoded);
        encoded.applied_us
    }

    /// Stop both channels and hand the compare unit back.
    pub fn release(self) -> U {
        self.stop();
        self.inner.into_inner().into_inner().unit
    }
}

fn report_adjustment(requested_us: u16, encoded: Encoded) {
    if !(MIN_PERIOD_US..=MAX_PERIOD_US).contains(&requested_us) {
        warn!(
            "channel B period {}us outside {}..={}us, using {}us",
            requested_us, MIN_PERIOD_US, MAX_PERIOD_US, encoded.applied_us
        );
    } else if requested_us != encoded.applied_us {
        debug!(
            "channel B period {}us rounded to {}us",
            requested_us, encoded.applied_us
        );
    }
}
