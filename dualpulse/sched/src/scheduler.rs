//! Channel scheduling: per-channel state, re-arming and handler dispatch

use core::cell::RefCell;
use critical_section::Mutex;

use dualpulse_core::{
    encode, ChannelId, ChannelSnapshot, CompareUnit, Encoded, PulseConfig, DEFAULT_PERIOD_B_US,
};

/// Zero-argument notification invoked from interrupt context
pub type Handler = fn();

#[derive(Clone, Copy)]
struct Channel {
    delta: u8,
    handler: Option<Handler>,
}

pub(crate) struct Inner<U> {
    pub(crate) unit: U,
    pub(crate) config: PulseConfig,
    channels: [Channel; 2],
}

impl<U: CompareUnit> Inner<U> {
    fn channel(&self, channel: ChannelId) -> &Channel {
        &self.channels[channel.index()]
    }

    fn channel_mut(&mut self, channel: ChannelId) -> &mut Channel {
        &mut self.channels[channel.index()]
    }

    pub(crate) fn set_delta(&mut self, channel: ChannelId, delta: u8) {
        self.channel_mut(channel).delta = delta;
    }

    /// Schedule the next match one delta from the counter's current value.
    pub(crate) fn prime(&mut self, channel: ChannelId) {
        let target = self.unit.counter().wrapping_add(self.channel(channel).delta);
        self.unit.set_match_register(channel, target);
    }

    /// Encode a new channel B period and restart its schedule from now.
    pub(crate) fn retune_b(&mut self, period_us: u16) -> Encoded {
        let encoded = encode(&self.config, period_us);
        self.set_delta(ChannelId::B, encoded.ticks);
        self.prime(ChannelId::B);
        encoded
    }

    /// Advance the match target by one period from the match that just fired.
    ///
    /// Stepping from the previous target rather than the counter keeps the
    /// period exact no matter how late the handler runs.
    fn rearm(&mut self, channel: ChannelId) -> Option<Handler> {
        let state = *self.channel(channel);
        let next = self.unit.match_register(channel).wrapping_add(state.delta);
        self.unit.set_match_register(channel, next);
        state.handler
    }

    pub(crate) fn is_running(&self) -> bool {
        ChannelId::ALL
            .iter()
            .all(|&channel| self.unit.interrupt_enabled(channel))
    }
}

/// Owner of a compare unit producing two periodic events.
///
/// Construct it in a `static` for use from interrupt handlers; every method
/// takes `&self`.
pub struct DualPulse<U> {
    pub(crate) inner: Mutex<RefCell<Inner<U>>>,
}

impl<U: CompareUnit> DualPulse<U> {
    /// Take ownership of `unit`. Both channels stay disabled until [`DualPulse::start`].
    pub const fn new(unit: U, config: PulseConfig) -> Self {
        let channel_b = encode(&config, DEFAULT_PERIOD_B_US);
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                unit,
                config,
                channels: [
                    Channel {
                        delta: config.delta_a(),
                        handler: None,
                    },
                    Channel {
                        delta: channel_b.ticks,
                        handler: None,
                    },
                ],
            })),
        }
    }

    /// Compare-match handler body for `channel`.
    ///
    /// Call this from the channel's interrupt vector. The channel is re-armed
    /// before its handler runs, so a slow handler delays only its own
    /// notification and never the next match.
    pub fn on_compare(&self, channel: ChannelId) {
        let handler = critical_section::with(|cs| self.inner.borrow_ref_mut(cs).rearm(channel));
        if let Some(handler) = handler {
            handler();
        }
    }

    /// Install the notification for `channel`, replacing any previous one.
    pub fn set_handler(&self, channel: ChannelId, handler: Handler) {
        critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).channel_mut(channel).handler = Some(handler);
        });
    }

    /// Remove the notification for `channel`; the channel keeps re-arming.
    pub fn clear_handler(&self, channel: ChannelId) {
        critical_section::with(|cs| {
            self.inner.borrow_ref_mut(cs).channel_mut(channel).handler = None;
        });
    }

    /// Check whether a notification is installed for `channel`
    pub fn has_handler(&self, channel: ChannelId) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).channel(channel).handler.is_some())
    }

    /// Current delta of `channel` in ticks
    pub fn delta(&self, channel: ChannelId) -> u8 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).channel(channel).delta)
    }

    /// Current period of `channel` in microseconds
    pub fn period_us(&self, channel: ChannelId) -> u16 {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            u16::from(inner.channel(channel).delta) * inner.config.tick_us()
        })
    }

    /// Read a channel's delta, match target and enable bit in one atomic step.
    pub fn snapshot(&self, channel: ChannelId) -> ChannelSnapshot {
        critical_section::with(|cs| {
            let inner = self.inner.borrow_ref(cs);
            ChannelSnapshot {
                delta: inner.channel(channel).delta,
                match_register: inner.unit.match_register(channel),
                enabled: inner.unit.interrupt_enabled(channel),
            }
        })
    }

    /// Whether both compare interrupts are enabled
    pub fn is_running(&self) -> bool {
        critical_section::with(|cs| self.inner.borrow_ref(cs).is_running())
    }

    /// Timer configuration in use
    pub fn config(&self) -> PulseConfig {
        critical_section::with(|cs| self.inner.borrow_ref(cs).config)
    }
}
