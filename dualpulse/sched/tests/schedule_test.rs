//! Scheduling tests for dualpulse-sched
//! These drive a DualPulse against the tick-accurate simulated Timer0.

use std::sync::atomic::{AtomicU32, Ordering};

use dualpulse_sched::{ChannelId, DualPulse, PulseConfig};
use dualpulse_sim::SimTimer0;

type SimPulse<'a> = DualPulse<&'a SimTimer0>;

/// Advance `ticks`, dispatching matches to `pulse` and logging when each fired.
fn run(timer: &SimTimer0, pulse: &SimPulse<'_>, ticks: u32, log: &mut Vec<(u32, ChannelId)>) {
    timer.advance(ticks, |channel| {
        log.push((timer.elapsed(), channel));
        pulse.on_compare(channel);
    });
}

fn times_of(log: &[(u32, ChannelId)], channel: ChannelId) -> Vec<u32> {
    log.iter()
        .filter(|(_, ch)| *ch == channel)
        .map(|(at, _)| *at)
        .collect()
}

fn intervals(times: &[u32]) -> Vec<u32> {
    times.windows(2).map(|pair| pair[1] - pair[0]).collect()
}

#[test]
fn test_b_period_is_exact_over_many_wraps() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();

    assert_eq!(pulse.start(100), 100);
    run(&timer, &pulse, 10_000, &mut log);

    let b = times_of(&log, ChannelId::B);
    assert_eq!(b.len(), 400);
    assert_eq!(b[0], 25);
    assert!(intervals(&b).iter().all(|&gap| gap == 25));
    assert_eq!(*b.last().unwrap(), 10_000);

    let a = times_of(&log, ChannelId::A);
    assert_eq!(a.len(), 40);
    assert!(intervals(&a).iter().all(|&gap| gap == 250));
}

#[test]
fn test_late_service_shifts_phase_without_drift() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();
    pulse.start(100);

    run(&timer, &pulse, 20, &mut log);
    timer.mask_interrupts();
    run(&timer, &pulse, 10, &mut log);
    assert!(timer.is_pending(ChannelId::B));
    timer.unmask_interrupts(|channel| {
        log.push((timer.elapsed(), channel));
        pulse.on_compare(channel);
    });
    run(&timer, &pulse, 1000, &mut log);

    let b = times_of(&log, ChannelId::B);
    assert_eq!(b[0], 30);
    assert_eq!(b[1], 50);
    assert!(b[1..].iter().all(|at| at % 25 == 0));
    assert_eq!(b.len(), 41);

    let recorded = timer.fires_of(ChannelId::B);
    assert_eq!(recorded.first(), Some(&30));
}

#[test]
fn test_retuning_b_leaves_a_cadence_untouched() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();
    pulse.start(100);

    run(&timer, &pulse, 30, &mut log);
    assert_eq!(pulse.set_period_b(200), 200);
    run(&timer, &pulse, 970, &mut log);
    assert_eq!(pulse.set_period_b(52), 52);
    run(&timer, &pulse, 1000, &mut log);

    let a = times_of(&log, ChannelId::A);
    assert_eq!(a, [250, 500, 750, 1000, 1250, 1500, 1750, 2000]);

    let b = times_of(&log, ChannelId::B);
    // retune at tick 30 restarts B from "now": first match 50 ticks later
    assert_eq!(&b[..3], &[25, 80, 130]);
    let after_second_retune: Vec<u32> = b.into_iter().filter(|&at| at > 1000).collect();
    assert_eq!(after_second_retune[0], 1013);
    assert!(intervals(&after_second_retune).iter().all(|&gap| gap == 13));
}

#[test]
fn test_stop_silences_both_channels_and_spares_the_time_base() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();
    pulse.start(100);
    run(&timer, &pulse, 300, &mut log);
    let fired = log.len();
    assert!(fired > 0);

    pulse.stop();
    run(&timer, &pulse, 2000, &mut log);

    assert_eq!(log.len(), fired);
    assert!(!pulse.is_running());
    assert_eq!(timer.overflows(), 2300 / 256);
    assert!(timer.overflow_interrupt_enabled());
}

#[test]
fn test_stop_start_cycles_keep_a_25_tick_period() {
    let timer = SimTimer0::with_counter(3);
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();

    for cycle in 0..6u32 {
        pulse.stop();
        // let the old B target pass so its flag latches while stopped
        run(&timer, &pulse, 40 + cycle * 7, &mut log);
        let started_at = timer.elapsed();
        assert_eq!(pulse.start(100), 100);

        log.clear();
        run(&timer, &pulse, 100, &mut log);
        let b = times_of(&log, ChannelId::B);
        assert_eq!(b, [started_at + 25, started_at + 50, started_at + 75, started_at + 100]);
    }
}

#[test]
fn test_stale_flag_does_not_fire_after_restart() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();
    pulse.start(100);
    pulse.stop();

    run(&timer, &pulse, 30, &mut log);
    assert!(timer.is_pending(ChannelId::B));
    assert!(log.is_empty());

    pulse.start(100);
    assert!(!timer.is_pending(ChannelId::B));
    run(&timer, &pulse, 24, &mut log);
    assert!(log.is_empty());
    run(&timer, &pulse, 1, &mut log);
    assert_eq!(log, [(55, ChannelId::B)]);
}

#[test]
fn test_double_start_matches_single_start() {
    let twice = SimTimer0::new();
    let pulse_twice = DualPulse::new(&twice, PulseConfig::DEFAULT);
    pulse_twice.start(300);
    twice.advance(40, |channel| pulse_twice.on_compare(channel));
    pulse_twice.start(100);

    let once = SimTimer0::with_counter(40);
    let pulse_once = DualPulse::new(&once, PulseConfig::DEFAULT);
    pulse_once.start(100);

    for channel in ChannelId::ALL {
        assert_eq!(pulse_twice.snapshot(channel), pulse_once.snapshot(channel));
    }
}

#[test]
fn test_retune_below_floor_while_running_applies_twenty() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    let mut log = Vec::new();
    pulse.start(100);
    run(&timer, &pulse, 10, &mut log);

    assert_eq!(pulse.set_period_b(17), 20);
    assert_eq!(pulse.delta(ChannelId::B), 5);
    assert_eq!(pulse.period_us(ChannelId::B), 20);

    run(&timer, &pulse, 50, &mut log);
    let b = times_of(&log, ChannelId::B);
    assert_eq!(b, [15, 20, 25, 30, 35, 40, 45, 50, 55, 60]);
}

static A_NOTIFICATIONS: AtomicU32 = AtomicU32::new(0);
static B_NOTIFICATIONS: AtomicU32 = AtomicU32::new(0);

fn on_a() {
    A_NOTIFICATIONS.fetch_add(1, Ordering::Relaxed);
}

fn on_b() {
    B_NOTIFICATIONS.fetch_add(1, Ordering::Relaxed);
}

#[test]
fn test_handlers_are_notified_once_per_fire() {
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, PulseConfig::DEFAULT);
    pulse.set_handler(ChannelId::A, on_a);
    pulse.set_handler(ChannelId::B, on_b);
    pulse.start(100);

    timer.advance(1000, |channel| pulse.on_compare(channel));

    assert_eq!(A_NOTIFICATIONS.load(Ordering::Relaxed), 4);
    assert_eq!(B_NOTIFICATIONS.load(Ordering::Relaxed), 40);
}

#[test]
fn test_eight_megahertz_clock_scales_both_channels() {
    let config = PulseConfig::from_clock(8_000_000, 64).unwrap();
    let timer = SimTimer0::new();
    let pulse = DualPulse::new(&timer, config);
    let mut log = Vec::new();

    assert_eq!(pulse.start(100), 96);
    assert_eq!(pulse.period_us(ChannelId::A), 1000);
    run(&timer, &pulse, 1000, &mut log);

    assert!(intervals(&times_of(&log, ChannelId::A)).iter().all(|&gap| gap == 125));
    assert_eq!(times_of(&log, ChannelId::A).len(), 8);
    assert!(intervals(&times_of(&log, ChannelId::B)).iter().all(|&gap| gap == 12));
}
