//! Pure trigger-window evaluation. No clock, no IO — the engine feeds in
//! "now" so every rule here is table-testable.

use chrono::{Duration, NaiveTime, Timelike, Weekday};
use vigil_core::types::ReminderPreference;

const SECS_PER_DAY: i64 = 86_400;

/// When the reminder should fire: slot start minus the (normalized) offset.
/// Wraps past midnight, so an early slot with a long offset triggers late
/// the previous evening.
pub fn trigger_time(start: NaiveTime, offset_minutes: u32) -> NaiveTime {
    start - Duration::minutes(i64::from(offset_minutes))
}

/// Circular time-of-day distance in seconds, so 23:59 and 00:01 are two
/// minutes apart rather than almost a day.
fn wall_clock_distance(a: NaiveTime, b: NaiveTime) -> i64 {
    let diff = (i64::from(a.num_seconds_from_midnight())
        - i64::from(b.num_seconds_from_midnight()))
    .abs();
    diff.min(SECS_PER_DAY - diff)
}

/// Whether a slot's reminder should fire at this instant. Combines the
/// availability check (weekday, enabled flag) with the trigger window:
/// `|now − trigger| ≤ tolerance`. The dedup check is the engine's job.
pub fn should_fire(
    start: NaiveTime,
    pref: &ReminderPreference,
    now: NaiveTime,
    weekday: Weekday,
    tolerance_secs: u64,
) -> bool {
    if !pref.enabled || !pref.active_on(weekday) {
        return false;
    }
    let trigger = trigger_time(start, pref.normalized_offset());
    wall_clock_distance(now, trigger) <= tolerance_secs as i64
}
