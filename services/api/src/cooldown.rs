//! Daily-action cooldown arithmetic
//!
//! Both the vote and the username change are gated by the same 24-hour
//! window. The functions here are pure; the timestamps they compare come
//! from the voter's row in the database.

use chrono::{DateTime, Utc};

/// Length of the cooldown window in milliseconds (24 hours)
pub const COOLDOWN_MS: i64 = 24 * 60 * 60 * 1000;

/// Whether the action is allowed at `now`
///
/// A user who has never acted (`last` is `None`) may always act. Exactly
/// 24 hours after the last action is allowed; one millisecond short is not.
pub fn can_act(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last {
        None => true,
        Some(last) => (now - last).num_milliseconds() >= COOLDOWN_MS,
    }
}

/// Milliseconds left until the action is allowed again (0 if allowed)
pub fn remaining_ms(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    match last {
        None => 0,
        Some(last) => (COOLDOWN_MS - (now - last).num_milliseconds()).max(0),
    }
}

/// Render a remaining wait as `"Hh Mm"` by floor division
pub fn format_remaining(ms: i64) -> String {
    let hours = ms / (60 * 60 * 1000);
    let minutes = (ms % (60 * 60 * 1000)) / (60 * 1000);
    format!("{}h {}m", hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_never_acted_is_always_allowed() {
        assert!(can_act(None, now()));
        assert_eq!(remaining_ms(None, now()), 0);
    }

    #[test]
    fn test_exactly_24h_is_allowed() {
        let last = now() - TimeDelta::milliseconds(COOLDOWN_MS);
        assert!(can_act(Some(last), now()));
        assert_eq!(remaining_ms(Some(last), now()), 0);
    }

    #[test]
    fn test_one_millisecond_short_is_blocked() {
        let last = now() - TimeDelta::milliseconds(COOLDOWN_MS - 1);
        assert!(!can_act(Some(last), now()));
        assert_eq!(remaining_ms(Some(last), now()), 1);
    }

    #[test]
    fn test_remaining_just_after_acting() {
        let last = now();
        assert!(!can_act(Some(last), now()));
        assert_eq!(remaining_ms(Some(last), now()), COOLDOWN_MS);
    }

    #[test]
    fn test_format_remaining_floors_hours_and_minutes() {
        // 23h 59m 59.999s floors to 23h 59m
        assert_eq!(format_remaining(COOLDOWN_MS - 1), "23h 59m");
        assert_eq!(format_remaining(60 * 60 * 1000 + 5 * 60 * 1000), "1h 5m");
        assert_eq!(format_remaining(59 * 1000), "0h 0m");
        assert_eq!(format_remaining(0), "0h 0m");
    }
}
