//! Market-hours gate.
//!
//! Pure predicate deciding whether scheduled jobs should fire. Jobs that
//! consult it must no-op silently when the window is closed.

use chrono::{DateTime, Datelike, Timelike, Weekday};
use chrono_tz::Tz;

/// Daily trading window in local wall-clock hours.
#[derive(Debug, Clone, Copy)]
pub struct TradingWindow {
    pub open_hour: u32,
    pub close_hour: u32,
}

/// True iff `now` falls inside the trading window.
///
/// Closed all day Saturday and Sunday. On weekdays the window opens at
/// `open_hour:00` (the full opening minute counts as open) and closes at
/// `close_hour:00` sharp. The asymmetry between the minute-inclusive open
/// and the hard hour close is intentional and must not be "corrected".
pub fn is_open(now: DateTime<Tz>, window: TradingWindow) -> bool {
    if matches!(now.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let hour = now.hour();
    hour >= window.open_hour && hour < window.close_hour
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    const WINDOW: TradingWindow = TradingWindow {
        open_hour: 8,
        close_hour: 22,
    };

    fn berlin(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Berlin.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_open_at_opening_minute() {
        // Tuesday 08:00:00 counts as open
        assert!(is_open(berlin(2026, 8, 4, 8, 0), WINDOW));
    }

    #[test]
    fn test_closed_before_open() {
        // Tuesday 07:59 is still closed
        assert!(!is_open(berlin(2026, 8, 4, 7, 59), WINDOW));
    }

    #[test]
    fn test_open_until_last_minute() {
        // Tuesday 21:59 is open
        assert!(is_open(berlin(2026, 8, 4, 21, 59), WINDOW));
    }

    #[test]
    fn test_closed_at_close_sharp() {
        // Tuesday 22:00:00 is closed
        assert!(!is_open(berlin(2026, 8, 4, 22, 0), WINDOW));
    }

    #[test]
    fn test_weekend_closed_all_day() {
        // Saturday and Sunday, any hour
        for hour in 0..24 {
            assert!(!is_open(berlin(2026, 8, 8, hour, 30), WINDOW));
            assert!(!is_open(berlin(2026, 8, 9, hour, 30), WINDOW));
        }
    }

    #[test]
    fn test_midday_open() {
        assert!(is_open(berlin(2026, 8, 5, 12, 30), WINDOW));
    }

    #[test]
    fn test_midnight_closed() {
        assert!(!is_open(berlin(2026, 8, 4, 0, 0), WINDOW));
    }
}
