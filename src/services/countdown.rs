//! Countdown engine: pure derivations from the exam timestamps and a sampled
//! "now". Never fails; a missing early-exit time just suppresses that output.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    /// 10 minutes or less remain.
    Warning,
    /// 5 minutes or less remain. Takes precedence over Warning.
    Danger,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountdownState {
    /// Signed; negative once the exam is over.
    pub remaining: Duration,
    pub is_finished: bool,
    pub urgency: Urgency,
    /// `HH:MM:SS`, clamped to `00:00:00` once finished.
    pub display: String,
    pub can_early_exit: bool,
    /// Time until early exit opens; only present while still in the future.
    pub early_exit_remaining: Option<Duration>,
}

pub fn remaining(end_time: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    end_time - now
}

pub fn urgency(remaining: Duration) -> Urgency {
    if remaining <= Duration::zero() {
        Urgency::Finished
    } else if remaining <= Duration::minutes(5) {
        Urgency::Danger
    } else if remaining <= Duration::minutes(10) {
        Urgency::Warning
    } else {
        Urgency::Normal
    }
}

/// Zero-padded `HH:MM:SS`. Non-positive durations render as `00:00:00`,
/// never as a negative time.
pub fn format_remaining(remaining: Duration) -> String {
    let total_seconds = remaining.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn evaluate(
    end_time: DateTime<Utc>,
    early_exit_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CountdownState {
    let remaining = remaining(end_time, now);
    let can_early_exit = early_exit_time.is_some_and(|t| now >= t);
    let early_exit_remaining = early_exit_time
        .map(|t| t - now)
        .filter(|d| *d > Duration::zero());

    CountdownState {
        remaining,
        is_finished: remaining <= Duration::zero(),
        urgency: urgency(remaining),
        display: format_remaining(remaining),
        can_early_exit,
        early_exit_remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, h, m, s).unwrap()
    }

    #[test]
    fn counts_down_while_running() {
        let state = evaluate(at(12, 0, 0), None, at(10, 30, 15));
        assert!(!state.is_finished);
        assert_eq!(state.remaining, Duration::seconds(5385));
        assert_eq!(state.display, "01:29:45");
        assert_eq!(state.urgency, Urgency::Normal);
    }

    #[test]
    fn finished_at_and_after_end() {
        for now in [at(12, 0, 0), at(12, 0, 1), at(13, 0, 0)] {
            let state = evaluate(at(12, 0, 0), None, now);
            assert!(state.is_finished);
            assert_eq!(state.display, "00:00:00");
            assert_eq!(state.urgency, Urgency::Finished);
        }
    }

    #[test]
    fn threshold_boundaries() {
        let end = at(12, 0, 0);
        // Exactly 10:00 remaining is warning; one second more is normal.
        assert_eq!(urgency(remaining(end, at(11, 50, 0))), Urgency::Warning);
        assert_eq!(urgency(remaining(end, at(11, 49, 59))), Urgency::Normal);
        // Exactly 5:00 remaining is danger; one second more is warning.
        assert_eq!(urgency(remaining(end, at(11, 55, 0))), Urgency::Danger);
        assert_eq!(urgency(remaining(end, at(11, 54, 59))), Urgency::Warning);
        assert_eq!(urgency(remaining(end, at(11, 59, 59))), Urgency::Danger);
    }

    #[test]
    fn early_exit_eligibility() {
        let end = at(12, 0, 0);
        let early = Some(at(11, 0, 0));

        let before = evaluate(end, early, at(10, 59, 0));
        assert!(!before.can_early_exit);
        assert_eq!(before.early_exit_remaining, Some(Duration::minutes(1)));
        assert_eq!(format_remaining(before.early_exit_remaining.unwrap()), "00:01:00");

        let open = evaluate(end, early, at(11, 0, 0));
        assert!(open.can_early_exit);
        assert_eq!(open.early_exit_remaining, None);
    }

    #[test]
    fn absent_early_exit_suppresses_outputs() {
        let state = evaluate(at(12, 0, 0), None, at(10, 0, 0));
        assert!(!state.can_early_exit);
        assert_eq!(state.early_exit_remaining, None);
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(format_remaining(Duration::seconds(0)), "00:00:00");
        assert_eq!(format_remaining(Duration::seconds(-30)), "00:00:00");
        assert_eq!(format_remaining(Duration::seconds(59)), "00:00:59");
        assert_eq!(format_remaining(Duration::seconds(3661)), "01:01:01");
        assert_eq!(format_remaining(Duration::hours(27)), "27:00:00");
    }
}
