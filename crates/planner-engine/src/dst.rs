//! DST transition policies for recurring events.
//!
//! Recurrences are stepped on the local wall clock. A stepped local time can be
//! ambiguous (fall back) or nonexistent (spring forward); the policy decides
//! which instant, if any, it maps to.

use chrono::{DateTime, Days, Duration, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Upper bound on how far `ShiftForward` searches for the end of a gap. Covers
/// whole skipped calendar days (Pacific/Apia, 2011-12-30).
const MAX_GAP_MINUTES: u32 = 26 * 60;

/// How many days back `WallClock` looks for an existing wall time to take the
/// offset from.
const MAX_LOOKBACK_DAYS: u64 = 7;

/// Policy for handling occurrences that fall during DST transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DstPolicy {
    /// Skip instances that fall in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the first valid local time after the gap
    ShiftForward,
    /// Keep the wall clock time, using the UTC offset in effect before the gap
    /// (2:30 AM during spring forward becomes 3:30 AM)
    #[default]
    WallClock,
}

impl DstPolicy {
    /// Resolve a local wall-clock time in `tz` to a UTC instant.
    ///
    /// Ambiguous local times always resolve to the earlier instant. Returns
    /// `None` only for `Skip` inside a gap, or when the search runs off the
    /// end of the representable calendar.
    pub fn resolve(self, tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        if let Some(dt) = tz.from_local_datetime(&local).earliest() {
            return Some(dt.with_timezone(&Utc));
        }

        match self {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_valid_after_gap(tz, local),
            DstPolicy::WallClock => with_offset_before_gap(tz, local),
        }
    }
}

/// The first existing local minute after `local`, searched up to
/// `MAX_GAP_MINUTES` ahead.
fn first_valid_after_gap(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let mut candidate = local;
    for _ in 0..MAX_GAP_MINUTES {
        candidate = candidate.checked_add_signed(Duration::minutes(1))?;
        if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
            return Some(dt.with_timezone(&Utc));
        }
    }
    None
}

/// `local` read at the offset of the nearest earlier day on which the same wall
/// time exists.
///
/// Assumes a zone makes at most one gap transition per week. For an ordinary
/// spring-forward gap the previous day is enough. When a whole day is skipped
/// (Pacific/Apia, 2011-12-30) the result lands on the same instant as the
/// next day's wall time; `OccurrenceIter` drops such repeats.
fn with_offset_before_gap(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    let offset = (1..=MAX_LOOKBACK_DAYS).find_map(|days| {
        let before = local.checked_sub_days(Days::new(days))?;
        tz.from_local_datetime(&before).earliest()
    })?;
    let seconds = i64::from(offset.offset().fix().local_minus_utc());
    let utc = local.checked_sub_signed(Duration::seconds(seconds))?;
    Some(Utc.from_utc_datetime(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn regular_time_resolves_identically_under_every_policy() {
        let tz = chrono_tz::America::Los_Angeles;
        let t = local(2026, 1, 15, 9, 0);
        let expected = Utc.with_ymd_and_hms(2026, 1, 15, 17, 0, 0).unwrap();
        for policy in [DstPolicy::Skip, DstPolicy::ShiftForward, DstPolicy::WallClock] {
            assert_eq!(policy.resolve(tz, t), Some(expected));
        }
    }

    #[test]
    fn gap_time_per_policy() {
        // 2026-03-08 02:30 does not exist in Los Angeles.
        let tz = chrono_tz::America::Los_Angeles;
        let t = local(2026, 3, 8, 2, 30);

        assert_eq!(DstPolicy::Skip.resolve(tz, t), None);
        // 03:00 PDT = 10:00 UTC
        assert_eq!(
            DstPolicy::ShiftForward.resolve(tz, t),
            Some(Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap())
        );
        // 02:30 at PST offset = 10:30 UTC = 03:30 PDT
        assert_eq!(
            DstPolicy::WallClock.resolve(tz, t),
            Some(Utc.with_ymd_and_hms(2026, 3, 8, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn skipped_calendar_day_per_policy() {
        // Samoa jumped from 2011-12-29 23:59 (UTC-10) to 2011-12-31 00:00 (UTC+14).
        let tz = chrono_tz::Pacific::Apia;
        let t = local(2011, 12, 30, 9, 0);

        assert_eq!(DstPolicy::Skip.resolve(tz, t), None);
        // 2011-12-31 00:00 at UTC+14
        assert_eq!(
            DstPolicy::ShiftForward.resolve(tz, t),
            Some(Utc.with_ymd_and_hms(2011, 12, 30, 10, 0, 0).unwrap())
        );
        // 09:00 at UTC-10, the same instant as 2011-12-31 09:00 local
        assert_eq!(
            DstPolicy::WallClock.resolve(tz, t),
            Some(Utc.with_ymd_and_hms(2011, 12, 30, 19, 0, 0).unwrap())
        );
    }

    #[test]
    fn first_minute_of_skipped_day_still_shifts_forward() {
        let tz = chrono_tz::Pacific::Apia;
        assert_eq!(
            DstPolicy::ShiftForward.resolve(tz, local(2011, 12, 30, 0, 0)),
            Some(Utc.with_ymd_and_hms(2011, 12, 30, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn ambiguous_time_takes_earlier_instant() {
        // 2026-11-01 01:30 happens twice in Los Angeles; the PDT one comes first.
        let tz = chrono_tz::America::Los_Angeles;
        let t = local(2026, 11, 1, 1, 30);
        assert_eq!(
            DstPolicy::WallClock.resolve(tz, t),
            Some(Utc.with_ymd_and_hms(2026, 11, 1, 8, 30, 0).unwrap())
        );
    }
}
