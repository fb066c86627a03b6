//! Recurrence expansion -- turns an event template into concrete occurrence starts.
//!
//! Occurrence `k` of a rule is the template's local start plus `k * interval`
//! calendar units, stepped on the wall clock of the configured zone and resolved
//! back to an instant through the [`DstPolicy`](crate::dst::DstPolicy). Month and
//! year steps clamp to the last valid day of the target month, always measured
//! from the template start, so Jan 31 monthly runs Jan 31, Feb 28, Mar 31.

use std::iter::FusedIterator;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::model::{Event, Frequency, RecurrenceEnd};

/// Lazy iterator over `(index, start)` pairs of an event's occurrences.
///
/// Yields strictly increasing instants and stops for good at the first index
/// past a `count` bound, the first occurrence after an `until` day, or when
/// calendar arithmetic overflows. It has no iteration ceiling of its own.
///
/// A resolved start that does not move past the previous one (a whole skipped
/// day under `DstPolicy::WallClock`) is dropped; its index is still consumed.
#[derive(Debug, Clone)]
pub struct OccurrenceIter {
    config: EngineConfig,
    template_start: DateTime<Utc>,
    anchor: NaiveDateTime,
    frequency: Frequency,
    interval: u32,
    end: RecurrenceEnd,
    next_index: u32,
    last_start: Option<DateTime<Utc>>,
    exhausted: bool,
}

impl OccurrenceIter {
    pub fn new(event: &Event, config: &EngineConfig) -> Self {
        let recurrence = event.recurrence;
        if recurrence.frequency.is_recurring() && recurrence.interval == 0 {
            warn!(event_id = %event.id, "recurrence interval of 0 treated as 1");
        }

        Self {
            config: *config,
            template_start: event.start,
            anchor: event.start.with_timezone(&config.timezone).naive_local(),
            frequency: recurrence.frequency,
            interval: recurrence.effective_interval(),
            end: recurrence.end,
            next_index: 0,
            last_start: None,
            exhausted: false,
        }
    }

    /// Jump ahead so the next yielded occurrence is at most a couple of steps
    /// before the first one on or after local `day`.
    ///
    /// Every skipped index falls on an earlier local day than `day`, so
    /// searching forward from here finds the same occurrence as walking from
    /// the template. Never moves backwards.
    pub fn seek_to_day(mut self, day: NaiveDate) -> Self {
        let anchor_day = self.anchor.date();
        if day <= anchor_day {
            return self;
        }

        let interval = i64::from(self.interval);
        let whole_steps = match self.frequency {
            Frequency::None => 0,
            Frequency::Daily => (day - anchor_day).num_days() / interval,
            Frequency::Weekly => (day - anchor_day).num_days() / (interval * 7),
            Frequency::Monthly => months_between(anchor_day, day) / interval,
            Frequency::Yearly => i64::from(day.year() - anchor_day.year()) / interval,
        };
        // One step of margin for DST resolution moving a start across midnight.
        let index = u32::try_from(whole_steps.saturating_sub(1).max(0)).unwrap_or(u32::MAX);

        if index > self.next_index {
            self.next_index = index;
            self.last_start = None;
        }
        self
    }

    /// Local wall-clock time of occurrence `index`, before DST resolution.
    fn local_candidate(&self, index: u32) -> Option<NaiveDateTime> {
        let steps = index.checked_mul(self.interval)?;
        match self.frequency {
            Frequency::None => (index == 0).then_some(self.anchor),
            Frequency::Daily => self.anchor.checked_add_days(Days::new(u64::from(steps))),
            Frequency::Weekly => self
                .anchor
                .checked_add_days(Days::new(u64::from(steps) * 7)),
            Frequency::Monthly => self.anchor.checked_add_months(Months::new(steps)),
            Frequency::Yearly => self
                .anchor
                .checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }
}

impl Iterator for OccurrenceIter {
    type Item = (u32, DateTime<Utc>);

    fn next(&mut self) -> Option<Self::Item> {
        while !self.exhausted {
            let index = self.next_index;
            if !self.end.allows_index(index) {
                self.exhausted = true;
                break;
            }

            let Some(local) = self.local_candidate(index) else {
                self.exhausted = true;
                break;
            };
            match index.checked_add(1) {
                Some(next) => self.next_index = next,
                None => self.exhausted = true,
            }

            // The template itself is never re-resolved.
            let resolved = if index == 0 {
                Some(self.template_start)
            } else {
                self.config.dst_policy.resolve(self.config.timezone, local)
            };
            let Some(start) = resolved else {
                continue;
            };
            if self.last_start.is_some_and(|last| start <= last) {
                continue;
            }

            if !self.end.allows_day(self.config.local_day(start)) {
                self.exhausted = true;
                break;
            }
            self.last_start = Some(start);
            return Some((index, start));
        }
        None
    }
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    months(to) - months(from)
}

impl FusedIterator for OccurrenceIter {}

/// The first occurrence start whose local day is strictly after `after`'s local day.
///
/// Occurrences on the same day as `after` are stepped past. Returns `None` when
/// the rule is exhausted first (count reached, `until` passed) or, for a
/// non-repeating event, when the template does not fall on a later day.
///
/// The walk starts near `after` rather than at the template, so the cost does
/// not grow with the distance between them; at most `config.max_iterations`
/// occurrences are examined.
pub fn next_occurrence_after(
    event: &Event,
    after: DateTime<Utc>,
    config: &EngineConfig,
) -> Option<DateTime<Utc>> {
    let after_day = config.local_day(after);
    OccurrenceIter::new(event, config)
        .seek_to_day(after_day)
        .take(config.max_iterations)
        .map(|(_, start)| start)
        .find(|start| config.local_day(*start) > after_day)
}

/// Every occurrence start whose local day lies in `[range_start, range_end]`.
///
/// Walks the rule from the template start one occurrence at a time, stepping at
/// most `config.max_iterations` candidates; past the ceiling the result is
/// silently truncated. Long ranges over old unbounded rules should be paged.
pub fn occurrences_in_range(
    event: &Event,
    range_start: NaiveDate,
    range_end: NaiveDate,
    config: &EngineConfig,
) -> Vec<DateTime<Utc>> {
    indexed_occurrences_in_range(event, range_start, range_end, config)
        .into_iter()
        .map(|(_, start)| start)
        .collect()
}

pub(crate) fn indexed_occurrences_in_range(
    event: &Event,
    range_start: NaiveDate,
    range_end: NaiveDate,
    config: &EngineConfig,
) -> Vec<(u32, DateTime<Utc>)> {
    let mut occurrences = Vec::new();
    if range_start > range_end {
        return occurrences;
    }

    let mut stepped = 0usize;
    for (index, start) in OccurrenceIter::new(event, config) {
        if stepped >= config.max_iterations {
            debug!(
                event_id = %event.id,
                max_iterations = config.max_iterations,
                %range_start,
                %range_end,
                "iteration ceiling reached, truncating occurrences"
            );
            break;
        }
        stepped += 1;

        let day = config.local_day(start);
        if day > range_end {
            break;
        }
        if day >= range_start {
            occurrences.push((index, start));
        }
    }

    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Recurrence;
    use chrono::TimeZone;

    fn event_at(y: i32, m: u32, d: u32, recurrence: Recurrence) -> Event {
        let start = Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap();
        Event::new("e", "test", start, start + chrono::Duration::hours(1))
            .with_recurrence(recurrence)
    }

    #[test]
    fn iterator_is_fused_after_count() {
        let event = event_at(2024, 1, 1, Recurrence::daily(1).count(2));
        let mut iter = OccurrenceIter::new(&event, &EngineConfig::default());
        assert!(iter.next().is_some());
        assert!(iter.next().is_some());
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn indices_are_consecutive_without_gaps() {
        let event = event_at(2024, 1, 1, Recurrence::weekly(2).count(4));
        let indices: Vec<u32> = OccurrenceIter::new(&event, &EngineConfig::default())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn zero_interval_behaves_as_one() {
        let event = event_at(2024, 1, 1, Recurrence::daily(0).count(3));
        let days: Vec<u32> = OccurrenceIter::new(&event, &EngineConfig::default())
            .map(|(_, s)| chrono::Datelike::day(&s))
            .collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn seek_lands_one_step_before_target_day() {
        // 2024-03-01 is 60 days after Jan 1.
        let event = event_at(2024, 1, 1, Recurrence::daily(1));
        let target = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let first = OccurrenceIter::new(&event, &EngineConfig::default())
            .seek_to_day(target)
            .next();
        assert_eq!(first.map(|(i, _)| i), Some(59));
    }

    #[test]
    fn seek_monthly_counts_calendar_months() {
        let event = event_at(2024, 1, 31, Recurrence::monthly(2));
        let target = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        // 12 months / 2 = 6, minus one step of margin.
        let first = OccurrenceIter::new(&event, &EngineConfig::default())
            .seek_to_day(target)
            .next();
        assert_eq!(
            first,
            Some((5, Utc.with_ymd_and_hms(2024, 11, 30, 9, 0, 0).unwrap()))
        );
    }

    #[test]
    fn seek_before_template_is_a_no_op() {
        let event = event_at(2024, 1, 1, Recurrence::weekly(1));
        let target = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let first = OccurrenceIter::new(&event, &EngineConfig::default())
            .seek_to_day(target)
            .next();
        assert_eq!(first.map(|(i, _)| i), Some(0));
    }

    #[test]
    fn seek_past_count_exhausts() {
        let event = event_at(2024, 1, 1, Recurrence::daily(1).count(10));
        let target = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut iter = OccurrenceIter::new(&event, &EngineConfig::default()).seek_to_day(target);
        assert!(iter.next().is_none());
    }

    #[test]
    fn inverted_range_is_empty() {
        let event = event_at(2024, 1, 1, Recurrence::daily(1));
        let start = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(occurrences_in_range(&event, start, end, &EngineConfig::default()).is_empty());
    }
}
