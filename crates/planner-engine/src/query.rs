//! Day and range queries over a whole event collection.
//!
//! Results are fresh [`Occurrence`] copies in source order: all occurrences of
//! the first event, then the second, and so on. Callers that render a timeline
//! sort with [`sort_by_start`].

use chrono::NaiveDate;
use tracing::trace;

use crate::config::EngineConfig;
use crate::expander::indexed_occurrences_in_range;
use crate::model::{Event, Occurrence};

/// All occurrences whose start falls on local `day`, regardless of clock time.
pub fn events_for_day(events: &[Event], day: NaiveDate, config: &EngineConfig) -> Vec<Occurrence> {
    events_for_range(events, day, day, config)
}

/// All occurrences whose start falls on a local day in `[range_start, range_end]`.
///
/// Each occurrence keeps the template's clock time and its exact duration.
pub fn events_for_range(
    events: &[Event],
    range_start: NaiveDate,
    range_end: NaiveDate,
    config: &EngineConfig,
) -> Vec<Occurrence> {
    events
        .iter()
        .flat_map(|event| {
            let starts = indexed_occurrences_in_range(event, range_start, range_end, config);
            trace!(event_id = %event.id, occurrences = starts.len(), "expanded event");
            starts
                .into_iter()
                .map(move |(index, start)| Occurrence::materialize(event, index, start))
        })
        .collect()
}

/// Stable chronological sort; occurrences with equal starts keep source order.
pub fn sort_by_start(occurrences: &mut [Occurrence]) {
    occurrences.sort_by_key(Occurrence::start);
}
