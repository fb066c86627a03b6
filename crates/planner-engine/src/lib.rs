//! # planner-engine
//!
//! Deterministic recurrence expansion for a personal calendar and task planner.
//!
//! Given event templates that repeat daily, weekly, monthly or yearly (forever,
//! until a date, or a fixed number of times), the engine answers "what happens
//! on this day" and "what happens in this range" with concrete occurrences.
//! It is a pure library: events, query days and the [`EngineConfig`] are passed
//! in on every call and nothing is cached between calls.
//!
//! ## Modules
//!
//! - [`model`] — events, recurrence rules, occurrences
//! - [`expander`] — occurrence stepping, `next_occurrence_after`, `occurrences_in_range`
//! - [`query`] — `events_for_day` / `events_for_range` over many events
//! - [`dst`] — DST transition policies (skip, shift, wall clock)
//! - [`config`] — time zone, iteration ceiling, DST policy
//! - [`grid`] — month/week day grids for calendar views
//! - [`error`] — Error types

pub mod config;
pub mod dst;
pub mod error;
pub mod expander;
pub mod grid;
pub mod model;
pub mod query;

pub use config::{EngineConfig, DEFAULT_MAX_ITERATIONS};
pub use dst::DstPolicy;
pub use error::{PlannerError, Result};
pub use expander::{next_occurrence_after, occurrences_in_range, OccurrenceIter};
pub use model::{
    CompletionStatus, ContactPerson, Event, EventKind, Frequency, Occurrence, Recurrence,
    RecurrenceEnd,
};
pub use query::{events_for_day, events_for_range, sort_by_start};
