//! WASM bindings for planner-engine.
//!
//! Exposes day/range occurrence queries and the month grid to JavaScript via
//! `wasm-bindgen`. Events cross the boundary as JSON strings in the same shape
//! the planner stores them (camelCase keys, ISO 8601 timestamps); calendar days
//! are `YYYY-MM-DD` strings.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p planner-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/planner-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/planner_engine_wasm.wasm
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use planner_engine::{EngineConfig, Event, PlannerError};
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers: parse boundary inputs
// ---------------------------------------------------------------------------

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts both RFC 3339 (with offset, e.g., "2026-02-17T14:00:00-08:00")
/// and naive time (e.g., "2026-02-17T14:00:00"), which is interpreted as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>, JsValue> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| JsValue::from_str(&format!("Invalid datetime '{}': {}", s, e)))
}

/// Parse a `YYYY-MM-DD` calendar day.
fn parse_day(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

/// Parse an optional JSON engine config; `None` or `""` means defaults.
fn parse_config(json: Option<String>) -> Result<EngineConfig, JsValue> {
    let config = match json.as_deref().map(str::trim) {
        None | Some("") => EngineConfig::default(),
        Some(raw) => serde_json::from_str::<EngineConfig>(raw).map_err(|e| {
            js_error(PlannerError::InvalidConfig(e.to_string()))
        })?,
    };
    config.validate().map_err(js_error)?;
    Ok(config)
}

fn parse_event(json: &str) -> Result<Event, JsValue> {
    let event: Event = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid event JSON: {}", e)))?;
    event.validate().map_err(js_error)?;
    Ok(event)
}

fn parse_events(json: &str) -> Result<Vec<Event>, JsValue> {
    let events: Vec<Event> = serde_json::from_str(json)
        .map_err(|e| JsValue::from_str(&format!("Invalid events JSON: {}", e)))?;
    for event in &events {
        event.validate().map_err(js_error)?;
    }
    Ok(events)
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// All occurrences falling on `day` (`YYYY-MM-DD`) across a JSON array of events.
///
/// Returns a JSON array of occurrences: each event object with `start`/`end`
/// moved to the occurrence, plus its zero-based `index`.
#[wasm_bindgen(js_name = "eventsForDay")]
pub fn events_for_day(
    events_json: &str,
    day: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let events = parse_events(events_json)?;
    let day = parse_day(day)?;
    let config = parse_config(config_json)?;

    to_json(&planner_engine::events_for_day(&events, day, &config))
}

/// All occurrences in the inclusive day range `[range_start, range_end]`.
///
/// Results are grouped by source event, not sorted by time.
#[wasm_bindgen(js_name = "eventsForRange")]
pub fn events_for_range(
    events_json: &str,
    range_start: &str,
    range_end: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let events = parse_events(events_json)?;
    let range_start = parse_day(range_start)?;
    let range_end = parse_day(range_end)?;
    let config = parse_config(config_json)?;

    to_json(&planner_engine::events_for_range(
        &events,
        range_start,
        range_end,
        &config,
    ))
}

/// Occurrence start instants of one event within `[range_start, range_end]`,
/// as a JSON array of RFC 3339 strings.
#[wasm_bindgen(js_name = "occurrencesInRange")]
pub fn occurrences_in_range(
    event_json: &str,
    range_start: &str,
    range_end: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    let event = parse_event(event_json)?;
    let range_start = parse_day(range_start)?;
    let range_end = parse_day(range_end)?;
    let config = parse_config(config_json)?;

    let starts: Vec<String> =
        planner_engine::occurrences_in_range(&event, range_start, range_end, &config)
            .iter()
            .map(DateTime::to_rfc3339)
            .collect();
    to_json(&starts)
}

/// The next occurrence start on a later local day than `after`, as an RFC 3339
/// string, or `undefined` when the rule is exhausted.
#[wasm_bindgen(js_name = "nextOccurrenceAfter")]
pub fn next_occurrence_after(
    event_json: &str,
    after: &str,
    config_json: Option<String>,
) -> Result<Option<String>, JsValue> {
    let event = parse_event(event_json)?;
    let after = parse_datetime(after)?;
    let config = parse_config(config_json)?;

    Ok(planner_engine::next_occurrence_after(&event, after, &config).map(|dt| dt.to_rfc3339()))
}

/// The Sunday-aligned grid of days for the month containing `date`, as a JSON
/// array of `YYYY-MM-DD` strings.
#[wasm_bindgen(js_name = "monthGrid")]
pub fn month_grid(date: &str) -> Result<String, JsValue> {
    let date = parse_day(date)?;
    to_json(&planner_engine::grid::month_grid(date))
}
