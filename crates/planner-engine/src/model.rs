//! Event templates, recurrence rules and materialized occurrences.
//!
//! All types serialize with camelCase keys and ISO 8601 timestamps so a
//! storage or sync layer can round-trip them as JSON. The engine itself only
//! ever sees materialized values.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::{PlannerError, Result};

/// How often an event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// A single occurrence: the template itself.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn is_recurring(self) -> bool {
        self != Frequency::None
    }
}

/// When a recurrence stops producing occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecurrenceEnd {
    #[default]
    Never,
    /// The last occurrence is the last one whose local day is on or before `until`.
    ///
    /// Reads either a `YYYY-MM-DD` day or a stored RFC 3339 instant, whose UTC
    /// date is taken. Always written back as a plain day.
    Until {
        #[serde(deserialize_with = "deserialize_until")]
        until: NaiveDate,
    },
    /// Exactly `count` occurrences, the template's own start included. A missing
    /// `count` reads as 1.
    Count {
        #[serde(default = "default_count")]
        count: u32,
    },
}

fn default_count() -> u32 {
    1
}

fn deserialize_until<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.naive_utc().date()))
        .map_err(|_| de::Error::custom(format!("invalid until date '{raw}'")))
}

impl RecurrenceEnd {
    /// Whether the zero-based occurrence `index` is still inside the bound.
    pub fn allows_index(&self, index: u32) -> bool {
        match *self {
            RecurrenceEnd::Count { count } => index < count,
            _ => true,
        }
    }

    /// Whether an occurrence on local `day` is still inside the bound.
    pub fn allows_day(&self, day: NaiveDate) -> bool {
        match *self {
            RecurrenceEnd::Until { until } => day <= until,
            _ => true,
        }
    }
}

fn default_interval() -> u32 {
    1
}

/// The repetition rule attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    pub frequency: Frequency,
    /// Step multiplier (every `interval` days/weeks/months/years). Zero is read as one.
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub end: RecurrenceEnd,
}

impl Default for Recurrence {
    fn default() -> Self {
        Self::once()
    }
}

impl Recurrence {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            end: RecurrenceEnd::Never,
        }
    }

    /// A non-repeating rule.
    pub fn once() -> Self {
        Self::new(Frequency::None, 1)
    }

    pub fn daily(interval: u32) -> Self {
        Self::new(Frequency::Daily, interval)
    }

    pub fn weekly(interval: u32) -> Self {
        Self::new(Frequency::Weekly, interval)
    }

    pub fn monthly(interval: u32) -> Self {
        Self::new(Frequency::Monthly, interval)
    }

    pub fn yearly(interval: u32) -> Self {
        Self::new(Frequency::Yearly, interval)
    }

    pub fn until(mut self, until: NaiveDate) -> Self {
        self.end = RecurrenceEnd::Until { until };
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.end = RecurrenceEnd::Count { count };
        self
    }

    pub fn effective_interval(&self) -> u32 {
        self.interval.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Event,
    Task,
    Appointment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    #[default]
    Pending,
    Completed,
    Overdue,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// An event template: the first occurrence plus the rule that repeats it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EventKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Display hint only. Occurrences keep the template's exact duration.
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CompletionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_persons: Vec<ContactPerson>,
}

impl Event {
    /// A non-repeating event with every optional field empty.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            kind: EventKind::default(),
            start,
            end,
            all_day: false,
            color: String::new(),
            recurrence: Recurrence::once(),
            completed: false,
            deadline: None,
            status: None,
            location: None,
            contact_persons: Vec::new(),
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_status(mut self, status: CompletionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Exact span of the template, carried unchanged into every occurrence.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.frequency.is_recurring()
    }

    /// Structural checks for records coming from storage.
    ///
    /// # Errors
    /// Returns `PlannerError::InvalidEvent` if the id is empty or `end` precedes `start`.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(PlannerError::InvalidEvent("empty event id".to_string()));
        }
        if self.end < self.start {
            return Err(PlannerError::InvalidEvent(format!(
                "event '{}' ends ({}) before it starts ({})",
                self.id,
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        Ok(())
    }

    /// Status as seen at `now`: a pending task whose deadline has passed reads as overdue.
    pub fn effective_status(&self, now: DateTime<Utc>) -> CompletionStatus {
        let status = self.status.unwrap_or_default();
        match (status, self.deadline) {
            (CompletionStatus::Pending, Some(deadline)) if deadline < now => {
                CompletionStatus::Overdue
            }
            _ => status,
        }
    }
}

/// One concrete instance of an event.
///
/// Serializes as the event itself (with `start`/`end` replaced) plus its
/// zero-based `index` within the recurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub index: u32,
    #[serde(flatten)]
    pub event: Event,
}

impl Occurrence {
    /// Copy `template` with its span moved to begin at `start`.
    pub fn materialize(template: &Event, index: u32, start: DateTime<Utc>) -> Self {
        let mut event = template.clone();
        event.start = start;
        event.end = start + template.duration();
        Self { index, event }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.event.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.event.end
    }

    pub fn event_id(&self) -> &str {
        &self.event.id
    }
}
