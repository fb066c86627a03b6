//! Engine configuration.
//!
//! Every query takes an explicit [`EngineConfig`]: the time zone that defines
//! "local" calendar days, the per-query iteration ceiling, and the DST policy.
//! There is no ambient "current zone".

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{PlannerError, Result};

/// Default cap on candidates stepped per event per range query.
///
/// Enough for a daily rule to cover a full (leap) year in one call.
pub const DEFAULT_MAX_ITERATIONS: usize = 366;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// IANA zone used for day boundaries and wall-clock stepping.
    pub timezone: Tz,
    /// Maximum number of occurrences stepped per event in one range query.
    pub max_iterations: usize,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            dst_policy: DstPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Build a configuration for the given IANA time zone name.
    ///
    /// # Errors
    /// Returns `PlannerError::InvalidTimezone` if `timezone` is not a known IANA identifier.
    pub fn new(timezone: &str) -> Result<Self> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| PlannerError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self::default().with_timezone(tz))
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_dst_policy(mut self, dst_policy: DstPolicy) -> Self {
        self.dst_policy = dst_policy;
        self
    }

    /// Check values that deserialize fine but make every query empty.
    ///
    /// # Errors
    /// Returns `PlannerError::InvalidConfig` when `max_iterations` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(PlannerError::InvalidConfig(
                "maxIterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The local calendar day an instant falls on.
    pub fn local_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.timezone).date_naive()
    }
}
