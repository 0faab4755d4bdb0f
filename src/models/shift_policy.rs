//! Shift policy model.
//!
//! A [`ShiftPolicy`] belongs to a job role and defines the expected daily
//! work window and the work-day calendar used to decide which days are
//! scheduled.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The work-day calendar of a shift policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkDaysType {
    /// Monday through Friday.
    MonFri,
    /// Every day of the week.
    Daily,
    /// Four days on, four days off, counted from a rotation anchor.
    #[serde(rename = "ROTATING_4_4", alias = "SHIFT_4_4")]
    Rotating4x4,
}

/// The expected work window and calendar for a job role.
///
/// # Example
///
/// ```
/// use settlement_engine::models::{ShiftPolicy, WorkDaysType};
/// use chrono::NaiveTime;
///
/// let policy = ShiftPolicy::new(
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     WorkDaysType::MonFri,
/// )
/// .unwrap();
/// assert_eq!(policy.work_days_type, WorkDaysType::MonFri);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftPolicy {
    /// Expected check-in time.
    pub shift_start: NaiveTime,
    /// Expected check-out time.
    pub shift_end: NaiveTime,
    /// Which calendar days are scheduled work days.
    pub work_days_type: WorkDaysType,
    /// First "on" day of a 4-on/4-off rotation. Ignored by other calendars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation_anchor: Option<NaiveDate>,
}

impl ShiftPolicy {
    /// Creates a validated shift policy without a rotation anchor.
    pub fn new(
        shift_start: NaiveTime,
        shift_end: NaiveTime,
        work_days_type: WorkDaysType,
    ) -> EngineResult<Self> {
        let policy = Self {
            shift_start,
            shift_end,
            work_days_type,
            rotation_anchor: None,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Sets the rotation anchor used by [`WorkDaysType::Rotating4x4`].
    pub fn with_rotation_anchor(mut self, anchor: NaiveDate) -> Self {
        self.rotation_anchor = Some(anchor);
        self
    }

    /// Checks that the shift window lies within one calendar day.
    pub fn validate(&self) -> EngineResult<()> {
        if self.shift_start >= self.shift_end {
            return Err(EngineError::validation(format!(
                "shift_start {} must be before shift_end {}",
                self.shift_start, self.shift_end
            )));
        }
        Ok(())
    }
}
