use crate::domain::duration::{BreakDuration, ShouldWorkingHours, WorkDuration};
use crate::domain::error::AccountingError;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeEntryKind {
    Work,
    Break,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeEntry {
    pub id: String,
    pub owner: String,
    pub comment: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_break: bool,
}

impl TimeEntry {
    pub fn validate(&self) -> Result<(), AccountingError> {
        validate_non_empty(&self.id, "time_entry.id")?;
        validate_non_empty(&self.owner, "time_entry.owner")?;
        if self.end < self.start {
            return Err(AccountingError::InvalidInterval {
                entry_id: self.id.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn kind(&self) -> TimeEntryKind {
        if self.is_break {
            TimeEntryKind::Break
        } else {
            TimeEntryKind::Work
        }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn work_duration(&self) -> WorkDuration {
        if self.is_break {
            WorkDuration::ZERO
        } else {
            WorkDuration::new(self.duration())
        }
    }

    pub fn break_duration(&self) -> BreakDuration {
        if self.is_break {
            BreakDuration::new(self.duration())
        } else {
            BreakDuration::ZERO
        }
    }

    /// The day this entry counts for: the local date of its start in the given zone.
    /// An entry crossing midnight still belongs to the day it started on.
    pub fn bucket_date(&self, zone: Tz) -> NaiveDate {
        self.start.with_timezone(&zone).date_naive()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    User,
    TimeEntryEditAll,
    WorkingTimeEditAll,
    SettingsGlobal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Absence {
    pub id: String,
    pub kind: String,
    pub full_day: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceDay {
    pub absences: Vec<Absence>,
    pub should_working_hours: ShouldWorkingHours,
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), AccountingError> {
    if value.trim().is_empty() {
        return Err(AccountingError::InvalidValue(format!(
            "{field_name} must not be empty"
        )));
    }
    Ok(())
}
