use crate::domain::duration::{BreakDuration, PlannedWorkingHours, ShouldWorkingHours, WorkDuration};
use crate::domain::lock::is_allowed_to_bypass;
use crate::domain::models::{Absence, Capability, TimeEntry};
use chrono::{Datelike, NaiveDate, TimeDelta};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryDay {
    pub locked: bool,
    pub date: NaiveDate,
    pub work_duration: WorkDuration,
    pub planned_working_hours: PlannedWorkingHours,
    pub should_working_hours: ShouldWorkingHours,
    pub entries: Vec<TimeEntry>,
    pub absences: Vec<Absence>,
}

impl TimeEntryDay {
    /// Worked minus should-have-worked, both rounded up to minutes. Negative when short.
    pub fn overtime(&self) -> TimeDelta {
        self.work_duration.duration_in_minutes() - self.should_working_hours.duration_in_minutes()
    }

    pub fn break_duration(&self) -> BreakDuration {
        self.entries.iter().map(TimeEntry::break_duration).sum()
    }

    pub fn is_editable_by(&self, capabilities: &HashSet<Capability>) -> bool {
        !self.locked || is_allowed_to_bypass(capabilities)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntryWeek {
    pub first_date_of_week: NaiveDate,
    pub days: Vec<TimeEntryDay>,
}

impl TimeEntryWeek {
    pub fn week(&self) -> u32 {
        self.first_date_of_week.iso_week().week()
    }

    pub fn last_date_of_week(&self) -> NaiveDate {
        self.first_date_of_week
            .checked_add_days(chrono::Days::new(6))
            .unwrap_or(self.first_date_of_week)
    }

    pub fn work_duration(&self) -> WorkDuration {
        self.days.iter().map(|day| day.work_duration).sum()
    }

    pub fn planned_working_hours(&self) -> PlannedWorkingHours {
        self.days.iter().map(|day| day.planned_working_hours).sum()
    }

    pub fn should_working_hours(&self) -> ShouldWorkingHours {
        self.days.iter().map(|day| day.should_working_hours).sum()
    }

    pub fn overtime(&self) -> TimeDelta {
        self.work_duration().duration_in_minutes()
            - self.should_working_hours().duration_in_minutes()
    }
}
