use crate::domain::error::AccountingError;
use crate::domain::models::Capability;
use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LockTimeEntriesSettings {
    pub active: bool,
    pub days_in_past: i32,
}

impl LockTimeEntriesSettings {
    pub const DEFAULT: Self = Self {
        active: false,
        days_in_past: 2,
    };

    pub fn validate(&self) -> Result<(), AccountingError> {
        if self.active && self.days_in_past < 0 {
            return Err(AccountingError::InvalidSettings(format!(
                "lockTimeEntries.daysInPast must be >= 0 when active, got {}",
                self.days_in_past
            )));
        }
        Ok(())
    }
}

impl Default for LockTimeEntriesSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLockedEvent {
    pub tenant_id: String,
    pub date: NaiveDate,
    pub zone: Tz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockWindow {
    pub settings: LockTimeEntriesSettings,
    pub zone: Tz,
}

impl LockWindow {
    pub fn new(settings: LockTimeEntriesSettings, zone: Tz) -> Self {
        Self { settings, zone }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.zone).date_naive()
    }

    /// True if `date` lies more than `days_in_past` calendar days before today.
    pub fn is_locked(&self, date: NaiveDate, now: DateTime<Utc>) -> bool {
        if !self.settings.active {
            return false;
        }
        let days_between = (self.today(now) - date).num_days();
        let locked = days_between > i64::from(self.settings.days_in_past);
        tracing::debug!(%date, days_between, locked, "evaluated lock window");
        locked
    }

    pub fn is_timespan_locked(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        let start_date = start.with_timezone(&self.zone).date_naive();
        let end_date = end.with_timezone(&self.zone).date_naive();
        self.is_locked(start_date, now) || self.is_locked(end_date, now)
    }

    pub fn min_valid_date(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        if !self.settings.active {
            return None;
        }
        let days = u64::try_from(self.settings.days_in_past).unwrap_or_default();
        self.today(now).checked_sub_days(Days::new(days))
    }

    pub fn is_edit_allowed(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        capabilities: &HashSet<Capability>,
        now: DateTime<Utc>,
    ) -> bool {
        is_allowed_to_bypass(capabilities) || !self.is_timespan_locked(start, end, now)
    }

    pub fn newly_locked_date(&self, now: DateTime<Utc>) -> Option<NaiveDate> {
        self.min_valid_date(now)
            .and_then(|min_valid_date| min_valid_date.pred_opt())
    }
}

pub fn is_allowed_to_bypass(capabilities: &HashSet<Capability>) -> bool {
    capabilities.contains(&Capability::TimeEntryEditAll)
}

pub fn is_day_locked(date: NaiveDate, min_valid_date: Option<NaiveDate>) -> bool {
    min_valid_date.is_some_and(|min_valid_date| date < min_valid_date)
}
