use crate::domain::duration::PlannedWorkingHours;
use crate::domain::error::AccountingError;
use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<NaiveDate>", into = "Option<NaiveDate>")]
// Unbounded sorts before every concrete date.
pub enum LowerBound {
    Unbounded,
    From(NaiveDate),
}

impl LowerBound {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Unbounded => None,
            Self::From(date) => Some(*date),
        }
    }

    pub fn admits(&self, date: NaiveDate) -> bool {
        match self {
            Self::Unbounded => true,
            Self::From(start) => date >= *start,
        }
    }
}

impl From<Option<NaiveDate>> for LowerBound {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Unbounded, Self::From)
    }
}

impl From<LowerBound> for Option<NaiveDate> {
    fn from(value: LowerBound) -> Self {
        value.date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<NaiveDate>", into = "Option<NaiveDate>")]
pub enum UpperBound {
    Until(NaiveDate),
    Unbounded,
}

impl UpperBound {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Until(date) => Some(*date),
            Self::Unbounded => None,
        }
    }

    pub fn admits(&self, date: NaiveDate) -> bool {
        match self {
            Self::Until(end) => date <= *end,
            Self::Unbounded => true,
        }
    }
}

impl From<Option<NaiveDate>> for UpperBound {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Unbounded, Self::Until)
    }
}

impl From<UpperBound> for Option<NaiveDate> {
    fn from(value: UpperBound) -> Self {
        value.date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Workdays {
    hours: [PlannedWorkingHours; 7],
}

impl Workdays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_hours(hours: [f64; 7]) -> Result<Self, AccountingError> {
        let mut workdays = Self::default();
        for (slot, value) in workdays.hours.iter_mut().zip(hours) {
            *slot = PlannedWorkingHours::from_hours(value)?;
        }
        Ok(workdays)
    }

    pub fn with(mut self, weekday: Weekday, duration: TimeDelta) -> Self {
        self.hours[weekday.num_days_from_monday() as usize] = PlannedWorkingHours::new(duration);
        self
    }

    pub fn for_weekday(&self, weekday: Weekday) -> PlannedWorkingHours {
        self.hours[weekday.num_days_from_monday() as usize]
    }

    pub fn for_date(&self, date: NaiveDate) -> PlannedWorkingHours {
        self.for_weekday(date.weekday())
    }

    pub fn actual_working_days(&self) -> Vec<Weekday> {
        WEEK.into_iter()
            .filter(|weekday| !self.for_weekday(*weekday).is_zero())
            .collect()
    }

    pub fn has_different_working_hours(&self) -> bool {
        let mut working = self.hours.iter().filter(|hours| !hours.is_zero());
        match working.next() {
            Some(first) => working.any(|hours| hours != first),
            None => false,
        }
    }

    pub fn total_week(&self) -> PlannedWorkingHours {
        self.hours.iter().copied().sum()
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingTimeVersion {
    pub id: String,
    pub user_id: String,
    pub valid_from: LowerBound,
    pub workdays: Workdays,
    pub federal_state: Option<String>,
    pub works_on_public_holiday: bool,
}

impl WorkingTimeVersion {
    pub fn default_for(user_id: &str) -> Self {
        Self {
            id: format!("default-{user_id}"),
            user_id: user_id.to_string(),
            valid_from: LowerBound::Unbounded,
            federal_state: None,
            works_on_public_holiday: false,
            workdays: WEEK[..5]
                .iter()
                .fold(Workdays::new(), |workdays, weekday| {
                    workdays.with(*weekday, TimeDelta::hours(8))
                }),
        }
    }
}
