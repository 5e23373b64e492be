use crate::domain::calendar::DateRange;
use crate::domain::models::AbsenceDay;
use crate::infrastructure::error::InfraError;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Absences that start before `from` or end on or after `to_exclusive` still contribute the
/// dates they cover inside the range.
pub trait AbsenceSource: Send + Sync {
    fn absence_days(
        &self,
        user_id: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, AbsenceDay>, InfraError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoAbsences;

impl AbsenceSource for NoAbsences {
    fn absence_days(
        &self,
        _user_id: &str,
        _from: NaiveDate,
        _to_exclusive: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, AbsenceDay>, InfraError> {
        Ok(BTreeMap::new())
    }
}

#[derive(Debug, Clone)]
struct AbsencePeriod {
    dates: DateRange,
    day: AbsenceDay,
}

#[derive(Debug, Default)]
pub struct InMemoryAbsenceSource {
    periods: Mutex<HashMap<String, Vec<AbsencePeriod>>>,
}

impl InMemoryAbsenceSource {
    fn lock_periods(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, Vec<AbsencePeriod>>>, InfraError> {
        self.periods
            .lock()
            .map_err(|error| {
                InfraError::Repository(format!("absence store lock poisoned: {error}"))
            })
    }

    pub fn insert(
        &self,
        user_id: &str,
        date: NaiveDate,
        day: AbsenceDay,
    ) -> Result<(), InfraError> {
        self.insert_period(user_id, DateRange::new(date, date), day)
    }

    pub fn insert_period(
        &self,
        user_id: &str,
        dates: DateRange,
        day: AbsenceDay,
    ) -> Result<(), InfraError> {
        if dates.end < dates.start {
            return Err(InfraError::Repository(format!(
                "absence period ends {} before it starts {}",
                dates.end, dates.start
            )));
        }
        let mut periods = self.lock_periods()?;
        periods
            .entry(user_id.to_string())
            .or_default()
            .push(AbsencePeriod { dates, day });
        Ok(())
    }
}

impl AbsenceSource for InMemoryAbsenceSource {
    fn absence_days(
        &self,
        user_id: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, AbsenceDay>, InfraError> {
        let Ok(range) = DateRange::half_open(from, to_exclusive) else {
            return Ok(BTreeMap::new());
        };
        let periods = self.lock_periods()?;
        let mut days: BTreeMap<NaiveDate, AbsenceDay> = BTreeMap::new();

        let overlapping = periods
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|period| period.dates.start <= range.end && period.dates.end >= range.start);
        for period in overlapping {
            let clipped = DateRange::new(
                period.dates.start.max(range.start),
                period.dates.end.min(range.end),
            );
            for date in clipped.iter() {
                match days.get_mut(&date) {
                    Some(known) => {
                        known.absences.extend(period.day.absences.iter().cloned());
                        known.should_working_hours = known
                            .should_working_hours
                            .min(period.day.should_working_hours);
                    }
                    None => {
                        days.insert(date, period.day.clone());
                    }
                }
            }
        }
        Ok(days)
    }
}
