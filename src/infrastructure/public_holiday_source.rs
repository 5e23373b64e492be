use crate::infrastructure::error::InfraError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

pub trait PublicHolidaySource: Send + Sync {
    fn public_holidays(
        &self,
        federal_state: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, InfraError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoPublicHolidays;

impl PublicHolidaySource for NoPublicHolidays {
    fn public_holidays(
        &self,
        _federal_state: &str,
        _from: NaiveDate,
        _to_exclusive: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, InfraError> {
        Ok(BTreeSet::new())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPublicHolidaySource {
    holidays: Mutex<HashMap<String, BTreeSet<NaiveDate>>>,
}

impl InMemoryPublicHolidaySource {
    fn lock_holidays(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, BTreeSet<NaiveDate>>>, InfraError> {
        self.holidays.lock().map_err(|error| {
            InfraError::Repository(format!("public holiday store lock poisoned: {error}"))
        })
    }

    pub fn insert(&self, federal_state: &str, date: NaiveDate) -> Result<(), InfraError> {
        let mut holidays = self.lock_holidays()?;
        holidays
            .entry(federal_state.to_string())
            .or_default()
            .insert(date);
        Ok(())
    }
}

impl PublicHolidaySource for InMemoryPublicHolidaySource {
    fn public_holidays(
        &self,
        federal_state: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<BTreeSet<NaiveDate>, InfraError> {
        if to_exclusive <= from {
            return Ok(BTreeSet::new());
        }
        let holidays = self.lock_holidays()?;
        Ok(holidays
            .get(federal_state)
            .map(|dates| dates.range(from..to_exclusive).copied().collect())
            .unwrap_or_default())
    }
}
