use crate::domain::models::TimeEntry;
use crate::infrastructure::error::InfraError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Time entries by owner. Range queries select entries whose start lies in
/// `[from, to_exclusive)`.
pub trait TimeEntryRepository: Send + Sync {
    fn find_by_owner(
        &self,
        owner: &str,
        from: DateTime<Utc>,
        to_exclusive: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, InfraError>;
    fn find_by_owners(
        &self,
        owners: &[String],
        from: DateTime<Utc>,
        to_exclusive: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, InfraError>;
    fn save(&self, entry: &TimeEntry) -> Result<(), InfraError>;
    fn remove(&self, entry_id: &str) -> Result<(), InfraError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTimeEntryRepository {
    entries: Mutex<HashMap<String, TimeEntry>>,
}

impl InMemoryTimeEntryRepository {
    fn lock_entries(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, TimeEntry>>, InfraError> {
        self.entries.lock().map_err(|error| {
            InfraError::Repository(format!("time entry store lock poisoned: {error}"))
        })
    }

    fn select<F>(
        &self,
        from: DateTime<Utc>,
        to_exclusive: DateTime<Utc>,
        owner_matches: F,
    ) -> Result<Vec<TimeEntry>, InfraError>
    where
        F: Fn(&str) -> bool,
    {
        let entries = self.lock_entries()?;
        let mut selected: Vec<TimeEntry> = entries
            .values()
            .filter(|entry| owner_matches(&entry.owner))
            .filter(|entry| entry.start >= from && entry.start < to_exclusive)
            .cloned()
            .collect();
        selected.sort_by(|left, right| {
            left.start
                .cmp(&right.start)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(selected)
    }
}

impl TimeEntryRepository for InMemoryTimeEntryRepository {
    fn find_by_owner(
        &self,
        owner: &str,
        from: DateTime<Utc>,
        to_exclusive: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, InfraError> {
        self.select(from, to_exclusive, |candidate| candidate == owner)
    }

    fn find_by_owners(
        &self,
        owners: &[String],
        from: DateTime<Utc>,
        to_exclusive: DateTime<Utc>,
    ) -> Result<Vec<TimeEntry>, InfraError> {
        self.select(from, to_exclusive, |candidate| {
            owners.iter().any(|owner| owner == candidate)
        })
    }

    fn save(&self, entry: &TimeEntry) -> Result<(), InfraError> {
        entry.validate()?;
        let mut entries = self.lock_entries()?;
        entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn remove(&self, entry_id: &str) -> Result<(), InfraError> {
        let mut entries = self.lock_entries()?;
        entries.remove(entry_id.trim());
        Ok(())
    }
}
