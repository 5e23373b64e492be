use crate::domain::working_time::WorkingTimeVersion;
use crate::infrastructure::error::InfraError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub trait WorkingTimeRepository: Send + Sync {
    fn find_by_user(&self, user_id: &str) -> Result<Vec<WorkingTimeVersion>, InfraError>;
    fn find_by_users(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, Vec<WorkingTimeVersion>>, InfraError>;
    fn save(&self, version: &WorkingTimeVersion) -> Result<(), InfraError>;
    fn remove(&self, version_id: &str) -> Result<(), InfraError>;
}

#[derive(Debug, Default)]
pub struct InMemoryWorkingTimeRepository {
    versions: Mutex<HashMap<String, WorkingTimeVersion>>,
}

impl InMemoryWorkingTimeRepository {
    fn lock_versions(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, WorkingTimeVersion>>, InfraError> {
        self.versions.lock().map_err(|error| {
            InfraError::Repository(format!("working time store lock poisoned: {error}"))
        })
    }
}

impl WorkingTimeRepository for InMemoryWorkingTimeRepository {
    fn find_by_user(&self, user_id: &str) -> Result<Vec<WorkingTimeVersion>, InfraError> {
        let versions = self.lock_versions()?;
        Ok(versions
            .values()
            .filter(|version| version.user_id == user_id)
            .cloned()
            .collect())
    }

    fn find_by_users(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, Vec<WorkingTimeVersion>>, InfraError> {
        let versions = self.lock_versions()?;
        let mut by_user: HashMap<String, Vec<WorkingTimeVersion>> = HashMap::new();
        for version in versions.values() {
            if user_ids.contains(&version.user_id) {
                by_user
                    .entry(version.user_id.clone())
                    .or_default()
                    .push(version.clone());
            }
        }
        Ok(by_user)
    }

    fn save(&self, version: &WorkingTimeVersion) -> Result<(), InfraError> {
        if version.id.trim().is_empty() || version.user_id.trim().is_empty() {
            return Err(InfraError::Repository(
                "working time id and user id must not be empty".to_string(),
            ));
        }
        let mut versions = self.lock_versions()?;
        versions.insert(version.id.clone(), version.clone());
        Ok(())
    }

    fn remove(&self, version_id: &str) -> Result<(), InfraError> {
        let mut versions = self.lock_versions()?;
        versions.remove(version_id.trim());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::working_time::{LowerBound, Workdays};

    fn version(id: &str, user_id: &str) -> WorkingTimeVersion {
        WorkingTimeVersion {
            id: id.to_string(),
            user_id: user_id.to_string(),
            valid_from: LowerBound::Unbounded,
            federal_state: None,
            works_on_public_holiday: false,
            workdays: Workdays::new(),
        }
    }

    #[test]
    fn find_by_users_groups_versions() {
        let repository = InMemoryWorkingTimeRepository::default();
        repository.save(&version("wt-1", "usr-1")).expect("save");
        repository.save(&version("wt-2", "usr-1")).expect("save");
        repository.save(&version("wt-3", "usr-2")).expect("save");
        repository.save(&version("wt-4", "usr-3")).expect("save");

        let grouped = repository
            .find_by_users(&["usr-1".to_string(), "usr-2".to_string(), "usr-9".to_string()])
            .expect("find");
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["usr-1"].len(), 2);
        assert!(!grouped.contains_key("usr-9"));

        repository.remove("wt-1").expect("remove");
        assert_eq!(repository.find_by_user("usr-1").expect("find").len(), 1);
    }

    #[test]
    fn save_rejects_missing_user() {
        let repository = InMemoryWorkingTimeRepository::default();
        assert!(repository.save(&version("wt-1", " ")).is_err());
    }
}
