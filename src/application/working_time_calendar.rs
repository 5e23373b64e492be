use crate::domain::calendar::{WorkingTimeCalendar, project_with_holidays};
use crate::domain::error::ensure_range;
use crate::domain::schedule::{ResolvedWorkingTime, WorkingTimeChain};
use crate::domain::working_time::WorkingTimeVersion;
use crate::infrastructure::absence_source::AbsenceSource;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::public_holiday_source::{NoPublicHolidays, PublicHolidaySource};
use crate::infrastructure::user_directory::UserDirectory;
use crate::infrastructure::working_time_repository::WorkingTimeRepository;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

pub struct WorkingTimeCalendarService<W, A, U>
where
    W: WorkingTimeRepository,
    A: AbsenceSource,
    U: UserDirectory,
{
    working_time_repository: Arc<W>,
    absence_source: Arc<A>,
    user_directory: Arc<U>,
    public_holiday_source: Arc<dyn PublicHolidaySource>,
}

impl<W, A, U> WorkingTimeCalendarService<W, A, U>
where
    W: WorkingTimeRepository,
    A: AbsenceSource,
    U: UserDirectory,
{
    pub fn new(
        working_time_repository: Arc<W>,
        absence_source: Arc<A>,
        user_directory: Arc<U>,
    ) -> Self {
        Self {
            working_time_repository,
            absence_source,
            user_directory,
            public_holiday_source: Arc::new(NoPublicHolidays),
        }
    }

    pub fn with_public_holiday_source(
        mut self,
        public_holiday_source: Arc<dyn PublicHolidaySource>,
    ) -> Self {
        self.public_holiday_source = public_holiday_source;
        self
    }

    pub fn user_directory(&self) -> &Arc<U> {
        &self.user_directory
    }

    pub fn working_time_chain(&self, user_id: &str) -> Result<WorkingTimeChain, InfraError> {
        let versions = self.working_time_repository.find_by_user(user_id)?;
        chain_or_default(user_id, versions)
    }

    pub fn resolved_working_times(
        &self,
        user_id: &str,
        reference_date: NaiveDate,
    ) -> Result<Vec<ResolvedWorkingTime>, InfraError> {
        Ok(self.working_time_chain(user_id)?.resolved(reference_date))
    }

    pub fn working_time_calendar(
        &self,
        user_id: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<WorkingTimeCalendar, InfraError> {
        ensure_range(from, to_exclusive)?;
        let chain = self.working_time_chain(user_id)?;
        self.calendar_for_chain(user_id, &chain, from, to_exclusive)
    }

    pub fn working_time_calendars(
        &self,
        user_ids: &[String],
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<HashMap<String, WorkingTimeCalendar>, InfraError> {
        ensure_range(from, to_exclusive)?;
        let mut versions_by_user = self.working_time_repository.find_by_users(user_ids)?;

        let mut calendars = HashMap::with_capacity(user_ids.len());
        for user_id in user_ids {
            let versions = versions_by_user.remove(user_id).unwrap_or_default();
            let chain = chain_or_default(user_id, versions)?;
            let calendar = self.calendar_for_chain(user_id, &chain, from, to_exclusive)?;
            calendars.insert(user_id.clone(), calendar);
        }
        Ok(calendars)
    }

    pub fn working_time_calendars_for_all_users(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<HashMap<String, WorkingTimeCalendar>, InfraError> {
        let user_ids = self.user_directory.all_user_ids()?;
        self.working_time_calendars(&user_ids, from, to_exclusive)
    }

    fn calendar_for_chain(
        &self,
        user_id: &str,
        chain: &WorkingTimeChain,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<WorkingTimeCalendar, InfraError> {
        let relevant: Vec<WorkingTimeVersion> = chain
            .links()
            .filter(|link| link.touches_range(from, to_exclusive))
            .map(|link| link.version().clone())
            .collect();
        let pruned = WorkingTimeChain::new(relevant)?;
        tracing::debug!(
            user_id,
            %from,
            %to_exclusive,
            versions = chain.len(),
            relevant = pruned.len(),
            "projecting working time calendar"
        );

        let mut holidays_by_state: HashMap<&str, BTreeSet<NaiveDate>> = HashMap::new();
        for version in pruned.versions() {
            let Some(state) = version.federal_state.as_deref() else {
                continue;
            };
            if version.works_on_public_holiday || holidays_by_state.contains_key(state) {
                continue;
            }
            let holidays = self
                .public_holiday_source
                .public_holidays(state, from, to_exclusive)?;
            holidays_by_state.insert(state, holidays);
        }

        let planned = project_with_holidays(&pruned, from, to_exclusive, |version, date| {
            version
                .federal_state
                .as_deref()
                .and_then(|state| holidays_by_state.get(state))
                .is_some_and(|holidays| holidays.contains(&date))
        })?;
        let absence_days = self
            .absence_source
            .absence_days(user_id, from, to_exclusive)?;
        Ok(WorkingTimeCalendar::new(planned).with_absence_days(absence_days))
    }
}

fn chain_or_default(
    user_id: &str,
    versions: Vec<WorkingTimeVersion>,
) -> Result<WorkingTimeChain, InfraError> {
    if versions.is_empty() {
        return Ok(WorkingTimeChain::default_for(user_id));
    }
    Ok(WorkingTimeChain::new(versions)?)
}
