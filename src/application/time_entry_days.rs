use crate::application::working_time_calendar::WorkingTimeCalendarService;
use crate::domain::calendar::{DateRange, WorkingTimeCalendar, start_of_day};
use crate::domain::day::{TimeEntryDay, TimeEntryWeek};
use crate::domain::error::AccountingError;
use crate::domain::lock::{LockWindow, is_day_locked};
use crate::domain::models::{Capability, TimeEntry};
use crate::domain::work_duration::calculate_with_settings;
use crate::infrastructure::absence_source::AbsenceSource;
use crate::infrastructure::config::EngineSettings;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::time_entry_repository::TimeEntryRepository;
use crate::infrastructure::user_directory::UserDirectory;
use crate::infrastructure::working_time_repository::WorkingTimeRepository;
use chrono::{DateTime, Days, NaiveDate, Utc, Weekday};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub struct TimeEntryDayService<T, W, A, U>
where
    T: TimeEntryRepository,
    W: WorkingTimeRepository,
    A: AbsenceSource,
    U: UserDirectory,
{
    time_entry_repository: Arc<T>,
    calendar_service: Arc<WorkingTimeCalendarService<W, A, U>>,
    settings: EngineSettings,
    now_provider: NowProvider,
}

impl<T, W, A, U> TimeEntryDayService<T, W, A, U>
where
    T: TimeEntryRepository,
    W: WorkingTimeRepository,
    A: AbsenceSource,
    U: UserDirectory,
{
    pub fn new(
        time_entry_repository: Arc<T>,
        calendar_service: Arc<WorkingTimeCalendarService<W, A, U>>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            time_entry_repository,
            calendar_service,
            settings,
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn lock_window(&self) -> LockWindow {
        LockWindow::new(self.settings.lock, self.settings.zone)
    }

    pub fn time_entry_days(
        &self,
        user_id: &str,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<Vec<TimeEntryDay>, InfraError> {
        let range = DateRange::half_open(from, to_exclusive)?;
        let calendar = self
            .calendar_service
            .working_time_calendar(user_id, from, to_exclusive)?;
        let (start, end) = self.instant_range(from, to_exclusive)?;
        let entries = self
            .time_entry_repository
            .find_by_owner(user_id, start, end)?;

        self.build_days(range, &calendar, entries)
    }

    pub fn time_entry_days_for_users(
        &self,
        user_ids: &[String],
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<HashMap<String, Vec<TimeEntryDay>>, InfraError> {
        let range = DateRange::half_open(from, to_exclusive)?;
        let calendars = self
            .calendar_service
            .working_time_calendars(user_ids, from, to_exclusive)?;
        let (start, end) = self.instant_range(from, to_exclusive)?;

        let mut entries_by_owner: HashMap<String, Vec<TimeEntry>> = HashMap::new();
        for entry in self
            .time_entry_repository
            .find_by_owners(user_ids, start, end)?
        {
            entries_by_owner
                .entry(entry.owner.clone())
                .or_default()
                .push(entry);
        }

        let mut days_by_user = HashMap::with_capacity(user_ids.len());
        for user_id in user_ids {
            let calendar = calendars
                .get(user_id)
                .ok_or_else(|| AccountingError::MissingCalendar {
                    user_id: user_id.clone(),
                })?;
            let entries = entries_by_owner.remove(user_id).unwrap_or_default();
            days_by_user.insert(user_id.clone(), self.build_days(range, calendar, entries)?);
        }
        Ok(days_by_user)
    }

    pub fn time_entry_days_for_all_users(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<HashMap<String, Vec<TimeEntryDay>>, InfraError> {
        let user_ids = self.calendar_service.user_directory().all_user_ids()?;
        self.time_entry_days_for_users(&user_ids, from, to_exclusive)
    }

    pub fn entry_week(
        &self,
        user_id: &str,
        iso_year: i32,
        iso_week: u32,
    ) -> Result<TimeEntryWeek, InfraError> {
        let monday = NaiveDate::from_isoywd_opt(iso_year, iso_week, Weekday::Mon).ok_or_else(|| {
            AccountingError::InvalidValue(format!("{iso_year}-W{iso_week} is not a valid ISO week"))
        })?;
        let next_monday = monday
            .checked_add_days(Days::new(7))
            .ok_or_else(|| AccountingError::InvalidValue(format!("no week after {monday}")))?;

        let mut days = self.time_entry_days(user_id, monday, next_monday)?;
        days.reverse();
        Ok(TimeEntryWeek {
            first_date_of_week: monday,
            days,
        })
    }

    pub fn is_entry_editable(&self, entry: &TimeEntry, capabilities: &HashSet<Capability>) -> bool {
        self.lock_window()
            .is_edit_allowed(entry.start, entry.end, capabilities, (self.now_provider)())
    }

    fn instant_range(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), AccountingError> {
        Ok((
            start_of_day(from, self.settings.zone)?,
            start_of_day(to_exclusive, self.settings.zone)?,
        ))
    }

    fn build_days(
        &self,
        range: DateRange,
        calendar: &WorkingTimeCalendar,
        entries: Vec<TimeEntry>,
    ) -> Result<Vec<TimeEntryDay>, InfraError> {
        let zone = self.settings.zone;
        let mut entries_by_date: BTreeMap<NaiveDate, Vec<TimeEntry>> = BTreeMap::new();
        for entry in entries {
            entries_by_date
                .entry(entry.bucket_date(zone))
                .or_default()
                .push(entry);
        }

        let min_valid_date = self.lock_window().min_valid_date((self.now_provider)());
        let mut days = Vec::with_capacity(range.days() as usize);
        for date in range.iter() {
            let mut entries = entries_by_date.remove(&date).unwrap_or_default();
            entries.sort_by(|left, right| right.start.cmp(&left.start));

            let planned_working_hours = calendar
                .planned_working_hours(date)
                .ok_or(AccountingError::MissingPlannedHours { date })?;
            let should_working_hours = calendar
                .should_working_hours(date)
                .ok_or(AccountingError::MissingPlannedHours { date })?;

            days.push(TimeEntryDay {
                locked: is_day_locked(date, min_valid_date),
                date,
                work_duration: calculate_with_settings(&self.settings.subtract_breaks, &entries),
                planned_working_hours,
                should_working_hours,
                entries,
                absences: calendar.absences(date).to_vec(),
            });
        }
        days.reverse();
        Ok(days)
    }
}
