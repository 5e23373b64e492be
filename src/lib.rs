pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{BootstrapResult, bootstrap_workspace};
pub use application::day_locked::{
    ConfigTenantDirectory, DayLockedRunSummary, DayLockedScheduler, TenantDirectory,
    TenantLockSettings,
};
pub use application::time_entry_days::TimeEntryDayService;
pub use application::working_time_calendar::WorkingTimeCalendarService;
pub use domain::calendar::{DateRange, WorkingTimeCalendar, project, project_with_holidays};
pub use domain::day::{TimeEntryDay, TimeEntryWeek};
pub use domain::duration::{
    BreakDuration, PlannedWorkingHours, ShouldWorkingHours, WorkDuration, ZeitDuration,
    hours_to_duration,
};
pub use domain::error::AccountingError;
pub use domain::lock::{
    DayLockedEvent, LockTimeEntriesSettings, LockWindow, is_allowed_to_bypass, is_day_locked,
};
pub use domain::models::{Absence, AbsenceDay, Capability, TimeEntry, TimeEntryKind};
pub use domain::schedule::{ChainLink, ResolvedWorkingTime, WorkingTimeChain};
pub use domain::work_duration::{
    SubtractBreakSettings, calculate_plain_work_duration, calculate_with_settings,
    calculate_work_duration,
};
pub use domain::working_time::{LowerBound, UpperBound, Workdays, WorkingTimeVersion};
pub use infrastructure::config::{
    EngineSettings, TenantMode, read_engine_settings, save_lock_settings,
    save_subtract_break_settings,
};
pub use infrastructure::error::InfraError;
pub use infrastructure::public_holiday_source::{
    InMemoryPublicHolidaySource, NoPublicHolidays, PublicHolidaySource,
};
