pub mod bootstrap;
pub mod day_locked;
pub mod time_entry_days;
pub mod working_time_calendar;
