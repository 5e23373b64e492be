pub mod absence_source;
pub mod config;
pub mod error;
pub mod event_publisher;
pub mod public_holiday_source;
pub mod time_entry_repository;
pub mod user_directory;
pub mod working_time_repository;
