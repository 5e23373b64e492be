pub mod calendar;
pub mod day;
pub mod duration;
pub mod error;
pub mod lock;
pub mod models;
pub mod schedule;
pub mod work_duration;
pub mod working_time;
