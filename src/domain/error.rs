use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountingError {
    #[error("time entry {entry_id} ends at {end} before it starts at {start}")]
    InvalidInterval {
        entry_id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("date range is empty: to_exclusive {to_exclusive} must be after from {from}")]
    EmptyRange {
        from: NaiveDate,
        to_exclusive: NaiveDate,
    },
    #[error("working time {id} is not part of the given chain")]
    VersionNotInChain { id: String },
    #[error("working time chain contains more than one version valid from {valid_from}")]
    DuplicateValidFrom { valid_from: NaiveDate },
    #[error("working time chain contains more than one open-ended version")]
    MultipleOpenEndedVersions,
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("working time chain does not cover {from}")]
    ChainGap { from: NaiveDate },
    #[error("expected working time calendar for user {user_id}")]
    MissingCalendar { user_id: String },
    #[error("expected planned working hours for {date}")]
    MissingPlannedHours { date: NaiveDate },
}

impl AccountingError {
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::ChainGap { .. } | Self::MissingCalendar { .. } | Self::MissingPlannedHours { .. }
        )
    }
}

pub(crate) fn ensure_range(from: NaiveDate, to_exclusive: NaiveDate) -> Result<(), AccountingError> {
    if to_exclusive <= from {
        return Err(AccountingError::EmptyRange { from, to_exclusive });
    }
    Ok(())
}
