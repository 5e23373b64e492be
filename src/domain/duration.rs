use crate::domain::error::AccountingError;
use chrono::TimeDelta;
use std::fmt;
use std::iter::Sum;
use std::marker::PhantomData;
use std::ops::Add;

const NANOS_PER_MINUTE: i128 = 60 * 1_000_000_000;
// one thousandth of an hour is 3.6 seconds
const NANOS_PER_MILLI_HOUR: i128 = 3_600_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Work;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Break;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Planned;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Should;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZeitDuration<K> {
    duration: TimeDelta,
    role: PhantomData<K>,
}

pub type WorkDuration = ZeitDuration<Work>;
pub type BreakDuration = ZeitDuration<Break>;
pub type PlannedWorkingHours = ZeitDuration<Planned>;
pub type ShouldWorkingHours = ZeitDuration<Should>;

impl<K> ZeitDuration<K> {
    pub const ZERO: Self = Self {
        duration: TimeDelta::zero(),
        role: PhantomData,
    };

    pub const fn new(duration: TimeDelta) -> Self {
        Self {
            duration,
            role: PhantomData,
        }
    }

    pub fn from_hours(hours: f64) -> Result<Self, AccountingError> {
        Ok(Self::new(hours_to_duration(hours)?))
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    /// The duration rounded up to whole minutes, `PT30S` becomes `PT1M`.
    pub fn duration_in_minutes(&self) -> TimeDelta {
        let minutes = ceil_div(total_nanos(self.duration), NANOS_PER_MINUTE);
        TimeDelta::minutes(minutes as i64)
    }

    /// Hours as decimal value with three digits, rounded up (`PT15M` is `0.25`).
    pub fn hours_double_value(&self) -> f64 {
        let milli_hours = ceil_div(total_nanos(self.duration), NANOS_PER_MILLI_HOUR);
        milli_hours as f64 / 1000.0
    }

    pub fn plus(self, other: Self) -> Self {
        Self::new(self.duration + other.duration)
    }

    pub fn is_zero(&self) -> bool {
        self.duration.is_zero()
    }
}

impl<K> Default for ZeitDuration<K> {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<K> Add for ZeitDuration<K> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.plus(rhs)
    }
}

impl<K> Sum for ZeitDuration<K> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::plus)
    }
}

impl<K> fmt::Debug for ZeitDuration<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = std::any::type_name::<K>().rsplit("::").next().unwrap_or("Zeit");
        write!(f, "{role}Duration({})", self.duration)
    }
}

/// Converts decimal hours into a duration. The fractional part is rounded half-even to whole
/// minutes, so `7.7` becomes `7h 42m`.
pub fn hours_to_duration(hours: f64) -> Result<TimeDelta, AccountingError> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(AccountingError::InvalidValue(format!(
            "hours must be a non-negative number, got {hours}"
        )));
    }
    let whole_hours = hours.trunc();
    let minutes = ((hours - whole_hours) * 60.0).round_ties_even();
    Ok(TimeDelta::hours(whole_hours as i64) + TimeDelta::minutes(minutes as i64))
}

fn total_nanos(duration: TimeDelta) -> i128 {
    i128::from(duration.num_seconds()) * 1_000_000_000 + i128::from(duration.subsec_nanos())
}

fn ceil_div(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}
