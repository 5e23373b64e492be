use crate::domain::duration::{PlannedWorkingHours, ShouldWorkingHours};
use crate::domain::error::{AccountingError, ensure_range};
use crate::domain::models::{Absence, AbsenceDay};
use crate::domain::schedule::{WorkingTimeChain, day_before};
use crate::domain::working_time::{LowerBound, WorkingTimeVersion};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn half_open(from: NaiveDate, to_exclusive: NaiveDate) -> Result<Self, AccountingError> {
        ensure_range(from, to_exclusive)?;
        Ok(Self::new(from, day_before(to_exclusive)?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> i64 {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    pub fn iter(self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |date| *date <= end)
    }
}

/// First instant of `date` in `zone`. When midnight falls into a DST gap the day starts one hour
/// later.
pub fn start_of_day(date: NaiveDate, zone: Tz) -> Result<DateTime<Utc>, AccountingError> {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(zone)
        .earliest()
        .or_else(|| (midnight + TimeDelta::hours(1)).and_local_timezone(zone).earliest())
        .map(|start| start.with_timezone(&Utc))
        .ok_or_else(|| AccountingError::InvalidValue(format!("{date} has no start in {zone}")))
}

pub fn project(
    chain: &WorkingTimeChain,
    from: NaiveDate,
    to_exclusive: NaiveDate,
) -> Result<BTreeMap<NaiveDate, PlannedWorkingHours>, AccountingError> {
    project_with_holidays(chain, from, to_exclusive, |_, _| false)
}

/// Like [`project`], but plans zero hours on public holidays of versions that do not work on
/// them. Fails with [`AccountingError::ChainGap`] when the chain runs out before `from`.
pub fn project_with_holidays(
    chain: &WorkingTimeChain,
    from: NaiveDate,
    to_exclusive: NaiveDate,
    is_public_holiday: impl Fn(&WorkingTimeVersion, NaiveDate) -> bool,
) -> Result<BTreeMap<NaiveDate, PlannedWorkingHours>, AccountingError> {
    let range = DateRange::half_open(from, to_exclusive)?;
    let mut planned = BTreeMap::new();
    let mut next_end = range.end;

    for version in chain.versions() {
        let lower = match version.valid_from {
            LowerBound::Unbounded => from,
            LowerBound::From(valid_from) => valid_from.max(from),
        };

        for date in DateRange::new(lower, next_end).iter() {
            let hours = if !version.works_on_public_holiday && is_public_holiday(version, date) {
                PlannedWorkingHours::ZERO
            } else {
                version.workdays.for_date(date)
            };
            planned.insert(date, hours);
        }

        if lower == from {
            return Ok(planned);
        }

        // lower > from, so this version has a concrete start after `from`
        next_end = next_end.min(day_before(lower)?);
    }

    Err(AccountingError::ChainGap { from })
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkingTimeCalendar {
    planned: BTreeMap<NaiveDate, PlannedWorkingHours>,
    absence_days: BTreeMap<NaiveDate, AbsenceDay>,
}

impl WorkingTimeCalendar {
    pub fn new(planned: BTreeMap<NaiveDate, PlannedWorkingHours>) -> Self {
        Self {
            planned,
            absence_days: BTreeMap::new(),
        }
    }

    pub fn with_absence_days(mut self, absence_days: BTreeMap<NaiveDate, AbsenceDay>) -> Self {
        self.absence_days = absence_days;
        self
    }

    pub fn len(&self) -> usize {
        self.planned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planned.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.planned.keys().copied()
    }

    pub fn planned_working_hours(&self, date: NaiveDate) -> Option<PlannedWorkingHours> {
        self.planned.get(&date).copied()
    }

    // unknown dates keep their planned hours
    pub fn should_working_hours(&self, date: NaiveDate) -> Option<ShouldWorkingHours> {
        match self.absence_days.get(&date) {
            Some(day) => Some(day.should_working_hours),
            None => self
                .planned_working_hours(date)
                .map(|planned| ShouldWorkingHours::new(planned.duration())),
        }
    }

    pub fn absences(&self, date: NaiveDate) -> &[Absence] {
        self.absence_days
            .get(&date)
            .map(|day| day.absences.as_slice())
            .unwrap_or_default()
    }

    pub fn planned_working_hours_between(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> PlannedWorkingHours {
        if to_exclusive <= from {
            return PlannedWorkingHours::ZERO;
        }
        self.planned
            .range(from..to_exclusive)
            .map(|(_, hours)| *hours)
            .sum()
    }

    pub fn should_working_hours_between(
        &self,
        from: NaiveDate,
        to_exclusive: NaiveDate,
    ) -> ShouldWorkingHours {
        if to_exclusive <= from {
            return ShouldWorkingHours::ZERO;
        }
        self.planned
            .range(from..to_exclusive)
            .filter_map(|(date, _)| self.should_working_hours(*date))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::working_time::{Workdays, WorkingTimeVersion};
    use chrono::{TimeDelta, Weekday};
    use proptest::prelude::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn version(id: &str, valid_from: Option<&str>, monday_hours: i64) -> WorkingTimeVersion {
        WorkingTimeVersion {
            id: id.to_string(),
            user_id: "usr-1".to_string(),
            valid_from: valid_from.map(date).into(),
            federal_state: None,
            works_on_public_holiday: false,
            workdays: Workdays::new()
                .with(Weekday::Mon, TimeDelta::hours(monday_hours))
                .with(Weekday::Thu, TimeDelta::hours(monday_hours)),
        }
    }

    fn hours(calendar: &BTreeMap<NaiveDate, PlannedWorkingHours>, value: &str) -> TimeDelta {
        calendar
            .get(&date(value))
            .expect("date in calendar")
            .duration()
    }

    #[test]
    fn date_range_iterates_inclusive() {
        let range = DateRange::half_open(date("2024-02-27"), date("2024-03-02")).expect("range");
        let dates: Vec<NaiveDate> = range.iter().collect();
        assert_eq!(dates.len(), 4);
        assert_eq!(dates[2], date("2024-02-29"));
        assert_eq!(range.days(), 4);
        assert!(range.contains(date("2024-03-01")));
        assert!(!range.contains(date("2024-03-02")));
    }

    #[test]
    fn start_of_day_uses_zone_offset() {
        let start = start_of_day(date("2024-03-04"), chrono_tz::Europe::Berlin).expect("start");
        assert_eq!(start.to_rfc3339(), "2024-03-03T23:00:00+00:00");
        let start = start_of_day(date("2024-07-01"), chrono_tz::Europe::Berlin).expect("start");
        assert_eq!(start.to_rfc3339(), "2024-06-30T22:00:00+00:00");
    }

    #[test]
    fn project_switches_version_at_valid_from() {
        let chain = WorkingTimeChain::new(vec![
            version("wt-start", None, 8),
            version("wt-june", Some("2023-06-01"), 4),
        ])
        .expect("chain");

        let calendar = project(&chain, date("2023-05-29"), date("2023-06-05")).expect("projection");

        assert_eq!(calendar.len(), 7);
        assert_eq!(hours(&calendar, "2023-05-29"), TimeDelta::hours(8));
        assert_eq!(hours(&calendar, "2023-06-01"), TimeDelta::hours(4));
        assert!(hours(&calendar, "2023-06-04").is_zero());
        assert!(!calendar.contains_key(&date("2023-06-05")));
    }

    #[test]
    fn project_ignores_versions_starting_after_range() {
        let chain = WorkingTimeChain::new(vec![
            version("wt-start", None, 8),
            version("wt-future", Some("2030-01-01"), 2),
        ])
        .expect("chain");

        let calendar = project(&chain, date("2024-03-04"), date("2024-03-11")).expect("projection");
        assert_eq!(calendar.len(), 7);
        assert_eq!(hours(&calendar, "2024-03-04"), TimeDelta::hours(8));
    }

    #[test]
    fn project_fails_on_chain_gap() {
        let chain =
            WorkingTimeChain::new(vec![version("wt-june", Some("2023-06-01"), 4)]).expect("chain");
        let error = project(&chain, date("2023-05-29"), date("2023-06-05")).expect_err("gap");
        assert_eq!(
            error,
            AccountingError::ChainGap {
                from: date("2023-05-29")
            }
        );
        assert!(error.is_integrity_violation());
    }

    #[test]
    fn project_rejects_empty_range() {
        let chain = WorkingTimeChain::default_for("usr-1");
        let error = project(&chain, date("2024-03-04"), date("2024-03-04")).expect_err("empty");
        assert!(matches!(error, AccountingError::EmptyRange { .. }));
    }

    #[test]
    fn calendar_should_hours_fall_back_to_planned() {
        let chain = WorkingTimeChain::default_for("usr-1");
        let planned = project(&chain, date("2024-03-04"), date("2024-03-11")).expect("projection");
        let mut absence_days = BTreeMap::new();
        absence_days.insert(
            date("2024-03-05"),
            AbsenceDay {
                absences: vec![Absence {
                    id: "abs-1".to_string(),
                    kind: "holiday".to_string(),
                    full_day: true,
                }],
                should_working_hours: ShouldWorkingHours::ZERO,
            },
        );
        let calendar = WorkingTimeCalendar::new(planned).with_absence_days(absence_days);

        assert!(
            calendar
                .should_working_hours(date("2024-03-05"))
                .expect("known date")
                .is_zero()
        );
        assert_eq!(
            calendar
                .should_working_hours(date("2024-03-04"))
                .expect("known date")
                .duration(),
            TimeDelta::hours(8)
        );
        assert_eq!(calendar.absences(date("2024-03-05")).len(), 1);
        assert!(calendar.absences(date("2024-03-04")).is_empty());
        assert_eq!(calendar.should_working_hours(date("2024-04-01")), None);

        assert_eq!(
            calendar
                .planned_working_hours_between(date("2024-03-04"), date("2024-03-11"))
                .duration(),
            TimeDelta::hours(40)
        );
        assert_eq!(
            calendar
                .should_working_hours_between(date("2024-03-04"), date("2024-03-11"))
                .duration(),
            TimeDelta::hours(32)
        );
        assert!(
            calendar
                .planned_working_hours_between(date("2025-01-01"), date("2025-01-08"))
                .is_zero()
        );
    }

    #[test]
    fn public_holidays_clear_planned_hours_unless_version_works_on_them() {
        let mut regular = version("wt-start", None, 8);
        regular.federal_state = Some("BY".to_string());
        let holiday = date("2024-05-09");
        let is_holiday = |version: &WorkingTimeVersion, date: NaiveDate| {
            version.federal_state.as_deref() == Some("BY") && date == holiday
        };

        let chain = WorkingTimeChain::new(vec![regular.clone()]).expect("chain");
        let calendar =
            project_with_holidays(&chain, date("2024-05-06"), date("2024-05-13"), is_holiday)
                .expect("projection");
        assert!(hours(&calendar, "2024-05-09").is_zero());
        assert_eq!(hours(&calendar, "2024-05-06"), TimeDelta::hours(8));

        regular.works_on_public_holiday = true;
        let chain = WorkingTimeChain::new(vec![regular]).expect("chain");
        let calendar =
            project_with_holidays(&chain, date("2024-05-06"), date("2024-05-13"), is_holiday)
                .expect("projection");
        assert_eq!(hours(&calendar, "2024-05-09"), TimeDelta::hours(8));
    }

    proptest! {
        #[test]
        fn projection_covers_every_requested_day(
            offsets in prop::collection::btree_set(0i64..400, 0..6),
            from_offset in -50i64..450,
            length in 1i64..120,
        ) {
            let base = date("2023-01-01");
            let mut versions = vec![version("wt-open", None, 8)];
            versions.extend(offsets.iter().map(|offset| WorkingTimeVersion {
                id: format!("wt-{offset}"),
                user_id: "usr-1".to_string(),
                valid_from: LowerBound::From(base + TimeDelta::days(*offset)),
                federal_state: None,
                works_on_public_holiday: false,
                workdays: Workdays::new().with(Weekday::Mon, TimeDelta::hours(*offset % 9)),
            }));
            let chain = WorkingTimeChain::new(versions).expect("chain");
            let from = base + TimeDelta::days(from_offset);
            let to_exclusive = from + TimeDelta::days(length);

            let calendar = project(&chain, from, to_exclusive).expect("projection");

            prop_assert_eq!(calendar.len() as i64, length);
            for (day, planned) in &calendar {
                let link = chain.current(*day).expect("current version");
                prop_assert_eq!(*planned, link.version().workdays.for_date(*day));
            }
        }
    }
}
