use crate::domain::duration::WorkDuration;
use crate::domain::models::TimeEntry;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Span {
    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubtractBreakSettings {
    pub active: bool,
    #[serde(default)]
    pub enabled_at: Option<DateTime<Utc>>,
}

impl Default for SubtractBreakSettings {
    fn default() -> Self {
        Self {
            active: true,
            enabled_at: None,
        }
    }
}

pub fn calculate_work_duration<'a, I>(entries: I) -> WorkDuration
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let (work, breaks) = partition(entries);
    let merged_work = merge_spans(work);
    let merged_breaks = merge_spans(breaks);

    let raw: TimeDelta = merged_work.iter().map(Span::length).sum();
    let deduction: TimeDelta = merged_work
        .iter()
        .flat_map(|work| {
            merged_breaks
                .iter()
                .filter_map(move |pause| overlap(*work, *pause))
        })
        .sum();

    WorkDuration::new((raw - deduction).max(TimeDelta::zero()))
}

pub fn calculate_plain_work_duration<'a, I>(entries: I) -> WorkDuration
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let (work, _) = partition(entries);
    let total: TimeDelta = merge_spans(work).iter().map(Span::length).sum();
    WorkDuration::new(total)
}

/// Entries starting before `enabled_at` are calculated without break subtraction, later ones
/// with it. Active settings without `enabled_at` subtract breaks everywhere.
pub fn calculate_with_settings(
    settings: &SubtractBreakSettings,
    entries: &[TimeEntry],
) -> WorkDuration {
    if !settings.active {
        return calculate_plain_work_duration(entries);
    }

    // active since before any recorded entry
    let Some(enabled_at) = settings.enabled_at else {
        return calculate_work_duration(entries);
    };

    let (before, after): (Vec<&TimeEntry>, Vec<&TimeEntry>) =
        entries.iter().partition(|entry| entry.start < enabled_at);

    calculate_plain_work_duration(before) + calculate_work_duration(after)
}

// touching spans merge
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_unstable_by(|left, right| left.start.cmp(&right.start));

    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => {
                if span.end > last.end {
                    last.end = span.end;
                }
            }
            _ => merged.push(span),
        }
    }
    merged
}

fn partition<'a, I>(entries: I) -> (Vec<Span>, Vec<Span>)
where
    I: IntoIterator<Item = &'a TimeEntry>,
{
    let mut work = Vec::new();
    let mut breaks = Vec::new();
    for entry in entries {
        // reversed entries are rejected by TimeEntry::validate and contribute nothing here
        if entry.end < entry.start {
            continue;
        }
        let span = Span {
            start: entry.start,
            end: entry.end,
        };
        if entry.is_break {
            breaks.push(span);
        } else {
            work.push(span);
        }
    }
    (work, breaks)
}

fn overlap(left: Span, right: Span) -> Option<TimeDelta> {
    let start = left.start.max(right.start);
    let end = left.end.min(right.end);
    (end > start).then(|| end - start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn entry(id: &str, start: &str, end: &str, is_break: bool) -> TimeEntry {
        TimeEntry {
            id: id.to_string(),
            owner: "usr-1".to_string(),
            comment: String::new(),
            start: fixed_time(&format!("2024-03-04T{start}:00Z")),
            end: fixed_time(&format!("2024-03-04T{end}:00Z")),
            is_break,
        }
    }

    fn work(id: &str, start: &str, end: &str) -> TimeEntry {
        entry(id, start, end, false)
    }

    fn pause(id: &str, start: &str, end: &str) -> TimeEntry {
        entry(id, start, end, true)
    }

    #[test]
    fn empty_entries_yield_zero() {
        let entries: Vec<TimeEntry> = Vec::new();
        assert!(calculate_work_duration(&entries).is_zero());
        assert!(calculate_plain_work_duration(&entries).is_zero());
    }

    #[test]
    fn break_inside_work_day_is_subtracted() {
        let entries = [work("w1", "08:00", "17:00"), pause("b1", "12:00", "13:00")];
        assert_eq!(
            calculate_work_duration(&entries).duration(),
            TimeDelta::hours(8)
        );
    }

    #[test]
    fn overlapping_work_is_merged_before_break_subtraction() {
        let entries = [
            work("w1", "08:00", "09:00"),
            work("w2", "08:30", "09:30"),
            work("w3", "10:00", "11:00"),
            pause("b1", "08:15", "09:45"),
        ];
        assert_eq!(
            calculate_work_duration(&entries).duration(),
            TimeDelta::minutes(75)
        );
    }

    #[test]
    fn break_spanning_two_work_spans_subtracts_both_parts() {
        let entries = [
            work("w1", "08:00", "10:00"),
            work("w2", "11:00", "13:00"),
            pause("b1", "09:30", "11:30"),
        ];
        assert_eq!(
            calculate_work_duration(&entries).duration(),
            TimeDelta::hours(3)
        );
    }

    #[test]
    fn break_outside_work_is_ignored() {
        let entries = [work("w1", "08:00", "12:00"), pause("b1", "18:00", "19:00")];
        assert_eq!(
            calculate_work_duration(&entries).duration(),
            TimeDelta::hours(4)
        );
    }

    #[test]
    fn break_covering_all_work_yields_zero() {
        let entries = [work("w1", "09:00", "10:00"), pause("b1", "08:00", "11:00")];
        assert!(calculate_work_duration(&entries).is_zero());
    }

    #[test]
    fn touching_work_entries_merge_into_one_span() {
        let spans = merge_spans(vec![
            Span {
                start: fixed_time("2024-03-04T10:00:00Z"),
                end: fixed_time("2024-03-04T11:00:00Z"),
            },
            Span {
                start: fixed_time("2024-03-04T08:00:00Z"),
                end: fixed_time("2024-03-04T10:00:00Z"),
            },
            Span {
                start: fixed_time("2024-03-04T12:00:00Z"),
                end: fixed_time("2024-03-04T12:30:00Z"),
            },
        ]);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start, fixed_time("2024-03-04T08:00:00Z"));
        assert_eq!(spans[0].end, fixed_time("2024-03-04T11:00:00Z"));
    }

    #[test]
    fn plain_calculation_ignores_breaks() {
        let entries = [
            work("w1", "08:00", "17:00"),
            work("w2", "16:00", "17:30"),
            pause("b1", "12:00", "13:00"),
        ];
        assert_eq!(
            calculate_plain_work_duration(&entries).duration(),
            TimeDelta::minutes(570)
        );
    }

    #[test]
    fn inactive_settings_use_plain_calculation() {
        let settings = SubtractBreakSettings {
            active: false,
            enabled_at: None,
        };
        let entries = [work("w1", "08:00", "17:00"), pause("b1", "12:00", "13:00")];
        assert_eq!(
            calculate_with_settings(&settings, &entries).duration(),
            TimeDelta::hours(9)
        );
    }

    #[test]
    fn active_settings_without_timestamp_subtract_breaks_everywhere() {
        let settings = SubtractBreakSettings {
            active: true,
            enabled_at: None,
        };
        let entries = [work("w1", "08:00", "17:00"), pause("b1", "12:00", "13:00")];
        assert_eq!(
            calculate_with_settings(&settings, &entries).duration(),
            TimeDelta::hours(8)
        );
        assert_eq!(
            calculate_with_settings(&SubtractBreakSettings::default(), &entries).duration(),
            TimeDelta::hours(8)
        );
    }

    #[test]
    fn entries_are_split_at_enabled_at() {
        let settings = SubtractBreakSettings {
            active: true,
            enabled_at: Some(fixed_time("2024-03-04T12:00:00Z")),
        };
        let entries = [
            work("w1", "08:00", "11:00"),
            pause("b1", "09:00", "10:00"),
            work("w2", "13:00", "17:00"),
            pause("b2", "14:00", "14:30"),
        ];
        // 3h before enabled_at without subtraction, 3h30m after with subtraction
        assert_eq!(
            calculate_with_settings(&settings, &entries).duration(),
            TimeDelta::minutes(390)
        );
    }

    #[test]
    fn subtract_break_settings_read_camel_case_json() {
        let settings: SubtractBreakSettings =
            serde_json::from_str(r#"{"active":true,"enabledAt":"2024-01-01T00:00:00Z"}"#)
                .expect("parse settings");
        assert!(settings.active);
        assert_eq!(settings.enabled_at, Some(fixed_time("2024-01-01T00:00:00Z")));
    }

    fn arb_entries() -> impl Strategy<Value = Vec<TimeEntry>> {
        prop::collection::vec((0i64..960, 0i64..240, any::<bool>()), 0..12).prop_map(|raw| {
            let base = fixed_time("2024-03-04T06:00:00Z");
            raw.into_iter()
                .enumerate()
                .map(|(index, (offset, length, is_break))| TimeEntry {
                    id: format!("te-{index}"),
                    owner: "usr-1".to_string(),
                    comment: String::new(),
                    start: base + TimeDelta::minutes(offset),
                    end: base + TimeDelta::minutes(offset + length),
                    is_break,
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn calculation_is_deterministic_and_non_negative(entries in arb_entries()) {
            let first = calculate_work_duration(&entries);
            let second = calculate_work_duration(&entries);
            prop_assert_eq!(first, second);
            prop_assert!(first.duration() >= TimeDelta::zero());
            prop_assert!(first <= calculate_plain_work_duration(&entries));
        }

        #[test]
        fn duplicated_work_never_inflates_duration(entries in arb_entries()) {
            let mut doubled = entries.clone();
            doubled.extend(entries.iter().filter(|entry| !entry.is_break).cloned());
            prop_assert_eq!(calculate_work_duration(&doubled), calculate_work_duration(&entries));
        }

        #[test]
        fn break_outside_every_work_entry_changes_nothing(entries in arb_entries()) {
            let mut with_break = entries.clone();
            let late = fixed_time("2024-03-05T06:00:00Z");
            with_break.push(TimeEntry {
                id: "late-break".to_string(),
                owner: "usr-1".to_string(),
                comment: String::new(),
                start: late,
                end: late + TimeDelta::hours(1),
                is_break: true,
            });
            prop_assert_eq!(calculate_work_duration(&with_break), calculate_work_duration(&entries));
        }

        #[test]
        fn overlapping_breaks_subtract_shared_portion_once(
            break_start in 0i64..480,
            first_length in 1i64..120,
            second_offset in 0i64..120,
            second_length in 1i64..120,
        ) {
            let base = fixed_time("2024-03-04T06:00:00Z");
            let entry = |id: &str, start: i64, end: i64, is_break: bool| TimeEntry {
                id: id.to_string(),
                owner: "usr-1".to_string(),
                comment: String::new(),
                start: base + TimeDelta::minutes(start),
                end: base + TimeDelta::minutes(end),
                is_break,
            };
            let first_end = break_start + first_length;
            let second_start = break_start + second_offset.min(first_length);
            let second_end = second_start + second_length;
            let covered = first_end.max(second_end) - break_start;

            let entries = [
                entry("w1", 0, 720, false),
                entry("b1", break_start, first_end, true),
                entry("b2", second_start, second_end, true),
            ];
            prop_assert_eq!(
                calculate_work_duration(&entries).duration(),
                TimeDelta::minutes(720 - covered)
            );
        }
    }
}
