use crate::domain::error::AccountingError;
use crate::domain::working_time::{LowerBound, UpperBound, WorkingTimeVersion};
use chrono::{Days, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingTimeChain {
    versions: Vec<WorkingTimeVersion>,
    valid_to: Vec<UpperBound>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChainLink<'a> {
    chain: &'a WorkingTimeChain,
    index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedWorkingTime {
    pub version: WorkingTimeVersion,
    pub valid_from: LowerBound,
    pub valid_to: UpperBound,
    pub min_valid_from: LowerBound,
    pub is_current: bool,
}

impl WorkingTimeChain {
    pub fn new(mut versions: Vec<WorkingTimeVersion>) -> Result<Self, AccountingError> {
        versions.sort_by(|left, right| right.valid_from.cmp(&left.valid_from));

        for pair in versions.windows(2) {
            if pair[0].valid_from == pair[1].valid_from {
                return Err(match pair[0].valid_from {
                    LowerBound::Unbounded => AccountingError::MultipleOpenEndedVersions,
                    LowerBound::From(valid_from) => {
                        AccountingError::DuplicateValidFrom { valid_from }
                    }
                });
            }
        }

        let mut valid_to = Vec::with_capacity(versions.len());
        let mut newer: Option<&WorkingTimeVersion> = None;
        for version in &versions {
            let end = match newer.and_then(|newer| newer.valid_from.date()) {
                Some(next_start) => UpperBound::Until(day_before(next_start)?),
                None => UpperBound::Unbounded,
            };
            valid_to.push(end);
            newer = Some(version);
        }

        Ok(Self { versions, valid_to })
    }

    pub fn default_for(user_id: &str) -> Self {
        Self {
            versions: vec![WorkingTimeVersion::default_for(user_id)],
            valid_to: vec![UpperBound::Unbounded],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn versions(&self) -> &[WorkingTimeVersion] {
        &self.versions
    }

    pub fn links(&self) -> impl Iterator<Item = ChainLink<'_>> {
        (0..self.versions.len()).map(move |index| ChainLink { chain: self, index })
    }

    pub fn link(&self, id: &str) -> Result<ChainLink<'_>, AccountingError> {
        self.versions
            .iter()
            .position(|version| version.id == id)
            .map(|index| ChainLink { chain: self, index })
            .ok_or_else(|| AccountingError::VersionNotInChain { id: id.to_string() })
    }

    pub fn current(&self, date: NaiveDate) -> Option<ChainLink<'_>> {
        self.links().find(|link| link.is_current(date))
    }

    pub fn resolved(&self, reference_date: NaiveDate) -> Vec<ResolvedWorkingTime> {
        self.links()
            .map(|link| ResolvedWorkingTime {
                version: link.version().clone(),
                valid_from: link.valid_from(),
                valid_to: link.valid_to(),
                min_valid_from: link.min_valid_from(),
                is_current: link.is_current(reference_date),
            })
            .collect()
    }
}

impl<'a> ChainLink<'a> {
    pub fn version(&self) -> &'a WorkingTimeVersion {
        &self.chain.versions[self.index]
    }

    pub fn newer(&self) -> Option<ChainLink<'a>> {
        self.index.checked_sub(1).map(|index| ChainLink {
            chain: self.chain,
            index,
        })
    }

    pub fn older(&self) -> Option<ChainLink<'a>> {
        let index = self.index + 1;
        (index < self.chain.versions.len()).then_some(ChainLink {
            chain: self.chain,
            index,
        })
    }

    pub fn valid_from(&self) -> LowerBound {
        self.version().valid_from
    }

    pub fn valid_to(&self) -> UpperBound {
        self.chain.valid_to[self.index]
    }

    /// The day before the next older version starts, unbounded when there is none or it is the
    /// open-ended version.
    pub fn min_valid_from(&self) -> LowerBound {
        self.older()
            .and_then(|older| older.valid_from().date())
            .and_then(|start| start.checked_sub_days(Days::new(1)))
            .map_or(LowerBound::Unbounded, LowerBound::From)
    }

    pub fn is_current(&self, date: NaiveDate) -> bool {
        self.valid_from().admits(date) && self.valid_to().admits(date)
    }

    pub fn touches_range(&self, from: NaiveDate, to_exclusive: NaiveDate) -> bool {
        let starts_before_end = match self.valid_from() {
            LowerBound::Unbounded => true,
            LowerBound::From(start) => start < to_exclusive,
        };
        let ends_after_start = match self.valid_to() {
            UpperBound::Until(end) => end >= from,
            UpperBound::Unbounded => true,
        };
        starts_before_end && ends_after_start
    }
}

pub(crate) fn day_before(date: NaiveDate) -> Result<NaiveDate, AccountingError> {
    date.pred_opt()
        .ok_or_else(|| AccountingError::InvalidValue(format!("no day before {date}")))
}
