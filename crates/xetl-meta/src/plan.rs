//! Fetch plan computation.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeSet;
use xetl_types::DateRange;

use crate::Watermark;

/// Which partitions a run reads and which report dates it emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    /// First date that appears in the report.
    ///
    /// [`NaiveDate::MAX`] when a watermark exists and every date is covered.
    pub effective_start: NaiveDate,
    /// Partitions to read, ascending. Includes the lookback day.
    pub dates: BTreeSet<NaiveDate>,
    /// Day read only to seed the previous-close of `effective_start`.
    pub lookback: Option<NaiveDate>,
}

impl FetchPlan {
    /// Computes the plan for a run on `today`.
    ///
    /// Without a watermark every date from `first_date` through yesterday is
    /// fetched. With one, only dates not yet recorded are fetched, plus the
    /// day before the earliest of them.
    ///
    /// Missing dates are found by set difference, so after a gap the lookback
    /// is the day before the earliest missing date even if that day itself
    /// is recorded, and later missing dates are compared against whatever
    /// fetched day precedes them.
    #[must_use]
    pub fn compute(first_date: NaiveDate, watermark: Option<&Watermark>, today: NaiveDate) -> Self {
        let yesterday = today.pred_opt().unwrap_or(NaiveDate::MIN);
        let range = DateRange::non_empty(first_date, yesterday);
        let all_dates: BTreeSet<NaiveDate> = range.iter().flat_map(|r| r.days()).collect();

        let Some(watermark) = watermark else {
            return Self {
                effective_start: first_date,
                dates: all_dates,
                lookback: None,
            };
        };

        let covered: BTreeSet<NaiveDate> = watermark
            .processed_dates()
            .into_iter()
            .filter(|d| *d >= first_date)
            .collect();
        let mut dates: BTreeSet<NaiveDate> = all_dates.difference(&covered).copied().collect();

        let Some(&effective_start) = dates.first() else {
            return Self::nothing_to_do();
        };

        let lookback = effective_start.checked_sub_days(Days::new(1));
        if let Some(day) = lookback {
            dates.insert(day);
        }

        Self {
            effective_start,
            dates,
            lookback,
        }
    }

    /// Plan for a run where every date is already recorded.
    #[must_use]
    pub fn nothing_to_do() -> Self {
        Self {
            effective_start: NaiveDate::MAX,
            dates: BTreeSet::new(),
            lookback: None,
        }
    }

    /// Returns true if no partition needs to be read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Dates to record in the watermark once the run succeeds.
    #[must_use]
    pub fn dates_to_record(&self) -> BTreeSet<NaiveDate> {
        self.dates
            .iter()
            .copied()
            .filter(|d| Some(*d) != self.lookback)
            .collect()
    }
}
