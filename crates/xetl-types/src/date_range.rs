//! Date range and day iteration.

use chrono::{Days, NaiveDate};

use crate::DateRangeError;

/// Text format of partition dates, both in source keys and in the watermark.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns the chrono parse error if `s` is not a valid date.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
}

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new date range, validating that start <= end.
    ///
    /// # Errors
    ///
    /// Returns an error if start > end.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the range from `start` through `end`, or `None` when it would be empty.
    #[must_use]
    pub fn non_empty(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        Self::new(start, end).ok()
    }

    /// Returns an iterator over every date in the range.
    pub const fn days(&self) -> DateIterator {
        DateIterator {
            current: Some(self.start),
            end: self.end,
        }
    }
}

/// Iterator over all dates in a [`DateRange`].
#[derive(Debug, Clone)]
pub struct DateIterator {
    current: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DateIterator {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.filter(|d| *d <= self.end)?;
        self.current = current.checked_add_days(Days::new(1));
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.current {
            Some(current) if current <= self.end => {
                let days = (self.end - current).num_days() as usize + 1;
                (days, Some(days))
            }
            _ => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for DateIterator {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_new() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(range.start, date(2024, 1, 1));
        assert_eq!(range.end, date(2024, 1, 31));
        assert_eq!(range.days().len(), 31);
    }

    #[test]
    fn test_date_range_invalid() {
        assert!(DateRange::new(date(2024, 1, 31), date(2024, 1, 1)).is_err());
        assert!(DateRange::non_empty(date(2024, 1, 31), date(2024, 1, 1)).is_none());
    }

    #[test]
    fn test_day_iterator_crosses_month_end() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        let days: Vec<_> = range.days().collect();

        assert_eq!(days.len(), 4);
        assert_eq!(range.days().len(), 4);
        assert_eq!(days[2], date(2024, 2, 29));
        assert_eq!(days[3], date(2024, 3, 1));
    }

    #[test]
    fn test_single_day() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(range.days().collect::<Vec<_>>(), vec![date(2024, 1, 1)]);
    }

    #[test]
    fn test_day_iterator_at_max_date() {
        let range = DateRange::new(NaiveDate::MAX, NaiveDate::MAX).unwrap();
        assert_eq!(range.days().count(), 1);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2022-09-16").unwrap(), date(2022, 9, 16));
        assert!(parse_date("16.09.2022").is_err());
    }
}
