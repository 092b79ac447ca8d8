//! Calendar windows and the report's notion of "today".

use chrono::{Datelike, Local, NaiveDate};

use crate::error::InvestError;

/// First and last day of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), InvestError> {
    if !(1..=12).contains(&month) {
        return Err(InvestError::InvalidMonth(month));
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| InvestError::InvalidDate(format!("{}-{:02}", year, month)))?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    let last = next_first
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| InvestError::InvalidDate(format!("{}-{:02}", year, month)))?;
    Ok((first, last))
}

/// Jan 1 and Dec 31 of `year`
pub fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), InvestError> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1);
    let last = NaiveDate::from_ymd_opt(year, 12, 31);
    first
        .zip(last)
        .ok_or_else(|| InvestError::InvalidDate(year.to_string()))
}

/// The month before `(year, month)`; January rolls back to December
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Captures "today" once so every metric of a report agrees on which
/// windows are closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    today: NaiveDate,
}

impl Clock {
    pub fn fixed(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn system() -> Self {
        Self::fixed(Local::now().date_naive())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// A window is closed once its last day is not in the future
    pub fn is_window_closed(&self, window_end: NaiveDate) -> bool {
        window_end <= self.today
    }

    /// Year windows compare against Dec 31 of the current year, so the
    /// running year is reportable year-to-date.
    pub fn is_year_closed(&self, year: i32) -> bool {
        year <= self.today.year()
    }

    /// Date a year's position is valued at: Dec 31, or today while the year
    /// is still running.
    pub fn year_reporting_date(&self, year: i32) -> Result<NaiveDate, InvestError> {
        let (_, last) = year_bounds(year)?;
        Ok(last.min(self.today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds_follow_calendar_length() {
        assert_eq!(
            month_bounds(2023, 1).unwrap(),
            (date(2023, 1, 1), date(2023, 1, 31))
        );
        assert_eq!(month_bounds(2023, 2).unwrap().1, date(2023, 2, 28));
        assert_eq!(month_bounds(2024, 2).unwrap().1, date(2024, 2, 29));
        assert_eq!(month_bounds(2023, 4).unwrap().1, date(2023, 4, 30));
        assert_eq!(
            month_bounds(2023, 12).unwrap(),
            (date(2023, 12, 1), date(2023, 12, 31))
        );
    }

    #[test]
    fn test_month_bounds_rejects_invalid_month() {
        assert_eq!(month_bounds(2023, 0), Err(InvestError::InvalidMonth(0)));
        assert_eq!(month_bounds(2023, 13), Err(InvestError::InvalidMonth(13)));
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(year_bounds(2023).unwrap(), (date(2023, 1, 1), date(2023, 12, 31)));
        assert!(year_bounds(i32::MAX).is_err());
    }

    #[test]
    fn test_previous_month_rolls_over_year() {
        assert_eq!(previous_month(2023, 1), (2022, 12));
        assert_eq!(previous_month(2023, 7), (2023, 6));
        assert_eq!(previous_month(2023, 12), (2023, 11));
    }

    #[test]
    fn test_clock_window_closure() {
        let clock = Clock::fixed(date(2023, 6, 15));
        assert!(clock.is_window_closed(date(2023, 5, 31)));
        assert!(clock.is_window_closed(date(2023, 6, 15)));
        assert!(!clock.is_window_closed(date(2023, 6, 30)));

        assert!(clock.is_year_closed(2022));
        assert!(clock.is_year_closed(2023));
        assert!(!clock.is_year_closed(2024));
    }

    #[test]
    fn test_year_reporting_date_is_clamped_to_today() {
        let clock = Clock::fixed(date(2023, 6, 15));
        assert_eq!(clock.year_reporting_date(2022).unwrap(), date(2022, 12, 31));
        assert_eq!(clock.year_reporting_date(2023).unwrap(), date(2023, 6, 15));
    }
}
