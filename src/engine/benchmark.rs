//! Reference index figures.

use rust_decimal::Decimal;

use super::figures::add_optional;
use super::window::{month_bounds, previous_month};
use super::{Engine, MetricResult};

impl<'a> Engine<'a> {
    /// Latest index observation within the month
    pub fn index_month_value(
        &self,
        index_name: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        let (from, to) = month_bounds(year, month)?;
        Ok(self.store.index_value(index_name, from, to))
    }

    /// Sum of the twelve monthly observations of the year.
    ///
    /// A sum of levels, not a compounded return.
    pub fn index_year_value(&self, index_name: &str, year: i32) -> MetricResult<Option<Decimal>> {
        let mut total = None;
        for month in 1..=12 {
            total = add_optional(total, self.index_month_value(index_name, year, month)?);
        }
        Ok(total)
    }

    /// Change of the month's value against the previous month's, as a ratio
    pub fn index_month_change(
        &self,
        index_name: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        let Some(current) = self.index_month_value(index_name, year, month)? else {
            return Ok(None);
        };
        let (prev_year, prev_month) = previous_month(year, month);
        let Some(previous) = self.index_month_value(index_name, prev_year, prev_month)? else {
            return Ok(None);
        };
        if previous.is_zero() {
            return Ok(None);
        }
        Ok(Some((current - previous) / previous))
    }
}
