//! Asset-level metrics: month, year and since-inception.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::figures::{self, add_optional, PeriodFigures};
use super::window::{month_bounds, previous_month, year_bounds};
use super::{AssetFigures, Engine, MetricResult};
use crate::store::Flow;

impl<'a> Engine<'a> {
    /// Flows over `[from, to]`, position valued at `as_of`.
    fn measure_asset(
        &self,
        asset: &str,
        from: NaiveDate,
        to: NaiveDate,
        as_of: NaiveDate,
        closed: bool,
    ) -> AssetFigures {
        let store = self.store;
        let input = store.sum_flow(asset, from, to, Flow::Inputs);
        let output = store.sum_flow(asset, from, to, Flow::Outputs);
        let output_quantity = store.sum_disposed_quantity(asset, from, to);
        let disposed = store.has_disposal(asset, from, to);
        let price = store.latest_price(asset, as_of);
        let quantity_balance = store.sum_quantity(asset, as_of);
        let avg_purchase_price = store.average_cost(asset, as_of);

        let balance = if closed {
            price.map(|p| quantity_balance * p)
        } else {
            None
        };
        // Realized result of the window's disposals at average cost
        let profit = if disposed {
            avg_purchase_price.map(|avg| -output - output_quantity * avg)
        } else {
            None
        };

        AssetFigures {
            period: PeriodFigures {
                closed,
                input,
                output,
                disposed,
                balance,
                profit,
            },
            output_quantity,
            avg_purchase_price,
            price,
            quantity_balance,
        }
    }

    // ---- month ----

    pub fn month_figures(&self, asset: &str, year: i32, month: u32) -> MetricResult<AssetFigures> {
        self.caches
            .asset_month
            .get_or_try_insert_with((asset.to_string(), year, month), || {
                let (from, to) = month_bounds(year, month)?;
                let closed = self.clock.is_window_closed(to);
                Ok(self.measure_asset(asset, from, to, to, closed))
            })
    }

    /// Capital added during the month
    pub fn month_input(&self, asset: &str, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.month_figures(asset, year, month)?.period.input)
    }

    /// Capital removed during the month (zero or negative)
    pub fn month_output(&self, asset: &str, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.month_figures(asset, year, month)?.period.output)
    }

    /// Units disposed during the month
    pub fn month_output_quantity(&self, asset: &str, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.month_figures(asset, year, month)?.output_quantity)
    }

    /// Average purchase price of all acquisitions up to the month end
    pub fn month_avg_purchase_price(
        &self,
        asset: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        Ok(self.month_figures(asset, year, month)?.avg_purchase_price)
    }

    /// Last trade price on or before the month end
    pub fn month_price(&self, asset: &str, year: i32, month: u32) -> MetricResult<Option<Decimal>> {
        Ok(self.month_figures(asset, year, month)?.price)
    }

    pub fn month_quantity_balance(&self, asset: &str, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.month_figures(asset, year, month)?.quantity_balance)
    }

    pub fn month_balance(&self, asset: &str, year: i32, month: u32) -> MetricResult<Option<Decimal>> {
        Ok(self.month_figures(asset, year, month)?.period.balance)
    }

    pub fn month_profit(&self, asset: &str, year: i32, month: u32) -> MetricResult<Option<Decimal>> {
        Ok(self.month_figures(asset, year, month)?.period.profit)
    }

    pub fn month_profitability(
        &self,
        asset: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        let current = self.month_figures(asset, year, month)?;
        let (prev_year, prev_month) = previous_month(year, month);
        let previous = self.month_figures(asset, prev_year, prev_month)?;
        Ok(figures::profitability(&current.period, previous.period.balance))
    }

    /// Share of the asset within its category for the month
    pub fn month_weight(&self, asset: &str, year: i32, month: u32) -> MetricResult<Option<Decimal>> {
        let category = self.asset_category(asset)?;
        let part = self.month_figures(asset, year, month)?;
        let whole = self.category_month_figures(category, year, month)?;
        Ok(figures::weight(&part.period, &whole))
    }

    pub fn month_show(&self, asset: &str, year: i32, month: u32) -> MetricResult<bool> {
        Ok(self.month_figures(asset, year, month)?.period.show())
    }

    // ---- year ----

    /// Year flows use the year bounds; the position is valued at Dec 31,
    /// or today while the year runs. Profit is the sum of monthly profits.
    pub fn year_figures(&self, asset: &str, year: i32) -> MetricResult<AssetFigures> {
        self.caches
            .asset_year
            .get_or_try_insert_with((asset.to_string(), year), || {
                let (from, to) = year_bounds(year)?;
                let as_of = self.clock.year_reporting_date(year)?;
                let closed = self.clock.is_year_closed(year);
                let mut measured = self.measure_asset(asset, from, to, as_of, closed);

                let mut profit = None;
                for month in 1..=12 {
                    profit = add_optional(profit, self.month_profit(asset, year, month)?);
                }
                measured.period.profit = profit;
                Ok(measured)
            })
    }

    pub fn year_input(&self, asset: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.year_figures(asset, year)?.period.input)
    }

    pub fn year_output(&self, asset: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.year_figures(asset, year)?.period.output)
    }

    pub fn year_output_quantity(&self, asset: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.year_figures(asset, year)?.output_quantity)
    }

    pub fn year_avg_purchase_price(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.year_figures(asset, year)?.avg_purchase_price)
    }

    pub fn year_price(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.year_figures(asset, year)?.price)
    }

    pub fn year_quantity_balance(&self, asset: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.year_figures(asset, year)?.quantity_balance)
    }

    pub fn year_balance(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.year_figures(asset, year)?.period.balance)
    }

    pub fn year_profit(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.year_figures(asset, year)?.period.profit)
    }

    pub fn year_profitability(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        let current = self.year_figures(asset, year)?;
        let previous = self.year_figures(asset, year - 1)?;
        Ok(figures::profitability(&current.period, previous.period.balance))
    }

    pub fn year_weight(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        let category = self.asset_category(asset)?;
        let part = self.year_figures(asset, year)?;
        let whole = self.category_year_figures(category, year)?;
        Ok(figures::weight(&part.period, &whole))
    }

    pub fn year_show(&self, asset: &str, year: i32) -> MetricResult<bool> {
        Ok(self.year_figures(asset, year)?.period.show())
    }

    // ---- since inception ----

    /// Flows and profit accumulated over every ledger year up to `year`,
    /// with the balance of `year` itself.
    pub fn total_figures(&self, asset: &str, year: i32) -> MetricResult<PeriodFigures> {
        self.caches
            .asset_total
            .get_or_try_insert_with((asset.to_string(), year), || {
                let current = self.year_figures(asset, year)?.period;
                let mut total = PeriodFigures {
                    closed: current.closed,
                    balance: current.balance,
                    ..Default::default()
                };
                for &y in self.store.year_range().iter().filter(|&&y| y <= year) {
                    let figures = self.year_figures(asset, y)?.period;
                    total.input += figures.input;
                    total.output += figures.output;
                    total.disposed |= figures.disposed;
                    total.profit = add_optional(total.profit, figures.profit);
                }
                Ok(total)
            })
    }

    pub fn total_input(&self, asset: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.total_figures(asset, year)?.input)
    }

    pub fn total_output(&self, asset: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.total_figures(asset, year)?.output)
    }

    pub fn total_profit(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.total_figures(asset, year)?.profit)
    }

    /// `(balance + withdrawn - invested) / invested` since the first year
    pub fn total_profitability(&self, asset: &str, year: i32) -> MetricResult<Option<Decimal>> {
        let total = self.total_figures(asset, year)?;
        Ok(figures::profitability(&total, None))
    }
}
