//! Portfolio-level metrics: sums of every category's figures.

use rust_decimal::Decimal;

use super::figures::{self, PeriodFigures};
use super::window::{month_bounds, previous_month};
use super::{Engine, MetricResult};

impl<'a> Engine<'a> {
    pub fn portfolio_month_figures(&self, year: i32, month: u32) -> MetricResult<PeriodFigures> {
        self.caches
            .portfolio_month
            .get_or_try_insert_with((year, month), || {
                let (_, to) = month_bounds(year, month)?;
                let children = self
                    .store
                    .categories()
                    .keys()
                    .map(|category| self.category_month_figures(category, year, month))
                    .collect::<MetricResult<Vec<_>>>()?;
                Ok(PeriodFigures::rollup(
                    self.clock.is_window_closed(to),
                    &children,
                ))
            })
    }

    pub fn portfolio_month_input(&self, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.portfolio_month_figures(year, month)?.input)
    }

    pub fn portfolio_month_output(&self, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.portfolio_month_figures(year, month)?.output)
    }

    pub fn portfolio_month_balance(&self, year: i32, month: u32) -> MetricResult<Option<Decimal>> {
        Ok(self.portfolio_month_figures(year, month)?.balance)
    }

    pub fn portfolio_month_profit(&self, year: i32, month: u32) -> MetricResult<Option<Decimal>> {
        Ok(self.portfolio_month_figures(year, month)?.profit)
    }

    pub fn portfolio_month_profitability(
        &self,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        let current = self.portfolio_month_figures(year, month)?;
        let (prev_year, prev_month) = previous_month(year, month);
        let previous = self.portfolio_month_figures(prev_year, prev_month)?;
        Ok(figures::profitability(&current, previous.balance))
    }

    pub fn portfolio_month_show(&self, year: i32, month: u32) -> MetricResult<bool> {
        for category in self.store.categories().keys() {
            if self.category_month_show(category, year, month)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn portfolio_year_figures(&self, year: i32) -> MetricResult<PeriodFigures> {
        self.caches.portfolio_year.get_or_try_insert_with(year, || {
            let children = self
                .store
                .categories()
                .keys()
                .map(|category| self.category_year_figures(category, year))
                .collect::<MetricResult<Vec<_>>>()?;
            Ok(PeriodFigures::rollup(
                self.clock.is_year_closed(year),
                &children,
            ))
        })
    }

    pub fn portfolio_year_input(&self, year: i32) -> MetricResult<Decimal> {
        Ok(self.portfolio_year_figures(year)?.input)
    }

    pub fn portfolio_year_output(&self, year: i32) -> MetricResult<Decimal> {
        Ok(self.portfolio_year_figures(year)?.output)
    }

    pub fn portfolio_year_balance(&self, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.portfolio_year_figures(year)?.balance)
    }

    pub fn portfolio_year_profit(&self, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.portfolio_year_figures(year)?.profit)
    }

    pub fn portfolio_year_profitability(&self, year: i32) -> MetricResult<Option<Decimal>> {
        let current = self.portfolio_year_figures(year)?;
        let previous = self.portfolio_year_figures(year - 1)?;
        Ok(figures::profitability(&current, previous.balance))
    }

    pub fn portfolio_year_show(&self, year: i32) -> MetricResult<bool> {
        for category in self.store.categories().keys() {
            if self.category_year_show(category, year)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn portfolio_total_figures(&self, year: i32) -> MetricResult<PeriodFigures> {
        self.caches.portfolio_total.get_or_try_insert_with(year, || {
            let children = self
                .store
                .categories()
                .keys()
                .map(|category| self.category_total_figures(category, year))
                .collect::<MetricResult<Vec<_>>>()?;
            Ok(PeriodFigures::rollup(
                self.clock.is_year_closed(year),
                &children,
            ))
        })
    }

    pub fn portfolio_total_input(&self, year: i32) -> MetricResult<Decimal> {
        Ok(self.portfolio_total_figures(year)?.input)
    }

    pub fn portfolio_total_output(&self, year: i32) -> MetricResult<Decimal> {
        Ok(self.portfolio_total_figures(year)?.output)
    }

    pub fn portfolio_total_profit(&self, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.portfolio_total_figures(year)?.profit)
    }

    pub fn portfolio_total_profitability(&self, year: i32) -> MetricResult<Option<Decimal>> {
        let total = self.portfolio_total_figures(year)?;
        Ok(figures::profitability(&total, None))
    }
}
