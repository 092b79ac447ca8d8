//! Category-level metrics: sums of the category's asset figures.

use rust_decimal::Decimal;

use super::figures::{self, PeriodFigures};
use super::window::{month_bounds, previous_month};
use super::{Engine, MetricResult};

impl<'a> Engine<'a> {
    pub fn category_month_figures(
        &self,
        category: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<PeriodFigures> {
        self.caches
            .category_month
            .get_or_try_insert_with((category.to_string(), year, month), || {
                let (_, to) = month_bounds(year, month)?;
                let children = self
                    .store
                    .assets_of(category)
                    .map(|asset| Ok(self.month_figures(asset, year, month)?.period))
                    .collect::<MetricResult<Vec<_>>>()?;
                Ok(PeriodFigures::rollup(
                    self.clock.is_window_closed(to),
                    &children,
                ))
            })
    }

    pub fn category_month_input(&self, category: &str, year: i32, month: u32) -> MetricResult<Decimal> {
        Ok(self.category_month_figures(category, year, month)?.input)
    }

    pub fn category_month_output(
        &self,
        category: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Decimal> {
        Ok(self.category_month_figures(category, year, month)?.output)
    }

    pub fn category_month_balance(
        &self,
        category: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        Ok(self.category_month_figures(category, year, month)?.balance)
    }

    pub fn category_month_profit(
        &self,
        category: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        Ok(self.category_month_figures(category, year, month)?.profit)
    }

    pub fn category_month_profitability(
        &self,
        category: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        let current = self.category_month_figures(category, year, month)?;
        let (prev_year, prev_month) = previous_month(year, month);
        let previous = self.category_month_figures(category, prev_year, prev_month)?;
        Ok(figures::profitability(&current, previous.balance))
    }

    /// Share of the category within the whole portfolio for the month
    pub fn category_month_weight(
        &self,
        category: &str,
        year: i32,
        month: u32,
    ) -> MetricResult<Option<Decimal>> {
        let part = self.category_month_figures(category, year, month)?;
        let whole = self.portfolio_month_figures(year, month)?;
        Ok(figures::weight(&part, &whole))
    }

    pub fn category_month_show(&self, category: &str, year: i32, month: u32) -> MetricResult<bool> {
        for asset in self.store.assets_of(category) {
            if self.month_show(asset, year, month)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn category_year_figures(&self, category: &str, year: i32) -> MetricResult<PeriodFigures> {
        self.caches
            .category_year
            .get_or_try_insert_with((category.to_string(), year), || {
                let children = self
                    .store
                    .assets_of(category)
                    .map(|asset| Ok(self.year_figures(asset, year)?.period))
                    .collect::<MetricResult<Vec<_>>>()?;
                Ok(PeriodFigures::rollup(
                    self.clock.is_year_closed(year),
                    &children,
                ))
            })
    }

    pub fn category_year_input(&self, category: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.category_year_figures(category, year)?.input)
    }

    pub fn category_year_output(&self, category: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.category_year_figures(category, year)?.output)
    }

    pub fn category_year_balance(&self, category: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.category_year_figures(category, year)?.balance)
    }

    pub fn category_year_profit(&self, category: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.category_year_figures(category, year)?.profit)
    }

    pub fn category_year_profitability(
        &self,
        category: &str,
        year: i32,
    ) -> MetricResult<Option<Decimal>> {
        let current = self.category_year_figures(category, year)?;
        let previous = self.category_year_figures(category, year - 1)?;
        Ok(figures::profitability(&current, previous.balance))
    }

    pub fn category_year_weight(&self, category: &str, year: i32) -> MetricResult<Option<Decimal>> {
        let part = self.category_year_figures(category, year)?;
        let whole = self.portfolio_year_figures(year)?;
        Ok(figures::weight(&part, &whole))
    }

    pub fn category_year_show(&self, category: &str, year: i32) -> MetricResult<bool> {
        for asset in self.store.assets_of(category) {
            if self.year_show(asset, year)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn category_total_figures(&self, category: &str, year: i32) -> MetricResult<PeriodFigures> {
        self.caches
            .category_total
            .get_or_try_insert_with((category.to_string(), year), || {
                let children = self
                    .store
                    .assets_of(category)
                    .map(|asset| self.total_figures(asset, year))
                    .collect::<MetricResult<Vec<_>>>()?;
                Ok(PeriodFigures::rollup(
                    self.clock.is_year_closed(year),
                    &children,
                ))
            })
    }

    pub fn category_total_input(&self, category: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.category_total_figures(category, year)?.input)
    }

    pub fn category_total_output(&self, category: &str, year: i32) -> MetricResult<Decimal> {
        Ok(self.category_total_figures(category, year)?.output)
    }

    pub fn category_total_profit(&self, category: &str, year: i32) -> MetricResult<Option<Decimal>> {
        Ok(self.category_total_figures(category, year)?.profit)
    }

    pub fn category_total_profitability(
        &self,
        category: &str,
        year: i32,
    ) -> MetricResult<Option<Decimal>> {
        let total = self.category_total_figures(category, year)?;
        Ok(figures::profitability(&total, None))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_month_sums_assets() {
        let store = sample_store();
        let engine = engine(&store);

        assert_eq!(engine.category_month_input("Stocks", 2023, 1).unwrap(), dec!(12000000));
        assert_eq!(
            engine.category_month_balance("Stocks", 2023, 1).unwrap(),
            Some(dec!(12000000))
        );
        assert_eq!(
            engine.category_month_profit("Stocks", 2023, 2).unwrap(),
            engine.month_profit("ABC", 2023, 2).unwrap()
        );
        assert_eq!(engine.category_month_profit("Stocks", 2023, 1).unwrap(), None);
    }

    #[test]
    fn test_category_balance_ignores_assets_without_price() {
        let store = sample_store();
        let engine = engine(&store);

        // Stocks had no trade yet in 2022: closed window, zero balance
        assert_eq!(
            engine.category_month_balance("Stocks", 2022, 12).unwrap(),
            Some(Decimal::ZERO)
        );
        // Open window
        assert_eq!(engine.category_month_balance("Stocks", 2023, 12).unwrap(), None);
    }

    #[test]
    fn test_category_weight_against_portfolio() {
        let store = sample_store();
        let engine = engine(&store);

        let stocks = engine.category_month_weight("Stocks", 2023, 1).unwrap().unwrap();
        let fii = engine.category_month_weight("FII", 2023, 1).unwrap().unwrap();
        // 12_000_000 and 95_000_000 of 107_000_000
        assert_eq!(stocks, dec!(12000000) / dec!(107000000));
        assert_eq!(fii, dec!(95000000) / dec!(107000000));
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let store = sample_store();
        let engine = engine(&store);
        assert_eq!(engine.category_month_input("Bonds", 2023, 1).unwrap(), Decimal::ZERO);
        assert!(!engine.category_month_show("Bonds", 2023, 1).unwrap());
        assert_eq!(engine.category_month_weight("Bonds", 2023, 1).unwrap(), None);
    }

    #[test]
    fn test_category_profitability() {
        let store = sample_store();
        let engine = engine(&store);

        // Stocks February: start 12_000_000, ABC 7_200_000 + DEF 2_000_000 held,
        // 4_800_000 paid out
        assert_eq!(
            engine.category_month_profitability("Stocks", 2023, 2).unwrap(),
            Some(dec!(2000000) / dec!(12000000))
        );
        assert_eq!(engine.category_month_profitability("Stocks", 2022, 12).unwrap(), None);
    }

    #[test]
    fn test_category_year_and_total() {
        let store = sample_store();
        let engine = engine(&store);

        assert_eq!(engine.category_year_input("Stocks", 2023).unwrap(), dec!(14500000));
        assert_eq!(engine.category_year_output("Stocks", 2023).unwrap(), dec!(-11400000));
        assert_eq!(engine.category_year_profit("Stocks", 2023).unwrap(), Some(dec!(1400000)));
        assert!(engine.category_year_show("Stocks", 2023).unwrap());
        assert!(!engine.category_year_show("Stocks", 2022).unwrap());

        assert_eq!(engine.category_total_input("FII", 2023).unwrap(), dec!(95000000));
        assert_eq!(
            engine.category_total_profitability("FII", 2023).unwrap(),
            engine.total_profitability("XPML11", 2023).unwrap()
        );
    }
}
