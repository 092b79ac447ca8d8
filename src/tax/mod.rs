// Tax module - realized gains per month for tax-relevant categories

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::engine::{Engine, MetricResult};

/// Categories reported when the configuration names none
pub const DEFAULT_TAX_CATEGORIES: &[&str] = &["Stocks"];

/// One month of one category with a realized result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxRow {
    pub year: i32,
    pub month: u32,
    pub category: String,
    /// Sale proceeds, positive
    pub disposal_proceeds: Decimal,
    pub profit: Decimal,
}

/// Per-year sums of the tax rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearTotals {
    pub year: i32,
    pub disposal_proceeds: Decimal,
    pub profit: Decimal,
}

/// Realized gains report, most recent month first
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxReport {
    pub rows: Vec<TaxRow>,
}

impl TaxReport {
    /// Walk every ledger month for each tax category and keep the months
    /// where the category realized a non-zero result.
    pub fn build(engine: &Engine<'_>, categories: &[String]) -> MetricResult<Self> {
        let mut rows = Vec::new();
        for year in engine.year_range() {
            for month in 1..=12 {
                for category in categories {
                    let profit = engine
                        .category_month_profit(category, year, month)?
                        .unwrap_or_default();
                    if profit.is_zero() {
                        continue;
                    }
                    let output = engine.category_month_output(category, year, month)?;
                    rows.push(TaxRow {
                        year,
                        month,
                        category: category.clone(),
                        disposal_proceeds: -output,
                        profit,
                    });
                }
            }
        }
        rows.reverse();
        debug!("Tax report: {} rows", rows.len());
        Ok(Self { rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sums per year, most recent year first
    pub fn yearly_totals(&self) -> Vec<YearTotals> {
        let mut by_year: BTreeMap<i32, (Decimal, Decimal)> = BTreeMap::new();
        for row in &self.rows {
            let entry = by_year.entry(row.year).or_default();
            entry.0 += row.disposal_proceeds;
            entry.1 += row.profit;
        }
        by_year
            .into_iter()
            .rev()
            .map(|(year, (disposal_proceeds, profit))| YearTotals {
                year,
                disposal_proceeds,
                profit,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Event;
    use crate::engine::EngineOptions;
    use crate::store::EventStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> EventStore {
        EventStore::from_parts(
            vec![
                Event::new(date(2022, 3, 1), "ABC", "Stocks", 1000, 10000),
                Event::new(date(2022, 5, 2), "ABC", "Stocks", -200, 9000),
                Event::new(date(2023, 2, 10), "ABC", "Stocks", -400, 12000),
                // Sold exactly at cost: zero result, no row
                Event::new(date(2023, 4, 10), "ABC", "Stocks", -100, 10000),
                Event::new(date(2023, 1, 2), "XPML11", "FII", 100, 9500),
                Event::new(date(2023, 3, 2), "XPML11", "FII", -100, 9900),
            ],
            vec![],
            vec![],
        )
        .unwrap()
    }

    fn stocks() -> Vec<String> {
        vec!["Stocks".to_string()]
    }

    #[test]
    fn test_rows_are_most_recent_first() {
        let store = store();
        let engine = Engine::new(&store, EngineOptions::new(date(2023, 12, 31)));
        let report = TaxReport::build(&engine, &stocks()).unwrap();

        assert_eq!(
            report.rows,
            vec![
                TaxRow {
                    year: 2023,
                    month: 2,
                    category: "Stocks".to_string(),
                    disposal_proceeds: dec!(4800000),
                    profit: dec!(800000),
                },
                TaxRow {
                    year: 2022,
                    month: 5,
                    category: "Stocks".to_string(),
                    disposal_proceeds: dec!(1800000),
                    profit: dec!(-200000),
                },
            ]
        );
    }

    #[test]
    fn test_only_configured_categories_are_reported() {
        let store = store();
        let engine = Engine::new(&store, EngineOptions::new(date(2023, 12, 31)));

        let report = TaxReport::build(&engine, &["FII".to_string()]).unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].profit, dec!(40000));

        let none = TaxReport::build(&engine, &["Bonds".to_string()]).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_yearly_totals() {
        let store = store();
        let engine = Engine::new(&store, EngineOptions::new(date(2023, 12, 31)));
        let categories = vec!["Stocks".to_string(), "FII".to_string()];
        let report = TaxReport::build(&engine, &categories).unwrap();

        let totals = report.yearly_totals();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].year, 2023);
        assert_eq!(totals[0].profit, dec!(840000));
        assert_eq!(totals[0].disposal_proceeds, dec!(5790000));
        assert_eq!(totals[1].year, 2022);
        assert_eq!(totals[1].profit, dec!(-200000));
    }
}
