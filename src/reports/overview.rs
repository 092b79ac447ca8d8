use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::{Engine, MetricResult};

/// Portfolio figures of one ledger year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearOverview {
    pub year: i32,
    pub input: Decimal,
    pub output: Decimal,
    pub balance: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub profitability: Option<Decimal>,
    pub total_profitability: Option<Decimal>,
}

/// One line per ledger year, oldest first
pub fn years_overview(engine: &Engine<'_>) -> MetricResult<Vec<YearOverview>> {
    engine
        .year_range()
        .into_iter()
        .map(|year| {
            let figures = engine.portfolio_year_figures(year)?;
            Ok(YearOverview {
                year,
                input: figures.input,
                output: figures.output,
                balance: figures.balance,
                profit: figures.profit,
                profitability: engine.portfolio_year_profitability(year)?,
                total_profitability: engine.portfolio_total_profitability(year)?,
            })
        })
        .collect()
}
