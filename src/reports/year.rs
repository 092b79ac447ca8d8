use rust_decimal::Decimal;
use serde::Serialize;

use crate::engine::{Engine, MetricResult};

/// Which window a row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPeriod {
    Month(u32),
    Year,
    SinceInception,
}

/// One line of metrics, for an asset, a category or the portfolio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsRow {
    pub period: RowPeriod,
    pub input: Decimal,
    pub output: Decimal,
    pub balance: Option<Decimal>,
    pub profit: Option<Decimal>,
    pub profitability: Option<Decimal>,
    pub weight: Option<Decimal>,
}

/// Position details shown next to an asset's year row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionRow {
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub avg_purchase_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetSection {
    pub asset: String,
    pub benchmark_member: bool,
    pub position: PositionRow,
    pub rows: Vec<MetricsRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySection {
    pub category: String,
    pub assets: Vec<AssetSection>,
    pub rows: Vec<MetricsRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexMonth {
    pub month: u32,
    pub value: Option<Decimal>,
    /// Change against the previous month, as a ratio
    pub change: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkSection {
    pub index: String,
    pub year: i32,
    pub months: Vec<IndexMonth>,
    pub year_value: Option<Decimal>,
}

/// Everything the year report shows, built from engine calls only.
///
/// Month rows are listed only for months the entity shows activity in; the
/// year and since-inception rows are always present.
#[derive(Debug, Clone, Serialize)]
pub struct YearReport {
    pub year: i32,
    pub today: chrono::NaiveDate,
    pub categories: Vec<CategorySection>,
    pub portfolio: Vec<MetricsRow>,
    pub benchmark: Option<BenchmarkSection>,
}

impl YearReport {
    pub fn build(engine: &Engine<'_>, year: i32, benchmark_index: Option<&str>) -> MetricResult<Self> {
        let mut categories = Vec::new();
        for (category, assets) in engine.categories(Some(year))? {
            let mut sections = Vec::with_capacity(assets.len());
            for asset in &assets {
                sections.push(asset_section(engine, asset, year)?);
            }
            categories.push(CategorySection {
                rows: category_rows(engine, &category, year)?,
                category,
                assets: sections,
            });
        }

        let benchmark = match benchmark_index {
            Some(index) => Some(BenchmarkSection::build(engine, index, year)?),
            None => None,
        };

        Ok(Self {
            year,
            today: engine.today(),
            categories,
            portfolio: portfolio_rows(engine, year)?,
            benchmark,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn asset_section(engine: &Engine<'_>, asset: &str, year: i32) -> MetricResult<AssetSection> {
    let mut rows = Vec::new();
    for month in 1..=12 {
        if !engine.month_show(asset, year, month)? {
            continue;
        }
        let figures = engine.month_figures(asset, year, month)?.period;
        rows.push(MetricsRow {
            period: RowPeriod::Month(month),
            input: figures.input,
            output: figures.output,
            balance: figures.balance,
            profit: figures.profit,
            profitability: engine.month_profitability(asset, year, month)?,
            weight: engine.month_weight(asset, year, month)?,
        });
    }

    let year_figures = engine.year_figures(asset, year)?;
    rows.push(MetricsRow {
        period: RowPeriod::Year,
        input: year_figures.period.input,
        output: year_figures.period.output,
        balance: year_figures.period.balance,
        profit: year_figures.period.profit,
        profitability: engine.year_profitability(asset, year)?,
        weight: engine.year_weight(asset, year)?,
    });

    let total = engine.total_figures(asset, year)?;
    rows.push(MetricsRow {
        period: RowPeriod::SinceInception,
        input: total.input,
        output: total.output,
        balance: total.balance,
        profit: total.profit,
        profitability: engine.total_profitability(asset, year)?,
        weight: None,
    });

    Ok(AssetSection {
        asset: asset.to_string(),
        benchmark_member: engine.is_benchmark_member(asset),
        position: PositionRow {
            quantity: year_figures.quantity_balance,
            price: year_figures.price,
            avg_purchase_price: year_figures.avg_purchase_price,
        },
        rows,
    })
}

fn category_rows(engine: &Engine<'_>, category: &str, year: i32) -> MetricResult<Vec<MetricsRow>> {
    let mut rows = Vec::new();
    for month in 1..=12 {
        if !engine.category_month_show(category, year, month)? {
            continue;
        }
        let figures = engine.category_month_figures(category, year, month)?;
        rows.push(MetricsRow {
            period: RowPeriod::Month(month),
            input: figures.input,
            output: figures.output,
            balance: figures.balance,
            profit: figures.profit,
            profitability: engine.category_month_profitability(category, year, month)?,
            weight: engine.category_month_weight(category, year, month)?,
        });
    }

    let figures = engine.category_year_figures(category, year)?;
    rows.push(MetricsRow {
        period: RowPeriod::Year,
        input: figures.input,
        output: figures.output,
        balance: figures.balance,
        profit: figures.profit,
        profitability: engine.category_year_profitability(category, year)?,
        weight: engine.category_year_weight(category, year)?,
    });

    let total = engine.category_total_figures(category, year)?;
    rows.push(MetricsRow {
        period: RowPeriod::SinceInception,
        input: total.input,
        output: total.output,
        balance: total.balance,
        profit: total.profit,
        profitability: engine.category_total_profitability(category, year)?,
        weight: None,
    });
    Ok(rows)
}

fn portfolio_rows(engine: &Engine<'_>, year: i32) -> MetricResult<Vec<MetricsRow>> {
    let mut rows = Vec::new();
    for month in 1..=12 {
        if !engine.portfolio_month_show(year, month)? {
            continue;
        }
        let figures = engine.portfolio_month_figures(year, month)?;
        rows.push(MetricsRow {
            period: RowPeriod::Month(month),
            input: figures.input,
            output: figures.output,
            balance: figures.balance,
            profit: figures.profit,
            profitability: engine.portfolio_month_profitability(year, month)?,
            weight: None,
        });
    }

    let figures = engine.portfolio_year_figures(year)?;
    rows.push(MetricsRow {
        period: RowPeriod::Year,
        input: figures.input,
        output: figures.output,
        balance: figures.balance,
        profit: figures.profit,
        profitability: engine.portfolio_year_profitability(year)?,
        weight: None,
    });

    let total = engine.portfolio_total_figures(year)?;
    rows.push(MetricsRow {
        period: RowPeriod::SinceInception,
        input: total.input,
        output: total.output,
        balance: total.balance,
        profit: total.profit,
        profitability: engine.portfolio_total_profitability(year)?,
        weight: None,
    });
    Ok(rows)
}

impl BenchmarkSection {
    pub fn build(engine: &Engine<'_>, index: &str, year: i32) -> MetricResult<Self> {
        let mut months = Vec::with_capacity(12);
        for month in 1..=12 {
            months.push(IndexMonth {
                month,
                value: engine.index_month_value(index, year, month)?,
                change: engine.index_month_change(index, year, month)?,
            });
        }
        Ok(Self {
            index: index.to_string(),
            year,
            months,
            year_value: engine.index_year_value(index, year)?,
        })
    }

    pub fn has_values(&self) -> bool {
        self.months.iter().any(|m| m.value.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Event, IndexValue};
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
                Event::new(date(2022, 6, 1), "OLD", "Bonds", 100, 10000),
                Event::new(date(2022, 9, 1), "OLD", "Bonds", -100, 10500),
                Event::new(date(2023, 1, 5), "ABC", "Stocks", 1000, 10000),
                Event::new(date(2023, 2, 10), "ABC", "Stocks", -400, 12000),
            ],
            vec![IndexValue::new(date(2023, 1, 31), "IBOV", 11308200)],
            vec!["ABC".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_year_report_lists_active_entities() {
        let store = store();
        let engine = Engine::new(&store, EngineOptions::new(date(2023, 3, 10)));
        let report = YearReport::build(&engine, 2023, Some("IBOV")).unwrap();

        // OLD was sold out in 2022 and has a zero balance in 2023
        let names: Vec<&str> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Bonds", "Stocks"]);

        let stocks = &report.categories[1];
        let abc = &stocks.assets[0];
        assert!(abc.benchmark_member);
        assert_eq!(abc.position.quantity, dec!(600));
        // January, February, then year and since-inception
        let periods: Vec<RowPeriod> = abc.rows.iter().map(|r| r.period).collect();
        assert_eq!(
            periods,
            vec![
                RowPeriod::Month(1),
                RowPeriod::Month(2),
                RowPeriod::Year,
                RowPeriod::SinceInception
            ]
        );
        assert_eq!(abc.rows[1].profit, Some(dec!(800000)));
        assert_eq!(abc.rows[1].weight, Some(Decimal::ONE));

        let benchmark = report.benchmark.unwrap();
        assert_eq!(
            benchmark.months[0],
            IndexMonth {
                month: 1,
                value: Some(dec!(11308200)),
                change: None
            }
        );
        assert_eq!(benchmark.months[1].value, None);
        assert_eq!(benchmark.year_value, Some(dec!(11308200)));
        assert!(benchmark.has_values());
    }

    #[test]
    fn test_portfolio_rows_match_category_sums() {
        let store = store();
        let engine = Engine::new(&store, EngineOptions::new(date(2023, 3, 10)));
        let report = YearReport::build(&engine, 2023, None).unwrap();

        let year_row = |rows: &[MetricsRow]| {
            rows.iter()
                .find(|r| r.period == RowPeriod::Year)
                .cloned()
                .unwrap()
        };
        let portfolio = year_row(&report.portfolio);
        let summed: Decimal = report
            .categories
            .iter()
            .map(|c| year_row(&c.rows).input)
            .sum();
        assert_eq!(portfolio.input, summed);
        assert!(report.benchmark.is_none());
    }

    #[test]
    fn test_year_without_events_is_empty() {
        let store = store();
        let engine = Engine::new(&store, EngineOptions::new(date(2023, 3, 10)));
        let report = YearReport::build(&engine, 2030, None).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.portfolio.len(), 2);
    }
}
