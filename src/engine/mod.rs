//! Aggregation engine: period metrics at asset, category and portfolio level.
//!
//! Every metric is a read-only function of the ledger snapshot, the
//! engine's fixed "today" and its arguments. Lower-level figures are memoized
//! per engine instance (see [`memo`]), so a report can ask for the same
//! month of the same asset from many rollups without recomputing it.
//!
//! Naming follows the hierarchy:
//! - `month_*`, `year_*`, `total_*` take an asset;
//! - `category_month_*`, `category_year_*`, `category_total_*` take a category;
//! - `portfolio_month_*`, `portfolio_year_*`, `portfolio_total_*` cover everything.
//!
//! `total_*` are cumulative since the first ledger year up to the given year.

pub mod asset;
pub mod benchmark;
pub mod category;
pub mod figures;
pub mod memo;
pub mod portfolio;
pub mod window;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::InvestError;
use crate::store::EventStore;
pub use figures::PeriodFigures;
pub use memo::{CacheStats, Memo};
pub use window::{month_bounds, previous_month, year_bounds, Clock};

/// Result of a metric query: only calendar and lookup errors are errors,
/// missing data is `None` inside `Ok`.
pub type MetricResult<T> = std::result::Result<T, InvestError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Reference date deciding which windows are closed
    pub today: NaiveDate,
    /// Memoize intermediate figures (results are identical either way)
    pub cache: bool,
}

impl EngineOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self { today, cache: true }
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = false;
        self
    }
}

/// Asset figures plus the position details only an asset has
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFigures {
    pub period: PeriodFigures,
    pub output_quantity: Decimal,
    pub avg_purchase_price: Option<Decimal>,
    pub price: Option<Decimal>,
    pub quantity_balance: Decimal,
}

#[derive(Debug)]
struct Caches {
    asset_month: Memo<(String, i32, u32), AssetFigures>,
    asset_year: Memo<(String, i32), AssetFigures>,
    asset_total: Memo<(String, i32), PeriodFigures>,
    category_month: Memo<(String, i32, u32), PeriodFigures>,
    category_year: Memo<(String, i32), PeriodFigures>,
    category_total: Memo<(String, i32), PeriodFigures>,
    portfolio_month: Memo<(i32, u32), PeriodFigures>,
    portfolio_year: Memo<i32, PeriodFigures>,
    portfolio_total: Memo<i32, PeriodFigures>,
}

impl Caches {
    fn new(enabled: bool) -> Self {
        Self {
            asset_month: Memo::new(enabled),
            asset_year: Memo::new(enabled),
            asset_total: Memo::new(enabled),
            category_month: Memo::new(enabled),
            category_year: Memo::new(enabled),
            category_total: Memo::new(enabled),
            portfolio_month: Memo::new(enabled),
            portfolio_year: Memo::new(enabled),
            portfolio_total: Memo::new(enabled),
        }
    }

    fn stats(&self) -> CacheStats {
        self.asset_month.stats()
            + self.asset_year.stats()
            + self.asset_total.stats()
            + self.category_month.stats()
            + self.category_year.stats()
            + self.category_total.stats()
            + self.portfolio_month.stats()
            + self.portfolio_year.stats()
            + self.portfolio_total.stats()
    }
}

/// One report's view over a ledger snapshot.
///
/// Not `Sync`: each report builds its own engine and cache.
#[derive(Debug)]
pub struct Engine<'a> {
    store: &'a EventStore,
    clock: Clock,
    caches: Caches,
}

impl<'a> Engine<'a> {
    pub fn new(store: &'a EventStore, options: EngineOptions) -> Self {
        Self {
            store,
            clock: Clock::fixed(options.today),
            caches: Caches::new(options.cache),
        }
    }

    pub fn store(&self) -> &'a EventStore {
        self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Distinct ledger years, ascending
    pub fn year_range(&self) -> Vec<i32> {
        self.store.year_range().to_vec()
    }

    /// Category -> ordered assets.
    ///
    /// With a year, only assets with a defined balance for that year are
    /// listed, and categories left without assets are dropped.
    pub fn categories(&self, year: Option<i32>) -> MetricResult<BTreeMap<String, Vec<String>>> {
        let mut result = BTreeMap::new();
        for (category, assets) in self.store.categories() {
            let mut listed = Vec::new();
            for asset in assets {
                let keep = match year {
                    Some(year) => self.year_balance(asset, year)?.is_some(),
                    None => true,
                };
                if keep {
                    listed.push(asset.clone());
                }
            }
            if !listed.is_empty() {
                result.insert(category.clone(), listed);
            }
        }
        Ok(result)
    }

    /// Category an asset belongs to; unknown assets are an error
    pub fn asset_category(&self, asset: &str) -> MetricResult<&'a str> {
        self.store.asset_category(asset)
    }

    /// Whether the asset belongs to the reference index
    pub fn is_benchmark_member(&self, asset: &str) -> bool {
        self.store.is_benchmark_member(asset)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }

    /// Emit cache counters at debug level
    pub fn log_cache_stats(&self) {
        let stats = self.cache_stats();
        debug!(
            "Engine cache: {} entries, {} hits, {} misses",
            stats.entries, stats.hits, stats.misses
        );
    }
}
