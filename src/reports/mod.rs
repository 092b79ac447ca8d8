// Reports module - report models assembled from engine metrics

pub mod overview;
pub mod year;

pub use overview::{years_overview, YearOverview};
pub use year::{
    AssetSection, BenchmarkSection, CategorySection, IndexMonth, MetricsRow, PositionRow, RowPeriod,
    YearReport,
};
