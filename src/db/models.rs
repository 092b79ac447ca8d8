use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Scale of every fixed-point column: two implied decimals.
pub const FIXED_POINT_SCALE: i64 = 100;

/// One ledger row (buy, sell, deposit or withdrawal)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub asset: String,
    pub category: String,
    /// Positive = acquisition/deposit, negative = disposal/withdrawal (x100)
    pub signed_quantity: i64,
    /// Unit price (x100), never negative
    pub unit_price: i64,
    /// Brokerage fee (x100); informational only
    pub fee: i64,
}

impl Event {
    pub fn new(
        date: NaiveDate,
        asset: &str,
        category: &str,
        signed_quantity: i64,
        unit_price: i64,
    ) -> Self {
        Self {
            id: None,
            date,
            asset: asset.to_string(),
            category: category.to_string(),
            signed_quantity,
            unit_price,
            fee: 0,
        }
    }

    pub fn with_fee(mut self, fee: i64) -> Self {
        self.fee = fee;
        self
    }

    pub fn is_acquisition(&self) -> bool {
        self.signed_quantity > 0
    }

    pub fn is_disposal(&self) -> bool {
        self.signed_quantity < 0
    }

    /// `signed_quantity * unit_price`, in product scale (x10_000)
    pub fn flow(&self) -> Decimal {
        Decimal::from(self.signed_quantity) * Decimal::from(self.unit_price)
    }
}

/// Observation of a benchmark index level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexValue {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub index_name: String,
    /// Index level (x100)
    pub value: i64,
}

impl IndexValue {
    pub fn new(date: NaiveDate, index_name: &str, value: i64) -> Self {
        Self {
            id: None,
            date,
            index_name: index_name.to_string(),
            value,
        }
    }
}

/// Everything one import writes, committed as a single unit
#[derive(Debug, Clone, Default)]
pub struct LedgerBatch {
    pub events: Vec<Event>,
    pub index_values: Vec<IndexValue>,
    pub benchmark_members: Vec<String>,
}

impl LedgerBatch {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.index_values.is_empty() && self.benchmark_members.is_empty()
    }
}
