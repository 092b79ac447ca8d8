//! Invest - period metrics over a ledger of trade events
//!
//! Imports a ledger of buys, sells, deposits and withdrawals into SQLite and
//! computes month, year and since-inception metrics (balance, cash flow,
//! realized profit, profitability, weight) per asset, category and portfolio.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod importers;
pub mod reports;
pub mod store;
pub mod tax;
pub mod utils;
