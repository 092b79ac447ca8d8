//! Immutable ledger snapshot and the query primitives the engine builds on.
//!
//! The snapshot is loaded once from SQLite (or built from vectors in tests)
//! and never changes afterwards. Every query is an "as of" query on
//! `date <= upto`, and every sum works in the fixed-point scale of the
//! ledger: quantities and prices x100, flows x10_000.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::db::{self, Event, IndexValue};
use crate::error::InvestError;

/// Which side of the ledger a flow sum looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    /// Events with positive quantity (acquisitions, deposits)
    Inputs,
    /// Events with negative quantity (disposals, withdrawals)
    Outputs,
}

impl Flow {
    fn matches(self, event: &Event) -> bool {
        match self {
            Flow::Inputs => event.is_acquisition(),
            Flow::Outputs => event.is_disposal(),
        }
    }
}

#[derive(Debug, Default)]
pub struct EventStore {
    by_asset: HashMap<String, Vec<Event>>,
    categories: BTreeMap<String, BTreeSet<String>>,
    index_values: HashMap<String, Vec<IndexValue>>,
    benchmark: HashSet<String>,
    years: Vec<i32>,
}

impl EventStore {
    /// Build a snapshot from raw rows.
    ///
    /// Events are grouped per asset and ordered by date; events sharing a
    /// date keep their relative order.
    pub fn from_parts(
        events: Vec<Event>,
        index_values: Vec<IndexValue>,
        benchmark_members: Vec<String>,
    ) -> std::result::Result<Self, InvestError> {
        db::check_category_consistency(&events)?;

        let years: Vec<i32> = events
            .iter()
            .map(|e| e.date.year())
            .sorted()
            .dedup()
            .collect();

        let mut categories: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut by_asset: HashMap<String, Vec<Event>> = HashMap::new();
        for event in events {
            categories
                .entry(event.category.clone())
                .or_default()
                .insert(event.asset.clone());
            by_asset.entry(event.asset.clone()).or_default().push(event);
        }
        for list in by_asset.values_mut() {
            list.sort_by_key(|e| e.date);
        }

        let mut by_index: HashMap<String, Vec<IndexValue>> = HashMap::new();
        for value in index_values {
            by_index
                .entry(value.index_name.clone())
                .or_default()
                .push(value);
        }
        for list in by_index.values_mut() {
            list.sort_by_key(|v| v.date);
        }

        Ok(Self {
            by_asset,
            categories,
            index_values: by_index,
            benchmark: benchmark_members.into_iter().collect(),
            years,
        })
    }

    /// Load the full snapshot from the database
    pub fn load(conn: &Connection) -> Result<Self> {
        let events = db::get_all_events(conn)?;
        let index_values = db::get_all_index_values(conn)?;
        let members = db::get_benchmark_members(conn)?;
        Self::from_parts(events, index_values, members).context("Ledger snapshot is inconsistent")
    }

    pub fn is_empty(&self) -> bool {
        self.by_asset.is_empty()
    }

    /// All events of `asset` in date order (empty for unknown assets)
    pub fn events_of(&self, asset: &str) -> &[Event] {
        self.by_asset.get(asset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Events of `asset` with `from <= date <= to`
    fn window(&self, asset: &str, from: NaiveDate, to: NaiveDate) -> &[Event] {
        let events = self.events_of(asset);
        let start = events.partition_point(|e| e.date < from);
        let end = events.partition_point(|e| e.date <= to);
        if start >= end {
            &[]
        } else {
            &events[start..end]
        }
    }

    /// Sum of `quantity * price` over the window, restricted to one side
    pub fn sum_flow(&self, asset: &str, from: NaiveDate, to: NaiveDate, flow: Flow) -> Decimal {
        self.window(asset, from, to)
            .iter()
            .filter(|e| flow.matches(e))
            .map(Event::flow)
            .sum()
    }

    /// Cumulative position as of `upto`
    pub fn sum_quantity(&self, asset: &str, upto: NaiveDate) -> Decimal {
        self.window(asset, NaiveDate::MIN, upto)
            .iter()
            .map(|e| Decimal::from(e.signed_quantity))
            .sum()
    }

    /// Units disposed within the window, as a non-negative number
    pub fn sum_disposed_quantity(&self, asset: &str, from: NaiveDate, to: NaiveDate) -> Decimal {
        -self
            .window(asset, from, to)
            .iter()
            .filter(|e| e.is_disposal())
            .map(|e| Decimal::from(e.signed_quantity))
            .sum::<Decimal>()
    }

    pub fn has_disposal(&self, asset: &str, from: NaiveDate, to: NaiveDate) -> bool {
        self.window(asset, from, to).iter().any(Event::is_disposal)
    }

    /// Unit price of the most recent event on or before `upto`
    pub fn latest_price(&self, asset: &str, upto: NaiveDate) -> Option<Decimal> {
        self.window(asset, NaiveDate::MIN, upto)
            .last()
            .map(|e| Decimal::from(e.unit_price))
    }

    /// Average purchase price of every acquisition up to `upto`
    pub fn average_cost(&self, asset: &str, upto: NaiveDate) -> Option<Decimal> {
        let acquired: Decimal = self
            .window(asset, NaiveDate::MIN, upto)
            .iter()
            .filter(|e| e.is_acquisition())
            .map(|e| Decimal::from(e.signed_quantity))
            .sum();
        if acquired.is_zero() {
            return None;
        }
        let cost = self.sum_flow(asset, NaiveDate::MIN, upto, Flow::Inputs);
        Some(cost / acquired)
    }

    /// Category -> assets, ordered by category then asset
    pub fn categories(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.categories
    }

    /// Assets of one category (empty for unknown categories)
    pub fn assets_of<'a>(&'a self, category: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.categories
            .get(category)
            .into_iter()
            .flat_map(|assets| assets.iter().map(String::as_str))
    }

    pub fn asset_category(&self, asset: &str) -> std::result::Result<&str, InvestError> {
        self.categories
            .iter()
            .find(|(_, assets)| assets.contains(asset))
            .map(|(category, _)| category.as_str())
            .ok_or_else(|| InvestError::AssetNotFound(asset.to_string()))
    }

    pub fn is_benchmark_member(&self, asset: &str) -> bool {
        self.benchmark.contains(asset)
    }

    /// Latest index observation within `[from, to]`
    pub fn index_value(&self, index_name: &str, from: NaiveDate, to: NaiveDate) -> Option<Decimal> {
        self.index_values
            .get(index_name)?
            .iter()
            .filter(|v| v.date >= from && v.date <= to)
            .last()
            .map(|v| Decimal::from(v.value))
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.index_values.keys().map(String::as_str).sorted()
    }

    /// Distinct event years, ascending
    pub fn year_range(&self) -> &[i32] {
        &self.years
    }
}
