// Database module - SQLite event store and models

pub mod models;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::InvestError;
pub use models::{Event, IndexValue, LedgerBatch, FIXED_POINT_SCALE};

/// Environment variable that overrides the database location
pub const DB_PATH_ENV: &str = "INVEST_DB";

/// Get the default database path (`$INVEST_DB` or `<data dir>/invest/invest.db`)
pub fn get_default_db_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let data_dir = dir_spec::data_home()
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let invest_dir = data_dir.join("invest");

    // Create directory if it doesn't exist
    std::fs::create_dir_all(&invest_dir).context("Failed to create invest data directory")?;

    Ok(invest_dir.join("invest.db"))
}

/// Open database connection
pub fn open_db(db_path: Option<PathBuf>) -> Result<Connection> {
    let path = match db_path {
        Some(path) => path,
        None => get_default_db_path()?,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory {:?}", parent))?;
        }
    }
    let conn = Connection::open(&path).context(format!("Failed to open database at {:?}", path))?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Create all tables and indexes if missing
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")?;
    Ok(())
}

/// Replace the whole ledger with `batch` in a single transaction.
///
/// Either every row lands or none does: the previous contents are kept when
/// any insert fails.
pub fn replace_ledger(conn: &mut Connection, batch: &LedgerBatch) -> Result<()> {
    check_category_consistency(&batch.events)?;

    let tx = conn.transaction().context("Failed to start import transaction")?;
    tx.execute("DELETE FROM events", [])?;
    tx.execute("DELETE FROM index_values", [])?;
    tx.execute("DELETE FROM benchmark_members", [])?;

    for event in &batch.events {
        insert_event(&tx, event)?;
    }
    for value in &batch.index_values {
        insert_index_value(&tx, value)?;
    }
    for asset in &batch.benchmark_members {
        insert_benchmark_member(&tx, asset)?;
    }

    tx.commit().context("Failed to commit import transaction")?;

    info!(
        "Imported {} events, {} index values, {} benchmark members",
        batch.events.len(),
        batch.index_values.len(),
        batch.benchmark_members.len()
    );
    Ok(())
}

/// Every event of an asset must carry the same category.
pub fn check_category_consistency(events: &[Event]) -> std::result::Result<(), InvestError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for event in events {
        match seen.get(event.asset.as_str()) {
            Some(&category) if category != event.category => {
                return Err(InvestError::CategoryConflict {
                    asset: event.asset.clone(),
                    first: category.to_string(),
                    second: event.category.clone(),
                });
            }
            Some(_) => {}
            None => {
                seen.insert(&event.asset, &event.category);
            }
        }
    }
    Ok(())
}

/// Insert event
pub fn insert_event(tx: &Transaction<'_>, event: &Event) -> Result<i64> {
    tx.execute(
        "INSERT INTO events (date, asset, category, quantity, price, fee)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.date,
            event.asset,
            event.category,
            event.signed_quantity,
            event.unit_price,
            event.fee,
        ],
    )
    .context(format!("Failed to insert event for {}", event.asset))?;

    Ok(tx.last_insert_rowid())
}

/// Insert index observation
pub fn insert_index_value(tx: &Transaction<'_>, value: &IndexValue) -> Result<i64> {
    tx.execute(
        "INSERT INTO index_values (date, index_name, value) VALUES (?1, ?2, ?3)",
        params![value.date, value.index_name, value.value],
    )
    .context(format!("Failed to insert index value for {}", value.index_name))?;

    Ok(tx.last_insert_rowid())
}

/// Insert benchmark member (duplicates are ignored)
pub fn insert_benchmark_member(tx: &Transaction<'_>, asset: &str) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO benchmark_members (asset) VALUES (?1)",
        params![asset],
    )?;
    Ok(())
}

/// Load every event in chronological order (insertion order breaks ties)
pub fn get_all_events(conn: &Connection) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, asset, category, quantity, price, fee
         FROM events
         ORDER BY date ASC, id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(Event {
            id: Some(row.get(0)?),
            date: row.get(1)?,
            asset: row.get(2)?,
            category: row.get(3)?,
            signed_quantity: row.get(4)?,
            unit_price: row.get(5)?,
            fee: row.get(6)?,
        })
    })?;

    let mut events = Vec::new();
    for row in rows {
        events.push(row.context("Failed to read event row")?);
    }
    debug!("Loaded {} events", events.len());
    Ok(events)
}

/// Load every index observation in chronological order
pub fn get_all_index_values(conn: &Connection) -> Result<Vec<IndexValue>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, index_name, value
         FROM index_values
         ORDER BY index_name ASC, date ASC, id ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(IndexValue {
            id: Some(row.get(0)?),
            date: row.get(1)?,
            index_name: row.get(2)?,
            value: row.get(3)?,
        })
    })?;

    let mut values = Vec::new();
    for row in rows {
        values.push(row.context("Failed to read index value row")?);
    }
    Ok(values)
}

/// Load the benchmark membership set
pub fn get_benchmark_members(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT asset FROM benchmark_members ORDER BY asset")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut members = Vec::new();
    for row in rows {
        members.push(row?);
    }
    Ok(members)
}

/// Distinct years present in the events table, ascending
pub fn get_year_range(conn: &Connection) -> Result<Vec<i32>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
         FROM events
         ORDER BY year",
    )?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut years = Vec::new();
    for row in rows {
        years.push(row?);
    }
    Ok(years)
}
