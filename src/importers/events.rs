use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{debug, info, warn};

use super::parse::{detect_delimiter, parse_date, parse_fixed_point, read_text};
use crate::db::Event;
use crate::error::InvestError;

/// Largest accepted quantity or price in fixed point (100 million units).
///
/// Keeps `quantity * price` and the sums over it inside `Decimal` range.
pub const MAX_FIXED_POINT: u64 = 10_000_000_000;

#[derive(Debug, PartialEq, Eq)]
struct EventColumns {
    date: usize,
    asset: usize,
    category: usize,
    quantity: usize,
    price: usize,
    fee: Option<usize>,
}

impl EventColumns {
    /// date, asset, category, quantity, price[, fee]
    const POSITIONAL: EventColumns = EventColumns {
        date: 0,
        asset: 1,
        category: 2,
        quantity: 3,
        price: 4,
        fee: Some(5),
    };
}

/// Match headers by name (English or Portuguese); unknown headers fall back
/// to positional order.
fn find_columns(headers: &StringRecord) -> EventColumns {
    let mut date = None;
    let mut asset = None;
    let mut category = None;
    let mut quantity = None;
    let mut price = None;
    let mut fee = None;

    for (idx, header) in headers.iter().enumerate() {
        let text = header.to_lowercase();
        match text.as_str() {
            "date" | "data" => date = Some(idx),
            "asset" | "ativo" | "ticker" | "código" | "codigo" => asset = Some(idx),
            "category" | "categoria" | "classe" => category = Some(idx),
            "quantity" | "quantidade" | "qtd" => quantity = Some(idx),
            "price" | "preço" | "preco" => price = Some(idx),
            "fee" | "fees" | "brokerage" | "corretagem" | "taxa" | "taxas" => fee = Some(idx),
            _ => {}
        }
    }

    match (date, asset, category, quantity, price) {
        (Some(date), Some(asset), Some(category), Some(quantity), Some(price)) => EventColumns {
            date,
            asset,
            category,
            quantity,
            price,
            fee,
        },
        _ => {
            debug!("Unrecognized event headers {:?}, using column order", headers);
            EventColumns::POSITIONAL
        }
    }
}

/// Parse the ledger events file.
///
/// Any malformed row fails the whole file; fully blank rows are skipped.
pub fn parse_events_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<Event>> {
    let path = file_path.as_ref();
    info!("Parsing events file: {:?}", path);
    let content = read_text(path)?;
    parse_events(&content).with_context(|| format!("Failed to import events from {:?}", path))
}

pub(crate) fn parse_events(content: &str) -> Result<Vec<Event>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers().context("Failed to read CSV headers")?.clone();
    let columns = find_columns(&headers);
    debug!("Event columns: {:?}", columns);

    let mut events = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| InvestError::Ingestion {
            line: idx + 2,
            message: e.to_string(),
        })?;
        let line = record_line(&record, idx + 2);
        if record.iter().all(str::is_empty) {
            warn!("Skipping blank row {}", line);
            continue;
        }
        let event = parse_event_row(&record, &columns).map_err(|message| InvestError::Ingestion {
            line,
            message,
        })?;
        events.push(event);
    }

    info!("Parsed {} events", events.len());
    Ok(events)
}

/// 1-based line of a record in the source file
pub(crate) fn record_line(record: &StringRecord, fallback: usize) -> usize {
    record
        .position()
        .map(|pos| pos.line() as usize)
        .unwrap_or(fallback)
}

/// Non-empty cell or a "missing <name>" message
pub(crate) fn required<'r>(
    record: &'r StringRecord,
    idx: usize,
    name: &str,
) -> std::result::Result<&'r str, String> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format!("missing {}", name)),
    }
}

fn parse_event_row(record: &StringRecord, columns: &EventColumns) -> std::result::Result<Event, String> {
    let date = parse_date(required(record, columns.date, "date")?)?;
    let asset = required(record, columns.asset, "asset")?.to_uppercase();
    let category = required(record, columns.category, "category")?.to_string();
    let quantity = parse_fixed_point(required(record, columns.quantity, "quantity")?)?;
    let price = parse_fixed_point(required(record, columns.price, "price")?)?;
    let fee = match columns.fee.and_then(|idx| record.get(idx)) {
        Some(text) if !text.is_empty() => parse_fixed_point(text)?,
        _ => 0,
    };

    if price < 0 {
        return Err(format!("negative price for {}", asset));
    }
    if fee < 0 {
        return Err(format!("negative fee for {}", asset));
    }
    if quantity.unsigned_abs() > MAX_FIXED_POINT {
        return Err(format!("quantity out of range for {}", asset));
    }
    if price.unsigned_abs() > MAX_FIXED_POINT {
        return Err(format!("price out of range for {}", asset));
    }

    Ok(Event::new(date, &asset, &category, quantity, price).with_fee(fee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ingestion_line(err: &anyhow::Error) -> Option<usize> {
        match err.downcast_ref::<InvestError>() {
            Some(InvestError::Ingestion { line, .. }) => Some(*line),
            _ => None,
        }
    }

    #[test]
    fn test_parse_brazilian_events() {
        let content = "data,ativo,categoria,quantidade,preco,corretagem\n\
                       \"05/01/23\",abc,Stocks,\"10,00\",\"100,00\",\"4,90\"\n\
                       \"10/02/23\",ABC,Stocks,\"-4\",\"120\",\n";
        let events = parse_events(content).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert_eq!(events[0].asset, "ABC");
        assert_eq!(events[0].signed_quantity, 1000);
        assert_eq!(events[0].unit_price, 10000);
        assert_eq!(events[0].fee, 490);
        assert_eq!(events[1].signed_quantity, -400);
        assert_eq!(events[1].unit_price, 12000);
        assert_eq!(events[1].fee, 0);
    }

    #[test]
    fn test_semicolon_and_reordered_headers() {
        let content = "category;asset;date;price;quantity\n\
                       FII;XPML11;2022-11-03;95,00;100\n";
        let events = parse_events(content).unwrap();
        assert_eq!(events[0].category, "FII");
        assert_eq!(events[0].unit_price, 9500);
        assert_eq!(events[0].signed_quantity, 10000);
    }

    #[test]
    fn test_unknown_headers_use_column_order() {
        let content = "when,what,kind,how many,how much,cost\n\
                       05/01/2023,ABC,Stocks,1,10,0\n";
        let events = parse_events(content).unwrap();
        assert_eq!(events[0].asset, "ABC");
        assert_eq!(events[0].unit_price, 1000);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let content = "date,asset,category,quantity,price\n\
                       ,,,,\n\
                       05/01/2023,ABC,Stocks,1,10\n";
        assert_eq!(parse_events(content).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_row_fails_with_line_number() {
        let content = "date,asset,category,quantity,price\n\
                       05/01/2023,ABC,Stocks,1,10\n\
                       not a date,ABC,Stocks,1,10\n";
        let err = parse_events(content).unwrap_err();
        assert_eq!(ingestion_line(&err), Some(3));

        let content = "date,asset,category,quantity,price\n\
                       05/01/2023,ABC,Stocks,1,-10\n";
        let err = parse_events(content).unwrap_err();
        assert_eq!(ingestion_line(&err), Some(2));
        assert!(err.to_string().contains("negative price"));

        let content = "date,asset,category,quantity,price\n\
                       05/01/2023,,Stocks,1,10\n";
        assert!(parse_events(content).unwrap_err().to_string().contains("missing asset"));
    }

    #[test]
    fn test_oversized_values_are_rejected() {
        let content = "date,asset,category,quantity,price\n\
                       05/01/2023,ABC,Stocks,1,10\n\
                       05/01/2023,ABC,Stocks,100000000000000,100000000000000\n";
        let err = parse_events(content).unwrap_err();
        assert_eq!(ingestion_line(&err), Some(3));
        assert!(err.to_string().contains("quantity out of range"));

        let content = "date,asset,category,quantity,price\n\
                       05/01/2023,ABC,Stocks,-1,100000001\n";
        let err = parse_events(content).unwrap_err();
        assert!(err.to_string().contains("price out of range"));

        // The largest accepted values still compute without overflow
        let content = "date,asset,category,quantity,price\n\
                       05/01/2023,ABC,Stocks,100000000,100000000\n";
        let events = parse_events(content).unwrap();
        assert_eq!(events[0].signed_quantity as u64, MAX_FIXED_POINT);
        let max = rust_decimal::Decimal::from(MAX_FIXED_POINT);
        assert_eq!(events[0].flow(), max * max);
    }
}
