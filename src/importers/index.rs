use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;
use tracing::{info, warn};

use super::events::{record_line, required};
use super::parse::{detect_delimiter, parse_date, parse_fixed_point, read_text};
use crate::db::IndexValue;
use crate::error::InvestError;

/// Parse index observations: `date, index, value` with a header row.
///
/// Columns are positional; the header names are not checked.
pub fn parse_index_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<IndexValue>> {
    let path = file_path.as_ref();
    info!("Parsing index file: {:?}", path);
    let content = read_text(path)?;
    parse_index(&content).with_context(|| format!("Failed to import index values from {:?}", path))
}

pub(crate) fn parse_index(content: &str) -> Result<Vec<IndexValue>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(content))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut values = Vec::new();
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
        let value = parse_index_row(&record).map_err(|message| InvestError::Ingestion { line, message })?;
        values.push(value);
    }

    info!("Parsed {} index values", values.len());
    Ok(values)
}

fn parse_index_row(record: &StringRecord) -> std::result::Result<IndexValue, String> {
    let date = parse_date(required(record, 0, "date")?)?;
    let name = required(record, 1, "index name")?.to_uppercase();
    let value = parse_fixed_point(required(record, 2, "value")?)?;
    Ok(IndexValue::new(date, &name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_index_values() {
        let content = "data;indice;valor\n\
                       31/01/2023;ibov;113.082,00\n\
                       28/02/2023;IBOV;104.882,00\n";
        let values = parse_index(content).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].index_name, "IBOV");
        assert_eq!(values[0].date, NaiveDate::from_ymd_opt(2023, 1, 31).unwrap());
        assert_eq!(values[0].value, 11308200);
    }

    #[test]
    fn test_missing_value_fails() {
        let content = "date,index,value\n2023-01-31,IBOV,\n";
        let err = parse_index(content).unwrap_err();
        assert_eq!(
            err.downcast_ref::<InvestError>(),
            Some(&InvestError::Ingestion {
                line: 2,
                message: "missing value".to_string()
            })
        );
    }
}
