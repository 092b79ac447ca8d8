// Import module - ledger, index and benchmark file parsers

pub mod benchmark;
pub mod events;
pub mod index;
pub mod parse;

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::db::LedgerBatch;

pub use benchmark::parse_benchmark_list;
pub use events::parse_events_csv;
pub use index::parse_index_csv;

/// Parse every input of one import.
///
/// Nothing is written here: the batch is committed by
/// [`crate::db::replace_ledger`] only once every file parsed cleanly.
pub fn load_batch(
    events_path: &Path,
    index_path: Option<&Path>,
    benchmark_path: Option<&Path>,
) -> Result<LedgerBatch> {
    let events = parse_events_csv(events_path)?;
    let index_values = match index_path {
        Some(path) => parse_index_csv(path)?,
        None => Vec::new(),
    };
    let benchmark_members = match benchmark_path {
        Some(path) => parse_benchmark_list(path)?,
        None => Vec::new(),
    };

    info!(
        "Loaded batch: {} events, {} index values, {} benchmark members",
        events.len(),
        index_values.len(),
        benchmark_members.len()
    );
    Ok(LedgerBatch {
        events,
        index_values,
        benchmark_members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_batch_reads_all_inputs() {
        let events = write_temp("date,asset,category,quantity,price\n05/01/2023,ABC,Stocks,10,100\n");
        let index = write_temp("date,index,value\n31/01/2023,IBOV,1000\n");
        let members = write_temp("ABC\n");

        let batch = load_batch(events.path(), Some(index.path()), Some(members.path())).unwrap();
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.index_values.len(), 1);
        assert_eq!(batch.benchmark_members, vec!["ABC"]);
    }

    #[test]
    fn test_load_batch_fails_on_any_bad_file() {
        let events = write_temp("date,asset,category,quantity,price\n05/01/2023,ABC,Stocks,10,100\n");
        let index = write_temp("date,index,value\nbad,IBOV,1000\n");
        assert!(load_batch(events.path(), Some(index.path()), None).is_err());
    }
}
