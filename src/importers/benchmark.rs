use anyhow::{Context, Result};
use itertools::Itertools;
use std::path::Path;
use tracing::info;

use super::parse::read_text;

/// Parse the benchmark membership list: one asset per line.
///
/// Blank lines and `#` comments are ignored; a CSV export works too, only
/// the first cell of each line is read.
pub fn parse_benchmark_list<P: AsRef<Path>>(file_path: P) -> Result<Vec<String>> {
    let path = file_path.as_ref();
    let content = read_text(path).with_context(|| format!("Failed to read benchmark list {:?}", path))?;
    let members = parse_members(&content);
    info!("Parsed {} benchmark members", members.len());
    Ok(members)
}

pub(crate) fn parse_members(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split([',', ';']).next())
        .map(|cell| cell.trim().trim_matches('"').to_uppercase())
        .filter(|asset| !asset.is_empty())
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_members() {
        let content = "# Ibovespa composition\nabc\n\nDEF;Banco DEF;1,5\n\"GHI\"\nABC\n";
        assert_eq!(parse_members(content), vec!["ABC", "DEF", "GHI"]);
    }
}
