//! Error handling for Invest
//!
//! Defines the library error kinds and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use thiserror::Error;

/// Core error types for ledger ingestion and metric queries
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvestError {
    #[error("asset not found in ledger: {0}")]
    AssetNotFound(String),

    #[error("invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("ingestion error at line {line}: {message}")]
    Ingestion { line: usize, message: String },

    #[error("asset {asset} appears under categories '{first}' and '{second}'")]
    CategoryConflict {
        asset: String,
        first: String,
        second: String,
    },
}

/// Result type alias for application-level operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = InvestError::AssetNotFound("PETR4".to_string());
        assert_eq!(err.to_string(), "asset not found in ledger: PETR4");

        let err = InvestError::Ingestion {
            line: 7,
            message: "bad date".to_string(),
        };
        assert_eq!(err.to_string(), "ingestion error at line 7: bad date");
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> =
            Err(InvestError::InvalidMonth(13)).context("failed to build report");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to build report"));
                let root = e.root_cause().downcast_ref::<InvestError>();
                assert_eq!(root, Some(&InvestError::InvalidMonth(13)));
            }
            Ok(_) => panic!("expected error"),
        }
    }

    #[test]
    fn test_category_conflict_names_both_categories() {
        let err = InvestError::CategoryConflict {
            asset: "ITSA4".to_string(),
            first: "Ações".to_string(),
            second: "FII".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Ações"));
        assert!(msg.contains("FII"));
    }
}
