use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "invest")]
#[command(
    version,
    about = "Monthly and yearly portfolio metrics from a ledger of trade events"
)]
#[command(
    long_about = "Import a ledger of buys, sells, deposits and withdrawals, then report balance, cash flow, realized profit, profitability and weight per asset, category and portfolio, month by month."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Database file (overrides INVEST_DB and the config file)
    #[arg(long = "db", global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to <config dir>/invest/config.toml)
    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Reference date deciding which months are closed (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long = "today", global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace the ledger with the contents of an events CSV
    Import {
        /// Events file: date, asset, category, quantity, price[, fee]
        file: PathBuf,

        /// Index observations file: date, index, value
        #[arg(long)]
        index: Option<PathBuf>,

        /// Benchmark membership list, one asset per line
        #[arg(long)]
        benchmark: Option<PathBuf>,

        /// Parse and validate only, don't touch the database
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Portfolio figures for every ledger year
    Years,

    /// Month-by-month report of one year (defaults to the current year)
    Report {
        /// Year to report
        year: Option<i32>,
    },

    /// Realized gains of the tax-relevant categories, most recent first
    Tax,

    /// Monthly values of a reference index
    Index {
        /// Index name (e.g. IBOV)
        name: String,

        /// Year to show
        year: i32,
    },

    /// Print the effective configuration
    Config,
}
