use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use itertools::Itertools;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

use invest::config::Config;
use invest::db::{self, LedgerBatch};
use invest::engine::{Clock, Engine, EngineOptions};
use invest::error::InvestError;
use invest::importers::{self, parse::parse_date};
use invest::reports::{years_overview, BenchmarkSection, YearReport};
use invest::store::EventStore;
use invest::tax::TaxReport;

use crate::cli::formatters;
use crate::cli::{Cli, Commands};

/// Execute one parsed command line
pub fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let today = resolve_today(cli.today.as_deref())?;

    match &cli.command {
        Commands::Import {
            file,
            index,
            benchmark,
            dry_run,
        } => handle_import(
            cli,
            &config,
            file,
            index.as_deref(),
            benchmark.as_deref(),
            *dry_run,
        ),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
        command => {
            let conn = db::open_db(Some(config.resolve_db_path(cli.db.clone())?))?;
            let store = EventStore::load(&conn)?;
            if store.is_empty() && !cli.json {
                print!("{}", formatters::format_empty_ledger());
                return Ok(());
            }

            let engine = Engine::new(&store, EngineOptions::new(today));
            let output = render(cli, &config, &engine, command)?;
            println!("{}", output);
            engine.log_cache_stats();
            Ok(())
        }
    }
}

/// `--today` or the system date
fn resolve_today(arg: Option<&str>) -> Result<NaiveDate> {
    match arg {
        Some(text) => {
            let date = parse_date(text).map_err(InvestError::InvalidDate)?;
            Ok(date)
        }
        None => Ok(Clock::system().today()),
    }
}

fn render(cli: &Cli, config: &Config, engine: &Engine<'_>, command: &Commands) -> Result<String> {
    let text = match command {
        Commands::Years => {
            let overview = years_overview(engine)?;
            if cli.json {
                formatters::to_json(&overview)
            } else {
                formatters::format_years_table(&overview)
            }
        }
        Commands::Report { year } => {
            let year = year.unwrap_or_else(|| engine.today().year());
            let report = YearReport::build(engine, year, config.benchmark_index.as_deref())
                .with_context(|| format!("Failed to build report for {}", year))?;
            if cli.json {
                formatters::to_json(&report)
            } else if report.is_empty() {
                format!("No positions in {}", year)
            } else {
                formatters::format_year_report(&report)
            }
        }
        Commands::Tax => {
            let report = TaxReport::build(engine, &config.tax_categories)?;
            if cli.json {
                formatters::to_json(&report)
            } else {
                formatters::format_tax_report(&report)
            }
        }
        Commands::Index { name, year } => {
            let name = name.to_uppercase();
            if !engine.store().index_names().any(|known| known == name) {
                warn!("Index {} has no values in the ledger", name);
            }
            let section = BenchmarkSection::build(engine, &name, *year)?;
            if cli.json {
                formatters::to_json(&section)
            } else {
                formatters::format_index_table(&section)
            }
        }
        Commands::Import { .. } | Commands::Config => String::new(),
    };
    Ok(text)
}

fn handle_import(
    cli: &Cli,
    config: &Config,
    file: &Path,
    index: Option<&Path>,
    benchmark: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    info!("Importing ledger from {:?}", file);
    let batch = importers::load_batch(file, index, benchmark)?;
    if batch.is_empty() {
        warn!("{:?} has no rows; the ledger will be emptied", file);
    }

    let years = if dry_run {
        // Validate what the store would reject
        db::check_category_consistency(&batch.events)?;
        batch_years(&batch)
    } else {
        let mut conn = db::open_db(Some(config.resolve_db_path(cli.db.clone())?))?;
        db::replace_ledger(&mut conn, &batch)?;
        db::get_year_range(&conn)?
    };

    if cli.json {
        let summary = json!({
            "events": batch.events.len(),
            "index_values": batch.index_values.len(),
            "benchmark_members": batch.benchmark_members.len(),
            "years": years,
            "dry_run": dry_run,
        });
        println!("{}", formatters::to_json(&summary));
    } else {
        print!("{}", formatters::format_import_summary(&batch, &years, dry_run));
    }
    Ok(())
}

fn batch_years(batch: &LedgerBatch) -> Vec<i32> {
    batch
        .events
        .iter()
        .map(|e| e.date.year())
        .sorted()
        .dedup()
        .collect()
}
