//! Output formatting module for CLI display
//!
//! Turns report models into terminal tables. Amounts arrive in the ledger's
//! fixed-point scales and are converted by the `utils` helpers.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use invest::db::LedgerBatch;
use invest::reports::{BenchmarkSection, MetricsRow, RowPeriod, YearOverview, YearReport};
use invest::tax::TaxReport;
use invest::utils::{format_amount, format_percent, format_price, format_units, or_blank};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_name(month: u32) -> &'static str {
    (month as usize)
        .checked_sub(1)
        .and_then(|idx| MONTHS.get(idx))
        .copied()
        .unwrap_or("?")
}

/// Pretty JSON for `--json`
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Green when non-negative, red otherwise
fn signed(value: Decimal, text: String) -> String {
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn signed_amount(value: Option<Decimal>) -> String {
    or_blank(value, |v| signed(v, format_amount(v)))
}

fn signed_percent(value: Option<Decimal>) -> String {
    or_blank(value, |v| signed(v, format_percent(v)))
}

#[derive(Tabled)]
struct MetricsLine {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Input")]
    input: String,
    #[tabled(rename = "Output")]
    output: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Profit")]
    profit: String,
    #[tabled(rename = "Return")]
    profitability: String,
    #[tabled(rename = "Weight")]
    weight: String,
}

impl MetricsLine {
    fn from_row(row: &MetricsRow, year: i32) -> Self {
        let period = match row.period {
            RowPeriod::Month(month) => format!("{} {}", month_name(month), year),
            RowPeriod::Year => year.to_string(),
            RowPeriod::SinceInception => "Since start".to_string(),
        };
        Self {
            period,
            input: format_amount(row.input),
            output: format_amount(row.output),
            balance: or_blank(row.balance, format_amount),
            profit: signed_amount(row.profit),
            profitability: signed_percent(row.profitability),
            weight: or_blank(row.weight, format_percent),
        }
    }
}

fn metrics_table(rows: &[MetricsRow], year: i32) -> String {
    let lines: Vec<MetricsLine> = rows.iter().map(|r| MetricsLine::from_row(r, year)).collect();
    let mut table = Table::new(&lines);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Summary printed after parsing an import
pub fn format_import_summary(batch: &LedgerBatch, years: &[i32], dry_run: bool) -> String {
    let mut output = format!(
        "\n{} Found {} events, {} index values, {} benchmark members\n",
        "✓".green().bold(),
        batch.events.len(),
        batch.index_values.len(),
        batch.benchmark_members.len()
    );
    if let (Some(first), Some(last)) = (years.first(), years.last()) {
        output.push_str(&format!("  Years: {}-{}\n", first, last));
    }
    if dry_run {
        output.push_str(&format!("\n{} Dry run - no changes saved\n", "ℹ".blue().bold()));
    } else {
        output.push_str(&format!("\n{} Ledger replaced\n", "✓".green().bold()));
    }
    output
}

pub fn format_years_table(overview: &[YearOverview]) -> String {
    #[derive(Tabled)]
    struct YearLine {
        #[tabled(rename = "Year")]
        year: i32,
        #[tabled(rename = "Input")]
        input: String,
        #[tabled(rename = "Output")]
        output: String,
        #[tabled(rename = "Balance")]
        balance: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "Return")]
        profitability: String,
        #[tabled(rename = "Return since start")]
        total_profitability: String,
    }

    let lines: Vec<YearLine> = overview
        .iter()
        .map(|o| YearLine {
            year: o.year,
            input: format_amount(o.input),
            output: format_amount(o.output),
            balance: or_blank(o.balance, format_amount),
            profit: signed_amount(o.profit),
            profitability: signed_percent(o.profitability),
            total_profitability: signed_percent(o.total_profitability),
        })
        .collect();

    let mut table = Table::new(&lines);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    format!("\n{} Portfolio by year\n\n{}\n", "📊".cyan().bold(), table)
}

pub fn format_year_report(report: &YearReport) -> String {
    let mut output = format!(
        "\n{} Report {} (as of {})\n",
        "📊".cyan().bold(),
        report.year,
        report.today.format("%d/%m/%Y")
    );

    for category in &report.categories {
        output.push_str(&format!("\n{}\n", category.category.bold().underline()));
        for asset in &category.assets {
            let marker = if asset.benchmark_member { " *" } else { "" };
            output.push_str(&format!(
                "\n{}{}  qty {}  price {}  avg {}\n",
                asset.asset.bold(),
                marker,
                format_units(asset.position.quantity),
                or_blank(asset.position.price, format_price),
                or_blank(asset.position.avg_purchase_price, format_price),
            ));
            output.push_str(&metrics_table(&asset.rows, report.year));
            output.push('\n');
        }
        output.push_str(&format!("\n{} total\n", category.category.bold()));
        output.push_str(&metrics_table(&category.rows, report.year));
        output.push('\n');
    }

    output.push_str(&format!("\n{}\n", "Portfolio".bold().underline()));
    output.push_str(&metrics_table(&report.portfolio, report.year));
    output.push('\n');

    if let Some(benchmark) = &report.benchmark {
        output.push_str(&format_index_table(benchmark));
    }
    if report.categories.iter().any(|c| c.assets.iter().any(|a| a.benchmark_member)) {
        output.push_str(&format!("\n{}\n", "* member of the benchmark index".bright_black()));
    }
    output
}

pub fn format_index_table(section: &BenchmarkSection) -> String {
    #[derive(Tabled)]
    struct IndexLine {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Change")]
        change: String,
    }

    if !section.has_values() {
        return format!(
            "\n{} No values for index {} in {}\n",
            "ℹ".blue().bold(),
            section.index,
            section.year
        );
    }

    let mut lines: Vec<IndexLine> = section
        .months
        .iter()
        .map(|m| IndexLine {
            month: month_name(m.month).to_string(),
            value: or_blank(m.value, format_units),
            change: signed_percent(m.change),
        })
        .collect();
    lines.push(IndexLine {
        month: "Sum".to_string(),
        value: or_blank(section.year_value, format_units),
        change: String::new(),
    });

    let mut table = Table::new(&lines);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    format!("\n{} {} {}\n\n{}\n", "📈".cyan().bold(), section.index.bold(), section.year, table)
}

pub fn format_tax_report(report: &TaxReport) -> String {
    #[derive(Tabled)]
    struct TaxLine {
        #[tabled(rename = "Month")]
        month: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Proceeds")]
        proceeds: String,
        #[tabled(rename = "Profit")]
        profit: String,
    }

    if report.is_empty() {
        return format!("{} No realized gains to report\n", "ℹ".blue().bold());
    }

    let lines: Vec<TaxLine> = report
        .rows
        .iter()
        .map(|r| TaxLine {
            month: format!("{:02}/{}", r.month, r.year),
            category: r.category.clone(),
            proceeds: format_amount(r.disposal_proceeds),
            profit: signed(r.profit, format_amount(r.profit)),
        })
        .collect();
    let mut table = Table::new(&lines);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());

    let mut output = format!("\n{} Realized gains\n\n{}\n", "🧾".cyan().bold(), table);
    for totals in report.yearly_totals() {
        output.push_str(&format!(
            "\n{:<8} proceeds {}  profit {}",
            totals.year.to_string().bold(),
            format_amount(totals.disposal_proceeds),
            signed(totals.profit, format_amount(totals.profit))
        ));
    }
    output.push('\n');
    output
}

/// Message for commands run before any import
pub fn format_empty_ledger() -> String {
    format!(
        "{} No events found\nImport a ledger first using: {} import <file>\n",
        "ℹ".blue().bold(),
        "invest".bold()
    )
}
