//! CLI argument definitions for `lecap`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Fetch the raw quotes CSV (headers, rows, source) |
//! | `table` | Quote table for the selected LECAP range |
//! | `simulate` | Final capital and breakeven dollar per bond |
//! | `usd` | Current "dólar bolsa" quote |
//! | `sources` | Configured CSV candidates and their relay URLs |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `LECAP_TIMEOUT_MS` or `10000` | Per-attempt timeout |
//! | `--start` / `--end` | `S15G5` / `T15E7` | Selected code range |
//! | `--gviz-url` / `--export-url` | env | CSV candidate URLs |
//! | `--usd-url` | env | Dollar API URL |
//!
//! # Examples
//!
//! ```bash
//! lecap table --format table
//! lecap simulate --amount "1.500.000,00" --pretty
//! lecap fetch --gviz-url "https://docs.google.com/spreadsheets/d/<id>/gviz/tq?tqx=out:csv"
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// LECAP quotes from the public spreadsheet, with a yield calculator.
#[derive(Debug, Parser)]
#[command(name = "lecap", author, version, about = "LECAP quotes and yield calculator")]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-attempt request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// First code of the selected range.
    #[arg(long, global = true)]
    pub start: Option<String>,

    /// Last code of the selected range.
    #[arg(long, global = true)]
    pub end: Option<String>,

    /// Spreadsheet gviz CSV URL (overrides LECAP_SHEET_GVIZ_URL).
    #[arg(long, global = true)]
    pub gviz_url: Option<String>,

    /// Spreadsheet export CSV URL (overrides LECAP_SHEET_EXPORT_URL).
    #[arg(long, global = true)]
    pub export_url: Option<String>,

    /// Dollar API URL (overrides LECAP_DOLAR_API_URL).
    #[arg(long, global = true)]
    pub usd_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the quotes CSV and print it as decoded rows.
    Fetch,

    /// Show the quote table for the selected range.
    Table,

    /// Run the yield calculator for an amount in pesos.
    ///
    ///   lecap simulate --amount 100000
    ///   lecap simulate --amount "$ 1.000.000,50" --format table
    Simulate(SimulateArgs),

    /// Fetch the "dólar bolsa" quote.
    Usd,

    /// List configured CSV candidates.
    Sources,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// Amount to invest, in pesos (locale-tolerant: `1.500,5`, `$ 100000`).
    #[arg(long)]
    pub amount: String,

    /// Skip the dollar quote (no breakeven column).
    #[arg(long, default_value_t = false)]
    pub no_usd: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn global_options_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lecap",
            "simulate",
            "--amount",
            "1000",
            "--format",
            "table",
            "--start",
            "S30S5",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.start.as_deref(), Some("S30S5"));
        assert!(matches!(cli.command, Command::Simulate(ref args) if args.amount == "1000"));
    }

    #[test]
    fn simulate_requires_amount() {
        assert!(Cli::try_parse_from(["lecap", "simulate"]).is_err());
    }
}
