//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "tabio",
    version,
    about = "Read tabular files through pluggable format readers",
    long_about = "Read tabular files through pluggable format readers.\n\n\
                  The built-in polars.csv reader parses delimited text with polars \
                  and keeps column types and missing values."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read a file and print its contents.
    Read(ReadArgs),

    /// List registered formats.
    Formats,
}

#[derive(Parser)]
pub struct ReadArgs {
    /// Input file, or `-` for standard input (requires --format).
    #[arg(value_name = "PATH")]
    pub input: PathBuf,

    /// Format identifier (default: identified from the file extension).
    #[arg(long = "format", value_name = "ID")]
    pub format: Option<String>,

    /// Field delimiter; `tab` or `\t` for tabs.
    #[arg(long = "delimiter", value_name = "CHAR")]
    pub delimiter: Option<String>,

    /// The first record is data, not column names.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Text read as a missing value (repeatable; replaces the default).
    #[arg(long = "null-value", value_name = "TEXT")]
    pub null_values: Vec<String>,

    /// Column type override, e.g. `price=float` (repeatable).
    #[arg(long = "dtype", value_name = "NAME=TYPE", value_parser = parse_key_value)]
    pub dtypes: Vec<(String, String)>,

    /// Physical lines to drop before the header.
    #[arg(long = "skip-rows", value_name = "N")]
    pub skip_rows: Option<usize>,

    /// Any read option as `key=value` (repeatable, applied last).
    #[arg(long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// TOML file with read options (applied first).
    #[arg(long = "options-file", value_name = "FILE")]
    pub options_file: Option<PathBuf>,

    /// Output format.
    #[arg(long = "output", value_enum, default_value = "table")]
    pub output: OutputArg,

    /// Print at most this many rows.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{value}'"));
    }
    Ok((key.to_string(), val.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("a=datetime[ms, UTC]").unwrap(),
            ("a".to_string(), "datetime[ms, UTC]".to_string())
        );
        assert_eq!(
            parse_key_value("null_values=").unwrap(),
            ("null_values".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_read_args() {
        let cli = Cli::try_parse_from([
            "tabio",
            "read",
            "data.csv",
            "--dtype",
            "a=int",
            "--null-value",
            "NA",
            "--output",
            "json",
            "-v",
        ])
        .unwrap();
        let Command::Read(args) = cli.command else {
            panic!("expected read command");
        };
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.dtypes, vec![("a".to_string(), "int".to_string())]);
        assert_eq!(args.null_values, vec!["NA"]);
        assert_eq!(args.output, OutputArg::Json);
        assert!(cli.verbosity.is_present());
    }
}
