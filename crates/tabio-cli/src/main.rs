//! tabio CLI.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use tabio_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg, OutputArg, ReadArgs};
use tabio_cli::commands::run_read;
use tabio_cli::logging::{LogConfig, LogFormat, init_logging};
use tabio_cli::render::{formats_table, json_table, summary_line, text_table};
use tabio_io::FormatRegistry;
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let registry = FormatRegistry::with_default_readers();
    let exit_code = match &cli.command {
        Command::Read(args) => match print_read(&registry, args) {
            Ok(()) => 0,
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Formats => {
            println!("{}", formats_table(&registry.formats()));
            0
        }
    };
    std::process::exit(exit_code);
}

fn print_read(registry: &FormatRegistry, args: &ReadArgs) -> anyhow::Result<()> {
    let table = run_read(registry, args)?;
    match args.output {
        OutputArg::Table => {
            println!("{}", text_table(&table, args.limit));
            println!("{}", summary_line(&table, args.limit));
        }
        OutputArg::Json => {
            let value = json_table(&table, args.limit);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
