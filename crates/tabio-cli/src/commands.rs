//! Command implementations.

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use tabio_io::{FormatRegistry, ReadOptions, ReadSource};
use tabio_model::Table;
use tracing::{debug, info_span};

use crate::cli::ReadArgs;

/// Merges read options: options file first, then dedicated flags, then
/// `--option` pairs.
pub fn build_options(args: &ReadArgs) -> Result<ReadOptions> {
    let mut options = match &args.options_file {
        Some(path) => ReadOptions::from_toml_file(path)
            .with_context(|| format!("load options from {}", path.display()))?,
        None => ReadOptions::default(),
    };

    if let Some(delimiter) = &args.delimiter {
        options.set("delimiter", delimiter)?;
    }
    if args.no_header {
        options.header = false;
    }
    if !args.null_values.is_empty() {
        options.null_values = args.null_values.clone();
    }
    for (column, column_type) in &args.dtypes {
        options.set(&format!("dtypes.{column}"), column_type)?;
    }
    if let Some(rows) = args.skip_rows {
        options.skip_rows = rows;
    }
    for (key, value) in &args.options {
        options.set(key, value)?;
    }
    Ok(options)
}

/// Reads the input named by `args` through `registry`.
pub fn run_read(registry: &FormatRegistry, args: &ReadArgs) -> Result<Table> {
    let span = info_span!("read", input = %args.input.display());
    let _guard = span.enter();

    let options = build_options(args)?;
    debug!(?options, "resolved read options");

    let source = if args.input == Path::new("-") {
        ReadSource::reader(io::stdin().lock())
    } else {
        ReadSource::path(&args.input)
    };
    let table = match &args.format {
        Some(format) => registry.read(format, source, &options),
        None => registry.read_auto(source, &options),
    }
    .with_context(|| format!("read {}", args.input.display()))?;
    Ok(table)
}
