use std::io::Write;

use clap::Parser;
use tabio_cli::cli::{Cli, Command, ReadArgs};
use tabio_cli::commands::{build_options, run_read};
use tabio_cli::render::{formats_table, json_table};
use tabio_io::FormatRegistry;
use tabio_model::ColumnType;
use tempfile::NamedTempFile;

fn read_args(args: &[&str]) -> ReadArgs {
    let argv = ["tabio", "read"].iter().chain(args.iter()).copied();
    match Cli::try_parse_from(argv).expect("parse args").command {
        Command::Read(args) => args,
        Command::Formats => panic!("expected read command"),
    }
}

fn temp_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("create temp file");
    write!(file, "{contents}").expect("write temp file");
    file
}

#[test]
fn flags_override_options_file() {
    let options_file = temp_file(".toml", "delimiter = \";\"\nskip_rows = 2\n");
    let path = options_file.path().to_str().unwrap();
    let args = read_args(&[
        "data.csv",
        "--options-file",
        path,
        "--delimiter",
        "tab",
        "--no-header",
        "--dtype",
        "price=float",
        "--option",
        "comment=#",
        "--option",
        "skip_rows=1",
    ]);

    let options = build_options(&args).expect("build options");
    assert_eq!(options.delimiter, '\t');
    assert!(!options.header);
    assert_eq!(options.skip_rows, 1);
    assert_eq!(options.comment, Some('#'));
    assert_eq!(options.dtypes.get("price"), Some(&ColumnType::Float));
}

#[test]
fn unknown_option_is_rejected() {
    let args = read_args(&["data.csv", "--option", "separator=;"]);
    let err = build_options(&args).unwrap_err();
    assert_eq!(err.to_string(), "unknown option 'separator'");
}

#[test]
fn json_output_snapshot() {
    let file = temp_file(
        ".csv",
        "id,name,score,active,joined\n1,ana,1.5,true,2024-01-02\n2,,NA,false,\n3,cy,2.25,,2023-12-31\n",
    );
    let path = file.path().to_str().unwrap();
    let args = read_args(&[path, "--null-value", "NA", "--null-value", "", "--option", "parse_dates=true"]);

    let table = run_read(&FormatRegistry::with_default_readers(), &args).expect("read csv");
    insta::assert_json_snapshot!("json_output", json_table(&table, None));
}

#[test]
fn unknown_format_error_has_context() {
    let args = read_args(&["missing.csv", "--format", "nonexistent.csv"]);
    let err = run_read(&FormatRegistry::with_default_readers(), &args).unwrap_err();
    assert_eq!(
        format!("{err:#}"),
        "read missing.csv: unknown format 'nonexistent.csv' (registered: polars.csv)"
    );
}

#[test]
fn formats_listing() {
    let rendered = formats_table(&FormatRegistry::with_default_readers().formats()).to_string();
    assert!(rendered.contains("polars.csv"));
    assert!(rendered.contains("Delimited text parsed by the polars CSV engine"));
}
