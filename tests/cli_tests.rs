// SPDX-FileCopyrightText: 2025 RAprogramm
// SPDX-License-Identifier: MIT

use clap::{Parser, ValueEnum};
use sql_review_bot::cli::{Cli, Commands, Dialect, Format};

#[test]
fn test_dialect_default() {
    assert_eq!(Dialect::default(), Dialect::Ansi);
}

#[test]
fn test_dialect_sqlfluff_names() {
    assert_eq!(Dialect::Ansi.as_sqlfluff(), "ansi");
    assert_eq!(Dialect::Postgres.as_sqlfluff(), "postgres");
    assert_eq!(Dialect::Bigquery.as_sqlfluff(), "bigquery");
    assert_eq!(Dialect::Tsql.as_sqlfluff(), "tsql");
}

#[test]
fn test_dialect_value_names_match_sqlfluff() {
    for dialect in Dialect::value_variants() {
        let value = dialect.to_possible_value().unwrap();
        assert_eq!(value.get_name(), dialect.as_sqlfluff());
    }
}

#[test]
fn test_format_variants() {
    let _text = Format::Text;
    let _json = Format::Json;
    let _yaml = Format::Yaml;
}

#[test]
fn test_parse_serve() {
    let cli = Cli::try_parse_from([
        "sql-review-bot",
        "serve",
        "--port",
        "8080",
        "--dialect",
        "postgres",
        "--max-in-flight",
        "4"
    ])
    .unwrap();

    match cli.command {
        Commands::Serve {
            port,
            dialect,
            max_in_flight,
            ..
        } => {
            assert_eq!(port, Some(8080));
            assert_eq!(dialect, Some(Dialect::Postgres));
            assert_eq!(max_in_flight, Some(4));
        }
        Commands::Check {
            ..
        } => panic!("expected serve")
    }
}

#[test]
fn test_parse_check_defaults() {
    let cli = Cli::try_parse_from(["sql-review-bot", "check"]).unwrap();

    match cli.command {
        Commands::Check {
            query,
            dialect,
            output_format,
            no_color
        } => {
            assert_eq!(query.to_str(), Some("-"));
            assert!(dialect.is_none());
            assert!(matches!(output_format, Format::Text));
            assert!(!no_color);
        }
        Commands::Serve {
            ..
        } => panic!("expected check")
    }
}

#[test]
fn test_parse_unknown_dialect() {
    assert!(Cli::try_parse_from(["sql-review-bot", "check", "--dialect", "cobol"]).is_err());
}
