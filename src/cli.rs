use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// SQL Review Bot - lint and auto-fix SQL from chat slash commands
#[derive(Parser, Debug)]
#[command(name = "sql-review-bot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the webhook server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long, env = "SQL_REVIEW_PORT")]
        port: Option<u16>,

        /// SQL dialect passed to sqlfluff
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Maximum number of queries analyzed at the same time
        #[arg(long)]
        max_in_flight: Option<usize>
    },
    /// Lint a query locally and print the report
    Check {
        /// Path to SQL file (use - for stdin)
        #[arg(short, long, default_value = "-")]
        query: PathBuf,

        /// SQL dialect passed to sqlfluff
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

/// SQL dialects understood by sqlfluff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Ansi,
    Bigquery,
    Clickhouse,
    Duckdb,
    Mysql,
    Oracle,
    Postgres,
    Redshift,
    Snowflake,
    Sparksql,
    Sqlite,
    Tsql
}

impl Dialect {
    /// Name of the dialect as sqlfluff expects it on the command line
    pub fn as_sqlfluff(&self) -> &'static str {
        match self {
            Self::Ansi => "ansi",
            Self::Bigquery => "bigquery",
            Self::Clickhouse => "clickhouse",
            Self::Duckdb => "duckdb",
            Self::Mysql => "mysql",
            Self::Oracle => "oracle",
            Self::Postgres => "postgres",
            Self::Redshift => "redshift",
            Self::Snowflake => "snowflake",
            Self::Sparksql => "sparksql",
            Self::Sqlite => "sqlite",
            Self::Tsql => "tsql"
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml
}
