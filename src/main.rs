//! # SQL Review Bot
//!
//! Chat-integrated SQL review powered by [sqlfluff](https://sqlfluff.com).
//!
//! A user types `/sql SELECT ...` in Slack. The bot answers right away with
//! an acknowledgment, lints and auto-fixes the query in the background, and
//! posts the translated diagnostics plus the corrected SQL back into the
//! conversation.
//!
//! # Architecture
//!
//! ```text
//! webhook ──▶ Intake ──ack──▶ HTTP 200
//!               │
//!               └─spawn─▶ CommandProcessor ─▶ SqlFluff (lint, fix)
//!                                 │
//!                                 ├─▶ ReportFormatter (Catalog)
//!                                 └─▶ DeliveryChannel ─▶ response_url / chat.postMessage
//! ```
//!
//! The acknowledgment and the result travel on separate channels: Slack
//! drops slash commands that do not answer within three seconds, while a
//! sqlfluff run can take longer than that.
//!
//! # Quick Start
//!
//! ```bash
//! # Serve the webhook
//! export SLACK_BOT_TOKEN="xoxb-..."
//! export SLACK_SIGNING_SECRET="..."
//! sql-review-bot serve --port 5000 --dialect postgres
//!
//! # Review a file locally
//! sql-review-bot check -q query.sql --dialect postgres
//!
//! # Machine-readable output
//! echo "select a from t" | sql-review-bot check -f json
//! ```
//!
//! # Exit Codes (`check`)
//!
//! - `0` - No issues
//! - `1` - Diagnostics reported
//! - `2` - sqlfluff could not run, or configuration error
//!
//! # Modules
//!
//! - `intake` - Validation, admission and acknowledgment
//! - `processor` - Background analyze, format and deliver
//! - `linter` - sqlfluff invocation and output parsing
//! - `catalog` - Localized messages and diagnostic translations
//! - `report` - Chat message rendering
//! - `delivery` - Posting results back to the chat
//! - `server` - HTTP routes and request signing
//! - `config` - Configuration loading

use std::process;

use clap::Parser;
use sql_review_bot::{
    app::{CheckParams, ServeParams, run_check, run_serve},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult,
    logging::init_tracing
};
use tokio::main;

#[main]
async fn main() {
    match run().await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

async fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing(&config.log)?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            dialect,
            max_in_flight
        } => {
            let params = ServeParams {
                host,
                port,
                dialect,
                max_in_flight
            };
            run_serve(params, config).await?;
            Ok(0)
        }
        Commands::Check {
            query,
            dialect,
            output_format,
            no_color
        } => {
            let params = CheckParams {
                query_path: query.display().to_string(),
                dialect,
                output_format,
                no_color
            };
            run_check(params, config).await
        }
    }
}
