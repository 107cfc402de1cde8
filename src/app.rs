//! Application logic for the SQL Review Bot CLI.
//!
//! This module contains the command implementations separated from the main
//! entry point to enable testing.

use std::{
    fs::read_to_string,
    io::{self, IsTerminal, Read},
    net::{IpAddr, SocketAddr},
    sync::Arc,
    time::Duration
};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    catalog::Catalog,
    cli::{Dialect, Format},
    config::Config,
    delivery::{DeliveryChannel, HttpDelivery},
    error::{AppResult, config_error, file_read_error},
    intake::Intake,
    linter::{AnalysisResult, Analyzer, SqlFluff},
    output::{OutputFormat, OutputOptions, format_check_result},
    processor::CommandProcessor,
    report::ReportFormatter,
    server::{self, AppState}
};

/// Parameters for the serve command
#[derive(Debug, Clone, Default)]
pub struct ServeParams {
    pub host:          Option<String>,
    pub port:          Option<u16>,
    pub dialect:       Option<Dialect>,
    pub max_in_flight: Option<usize>
}

/// Parameters for the check command
#[derive(Debug, Clone)]
pub struct CheckParams {
    /// Path to SQL file or "-" for stdin
    pub query_path:    String,
    pub dialect:       Option<Dialect>,
    pub output_format: Format,
    pub no_color:      bool
}

/// Convert CLI format to internal OutputFormat
pub fn convert_format(format: Format) -> OutputFormat {
    match format {
        Format::Text => OutputFormat::Text,
        Format::Json => OutputFormat::Json,
        Format::Yaml => OutputFormat::Yaml
    }
}

/// Create output options from parameters
pub fn create_output_options(
    format: Format,
    no_color: bool,
    show_clean_sql: bool
) -> OutputOptions {
    OutputOptions {
        format: convert_format(format),
        colored: !no_color,
        show_clean_sql
    }
}

/// Calculate exit code for a check run
///
/// - `0` - No issues
/// - `1` - Diagnostics reported
/// - `2` - The linter could not run
pub fn calculate_exit_code(result: &AnalysisResult) -> i32 {
    if result.invocation_failed {
        2
    } else if !result.diagnostics.is_empty() {
        1
    } else {
        0
    }
}

/// Read query from file or stdin
pub fn read_query_input(path: &str) -> AppResult<String> {
    if path == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| file_read_error("stdin", e))?;
        Ok(buffer)
    } else {
        read_to_string(path).map_err(|e| file_read_error(path, e))
    }
}

/// Apply serve flags on top of the loaded configuration
pub fn apply_serve_params(config: &mut Config, params: &ServeParams) {
    if let Some(host) = &params.host {
        config.server.host = host.clone();
    }
    if let Some(port) = params.port {
        config.server.port = port;
    }
    if let Some(dialect) = params.dialect {
        config.linter.dialect = dialect;
    }
    if let Some(max) = params.max_in_flight {
        config.workers.max_in_flight = max;
    }
}

/// Resolve the listen address from configuration
pub fn listen_addr(config: &Config) -> AppResult<SocketAddr> {
    let ip: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|e| config_error(format!("Invalid host '{}': {}", config.server.host, e)))?;
    Ok(SocketAddr::new(ip, config.server.port))
}

/// Wire analyzer, formatter and delivery channel into an intake
pub fn build_intake(
    config: &Config,
    analyzer: Arc<dyn Analyzer>,
    channel: Arc<dyn DeliveryChannel>
) -> AppResult<Intake> {
    let catalog = Arc::new(Catalog::from_config(&config.report)?);
    let formatter = ReportFormatter::new(catalog, config.report.show_clean_sql);
    let processor = Arc::new(CommandProcessor::new(analyzer, formatter, channel));
    Ok(Intake::new(processor, config.workers.max_in_flight))
}

/// Run the webhook server
pub async fn run_serve(params: ServeParams, mut config: Config) -> AppResult<()> {
    apply_serve_params(&mut config, &params);
    config.validate()?;

    let addr = listen_addr(&config)?;
    let analyzer: Arc<dyn Analyzer> = Arc::new(SqlFluff::from_config(&config.linter)?);
    let channel: Arc<dyn DeliveryChannel> = Arc::new(HttpDelivery::from_config(&config.delivery));
    let intake = Arc::new(build_intake(&config, analyzer, channel)?);

    if config.delivery.bot_token.is_none() {
        tracing::warn!(
            event = "config.no_bot_token",
            "SLACK_BOT_TOKEN unset; results can only be delivered through response_url"
        );
    }
    tracing::info!(
        event = "config.loaded",
        dialect = config.linter.dialect.as_sqlfluff(),
        max_in_flight = config.workers.max_in_flight,
        locale = %config.report.locale,
        signed = config.server.signing_secret.is_some()
    );

    let state = AppState::new(intake, config.server.signing_secret.clone());
    server::serve(addr, state).await
}

/// Run the check command, returning the process exit code
pub async fn run_check(params: CheckParams, mut config: Config) -> AppResult<i32> {
    if let Some(dialect) = params.dialect {
        config.linter.dialect = dialect;
    }
    config.validate()?;

    let sql = read_query_input(&params.query_path)?;
    if sql.trim().is_empty() {
        return Err(config_error("No SQL query found in input"));
    }

    let catalog = Catalog::from_config(&config.report)?;
    let linter = SqlFluff::from_config(&config.linter)?;
    let output_opts = create_output_options(
        params.output_format,
        params.no_color,
        config.report.show_clean_sql
    );

    let pb = spinner(matches!(output_opts.format, OutputFormat::Text));
    let result = linter.analyze(&sql).await;
    pb.finish_and_clear();

    println!(
        "{}",
        format_check_result(&result, &catalog, linter.dialect(), &output_opts)
    );
    Ok(calculate_exit_code(&result))
}

fn spinner(visible: bool) -> ProgressBar {
    if !visible || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Running sqlfluff...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linter::{DiagnosticEntry, DiagnosticVec};

    fn entry(code: &str) -> DiagnosticEntry {
        DiagnosticEntry {
            code:        code.into(),
            raw_line:    format!("L:   1 | P:   1 | {} | x", code),
            line:        1,
            position:    1,
            description: "x".to_string()
        }
    }

    #[test]
    fn test_convert_format_text() {
        assert!(matches!(convert_format(Format::Text), OutputFormat::Text));
    }

    #[test]
    fn test_convert_format_json() {
        assert!(matches!(convert_format(Format::Json), OutputFormat::Json));
    }

    #[test]
    fn test_convert_format_yaml() {
        assert!(matches!(convert_format(Format::Yaml), OutputFormat::Yaml));
    }

    #[test]
    fn test_exit_code_clean() {
        let result = AnalysisResult::completed(DiagnosticVec::new(), "SELECT 1\n".to_string());
        assert_eq!(calculate_exit_code(&result), 0);
    }

    #[test]
    fn test_exit_code_diagnostics() {
        let mut diagnostics = DiagnosticVec::new();
        diagnostics.push(entry("L016"));
        let result = AnalysisResult::completed(diagnostics, String::new());
        assert_eq!(calculate_exit_code(&result), 1);
    }

    #[test]
    fn test_exit_code_failure() {
        assert_eq!(calculate_exit_code(&AnalysisResult::failed("boom")), 2);
    }

    #[test]
    fn test_create_output_options_no_color() {
        let opts = create_output_options(Format::Json, true, false);
        assert!(matches!(opts.format, OutputFormat::Json));
        assert!(!opts.colored);
        assert!(!opts.show_clean_sql);
    }

    #[test]
    fn test_apply_serve_params_overrides() {
        let mut config = Config::default();
        let params = ServeParams {
            host:          Some("127.0.0.1".to_string()),
            port:          Some(8080),
            dialect:       Some(Dialect::Postgres),
            max_in_flight: Some(2)
        };
        apply_serve_params(&mut config, &params);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.linter.dialect, Dialect::Postgres);
        assert_eq!(config.workers.max_in_flight, 2);
    }

    #[test]
    fn test_apply_serve_params_keeps_config() {
        let mut config = Config::default();
        apply_serve_params(&mut config, &ServeParams::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.linter.dialect, Dialect::Ansi);
    }

    #[test]
    fn test_listen_addr() {
        let config = Config::default();
        assert_eq!(listen_addr(&config).unwrap().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_listen_addr_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not an ip".to_string();
        assert!(listen_addr(&config).is_err());
    }

    #[test]
    fn test_read_query_input_missing_file() {
        assert!(read_query_input("/nonexistent/query.sql").is_err());
    }
}
