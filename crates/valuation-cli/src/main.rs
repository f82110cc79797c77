//! valuation: score a company's latest annual figures and print the report.
//!
//! Usage:
//!   valuation AAPL
//!   valuation "Acme Corp" --data-dir ./statements
//!   valuation --snapshot snapshot.json --pretty
//!
//! The report goes to stdout as JSON. On failure stdout carries
//! `{"error": "..."}` and the process exits non-zero: 1 for bad configuration,
//! otherwise as in [`exit_code`].

mod config;

use clap::Parser;
use config::{CliConfig, LogFormat};
use serde_json::json;
use statement_loader::{read_snapshot_file, DirectorySnapshotProvider};
use std::path::PathBuf;
use std::process::ExitCode;
use valuation_core::{ValuationError, ValuationReport};
use valuation_engine::ValuationEngine;

const DEFAULT_LOG_FILTER: &str = "valuation=info,statement_loader=info,valuation_engine=warn";

#[derive(Parser, Debug)]
#[command(name = "valuation", version, about = "Multi-metric valuation verdict for one company")]
struct Cli {
    /// Ticker or company name to resolve from the data directory
    #[arg(required_unless_present = "snapshot", conflicts_with = "snapshot")]
    identifier: Option<String>,

    /// Score a raw snapshot JSON file instead of resolving an identifier
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Directory of statement bundles (overrides VALUATION_DATA_DIR)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            println!("{}", error_body(format!("{:#}", err)));
            return Ok(ExitCode::FAILURE);
        }
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    config.pretty |= cli.pretty;

    init_tracing(config.log_format);

    let (body, code) = match run(&cli, &config).await {
        Ok(report) => (serde_json::to_value(&report)?, ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!("Valuation failed: {}", err);
            (error_body(&err), ExitCode::from(exit_code(&err)))
        }
    };

    let output = if config.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{}", output);

    Ok(code)
}

async fn run(cli: &Cli, config: &CliConfig) -> Result<ValuationReport, ValuationError> {
    let engine = ValuationEngine::new();

    if let Some(path) = &cli.snapshot {
        tracing::info!("Scoring snapshot file {}", path.display());
        let snapshot = read_snapshot_file(path).await?;
        return engine.evaluate_scored(&snapshot, &path.display().to_string());
    }

    let identifier = cli.identifier.as_deref().unwrap_or_default();
    let provider = DirectorySnapshotProvider::new(&config.data_dir);
    tracing::info!(
        "Resolving '{}' from {}",
        identifier,
        provider.root().display()
    );
    engine.value_company(&provider, identifier).await
}

fn error_body(message: impl std::fmt::Display) -> serde_json::Value {
    json!({ "error": message.to_string() })
}

/// 2: the identifier or input was bad; 3: the data source failed;
/// 4: data resolved but could not be scored.
fn exit_code(err: &ValuationError) -> u8 {
    match err {
        ValuationError::UnresolvedIdentifier(_)
        | ValuationError::AmbiguousIdentifier { .. }
        | ValuationError::InvalidData(_) => 2,
        ValuationError::UpstreamUnavailable(_) => 3,
        ValuationError::IncompleteData(_) | ValuationError::NoMetrics(_) => 4,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_identifier_or_snapshot() {
        assert!(Cli::try_parse_from(["valuation"]).is_err());
        assert!(Cli::try_parse_from(["valuation", "AAPL", "--snapshot", "s.json"]).is_err());

        let cli = Cli::try_parse_from(["valuation", "Acme Corp", "--pretty"]).unwrap();
        assert_eq!(cli.identifier.as_deref(), Some("Acme Corp"));
        assert!(cli.pretty);

        let cli = Cli::try_parse_from(["valuation", "--snapshot", "s.json"]).unwrap();
        assert_eq!(cli.snapshot, Some(PathBuf::from("s.json")));
    }

    #[test]
    fn test_exit_codes_distinguish_failure_kinds() {
        assert_eq!(exit_code(&ValuationError::UnresolvedIdentifier("X".into())), 2);
        assert_eq!(
            exit_code(&ValuationError::AmbiguousIdentifier {
                query: "Acme".into(),
                candidates: vec!["ACM".into(), "ACMX".into()],
            }),
            2
        );
        assert_eq!(exit_code(&ValuationError::UpstreamUnavailable("down".into())), 3);
        assert_eq!(exit_code(&ValuationError::IncompleteData("quote".into())), 4);
        assert_eq!(exit_code(&ValuationError::NoMetrics("X".into())), 4);
    }

    #[test]
    fn test_config_error_renders_as_error_body() {
        let err = CliConfig::from_lookup(|key| (key == "LOG_FORMAT").then(|| "xml".to_string()))
            .unwrap_err();
        let body = error_body(format!("{:#}", err));
        assert_eq!(
            body,
            json!({ "error": "invalid LOG_FORMAT: unknown log format 'xml' (expected 'text' or 'json')" })
        );
    }

    #[test]
    fn test_valuation_error_renders_as_error_body() {
        let body = error_body(&ValuationError::UnresolvedIdentifier("Initech".into()));
        assert_eq!(body, json!({ "error": "No company found matching 'Initech'" }));
    }

    #[tokio::test]
    async fn test_run_scores_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(
            &path,
            json!({
                "ticker": "ACME",
                "enterpriseValue": 2.0e9,
                "ebitda": 2.0e8,
                "netIncome": 1.5e8,
                "marketCap": 2.1e9
            })
            .to_string(),
        )
        .unwrap();

        let cli = Cli::try_parse_from(["valuation", "--snapshot", path.to_str().unwrap()]).unwrap();
        let config = CliConfig {
            data_dir: dir.path().to_path_buf(),
            log_format: LogFormat::Text,
            pretty: false,
        };

        let report = run(&cli, &config).await.unwrap();
        assert_eq!(report.metrics.len(), 2);
        assert_eq!(report.overall.confidence, 100);
    }
}
