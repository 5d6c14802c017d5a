//! Mock API transformer CLI entry point.
//!
//! Validates one request body against a service and prints the composed
//! response body.

use anyhow::{bail, Context, Result};
use clap::Parser;
use mockapi_transformer::{MockApiAgent, MockApiConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "mockapi-transformer")]
#[command(
    author,
    version,
    about = "Request validation and canned response selection for mock APIs"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fixture directory path
    #[arg(long, env = "MOCKAPI_FIXTURES_DIR")]
    fixtures_dir: Option<PathBuf>,

    /// Service to run the request through
    #[arg(short, long)]
    service: Option<String>,

    /// Request body file ("-" reads stdin)
    #[arg(short, long, default_value = "-")]
    request: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,

    /// List enabled services and exit.
    #[arg(long)]
    list_services: bool,
}

fn print_example_config() {
    let example = r#"# Mock API Transformer Configuration Example
version: "1"

settings:
  # Directory holding the response fixtures
  fixtures_dir: "__files"
  # Load the built-in export transaction services
  builtin_services: true
  # Maximum accepted request body size (bytes)
  max_body_size: 1048576

services:
  # Replaces the built-in service of the same name
  - name: "efirc-adjustment"
    description: "eFIRC adjustment"
    success_file: "efirc-adjustment-success.json"
    fail_file: "efirc-adjustment-failure.json"
    # Report every failing field instead of stopping at the first
    exhaustive: true
    messages: detailed
    echo_header:
      section: "response-header"
      fields:
        - from: "request-id"
          to: "req-hdr-request-id"
    echo_errors:
      section: "service-output"
    internal_error: "Internal transformer error"
    rules:
      - field: "fircNumber"
        label: "FIRC Number"
        code: "EF_HDR_001"
        max_length: 50
      - field: "adCode"
        label: "AD Code"
        code: "EF_HDR_002"
        max_length: 7

  - name: "softex-extension"
    success_file: "softex-extension-success.json"
    fail_file: "softex-extension-failure.json"
    rules:
      - field: "exportType"
        exact_length: 1
        one_of: ["1", "2"]
      - field: "formNo"
        max_length: 20
        when:
          field: "exportType"
          equals: "2"
      - field: "letterDate"
        mandatory: false
        pattern: '\d{2}/\d{2}/\d{4}'
"#;
    println!("{}", example);
}

async fn read_request(source: &str) -> Result<Vec<u8>> {
    if source == "-" {
        let mut body = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut body)
            .await
            .context("Failed to read request from stdin")?;
        Ok(body)
    } else {
        tokio::fs::read(source)
            .await
            .with_context(|| format!("Failed to read request file: {}", source))
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if args.example_config {
        print_example_config();
        return Ok(ExitCode::SUCCESS);
    }

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        if config_path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        }
    } else {
        MockApiConfig::default()
    };

    // Override fixture directory from CLI
    if let Some(dir) = &args.fixtures_dir {
        config.settings.fixtures_dir = dir.to_string_lossy().to_string();
    }

    let agent = MockApiAgent::with_fixtures_dir(config).context("Invalid configuration")?;

    if args.validate {
        info!("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    if args.list_services {
        for name in agent.service_names() {
            let description = agent
                .service(name)
                .map(|s| s.description.as_str())
                .unwrap_or_default();
            println!("{}\t{}", name, description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(service) = args.service.as_deref() else {
        bail!("--service is required (see --list-services)");
    };

    let body = read_request(&args.request).await?;
    let response = agent.handle(service, &body).await;

    info!(
        service,
        status = response.status,
        "Request handled"
    );
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    Ok(if response.status == mockapi_transformer::agent::STATUS_OK {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
