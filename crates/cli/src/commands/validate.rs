//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::RelayBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, ValidateArgs};
use crate::settings::{load_blueprint, ConfigSource};

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    api_base: String,
    chat_mode: &'static str,
    chunk_read_lines: usize,
    chunk_policy: String,
    delivery_mode: String,
    device_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(cli: &Cli, args: &ValidateArgs) -> Result<()> {
    let source = ConfigSource::from_cli(cli);
    info!(config = %source.path.display(), "Validating configuration");

    let result = validate_config(&source, cli.access_key.as_deref());

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(source: &ConfigSource, access_key: Option<&str>) -> ValidationResult {
    let config_path = source.path.display().to_string();

    if !source.path.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", source.path.display())),
            warnings: None,
            summary: None,
        };
    }

    match load_blueprint(source, access_key) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    api_base: blueprint.memobird.api_base.clone(),
                    chat_mode: if blueprint.chat.room { "room" } else { "direct" },
                    chunk_read_lines: blueprint.print.chunk_read_lines,
                    chunk_policy: format!("{:?}", blueprint.print.chunk_policy),
                    delivery_mode: format!("{:?}", blueprint.print.delivery_mode),
                    device_count: blueprint.devices.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RelayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.memobird.access_key.is_empty() {
        warnings.push(
            "memobird.access_key is empty - set it or MEMO_RELAY_ACCESS_KEY before running"
                .to_string(),
        );
    }

    if blueprint.chat.pattern.is_empty() {
        warnings.push("chat.pattern is empty - the chat command will refuse to start".to_string());
    }

    if blueprint.devices.is_empty() {
        warnings.push(
            "No devices configured - register them from the menu or with --device".to_string(),
        );
    }

    if blueprint.print.settle_delay_ms == 0 {
        warnings.push("print.settle_delay_ms is 0 - printers get no time to cool down".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  API base: {}", summary.api_base);
            println!("  Chat mode: {}", summary.chat_mode);
            println!(
                "  Chunks: {} lines, {}",
                summary.chunk_read_lines, summary.chunk_policy
            );
            println!("  Delivery: {}", summary.delivery_mode);
            println!("  Devices: {}", summary.device_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
