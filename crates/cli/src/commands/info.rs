//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RelayBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, InfoArgs};
use crate::settings::{load_blueprint, ConfigSource};

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    memobird: MemobirdInfo,
    chat: ChatInfo,
    print: PrintInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    devices: Vec<DeviceInfo>,
}

#[derive(Serialize)]
struct MemobirdInfo {
    api_base: String,
    access_key_set: bool,
    request_timeout_ms: u64,
}

#[derive(Serialize)]
struct ChatInfo {
    mode: &'static str,
    pattern: String,
}

#[derive(Serialize)]
struct PrintInfo {
    chunk_read_lines: usize,
    chunk_policy: String,
    settle_delay_ms: u64,
    delivery_mode: String,
    poll_interval_ms: u64,
    timeout_ms: u64,
    dispatch: String,
    trailing_lines: String,
}

#[derive(Serialize)]
struct DeviceInfo {
    device_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_identifying: Option<String>,
}

/// Execute the `info` command
pub fn run_info(cli: &Cli, args: &InfoArgs) -> Result<()> {
    let source = ConfigSource::from_cli(cli);
    info!(config = %source.path.display(), "Loading configuration info");

    let blueprint = load_blueprint(&source, cli.access_key.as_deref())
        .with_context(|| format!("Failed to load config from {}", source.path.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &RelayBlueprint, args: &InfoArgs) -> ConfigInfo {
    let print = &blueprint.print;
    let devices = if args.devices {
        blueprint
            .devices
            .iter()
            .map(|d| DeviceInfo {
                device_id: d.device_id.clone(),
                user_identifying: d.user_identifying.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        memobird: MemobirdInfo {
            api_base: blueprint.memobird.api_base.clone(),
            access_key_set: !blueprint.memobird.access_key.is_empty(),
            request_timeout_ms: blueprint.memobird.request_timeout_ms,
        },
        chat: ChatInfo {
            mode: chat_mode(blueprint),
            pattern: blueprint.chat.pattern.clone(),
        },
        print: PrintInfo {
            chunk_read_lines: print.chunk_read_lines,
            chunk_policy: format!("{:?}", print.chunk_policy),
            settle_delay_ms: print.settle_delay_ms,
            delivery_mode: format!("{:?}", print.delivery_mode),
            poll_interval_ms: print.poll_interval_ms,
            timeout_ms: print.timeout_ms,
            dispatch: format!("{:?}", print.dispatch),
            trailing_lines: format!("{:?}", print.trailing_lines),
        },
        devices,
    }
}

fn chat_mode(blueprint: &RelayBlueprint) -> &'static str {
    if blueprint.chat.room {
        "room"
    } else {
        "direct"
    }
}

fn print_config_info(blueprint: &RelayBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Memo Relay Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let memobird = &blueprint.memobird;
    println!("🐦 Memobird");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ API base: {}", memobird.api_base);
    println!(
        "   ├─ Access key: {}",
        if memobird.access_key.is_empty() {
            "(not set)"
        } else {
            "(set)"
        }
    );
    println!("   └─ Request timeout: {} ms", memobird.request_timeout_ms);

    println!("\n💬 Chat");
    println!("   ├─ Mode: {}", chat_mode(blueprint));
    if blueprint.chat.pattern.is_empty() {
        println!("   └─ Pattern: (not set)");
    } else {
        println!("   └─ Pattern: {}", blueprint.chat.pattern);
    }

    let print = &blueprint.print;
    println!("\n🖨️  Print");
    println!(
        "   ├─ Chunks: {} lines, {:?}",
        print.chunk_read_lines, print.chunk_policy
    );
    println!("   ├─ Settle delay: {} ms", print.settle_delay_ms);
    println!("   ├─ Delivery: {:?}", print.delivery_mode);
    println!(
        "   ├─ Polling: every {} ms, timeout {} ms",
        print.poll_interval_ms, print.timeout_ms
    );
    println!("   ├─ Dispatch: {:?}", print.dispatch);
    println!("   └─ Trailing lines: {:?}", print.trailing_lines);

    println!("\n📠 Devices ({})", blueprint.devices.len());
    if args.devices {
        for (i, device) in blueprint.devices.iter().enumerate() {
            let is_last = i == blueprint.devices.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            match &device.user_identifying {
                Some(user) => println!("   {} {} (user {})", prefix, device.device_id, user),
                None => println!("   {} {}", prefix, device.device_id),
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DeviceConfig;

    #[test]
    fn test_devices_listed_only_on_request() {
        let mut blueprint = RelayBlueprint::default();
        blueprint.devices = vec![DeviceConfig::new("bird-1")];

        let hidden = build_config_info(
            &blueprint,
            &InfoArgs {
                json: true,
                devices: false,
            },
        );
        assert!(hidden.devices.is_empty());

        let shown = build_config_info(
            &blueprint,
            &InfoArgs {
                json: true,
                devices: true,
            },
        );
        assert_eq!(shown.devices[0].device_id, "bird-1");
        assert!(!shown.memobird.access_key_set);
    }
}
