//! # Memo Relay CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 交互式菜单 (注册设备 / 聊天转发 / 打印文件)
//! - 非交互子命令

mod cli;
mod commands;
mod error;
mod session;
mod settings;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_chat, run_info, run_menu, run_print_file, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Memo Relay CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        None | Some(Commands::Menu) => run_menu(&cli).await,
        Some(Commands::Chat(args)) => run_chat(&cli, args).await,
        Some(Commands::PrintFile(args)) => run_print_file(&cli, args).await,
        Some(Commands::Validate(args)) => run_validate(&cli, args),
        Some(Commands::Info(args)) => run_info(&cli, args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging (and the optional metrics endpoint) based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    observability::init_with_config(ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: cli.metrics_port,
        default_log_level: ObservabilityConfig::level_for(cli.verbose, cli.quiet).to_string(),
    })
}
