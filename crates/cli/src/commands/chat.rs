//! `chat` command implementation.

use anyhow::{Context, Result};
use ingestion::JsonLinesChatSource;
use tracing::info;

use crate::cli::{ChatArgs, Cli};
use crate::session::{write_relay_stats, Session};
use crate::settings::{load_blueprint, ConfigSource};

/// Execute the `chat` command
pub async fn run_chat(cli: &Cli, args: &ChatArgs) -> Result<()> {
    let blueprint = load_blueprint(&ConfigSource::from_cli(cli), cli.access_key.as_deref())?;
    let mut session = Session::memobird(blueprint)?;
    session.register_devices(&args.devices)?;

    info!(
        devices = session.dispatcher().device_count(),
        room = session.blueprint().chat.room,
        pattern = %session.blueprint().chat.pattern,
        "Starting chat relay"
    );

    let stats = match &args.events {
        Some(path) => {
            let mut source = JsonLinesChatSource::open(path)
                .await
                .with_context(|| format!("Failed to open event file {}", path.display()))?;
            session.run_chat(&mut source).await?
        }
        None => {
            let mut source = JsonLinesChatSource::stdin();
            session.run_chat(&mut source).await?
        }
    };

    write_relay_stats(&mut std::io::stdout(), &stats)?;
    session.stats().print_summary();
    Ok(())
}
