//! `print-file` command implementation.

use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{Cli, PrintFileArgs};
use crate::session::{write_chunk_report, Session};
use crate::settings::{load_blueprint, ConfigSource};

/// Execute the `print-file` command
pub async fn run_print_file(cli: &Cli, args: &PrintFileArgs) -> Result<()> {
    let blueprint = load_blueprint(&ConfigSource::from_cli(cli), cli.access_key.as_deref())?;
    let mut session = Session::memobird(blueprint)?;
    session.register_devices(&args.devices)?;

    if session.dispatcher().device_count() == 0 {
        warn!("No devices registered, chunks will not be printed");
    }

    info!(
        file = %args.file.display(),
        start_line = args.start_line,
        "Printing file"
    );

    let report = session.print_file(&args.file, args.start_line).await?;

    write_chunk_report(&mut std::io::stdout(), &report)?;
    session.stats().print_summary();
    Ok(())
}
