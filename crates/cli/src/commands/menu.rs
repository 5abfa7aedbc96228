//! `menu` command implementation (interactive loop).

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use contracts::PrintDevice;
use device_factory::DeviceFactory;
use ingestion::JsonLinesChatSource;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli::Cli;
use crate::error::CliError;
use crate::session::{write_chunk_report, write_relay_stats, Session};
use crate::settings::{load_blueprint, ConfigSource};

/// Menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Register,
    Chat,
    PrintFile,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Register),
            "2" => Some(Self::Chat),
            "3" => Some(Self::PrintFile),
            "4" | "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Execute the `menu` command
pub async fn run_menu(cli: &Cli) -> Result<()> {
    let blueprint = load_blueprint(&ConfigSource::from_cli(cli), cli.access_key.as_deref())?;
    let mut session = Session::memobird(blueprint)?;

    let mut input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    menu_loop(&mut session, &mut input, &mut out).await?;

    session.stats().print_summary();
    Ok(())
}

/// Drive the menu until "quit" or end of input
pub async fn menu_loop<F, R, W>(session: &mut Session<F>, input: &mut R, out: &mut W) -> Result<()>
where
    F: DeviceFactory,
    F::Device: PrintDevice + Sync,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        writeln!(out)?;
        writeln!(out, "1. register device")?;
        writeln!(out, "2. run chat listener")?;
        writeln!(out, "3. print file")?;
        writeln!(out, "4. quit")?;

        let Some(answer) = ask(input, out, "choose: ").await? else {
            break;
        };

        match MenuChoice::parse(&answer) {
            Some(MenuChoice::Register) => {
                let Some(device_id) = ask(input, out, "device id: ").await? else {
                    break;
                };
                match session.register_device(&device_id) {
                    Ok(()) => writeln!(out, "registered {}", device_id.trim())?,
                    Err(e) => {
                        warn!(error = %e, "Registration failed");
                        writeln!(out, "registration failed: {e:#}")?;
                    }
                }
            }
            Some(MenuChoice::Chat) => {
                writeln!(out, "listening for chat events ...")?;
                out.flush()?;
                let mut source = JsonLinesChatSource::new("stdin", &mut *input);
                match session.run_chat(&mut source).await {
                    Ok(stats) => write_relay_stats(out, &stats)?,
                    Err(e) => writeln!(out, "chat listener stopped: {e:#}")?,
                }
            }
            Some(MenuChoice::PrintFile) => {
                let Some(file) = ask(input, out, "file name: ").await? else {
                    break;
                };
                let Some(start) = ask(input, out, "beginning lines [0]: ").await? else {
                    break;
                };
                let start_line = match parse_start_line(&start) {
                    Ok(n) => n,
                    Err(e) => {
                        writeln!(out, "{e}")?;
                        continue;
                    }
                };

                info!(file = %file, start_line, "Printing file from menu");
                match session.print_file(Path::new(&file), start_line).await {
                    Ok(report) => write_chunk_report(out, &report)?,
                    Err(e) => writeln!(out, "print failed: {e:#}")?,
                }
            }
            Some(MenuChoice::Quit) => break,
            None => writeln!(out, "unknown choice: {answer}")?,
        }
    }
    Ok(())
}

/// Prompt and read one trimmed line, `None` at end of input
async fn ask<R, W>(input: &mut R, out: &mut W, prompt: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_start_line(input: &str) -> std::result::Result<usize, CliError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(0);
    }
    input
        .parse()
        .map_err(|_| CliError::invalid_input(format!("'{input}' is not a line number")))
}
