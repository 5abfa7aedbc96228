//! Session statistics.

use std::io::{self, Write};
use std::time::Duration;

use dispatcher::{ChunkReport, MetricsSnapshot, RelayStats};
use observability::DeliverySummary;

/// Statistics of a relay session
#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    /// Time since the session was created
    pub duration: Duration,

    /// Registered devices
    pub devices: usize,

    /// Round-robin slots consumed
    pub dispatches: usize,

    /// Delivery outcomes aggregated by the dispatcher
    pub delivery: DeliverySummary,

    /// Per-device counters in registration order
    pub per_device: Vec<(String, MetricsSnapshot)>,
}

impl SessionStats {
    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Session Statistics ===\n");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Devices: {}", self.devices);
        println!("Dispatches: {}", self.dispatches);
        println!();
        print!("{}", self.delivery);

        if !self.per_device.is_empty() {
            println!("Attempts:");
            for (device_id, snapshot) in &self.per_device {
                println!(
                    "  {}: {} attempts, {} delivered, {} failed",
                    device_id, snapshot.attempts, snapshot.delivered, snapshot.failed
                );
            }
        }
        println!();
    }
}

/// Write the outcome of one file run
pub fn write_chunk_report(out: &mut impl Write, report: &ChunkReport) -> io::Result<()> {
    writeln!(out, "\n=== Print Report ===")?;
    writeln!(out, "Lines read: {}", report.lines_read)?;
    writeln!(out, "Lines skipped: {}", report.lines_skipped)?;
    writeln!(out, "Blank lines: {}", report.blank_lines)?;
    writeln!(out, "Chunks flushed: {}", report.chunks_flushed)?;
    writeln!(
        out,
        "Deliveries: {} ok, {} failed",
        report.deliveries_succeeded, report.deliveries_failed
    )?;
    if report.trailing_dropped > 0 {
        writeln!(
            out,
            "Trailing lines dropped: {} (set print.trailing_lines = \"flush\" to print them)",
            report.trailing_dropped
        )?;
    }
    Ok(())
}

/// Write the outcome of one chat run
pub fn write_relay_stats(out: &mut impl Write, stats: &RelayStats) -> io::Result<()> {
    writeln!(out, "\n=== Chat Relay ===")?;
    writeln!(out, "Messages relayed: {}", stats.relayed)?;
    writeln!(out, "Messages ignored: {}", stats.ignored)?;
    writeln!(
        out,
        "Deliveries: {} ok, {} failed",
        stats.delivered, stats.failed
    )
}
