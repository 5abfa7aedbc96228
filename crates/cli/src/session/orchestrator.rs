//! Session orchestrator - coordinates registry, dispatcher and sources.
//!
//! One session lives for the whole process (menu) or one command run.
//! The rotation counter and the registered devices survive between runs.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{DeviceConfig, PrintDevice, RelayBlueprint};
use device_factory::{DeviceFactory, MemobirdFactory};
use dispatcher::{
    ChatRelay, ChunkReport, Chunker, ChunkerConfig, DeliveryConfig, Dispatcher, RelayStats,
};
use ingestion::{FileLineSource, JsonLinesChatSource, LineSourceConfig};
use tokio::io::AsyncBufRead;
use tracing::{info, instrument};

use super::SessionStats;

/// Relay session
pub struct Session<F: DeviceFactory> {
    blueprint: RelayBlueprint,
    factory: F,
    dispatcher: Dispatcher<F::Device>,
    started: Instant,
}

impl Session<MemobirdFactory> {
    /// Session talking to the Memobird open API
    ///
    /// A missing access key only fails once a device is registered.
    pub fn memobird(blueprint: RelayBlueprint) -> Result<Self> {
        let factory = MemobirdFactory::new(&blueprint.memobird)
            .context("Failed to set up the Memobird client")?;
        Self::new(blueprint, factory)
    }
}

impl<F> Session<F>
where
    F: DeviceFactory,
    F::Device: PrintDevice + Sync,
{
    /// Create a session and register the `[[devices]]` from configuration
    pub fn new(blueprint: RelayBlueprint, factory: F) -> Result<Self> {
        let delivery = DeliveryConfig::from(&blueprint.print);
        let dispatcher =
            Dispatcher::new(Default::default(), delivery).with_strategy(blueprint.print.dispatch);

        let mut session = Self {
            blueprint,
            factory,
            dispatcher,
            started: Instant::now(),
        };

        let configured = session.blueprint.devices.clone();
        for config in &configured {
            session.register(config)?;
        }
        info!(
            devices = session.dispatcher.device_count(),
            policy = ?session.blueprint.print.chunk_policy,
            mode = ?session.blueprint.print.delivery_mode,
            "Session ready"
        );
        Ok(session)
    }

    pub fn blueprint(&self) -> &RelayBlueprint {
        &self.blueprint
    }

    pub fn dispatcher(&self) -> &Dispatcher<F::Device> {
        &self.dispatcher
    }

    /// Register one more device by id
    pub fn register_device(&mut self, device_id: &str) -> Result<()> {
        self.register(&DeviceConfig::new(device_id.trim()))
    }

    /// Register every id (e.g. repeated `--device` flags)
    pub fn register_devices<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        for id in ids {
            self.register_device(id.as_ref())?;
        }
        Ok(())
    }

    fn register(&mut self, config: &DeviceConfig) -> Result<()> {
        self.dispatcher
            .register(&self.factory, config)
            .with_context(|| format!("Failed to register device '{}'", config.device_id))?;
        info!(device_id = %config.device_id, "Device registered");
        Ok(())
    }

    /// Print `path` chunk by chunk, skipping the first `start_line` lines
    #[instrument(name = "session_print_file", skip(self, path), fields(path = %path.display()))]
    pub async fn print_file(&self, path: &Path, start_line: usize) -> Result<ChunkReport> {
        let mut source = FileLineSource::open(path, LineSourceConfig::default())
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let config = ChunkerConfig::from_print(&self.blueprint.print, start_line);
        let report = Chunker::new(&self.dispatcher, config)
            .run(&mut source)
            .await
            .with_context(|| format!("Failed while printing {}", path.display()))?;

        info!(
            lines = report.lines_read,
            chunks = report.chunks_flushed,
            "File printed"
        );
        Ok(report)
    }

    /// Relay chat messages until the event stream ends
    pub async fn run_chat<R>(&self, source: &mut JsonLinesChatSource<R>) -> Result<RelayStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut relay = ChatRelay::from_config(&self.dispatcher, &self.blueprint.chat)
            .context("Chat relay is not configured")?;
        source
            .run(&mut relay)
            .await
            .with_context(|| format!("Chat event source '{}' failed", source.name()))?;
        Ok(relay.stats().clone())
    }

    /// Snapshot of the session so far
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            duration: self.started.elapsed(),
            devices: self.dispatcher.device_count(),
            dispatches: self.dispatcher.dispatch_count(),
            delivery: self.dispatcher.summary(),
            per_device: self.dispatcher.metrics(),
        }
    }
}
