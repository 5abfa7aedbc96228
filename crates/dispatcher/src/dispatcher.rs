//! Dispatcher - device selection over the registry

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use contracts::{DeliveryOutcome, DeviceConfig, DispatchStrategy, PrintDevice};
use device_factory::{DeviceFactory, DeviceRegistry};
use futures::future::join_all;
use observability::{DeliveryMetricsAggregator, DeliverySummary};
use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::delivery::{deliver, DeliveryConfig};
use crate::error::Result;
use crate::metrics::{DeviceMetrics, MetricsSnapshot};

/// The Dispatcher that picks a device for every text
///
/// Owns the registry and the rotation counter. The counter starts at zero,
/// advances once per dispatch to a non-empty registry and is never reset.
pub struct Dispatcher<D> {
    registry: DeviceRegistry<D>,
    metrics: Vec<Arc<DeviceMetrics>>,
    counter: AtomicUsize,
    delivery: DeliveryConfig,
    strategy: DispatchStrategy,
    aggregator: Mutex<DeliveryMetricsAggregator>,
}

impl<D: PrintDevice> Dispatcher<D> {
    /// Create a dispatcher over an existing registry
    pub fn new(registry: DeviceRegistry<D>, delivery: DeliveryConfig) -> Self {
        let metrics = (0..registry.len())
            .map(|_| Arc::new(DeviceMetrics::new()))
            .collect();
        observability::record_registered_devices(registry.len());
        Self {
            registry,
            metrics,
            counter: AtomicUsize::new(0),
            delivery,
            strategy: DispatchStrategy::default(),
            aggregator: Mutex::new(DeliveryMetricsAggregator::new()),
        }
    }

    /// Set the strategy used by [`Dispatcher::send`]
    pub fn with_strategy(mut self, strategy: DispatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Register a device through `factory` and append it to the rotation
    pub fn register<F>(&mut self, factory: &F, config: &DeviceConfig) -> Result<&D>
    where
        F: DeviceFactory<Device = D>,
    {
        self.registry.register(factory, config)?;
        self.metrics.push(Arc::new(DeviceMetrics::new()));
        observability::record_registered_devices(self.registry.len());
        Ok(&self.registry.list()[self.registry.len() - 1])
    }

    /// Append an already built device
    pub fn push(&mut self, device: D) {
        self.registry.push(device);
        self.metrics.push(Arc::new(DeviceMetrics::new()));
        observability::record_registered_devices(self.registry.len());
    }

    pub fn registry(&self) -> &DeviceRegistry<D> {
        &self.registry
    }

    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    pub fn delivery_config(&self) -> &DeliveryConfig {
        &self.delivery
    }

    /// Current value of the rotation counter
    pub fn dispatch_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    /// Metrics for all devices, in registration order
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.registry
            .list()
            .iter()
            .zip(&self.metrics)
            .map(|(d, m)| (d.device_id().to_string(), m.snapshot()))
            .collect()
    }

    /// Summary of every dispatch so far (outcomes, latency, per device)
    pub fn summary(&self) -> DeliverySummary {
        self.aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    /// Dispatch according to the configured strategy
    pub async fn send(&self, text: &str) -> DeliveryOutcome {
        match self.strategy {
            DispatchStrategy::RoundRobin => self.send_orderly(text).await,
            DispatchStrategy::Random => self.send_randomly(text).await,
        }
    }

    /// Dispatch to the next device in registration order
    ///
    /// An empty registry yields `NoDevices` and leaves the counter untouched.
    #[instrument(name = "dispatcher_send_orderly", skip(self, text))]
    pub async fn send_orderly(&self, text: &str) -> DeliveryOutcome {
        let len = self.registry.len();
        if len == 0 {
            debug!("no registered devices, skipping dispatch");
            return self.aggregate(DeliveryOutcome::NoDevices, Duration::ZERO);
        }
        let slot = self.counter.fetch_add(1, Ordering::SeqCst);
        self.deliver_to(slot % len, text).await
    }

    /// Dispatch to a uniformly random device
    #[instrument(name = "dispatcher_send_randomly", skip(self, text))]
    pub async fn send_randomly(&self, text: &str) -> DeliveryOutcome {
        let len = self.registry.len();
        if len == 0 {
            debug!("no registered devices, skipping dispatch");
            return self.aggregate(DeliveryOutcome::NoDevices, Duration::ZERO);
        }
        let index = rand::rng().random_range(0..len);
        self.deliver_to(index, text).await
    }

    /// Dispatch every text concurrently and wait for all of them
    ///
    /// Each text takes one rotation slot, in input order.
    pub async fn send_all(&self, texts: &[String]) -> Vec<DeliveryOutcome> {
        join_all(texts.iter().map(|text| self.send(text))).await
    }

    async fn deliver_to(&self, index: usize, text: &str) -> DeliveryOutcome {
        let Some(device) = self.registry.get(index) else {
            return DeliveryOutcome::NoDevices;
        };
        debug!(index, device_id = %device.device_id(), "device selected");

        let metrics = &self.metrics[index];
        metrics.inc_attempts();

        let started = Instant::now();
        let outcome = deliver(device, text, &self.delivery).await;

        let elapsed = started.elapsed();
        metrics.record(&outcome);
        observability::record_delivery(&outcome, elapsed);
        self.aggregate(outcome, elapsed)
    }

    fn aggregate(&self, outcome: DeliveryOutcome, elapsed: Duration) -> DeliveryOutcome {
        self.aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(&outcome, elapsed);
        outcome
    }
}
