//! Metrics module for the application.
//!
//! - This module contains the global Prometheus registry.
//! - Defines the listener's failure and progress metrics.

pub mod server;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

lazy_static! {
	// Global Prometheus registry.
	pub static ref REGISTRY: Registry = Registry::new();

	// Counter for failed poll cycles and failed handler invocations.
	pub static ref FAILURES: IntCounter = {
		let counter = IntCounter::new(
			"eth_listener_ethclient_failures_total",
			"Number of listener failures"
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Gauge for the highest block selected by the latest poll.
	pub static ref LATEST_BLOCK: IntGauge = {
		let gauge = IntGauge::new(
			"eth_listener_ethclient_latest_block",
			"Highest block selected for processing"
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};

	// Counter Vector for handler failures per trigger
	pub static ref TRIGGER_FAILURES: IntCounterVec = {
		let counter = IntCounterVec::new(
			Opts::new("eth_listener_trigger_failures_total", "Number of handler failures per trigger"),
			&["kind", "trigger"]
		).unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Gauge Vector for the committed watermark per trigger
	pub static ref TRIGGER_LATEST_BLOCK: IntGaugeVec = {
		let gauge = IntGaugeVec::new(
			Opts::new("eth_listener_trigger_latest_block", "Latest block committed per trigger"),
			&["kind", "trigger"]
		).unwrap();
		REGISTRY.register(Box::new(gauge.clone())).unwrap();
		gauge
	};
}

/// Gather all metrics and encode into the provided format.
pub fn gather_metrics() -> Result<Vec<u8>, Box<dyn std::error::Error>> {
	let encoder = TextEncoder::new();
	let metric_families = REGISTRY.gather();
	let mut buffer = Vec::new();
	encoder.encode(&metric_families, &mut buffer)?;
	Ok(buffer)
}

/// Records a failed poll cycle or handler invocation.
pub fn monitor_failure() {
	FAILURES.inc();
}

/// Records the upper bound selected for a poll cycle.
pub fn monitor_latest_block(height: u64) {
	LATEST_BLOCK.set(i64::try_from(height).unwrap_or(i64::MAX));
}

/// Records a handler failure for one trigger; also counted in the global failures.
pub fn monitor_trigger_failure(kind: &str, trigger: &str) {
	FAILURES.inc();
	TRIGGER_FAILURES.with_label_values(&[kind, trigger]).inc();
}

/// Records the watermark committed for one trigger.
pub fn monitor_trigger_latest_block(kind: &str, trigger: &str, height: u64) {
	TRIGGER_LATEST_BLOCK
		.with_label_values(&[kind, trigger])
		.set(i64::try_from(height).unwrap_or(i64::MAX));
}

/// Serializes unit tests that touch or assert on the global failure counter.
#[cfg(test)]
pub(crate) static FAILURES_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
