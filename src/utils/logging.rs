//! Logging utilities for the application
//!
//! Sets up a `tracing_subscriber` registry with an `EnvFilter`. The filter directive is taken from
//! `LOG_LEVEL`, then `RUST_LOG`, and defaults to `info`. Records emitted through the `log` facade
//! are forwarded into the same subscriber.
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolves the filter directive from `LOG_LEVEL` or `RUST_LOG`
fn filter_directive(log_level: Option<String>, rust_log: Option<String>) -> String {
	log_level
		.filter(|v| !v.trim().is_empty())
		.or_else(|| rust_log.filter(|v| !v.trim().is_empty()))
		.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

fn build_filter() -> EnvFilter {
	let directive = filter_directive(std::env::var("LOG_LEVEL").ok(), std::env::var("RUST_LOG").ok());
	EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Setup logging for the application, writing to stdout
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(std::io::stdout)?;
	Ok(())
}

/// Setup logging for the application with a custom writer
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry()
		.with(build_filter())
		.with(
			fmt::layer()
				.with_writer(writer)
				.event_format(
					fmt::format()
						.with_level(true)
						.with_target(true)
						.with_thread_ids(false)
						.with_thread_names(false)
						.with_ansi(false)
						.compact(),
				),
		)
		.try_init()?;
	Ok(())
}
