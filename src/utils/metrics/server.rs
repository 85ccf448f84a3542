//! Metrics server module
//!
//! This module provides an HTTP server to expose Prometheus metrics for scraping.

use actix_web::middleware::{Compress, DefaultHeaders, NormalizePath};
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tracing::{error, info};

use crate::utils::metrics::gather_metrics;

/// Metrics endpoint handler
async fn metrics_handler() -> impl Responder {
	match gather_metrics() {
		Ok(buffer) => HttpResponse::Ok()
			.content_type("text/plain; version=0.0.4; charset=utf-8")
			.body(buffer),
		Err(e) => {
			error!("Error gathering metrics: {}", e);
			HttpResponse::InternalServerError().finish()
		}
	}
}

/// Maps the configured address to an all-interfaces bind when running in a container
fn resolve_bind_address(bind_address: &str, in_docker: bool) -> String {
	if !in_docker {
		return bind_address.to_string();
	}
	match bind_address.split(':').nth(1) {
		Some(port) => format!("0.0.0.0:{}", port),
		None => "0.0.0.0:8081".to_string(),
	}
}

// Create metrics server
pub fn create_metrics_server(bind_address: String) -> std::io::Result<actix_web::dev::Server> {
	let in_docker = std::env::var("IN_DOCKER").unwrap_or_default() == "true";
	let actual_bind_address = resolve_bind_address(&bind_address, in_docker);

	info!(
		"Starting metrics server on {} (actual bind: {})",
		bind_address, actual_bind_address
	);

	Ok(HttpServer::new(move || {
		App::new()
			.wrap(Compress::default())
			.wrap(NormalizePath::trim())
			.wrap(DefaultHeaders::new())
			.route("/metrics", web::get().to(metrics_handler))
	})
	.workers(2)
	.bind(actual_bind_address)?
	.shutdown_timeout(5)
	.run())
}
