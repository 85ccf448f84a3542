//! Utility modules for common functionality.
//!
//! This module provides various utility functions and types that are used across
//! the application. Currently includes:
//!
//! - http: Retryable HTTP client construction
//! - logging: Logging utilities
//! - metrics: Metrics utilities

pub mod http;
pub mod logging;
pub mod metrics;
