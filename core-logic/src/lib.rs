//! # Core Logic - Shared Utilities for the Wallet Checker
//!
//! This crate provides the domain-independent plumbing used by the checker
//! binary: proxy rotation, retry policy, input loading, logging, worker
//! scheduling, and run metrics.
//!
//! ## Modules
//!
//! - [`config`] - Shared configuration structures
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Run metrics collection
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Utility modules (input loading, proxies, retry, runner)

// Module declarations - internal modules marked pub(crate)
pub mod config;
pub mod error;
pub mod metrics;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use config::ProxyConfig;
pub use error::{ApiError, ConfigError, CoreError, ResultsError, WalletError};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use traits::{Worker, WorkerStats};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    is_address, is_private_key, key_to_address, normalize_input, parse_proxy_line, setup_logger,
    LoggerGuards, ProxyManager, WalletEntry, WalletManager, WorkerRunner,
};

// Export retry utilities for the API client and tests
pub use utils::retry::{is_proxy_error, with_retry, RetryConfig};
