//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Unified error type for core-logic operations.
///
/// This enum wraps all specific error types and provides a unified
/// error interface for the application layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Config(ConfigError),

    #[error(transparent)]
    Wallet(WalletError),

    #[error(transparent)]
    Api(ApiError),

    #[error(transparent)]
    Results(ResultsError),

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        CoreError::Config(e)
    }
}

impl From<WalletError> for CoreError {
    fn from(e: WalletError) -> Self {
        CoreError::Wallet(e)
    }
}

impl From<ApiError> for CoreError {
    fn from(e: ApiError) -> Self {
        CoreError::Api(e)
    }
}

impl From<ResultsError> for CoreError {
    fn from(e: ResultsError) -> Self {
        CoreError::Results(e)
    }
}

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error reading {path}: {msg}")]
    IoError { path: String, msg: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("No proxies available. Add proxies to the proxy file")]
    NoProxies,

    #[error("Invalid proxy entry: '{line}'. Expected host:port or host:port:login:password")]
    InvalidProxy { line: String },
}

/// Wallet input and key-derivation errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Invalid private key format: expected hex string")]
    InvalidKeyFormat,

    #[error("Private key has wrong length: expected 64 hex chars, got {length}")]
    InvalidKeyLength { length: usize },

    #[error("Failed to derive address from private key: {reason}")]
    DerivationFailed { reason: String },

    #[error("No valid addresses or private keys found in {path}")]
    NoValidEntries { path: String },
}

/// Wallet-data API and proxy-transport errors
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Proxy authentication required (407) at {endpoint}: check proxy login/password")]
    ProxyAuthRequired { endpoint: String },

    #[error("Proxy failure: {reason}")]
    ProxyFailure { reason: String },

    #[error("Request timeout after {timeout_ms}ms to {endpoint}")]
    Timeout { timeout_ms: u64, endpoint: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpStatus { status_code: u16, endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Request to {endpoint} failed after {attempts} attempts. Last error: {last_error}")]
    Exhausted {
        attempts: u32,
        endpoint: String,
        last_error: String,
    },
}

/// Result-file sink errors
#[derive(Error, Debug, Clone)]
pub enum ResultsError {
    #[error("Failed to create results directory {path}: {msg}")]
    CreateDirFailed { path: String, msg: String },

    #[error("Failed to write result file {path}: {msg}")]
    WriteFailed { path: String, msg: String },
}
