//! Error types for the cafebot gateway

use thiserror::Error;

/// Result type alias for cafebot operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the cafebot gateway
///
/// Every variant here is caught at the dispatch bridge boundary and turned
/// into a textual tool result; nothing in this crate is fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Menu item, order, or function lookup failed
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation rejected because of the current session state
    /// (busy robot, no active order, already paid, empty order)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Argument or customization validation failed
    #[error("validation error: {0}")]
    Validation(String),

    /// A function name was registered twice
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
