//! Crate-wide error type.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EchoError>;

/// Errors surfaced by echocache components.
///
/// The orchestration layer never lets any of these escape to an HTTP caller;
/// they exist so that lower layers can report *which* collaborator failed.
/// In particular a [`EchoError::Store`] is distinct from a cache miss — a
/// lookup failure must never be read as "key absent".
#[derive(Debug, Error)]
pub enum EchoError {
    /// The key-value store was unreachable or rejected an operation.
    #[error("cache store error: {0}")]
    Store(String),

    /// The origin completion service failed or returned an unusable reply.
    #[error("origin error: {0}")]
    Origin(String),

    /// Invalid or missing process configuration.
    #[error("config error: {0}")]
    Config(String),
}
