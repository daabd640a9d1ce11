pub mod config;
pub mod error;
pub mod retry;
pub mod scoring;
pub mod types;

pub use config::{load_config, load_config_from, AeoConfig, ConfigLayer};
pub use error::AuditError;
pub use retry::{request_with_retry, RetryConfig};

/// Outbound User-Agent for every HTTP request this crate issues.
pub const USER_AGENT: &str = concat!("aeolint/", env!("CARGO_PKG_VERSION"));
