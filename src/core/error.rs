use thiserror::Error;

/// Fatal audit failures. Everything recoverable (probe failures, bad pages,
/// parse errors) degrades into report fields instead of surfacing here.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("invalid seed URL '{url}': {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A bug, not an environment problem: aggregation preconditions broke.
    #[error("aggregation invariant violated: {0}")]
    Invariant(String),
}
