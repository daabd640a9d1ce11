pub mod checks;
pub mod core;
pub mod crawler;
pub mod discovery;
pub mod features;
pub mod tools;

// --- Primary core exports ---
pub use self::core::config::{load_config, load_config_from, AeoConfig, ConfigLayer};
pub use self::core::error::AuditError;
pub use self::core::retry::{request_with_retry, RetryConfig};
pub use self::core::scoring;
pub use self::core::types;
pub use self::core::types::*;
pub use self::core::USER_AGENT;

// --- Pipeline surface ---
pub use checks::{check_content, check_llms_txt, check_robots, check_schema_org, DEFAULT_AI_BOTS};
pub use crawler::{fetch_pages, HttpPageFetcher, PageFetcher};
pub use discovery::{discover_pages, normalize_url};
pub use features::history::{self, HistoryStore};
pub use tools::audit::{audit_site, audit_url, audit_urls, ensure_scheme, exit_code};
pub use tools::recommend::generate_recommendations;
pub use tools::regression::detect_regression;
