pub mod audit;
pub mod recommend;
pub mod regression;

pub use audit::{audit_site, audit_url, audit_urls, exit_code};
pub use recommend::generate_recommendations;
pub use regression::detect_regression;
