pub mod content;
pub mod llms_txt;
pub mod robots;
pub mod schema_org;

pub use content::check_content;
pub use llms_txt::check_llms_txt;
pub use robots::{check_robots, default_ai_bots, DEFAULT_AI_BOTS};
pub use schema_org::check_schema_org;
