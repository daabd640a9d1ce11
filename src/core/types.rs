use serde::{Deserialize, Serialize};

/// Access decision for a single AI crawler user-agent.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BotAccess {
    pub bot: String,
    pub allowed: bool,
    pub detail: String,
}

/// Robots pillar: which AI bots may crawl the seed path.
///
/// When `found` is `false` the bot list is empty and the pillar scores 0.
/// The raw robots.txt body is not part of the report; it travels alongside
/// (see `checks::robots::check_robots`) because discovery re-reads it.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RobotsReport {
    pub found: bool,
    #[serde(default)]
    pub bots: Vec<BotAccess>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub detail: String,
}

/// llms.txt pillar: presence of llms.txt / llms-full.txt at the well-known paths.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LlmsTxtReport {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub llms_full_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llms_full_url: Option<String>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub detail: String,
}

/// One JSON-LD candidate object: its `@type` label and top-level property names.
///
/// `schema_type` is comma-joined when `@type` is a list and `"Unknown"` when absent.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SchemaOrgResult {
    pub schema_type: String,
    #[serde(default)]
    pub properties: Vec<String>,
}

/// Schema.org pillar: JSON-LD coverage of a page (or aggregated over a site).
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SchemaReport {
    #[serde(default)]
    pub blocks_found: usize,
    #[serde(default)]
    pub schemas: Vec<SchemaOrgResult>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub detail: String,
}

/// Content pillar: density and structure analysis of the extracted markdown.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ContentReport {
    #[serde(default)]
    pub word_count: usize,
    #[serde(default)]
    pub char_count: usize,
    #[serde(default)]
    pub has_headings: bool,
    #[serde(default)]
    pub has_lists: bool,
    #[serde(default)]
    pub has_code_blocks: bool,
    #[serde(default)]
    pub chunk_count: usize,
    #[serde(default)]
    pub avg_chunk_words: usize,
    #[serde(default)]
    pub chunks_in_sweet_spot: usize,
    /// Flesch-Kincaid grade level; absent when the page has fewer than 30 words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability_grade: Option<f64>,
    #[serde(default)]
    pub heading_count: usize,
    #[serde(default = "default_true")]
    pub heading_hierarchy_valid: bool,
    #[serde(default)]
    pub answer_first_ratio: f64,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub detail: String,
}

fn default_true() -> bool {
    true
}

/// Per-page outcome inside a site audit.
///
/// `url` is the URL as crawled (for display); dedup and depth weighting use
/// the normalized form.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PageAudit {
    pub url: String,
    pub schema_org: SchemaReport,
    pub content: ContentReport,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Outcome of sitemap-first / spider-fallback page discovery.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscoveryResult {
    /// `"sitemap"` or `"spider"`.
    pub method: String,
    /// Pre-dedup URL count from the winning phase.
    pub urls_found: usize,
    /// Diversity sample, seed URL always first.
    pub urls_sampled: Vec<String>,
    #[serde(default)]
    pub detail: String,
}

/// Single-page audit report.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuditReport {
    pub url: String,
    pub overall_score: f64,
    pub robots: RobotsReport,
    pub llms_txt: LlmsTxtReport,
    pub schema_org: SchemaReport,
    pub content: ContentReport,
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Site-wide audit report with per-page detail.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SiteAuditReport {
    pub url: String,
    pub domain: String,
    pub overall_score: f64,
    pub robots: RobotsReport,
    pub llms_txt: LlmsTxtReport,
    /// Depth-weighted aggregate over audited pages.
    pub schema_org: SchemaReport,
    /// Depth-weighted aggregate over audited pages.
    pub content: ContentReport,
    pub discovery: DiscoveryResult,
    pub pages: Vec<PageAudit>,
    pub pages_audited: usize,
    pub pages_failed: usize,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl SiteAuditReport {
    /// Flatten the site report into the single-page shape used for
    /// persistence, regression diffing, and recommendations.
    pub fn as_audit_report(&self) -> AuditReport {
        AuditReport {
            url: self.url.clone(),
            overall_score: self.overall_score,
            robots: self.robots.clone(),
            llms_txt: self.llms_txt.clone(),
            schema_org: self.schema_org.clone(),
            content: self.content.clone(),
            errors: self.errors.clone(),
        }
    }
}

/// Result of fetching one page through the page-fetch collaborator.
///
/// Never constructed from an `Err`: failures set `success = false` with a
/// populated `error` and empty bodies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PageCrawl {
    pub url: String,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub markdown: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Best-effort same-host links found on the page; `None` when extraction
    /// was not attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_links: Option<Vec<String>>,
}

impl PageCrawl {
    pub fn failure(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            html: String::new(),
            markdown: String::new(),
            success: false,
            error: Some(error.into()),
            internal_links: None,
        }
    }
}

/// Compact history index row; the full report lives in the blob column.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    /// ISO-8601 UTC, assigned at insert time.
    pub timestamp: String,
    pub overall_score: f64,
    pub robots_score: f64,
    pub llms_txt_score: f64,
    pub schema_org_score: f64,
    pub content_score: f64,
}

/// Score change for a single pillar between two audits.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PillarDelta {
    pub pillar: String,
    pub previous: f64,
    pub current: f64,
    /// current - previous; negative means the pillar got worse.
    pub delta: f64,
}

/// Result of diffing the current audit against the previous baseline.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegressionReport {
    pub url: String,
    pub previous_score: f64,
    pub current_score: f64,
    pub delta: f64,
    /// True when the overall score dropped strictly more than `threshold`.
    pub has_regression: bool,
    pub threshold: f64,
    pub pillars: Vec<PillarDelta>,
}

/// A prioritized, impact-estimated action derived from an audit report.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Recommendation {
    pub pillar: String,
    pub action: String,
    pub estimated_impact: f64,
    /// `"high"`, `"medium"`, or `"low"`, from the gap as a fraction of the
    /// pillar max.
    pub priority: String,
    pub detail: String,
}
