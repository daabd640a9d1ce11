//! Pillar scoring: weights, tiers, and the overall Readiness Score.
//!
//! Scoring weights:
//!     Content  (max 40): most impactful — what LLMs actually extract and cite
//!     Schema   (max 25): structured signals help LLMs understand page entities
//!     Robots   (max 25): gatekeeper — blocked bots can't crawl at all
//!     llms.txt (max 10): forward-looking signal, minimal real impact today

use std::collections::HashSet;

use crate::core::types::{ContentReport, LlmsTxtReport, RobotsReport, SchemaReport};

/// (min_words, base_score) — evaluated top-down, first match wins.
pub const CONTENT_WORD_TIERS: [(usize, f64); 4] =
    [(1500, 25.0), (800, 20.0), (400, 15.0), (150, 8.0)];

pub const CONTENT_HEADING_BONUS: f64 = 7.0;
pub const CONTENT_LIST_BONUS: f64 = 5.0;
pub const CONTENT_CODE_BONUS: f64 = 3.0;
pub const CONTENT_MAX: f64 = 40.0;

pub const SCHEMA_BASE_SCORE: f64 = 8.0;
/// Types that get the larger per-type bonus: the ones AI answer engines cite.
pub const HIGH_VALUE_TYPES: [&str; 5] = ["FAQPage", "HowTo", "Article", "Product", "Recipe"];
pub const SCHEMA_HIGH_VALUE_BONUS: f64 = 5.0;
pub const SCHEMA_STANDARD_BONUS: f64 = 3.0;
pub const SCHEMA_MAX: f64 = 25.0;

pub const ROBOTS_MAX: f64 = 25.0;
pub const LLMS_TXT_MAX: f64 = 10.0;

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Robots pillar: proportional to the fraction of AI bots allowed.
pub fn score_robots(robots: &RobotsReport) -> f64 {
    if robots.found && !robots.bots.is_empty() {
        let allowed = robots.bots.iter().filter(|b| b.allowed).count();
        round1(ROBOTS_MAX * allowed as f64 / robots.bots.len() as f64)
    } else {
        0.0
    }
}

/// llms.txt pillar: either llms.txt or llms-full.txt qualifies for full marks.
pub fn score_llms_txt(llms_txt: &LlmsTxtReport) -> f64 {
    if llms_txt.found || llms_txt.llms_full_found {
        LLMS_TXT_MAX
    } else {
        0.0
    }
}

/// Schema pillar: base score for any JSON-LD plus per-unique-type bonuses,
/// high-value types rewarded more, capped at [`SCHEMA_MAX`].
pub fn score_schema_org(schema_org: &SchemaReport) -> f64 {
    if schema_org.blocks_found == 0 {
        return 0.0;
    }
    let unique_types: HashSet<&str> = schema_org
        .schemas
        .iter()
        .map(|s| s.schema_type.as_str())
        .collect();
    let high = unique_types
        .iter()
        .filter(|t| HIGH_VALUE_TYPES.contains(t))
        .count();
    let standard = unique_types.len() - high;
    (SCHEMA_BASE_SCORE + SCHEMA_HIGH_VALUE_BONUS * high as f64
        + SCHEMA_STANDARD_BONUS * standard as f64)
        .min(SCHEMA_MAX)
}

/// Content pillar: word-count tier plus structure bonuses, capped at [`CONTENT_MAX`].
pub fn score_content(content: &ContentReport) -> f64 {
    let mut score = 0.0;
    for (min_words, tier_score) in CONTENT_WORD_TIERS {
        if content.word_count >= min_words {
            score = tier_score;
            break;
        }
    }
    if content.has_headings {
        score += CONTENT_HEADING_BONUS;
    }
    if content.has_lists {
        score += CONTENT_LIST_BONUS;
    }
    if content.has_code_blocks {
        score += CONTENT_CODE_BONUS;
    }
    score.min(CONTENT_MAX)
}

/// Score all four pillars and return the freshly scored reports plus the
/// overall Readiness Score (their sum).
///
/// Pure projection: same inputs always produce the same outputs and nothing
/// outside the returned reports is touched.
pub fn compute_scores(
    mut robots: RobotsReport,
    mut llms_txt: LlmsTxtReport,
    mut schema_org: SchemaReport,
    mut content: ContentReport,
) -> (RobotsReport, LlmsTxtReport, SchemaReport, ContentReport, f64) {
    robots.score = score_robots(&robots);
    llms_txt.score = score_llms_txt(&llms_txt);
    schema_org.score = score_schema_org(&schema_org);
    content.score = score_content(&content);

    let overall = robots.score + llms_txt.score + schema_org.score + content.score;
    (robots, llms_txt, schema_org, content, overall)
}
