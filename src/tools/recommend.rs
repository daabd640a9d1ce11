//! Recommendation engine — turn an audit report into prioritized,
//! impact-estimated actions.

use std::collections::BTreeSet;

use crate::core::scoring::{
    round1, CONTENT_MAX, HIGH_VALUE_TYPES, LLMS_TXT_MAX, ROBOTS_MAX, SCHEMA_MAX,
};
use crate::core::types::{AuditReport, Recommendation};

/// Priority from the gap relative to the pillar max: >= 50% high, >= 25% medium.
fn priority_for_gap(gap: f64, max_score: f64) -> &'static str {
    let ratio = if max_score > 0.0 { gap / max_score } else { 0.0 };
    if ratio >= 0.5 {
        "high"
    } else if ratio >= 0.25 {
        "medium"
    } else {
        "low"
    }
}

fn robots_recommendations(report: &AuditReport, recs: &mut Vec<Recommendation>) {
    let robots = &report.robots;
    let gap = ROBOTS_MAX - robots.score;
    if gap <= 0.0 {
        return;
    }

    if !robots.found {
        recs.push(Recommendation {
            pillar: "robots".to_string(),
            action: "Create a robots.txt file".to_string(),
            estimated_impact: round1(gap),
            priority: priority_for_gap(gap, ROBOTS_MAX).to_string(),
            detail: "No robots.txt was found. Create one that allows AI bots \
                     (GPTBot, ClaudeBot, PerplexityBot, etc.) to crawl your site."
                .to_string(),
        });
        return;
    }

    let blocked: Vec<&str> = robots
        .bots
        .iter()
        .filter(|b| !b.allowed)
        .map(|b| b.bot.as_str())
        .collect();
    if !blocked.is_empty() {
        let per_bot_impact = round1(gap / blocked.len() as f64);
        recs.push(Recommendation {
            pillar: "robots".to_string(),
            action: format!("Unblock {} AI bot(s) in robots.txt", blocked.len()),
            estimated_impact: round1(gap),
            priority: priority_for_gap(gap, ROBOTS_MAX).to_string(),
            detail: format!(
                "The following AI bots are blocked: {}. Each bot unblocked adds \
                 ~{per_bot_impact} points to the Robots score.",
                blocked.join(", ")
            ),
        });
    }
}

fn llms_txt_recommendations(report: &AuditReport, recs: &mut Vec<Recommendation>) {
    let llms = &report.llms_txt;
    if !llms.found && !llms.llms_full_found {
        recs.push(Recommendation {
            pillar: "llms_txt".to_string(),
            action: "Create an llms.txt file".to_string(),
            estimated_impact: LLMS_TXT_MAX,
            priority: priority_for_gap(LLMS_TXT_MAX, LLMS_TXT_MAX).to_string(),
            detail: "No llms.txt was found. Create one at /llms.txt to help AI \
                     models understand your site's structure and content."
                .to_string(),
        });
    } else if llms.found && !llms.llms_full_found {
        recs.push(Recommendation {
            pillar: "llms_txt".to_string(),
            action: "Add an llms-full.txt file".to_string(),
            estimated_impact: 0.0,
            priority: "low".to_string(),
            detail: "You have llms.txt but no llms-full.txt. Adding a detailed \
                     llms-full.txt gives AI models richer context about your content."
                .to_string(),
        });
    }
}

fn schema_recommendations(report: &AuditReport, recs: &mut Vec<Recommendation>) {
    let schema = &report.schema_org;
    let gap = SCHEMA_MAX - schema.score;
    if gap <= 0.0 {
        return;
    }

    let existing: BTreeSet<&str> = schema
        .schemas
        .iter()
        .map(|s| s.schema_type.as_str())
        .collect();
    let missing_high_value: Vec<&str> = HIGH_VALUE_TYPES
        .iter()
        .copied()
        .filter(|t| !existing.contains(t))
        .collect();
    let suggested = {
        let mut sorted = missing_high_value.clone();
        sorted.sort_unstable();
        sorted.into_iter().take(3).collect::<Vec<_>>().join(", ")
    };

    if schema.blocks_found == 0 {
        recs.push(Recommendation {
            pillar: "schema".to_string(),
            action: "Add Schema.org JSON-LD structured data".to_string(),
            estimated_impact: round1(gap),
            priority: priority_for_gap(gap, SCHEMA_MAX).to_string(),
            detail: format!(
                "No JSON-LD blocks found. Add high-value types like {suggested} \
                 to help AI engines understand your page structure."
            ),
        });
    } else if !missing_high_value.is_empty() {
        let impact = gap.min(5.0 * missing_high_value.len() as f64);
        recs.push(Recommendation {
            pillar: "schema".to_string(),
            action: "Add high-value Schema.org types".to_string(),
            estimated_impact: round1(impact),
            priority: priority_for_gap(gap, SCHEMA_MAX).to_string(),
            detail: format!(
                "Consider adding these high-value types: {suggested}. High-value \
                 types (FAQPage, HowTo, Article, Product, Recipe) receive a \
                 larger scoring bonus."
            ),
        });
    }
}

fn content_recommendations(report: &AuditReport, recs: &mut Vec<Recommendation>) {
    let content = &report.content;
    let gap = CONTENT_MAX - content.score;
    if gap <= 0.0 {
        return;
    }

    if content.word_count < 400 {
        let impact = gap.min(15.0);
        recs.push(Recommendation {
            pillar: "content".to_string(),
            action: "Add more content to the page".to_string(),
            estimated_impact: round1(impact),
            priority: priority_for_gap(gap, CONTENT_MAX).to_string(),
            detail: format!(
                "Page has only {} words. Aim for at least 400-800 words of \
                 substantive content for better AI engine citation.",
                content.word_count
            ),
        });
    }

    if !content.has_headings {
        let impact = gap.min(7.0);
        recs.push(Recommendation {
            pillar: "content".to_string(),
            action: "Add heading structure (H2/H3)".to_string(),
            estimated_impact: round1(impact),
            priority: priority_for_gap(impact, CONTENT_MAX).to_string(),
            detail: "No headings found. Add H2/H3 headings to structure your \
                     content into clear sections. This helps AI engines parse and \
                     cite specific sections."
                .to_string(),
        });
    }

    if !content.has_lists {
        let impact = gap.min(5.0);
        recs.push(Recommendation {
            pillar: "content".to_string(),
            action: "Add structured lists (ul/ol)".to_string(),
            estimated_impact: round1(impact),
            priority: priority_for_gap(impact, CONTENT_MAX).to_string(),
            detail: "No lists found. Bullet or numbered lists make content more \
                     scannable and extractable by AI engines."
                .to_string(),
        });
    }

    if content.readability_grade.is_some_and(|g| g > 12.0) {
        let impact = gap.min(3.0);
        let grade = content.readability_grade.unwrap_or_default();
        recs.push(Recommendation {
            pillar: "content".to_string(),
            action: "Simplify readability".to_string(),
            estimated_impact: round1(impact),
            priority: "medium".to_string(),
            detail: format!(
                "Readability grade is {grade:.1} (target: 8-12). Simplify \
                 sentences and use common vocabulary for better AI extraction."
            ),
        });
    }

    if content.answer_first_ratio < 0.3 && content.has_headings {
        let impact = gap.min(3.0);
        recs.push(Recommendation {
            pillar: "content".to_string(),
            action: "Restructure for answer-first pattern".to_string(),
            estimated_impact: round1(impact),
            priority: "medium".to_string(),
            detail: format!(
                "Only {:.0}% of sections lead with a direct answer. Start each \
                 section with a concise answer before elaborating.",
                content.answer_first_ratio * 100.0
            ),
        });
    }
}

/// Analyze a report and produce actionable recommendations, sorted by
/// estimated impact descending.
pub fn generate_recommendations(report: &AuditReport) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = Vec::new();
    robots_recommendations(report, &mut recs);
    llms_txt_recommendations(report, &mut recs);
    schema_recommendations(report, &mut recs);
    content_recommendations(report, &mut recs);
    recs.sort_by(|a, b| {
        b.estimated_impact
            .partial_cmp(&a.estimated_impact)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    recs
}
