//! Regression detection — compare the current audit against a stored baseline.

use crate::core::scoring::round1;
use crate::core::types::{AuditReport, PillarDelta, RegressionReport};

pub const DEFAULT_REGRESSION_THRESHOLD: f64 = 5.0;

fn pillar_delta(pillar: &str, previous: f64, current: f64) -> PillarDelta {
    PillarDelta {
        pillar: pillar.to_string(),
        previous,
        current,
        delta: round1(current - previous),
    }
}

/// Diff `current` against `previous`. A regression is a strict drop of the
/// overall score beyond `threshold`; an exact-threshold drop does not count.
pub fn detect_regression(
    current: &AuditReport,
    previous: &AuditReport,
    threshold: f64,
) -> RegressionReport {
    let delta = round1(current.overall_score - previous.overall_score);
    let pillars = vec![
        pillar_delta("robots", previous.robots.score, current.robots.score),
        pillar_delta("llms_txt", previous.llms_txt.score, current.llms_txt.score),
        pillar_delta(
            "schema_org",
            previous.schema_org.score,
            current.schema_org.score,
        ),
        pillar_delta("content", previous.content.score, current.content.score),
    ];
    RegressionReport {
        url: current.url.clone(),
        previous_score: previous.overall_score,
        current_score: current.overall_score,
        delta,
        has_regression: delta < -threshold,
        threshold,
        pillars,
    }
}
