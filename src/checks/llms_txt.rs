//! llms.txt pillar: probe the well-known paths for llms.txt and llms-full.txt.

use reqwest::Client;
use url::Url;

use crate::core::types::LlmsTxtReport;

/// Probe `candidates` in order; the first 200 response with non-whitespace
/// content wins. A blank file does not count as found.
async fn probe_first(client: &Client, candidates: &[String]) -> Option<String> {
    for candidate in candidates {
        let Ok(response) = client.get(candidate).send().await else {
            continue;
        };
        if response.status().as_u16() != 200 {
            continue;
        }
        let Ok(body) = response.text().await else {
            continue;
        };
        if !body.trim().is_empty() {
            return Some(candidate.clone());
        }
    }
    None
}

/// Check for llms.txt and llms-full.txt at the site root and under
/// `/.well-known/`. Either file being present is enough for full pillar
/// marks; both probes run regardless so the report can name what exists.
pub async fn check_llms_txt(seed_url: &str, client: &Client) -> LlmsTxtReport {
    let origin = match Url::parse(seed_url) {
        Ok(p) => p.origin().ascii_serialization(),
        Err(_) => return LlmsTxtReport::default(),
    };

    let llms_candidates = [
        format!("{origin}/llms.txt"),
        format!("{origin}/.well-known/llms.txt"),
    ];
    let llms_full_candidates = [
        format!("{origin}/llms-full.txt"),
        format!("{origin}/.well-known/llms-full.txt"),
    ];

    let (url, llms_full_url) = futures::join!(
        probe_first(client, &llms_candidates),
        probe_first(client, &llms_full_candidates),
    );

    let found = url.is_some();
    let llms_full_found = llms_full_url.is_some();
    let detail = match (&url, &llms_full_url) {
        (Some(u), Some(f)) => format!("llms.txt found at {u}; llms-full.txt found at {f}"),
        (Some(u), None) => format!("llms.txt found at {u}"),
        (None, Some(f)) => format!("llms-full.txt found at {f}"),
        (None, None) => "No llms.txt or llms-full.txt found".to_string(),
    };

    LlmsTxtReport {
        found,
        url,
        llms_full_found,
        llms_full_url,
        score: 0.0,
        detail,
    }
}
