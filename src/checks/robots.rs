//! Robots pillar: fetch robots.txt once per site and decide, per AI bot,
//! whether the seed path may be crawled.

use reqwest::Client;
use texting_robots::Robot;
use tracing::debug;
use url::Url;

use crate::core::types::{BotAccess, RobotsReport};

/// AI crawler user-agents checked by default. Passed in as a slice so tests
/// and callers can substitute their own list.
pub const DEFAULT_AI_BOTS: [&str; 13] = [
    "GPTBot",
    "ChatGPT-User",
    "Google-Extended",
    "ClaudeBot",
    "PerplexityBot",
    "Amazonbot",
    "OAI-SearchBot",
    "DeepSeek-AI",
    "Grok",
    "Meta-ExternalAgent",
    "cohere-ai",
    "AI2Bot",
    "ByteSpider",
];

pub fn default_ai_bots() -> Vec<String> {
    DEFAULT_AI_BOTS.iter().map(|s| (*s).to_string()).collect()
}

fn not_found(detail: impl Into<String>) -> (RobotsReport, Option<String>) {
    (
        RobotsReport {
            found: false,
            bots: Vec::new(),
            score: 0.0,
            detail: detail.into(),
        },
        None,
    )
}

/// Decide whether `bot` may fetch `path` under `robots_txt`.
///
/// Group selection and longest-match rule precedence follow the robots
/// exclusion standard: an explicit group for the bot shadows `*`, the most
/// specific matching rule wins, and Allow wins ties. An unparseable file
/// defaults to open access.
pub fn bot_allowed(robots_txt: &str, bot: &str, path: &str) -> bool {
    match Robot::new(bot, robots_txt.as_bytes()) {
        Ok(robot) => robot.allowed(path),
        Err(e) => {
            debug!(bot, error = %e, "robots.txt unparseable, defaulting to allowed");
            true
        }
    }
}

/// Fetch `{origin}/robots.txt` and evaluate every bot against the seed path.
///
/// Returns the pillar report plus the raw robots.txt body; later stages
/// (discovery filtering) re-read the raw text rather than refetching.
/// HTTP and network failures are non-fatal: they collapse to `found = false`.
pub async fn check_robots(
    seed_url: &str,
    client: &Client,
    bots: &[String],
) -> (RobotsReport, Option<String>) {
    let parsed = match Url::parse(seed_url) {
        Ok(p) => p,
        Err(e) => return not_found(format!("Invalid URL: {e}")),
    };
    let origin = parsed.origin().ascii_serialization();
    let robots_url = format!("{origin}/robots.txt");
    let seed_path = parsed.path().to_string();

    let response = match client.get(&robots_url).send().await {
        Ok(r) => r,
        Err(e) => return not_found(format!("robots.txt fetch failed: {e}")),
    };
    if response.status().as_u16() != 200 {
        return not_found(format!(
            "No robots.txt found (HTTP {})",
            response.status().as_u16()
        ));
    }
    let raw_text = match response.text().await {
        Ok(t) => t,
        Err(e) => return not_found(format!("robots.txt read failed: {e}")),
    };

    let bot_results: Vec<BotAccess> = bots
        .iter()
        .map(|bot| {
            let allowed = bot_allowed(&raw_text, bot, &seed_path);
            BotAccess {
                bot: bot.clone(),
                allowed,
                detail: if allowed {
                    "Allowed".to_string()
                } else {
                    "Blocked".to_string()
                },
            }
        })
        .collect();

    let allowed_count = bot_results.iter().filter(|b| b.allowed).count();
    let report = RobotsReport {
        found: true,
        detail: format!("{allowed_count}/{} AI bots allowed", bot_results.len()),
        bots: bot_results,
        score: 0.0,
    };
    (report, Some(raw_text))
}
