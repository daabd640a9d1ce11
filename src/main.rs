use anyhow::Result;
use tracing::{info, warn};

use aeolint::core::config::ConfigLayer;
use aeolint::tools::audit::{self, DEFAULT_CONCURRENCY};
use aeolint::{load_config, HistoryStore};

const USAGE: &str = "Usage: aeolint <url> [options]

Options:
  --single                 Audit only the given URL (skip discovery)
  --max-pages <n>          Page sample size for site audits
  --concurrency <n>        Concurrent page fetches (default 3)
  --timeout <seconds>      Per-request HTTP timeout
  --save                   Persist the report to the history store
  --history-db <path>      History store location (default ~/.aeolint/history.db)
  --fail-under <score>     Exit 1 when the overall score is below this
  --fail-on-blocked-bots   Exit 2 when any AI bot is blocked
  --verbose                Debug-level logging
";

/// Flags that consume the following argument.
const VALUE_FLAGS: [&str; 5] = [
    "--max-pages",
    "--concurrency",
    "--timeout",
    "--history-db",
    "--fail-under",
];

fn flag_value(args: &[String], name: &str) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == name {
            return iter.next().cloned();
        }
        if let Some(rest) = arg.strip_prefix(&format!("{name}=")) {
            return Some(rest.to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn positional_url(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_next = true;
            continue;
        }
        if !arg.starts_with('-') {
            return Some(arg.clone());
        }
    }
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = has_flag(&args, "--verbose");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(if verbose { "debug" } else { "info" })
        });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(url) = positional_url(&args) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let mut config = load_config();
    config.apply(ConfigLayer {
        timeout: flag_value(&args, "--timeout").and_then(|v| v.parse().ok()),
        max_pages: flag_value(&args, "--max-pages").and_then(|v| v.parse().ok()),
        single: has_flag(&args, "--single").then_some(true),
        verbose: verbose.then_some(true),
        save: has_flag(&args, "--save").then_some(true),
        regression_threshold: None,
        bots: None,
        format: None,
    });

    let concurrency = flag_value(&args, "--concurrency")
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CONCURRENCY);
    let fail_under: Option<f64> = flag_value(&args, "--fail-under").and_then(|v| v.parse().ok());
    let fail_on_blocked_bots = has_flag(&args, "--fail-on-blocked-bots");
    let timeout_secs = config.timeout as f64;
    let bots = config.bots.as_deref();

    let report = if config.single {
        match audit::audit_url(&url, timeout_secs, bots).await {
            Ok(report) => report,
            Err(e) => {
                eprintln!("audit failed: {e}");
                std::process::exit(1);
            }
        }
    } else {
        let progress = |message: &str| info!("{message}");
        match audit::audit_site(
            &url,
            config.max_pages,
            concurrency,
            timeout_secs,
            bots,
            Some(&progress),
        )
        .await
        {
            Ok(site_report) => {
                let report = site_report.as_audit_report();
                println!("{}", serde_json::to_string_pretty(&site_report)?);
                if config.save {
                    save_report(&args, &report);
                }
                std::process::exit(audit::exit_code(
                    report.overall_score,
                    &report.robots,
                    fail_under,
                    fail_on_blocked_bots,
                ));
            }
            Err(e) => {
                eprintln!("audit failed: {e}");
                std::process::exit(1);
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    if config.save {
        save_report(&args, &report);
    }
    std::process::exit(audit::exit_code(
        report.overall_score,
        &report.robots,
        fail_under,
        fail_on_blocked_bots,
    ));
}

/// History persistence is best-effort: a failed write is reported and the
/// audit result still stands.
fn save_report(args: &[String], report: &aeolint::AuditReport) {
    let store = match flag_value(args, "--history-db") {
        Some(path) => HistoryStore::open(path),
        None => HistoryStore::open_default(),
    };
    match store {
        Ok(store) => {
            match store.save(report) {
                Ok(id) => info!(id, url = %report.url, "report saved to history"),
                Err(e) => warn!("history save failed: {e}"),
            }
            store.close();
        }
        Err(e) => warn!("history store unavailable: {e}"),
    }
}
