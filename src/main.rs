//! `fetch-news`: one ingestion run.
//! Polls the news feed, writes new markdown files into the site's content
//! collection and updates the seen-set. Meant to be triggered by an external
//! scheduler (cron, CI); exits 1 on any fatal error.

use std::process::ExitCode;

use bupivacaine_news::ingest::config::load_config_default;
use bupivacaine_news::ingest::providers::google_news::GoogleNewsRssProvider;
use bupivacaine_news::ingest::seen::JsonFileSeenStore;
use bupivacaine_news::metrics::Metrics;
use bupivacaine_news::{run_once, IngestConfig, IngestReport};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("NEWS_LOG_JSON").is_ok_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cfg: &IngestConfig) -> anyhow::Result<IngestReport> {
    let provider = GoogleNewsRssProvider::from_url(cfg.feed_url.as_str(), &cfg.user_agent)?;
    let store = JsonFileSeenStore::new(&cfg.seen_path);
    run_once(&provider, &store, cfg, chrono::Utc::now()).await
}

/// Process status for a run outcome: 0 on success (any number of new
/// pages), 1 on any fatal error.
fn exit_status(outcome: &anyhow::Result<IngestReport>) -> u8 {
    match outcome {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match load_config_default() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = ?e, "config load failed");
            return ExitCode::FAILURE;
        }
    };

    let metrics = match cfg.metrics_textfile.as_ref().map(|_| Metrics::init()).transpose() {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(error = ?e, "metrics disabled");
            None
        }
    };

    let outcome = run(&cfg).await;

    if let (Some(m), Some(path)) = (&metrics, &cfg.metrics_textfile) {
        if let Err(e) = m.write_textfile(path) {
            tracing::warn!(error = ?e, path = %path.display(), "metrics textfile not written");
        }
    }

    let status = exit_status(&outcome);
    match &outcome {
        Ok(report) => {
            tracing::info!(
                target: "ingest",
                fetched = report.fetched,
                added = report.added,
                skipped = ?report.skipped,
                "ingest finished"
            );
            println!("Added {} new page(s).", report.added);
        }
        Err(e) => tracing::error!(error = ?e, "ingest failed"),
    }
    ExitCode::from(status)
}
