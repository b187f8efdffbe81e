// src/ingest/mod.rs
pub mod config;
pub mod dates;
pub mod filter;
pub mod providers;
pub mod record;
pub mod seen;
pub mod slug;
pub mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::ingest::config::IngestConfig;
use crate::ingest::filter::{check_item, SkipReason};
use crate::ingest::record::ContentRecord;
use crate::ingest::seen::SeenStore;
use crate::ingest::slug::file_stem;
use crate::ingest::types::FeedProvider;

/// Lowercase keyword a title must contain; also the single tag on every record.
pub const KEYWORD: &str = "bupivacaine";
pub const RECENCY_DAYS: i64 = 30;

/// One-time metrics registration (so series show up in the exported text).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_items_total", "Items parsed from the feed.");
        describe_counter!("ingest_added_total", "Content files written.");
        describe_counter!(
            "ingest_skipped_total",
            "Items not written, labelled by reason."
        );
        describe_counter!("ingest_fetch_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when the ingest job last ran.");
    });
}

/// Markup to plain text: strip tags, decode entities, collapse whitespace.
pub fn plain_text(s: &str) -> String {
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z!][^>]*>").unwrap());
    let stripped = re_tags.replace_all(s, " ");

    let decoded = html_escape::decode_html_entities(&stripped);

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub fetched: usize,
    pub added: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub written: Vec<PathBuf>,
}

impl IngestReport {
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
        counter!("ingest_skipped_total", "reason" => reason.as_str()).increment(1);
    }
}

/// Run the job once: load seen-set, fetch, filter, write new records,
/// persist the seen-set.
///
/// A fetch/parse error aborts before any record is written and before the
/// seen-set is saved. Filtered items are counted, never errors.
pub async fn run_once<P, S>(
    provider: &P,
    store: &S,
    cfg: &IngestConfig,
    now: DateTime<Utc>,
) -> Result<IngestReport>
where
    P: FeedProvider + ?Sized,
    S: SeenStore + ?Sized,
{
    ensure_metrics_described();

    fs::create_dir_all(&cfg.out_dir)
        .with_context(|| format!("creating output dir {}", cfg.out_dir.display()))?;
    let mut seen = store.load();

    let items = match provider.fetch_latest().await {
        Ok(items) => items,
        Err(e) => {
            counter!("ingest_fetch_errors_total").increment(1);
            return Err(e).with_context(|| format!("fetching feed from {}", provider.name()));
        }
    };

    tracing::info!(
        target: "ingest",
        provider = provider.name(),
        items = items.len(),
        seen = seen.len(),
        "feed fetched"
    );
    for it in items.iter().take(5) {
        tracing::debug!(
            target: "ingest",
            title = ?it.title,
            link = ?it.link,
            iso_date = ?it.iso_date,
            pub_date = ?it.pub_date,
            "sample item"
        );
    }

    let created_at = cfg.created_at.render(now);
    let mut report = IngestReport {
        fetched: items.len(),
        ..Default::default()
    };

    for item in &items {
        let candidate = match check_item(item, &seen, now) {
            Ok(c) => c,
            Err(reason) => {
                tracing::debug!(target: "ingest", reason = reason.as_str(), title = ?item.title, "item skipped");
                report.skip(reason);
                continue;
            }
        };

        let path = cfg
            .out_dir
            .join(format!("{}.md", file_stem(candidate.published, &candidate.title)));
        if path.exists() {
            tracing::debug!(target: "ingest", path = %path.display(), url = %candidate.url, "output exists, not overwriting");
            report.skip(SkipReason::PathExists);
            continue;
        }

        let record = ContentRecord::new(&candidate, item, created_at.clone());
        fs::write(&path, record.render_markdown())
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(target: "ingest", path = %path.display(), "content file written");

        seen.insert(candidate.url);
        report.added += 1;
        report.written.push(path);
    }

    store.save(&seen).context("saving seen-set")?;

    counter!("ingest_added_total").increment(report.added as u64);
    gauge!("ingest_last_run_ts").set(now.timestamp() as f64);

    Ok(report)
}
