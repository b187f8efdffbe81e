// tests/metrics_ingest.rs
use bupivacaine_news::ingest::config::IngestConfig;
use bupivacaine_news::ingest::providers::google_news::GoogleNewsRssProvider;
use bupivacaine_news::ingest::seen::MemorySeenStore;
use bupivacaine_news::metrics::Metrics;
use bupivacaine_news::run_once;
use chrono::{TimeZone, Utc};

const FEED_XML: &str = include_str!("fixtures/google_news_rss.xml");

#[tokio::test]
async fn run_metrics_render_to_textfile() {
    // Installs the global recorder; keep this the only test in the binary.
    let metrics = Metrics::init().expect("recorder");

    let tmp = tempfile::tempdir().unwrap();
    let cfg = IngestConfig {
        seen_path: tmp.path().join("seen.json"),
        out_dir: tmp.path().join("news"),
        ..Default::default()
    };
    let now = Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap();
    let provider = GoogleNewsRssProvider::from_fixture(FEED_XML);
    let store = MemorySeenStore::default();
    run_once(&provider, &store, &cfg, now).await.unwrap();

    let out = metrics.handle.render();
    assert!(out.contains("ingest_items_total"));
    assert!(out.contains("ingest_added_total"));
    assert!(out.contains("ingest_skipped_total{reason=\"stale\"}"));
    assert!(out.contains("ingest_parse_ms"));
    assert!(out.contains("ingest_last_run_ts"));

    let path = tmp.path().join("textfile").join("news_ingest.prom");
    metrics.write_textfile(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("ingest_added_total"));
}
