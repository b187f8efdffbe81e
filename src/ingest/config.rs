// src/ingest/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingest::record::CreatedAt;

pub const ENV_CONFIG_PATH: &str = "NEWS_INGEST_CONFIG";

pub const DEFAULT_FEED_URL: &str =
    "https://news.google.com/rss/search?q=bupivacaine+when:30d&hl=en-GB&gl=GB&ceid=GB:en";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; bupivacaine-news-bot/1.0)";
pub const DEFAULT_SEEN_PATH: &str = "data/seen.json";
pub const DEFAULT_OUT_DIR: &str = "src/content/news";

/// Where the job reads from and writes to. Keyword, recency window and
/// length caps are fixed in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub feed_url: String,
    pub user_agent: String,
    pub seen_path: PathBuf,
    pub out_dir: PathBuf,
    pub created_at: CreatedAt,
    /// Prometheus text file written after each run (node-exporter textfile collector).
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            seen_path: PathBuf::from(DEFAULT_SEEN_PATH),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            created_at: CreatedAt::default(),
            metrics_textfile: None,
        }
    }
}

/// Load config from an explicit path. TOML or JSON, picked by extension.
pub fn load_config_from(path: &Path) -> Result<IngestConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading ingest config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
        .with_context(|| format!("parsing ingest config {}", path.display()))
}

/// Load config using env var + fallbacks:
/// 1) $NEWS_INGEST_CONFIG
/// 2) config/ingest.toml
/// 3) config/ingest.json
/// 4) built-in defaults
pub fn load_config_default() -> Result<IngestConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_config_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/ingest.toml");
    if toml_p.exists() {
        return load_config_from(&toml_p);
    }
    let json_p = PathBuf::from("config/ingest.json");
    if json_p.exists() {
        return load_config_from(&json_p);
    }
    Ok(IngestConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<IngestConfig> {
    let cfg: IngestConfig = match hint_ext {
        "json" => serde_json::from_str(s)?,
        "toml" | "" => toml::from_str(s)?,
        other => bail!("unsupported config format: .{other}"),
    };
    if cfg.feed_url.trim().is_empty() {
        bail!("feed_url must not be empty");
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = parse_config(
            r#"
out_dir = "site/news"
created_at = "run_timestamp"
"#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.out_dir, PathBuf::from("site/news"));
        assert_eq!(cfg.created_at, CreatedAt::RunTimestamp);
        assert_eq!(cfg.seen_path, PathBuf::from(DEFAULT_SEEN_PATH));
        assert_eq!(cfg.feed_url, DEFAULT_FEED_URL);
    }

    #[test]
    fn json_and_unknown_keys() {
        let cfg = parse_config(r#"{"seen_path": "state/seen.json"}"#, "json").unwrap();
        assert_eq!(cfg.seen_path, PathBuf::from("state/seen.json"));
        assert!(parse_config(r#"keyword = "lidocaine""#, "toml").is_err());
        assert!(parse_config(r#"feed_url = " ""#, "toml").is_err());
        assert!(parse_config("x: 1", "yaml").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();

        env::remove_var(ENV_CONFIG_PATH);

        // nothing on disk -> defaults
        assert_eq!(load_config_default().unwrap(), IngestConfig::default());

        // fallback file in ./config/
        fs::create_dir_all("config").unwrap();
        fs::write("config/ingest.toml", r#"out_dir = "from-toml""#).unwrap();
        assert_eq!(load_config_default().unwrap().out_dir, PathBuf::from("from-toml"));

        // env wins
        let p = tmp.path().join("custom.json");
        fs::write(&p, r#"{"out_dir": "from-env"}"#).unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        assert_eq!(load_config_default().unwrap().out_dir, PathBuf::from("from-env"));

        // env pointing nowhere is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(load_config_default().is_err());
        env::remove_var(ENV_CONFIG_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
