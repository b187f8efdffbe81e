// src/ingest/seen.rs
//! Seen-set: the URLs already turned into content files, remembered across runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// On-disk shape: `{ "urls": [ ... ] }`. Order is insertion order; any other
/// top-level keys are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeenSet {
    #[serde(default)]
    urls: Vec<String>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl SeenSet {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for u in urls {
            set.insert(u);
        }
        set
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// Appends `url` unless present. Returns whether it was added.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.contains(&url) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Pretty JSON (2-space indent) with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut s = serde_json::to_string_pretty(self).context("serializing seen-set")?;
        s.push('\n');
        Ok(s)
    }
}

/// Persistence seam for the seen-set.
///
/// `load` never fails: a missing or unreadable store is an empty set.
pub trait SeenStore {
    fn load(&self) -> SeenSet;
    fn save(&self, seen: &SeenSet) -> Result<()>;
}

/// JSON file store (the default, `data/seen.json`).
#[derive(Debug, Clone)]
pub struct JsonFileSeenStore {
    path: PathBuf,
}

impl JsonFileSeenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SeenStore for JsonFileSeenStore {
    fn load(&self) -> SeenSet {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(target: "ingest", path = %self.path.display(), error = %e, "seen-set not readable, starting empty");
                return SeenSet::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(seen) => seen,
            Err(e) => {
                tracing::warn!(target: "ingest", path = %self.path.display(), error = %e, "seen-set corrupt, starting empty");
                SeenSet::default()
            }
        }
    }

    fn save(&self, seen: &SeenSet) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(&self.path, seen.to_json()?)
            .with_context(|| format!("writing seen-set to {}", self.path.display()))
    }
}

/// In-memory store, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    inner: Mutex<SeenSet>,
    saves: AtomicUsize,
}

impl MemorySeenStore {
    pub fn new(seen: SeenSet) -> Self {
        Self {
            inner: Mutex::new(seen),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> SeenSet {
        self.inner.lock().expect("seen-set mutex poisoned").clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }
}

impl SeenStore for MemorySeenStore {
    fn load(&self) -> SeenSet {
        self.snapshot()
    }

    fn save(&self, seen: &SeenSet) -> Result<()> {
        *self.inner.lock().expect("seen-set mutex poisoned") = seen.clone();
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_order_and_skips_duplicates() {
        let mut s = SeenSet::default();
        assert!(s.insert("https://b"));
        assert!(s.insert("https://a"));
        assert!(!s.insert("https://b"));
        assert_eq!(s.urls(), &["https://b".to_string(), "https://a".to_string()]);
    }

    #[test]
    fn missing_and_corrupt_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSeenStore::new(dir.path().join("nope.json"));
        assert!(store.load().is_empty());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        assert!(JsonFileSeenStore::new(&bad).load().is_empty());
    }

    #[test]
    fn save_creates_parents_and_pretty_prints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("seen.json");
        let store = JsonFileSeenStore::new(&path);
        store.save(&SeenSet::from_urls(["https://example.com/a"])).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\n  \"urls\": [\n    \"https://example.com/a\"\n  ]\n}\n");
    }

    #[test]
    fn empty_set_serializes_as_empty_list() {
        assert_eq!(SeenSet::default().to_json().unwrap(), "{\n  \"urls\": []\n}\n");
    }

    #[test]
    fn extra_keys_survive_round_trip() {
        let raw = "{\n  \"urls\": [\n    \"u1\"\n  ],\n  \"note\": \"kept\"\n}\n";
        let seen: SeenSet = serde_json::from_str(raw).unwrap();
        assert_eq!(seen.to_json().unwrap(), raw);
    }
}
