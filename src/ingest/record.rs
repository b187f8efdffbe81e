// src/ingest/record.rs
//! Content records: one markdown file (YAML front matter + body) per accepted item.
//!
//! The site build validates the front matter against its `news` collection
//! schema (`title`, `date` required; `source_name`, `source_url`, `tags`,
//! `summary`, `created_at` optional), so every field written here must stay
//! compatible with it.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::ingest::filter::Candidate;
use crate::ingest::types::FeedItem;
use crate::ingest::KEYWORD;

pub const SUMMARY_MAX_CHARS: usize = 240;
pub const DEFAULT_SOURCE_NAME: &str = "Google News";
pub const NO_SNIPPET_PLACEHOLDER: &str = "(No snippet provided by RSS feed.)";
pub const CREATED_AT_PLACEHOLDER: &str = "...";

/// What goes into the `created_at` front-matter field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreatedAt {
    /// Literal `"..."`, matching the files already published.
    #[default]
    Placeholder,
    /// The run's start time, ISO 8601.
    RunTimestamp,
}

impl CreatedAt {
    pub fn render(self, run_started: DateTime<Utc>) -> String {
        match self {
            CreatedAt::Placeholder => CREATED_AT_PLACEHOLDER.to_string(),
            CreatedAt::RunTimestamp => iso_instant(run_started),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub title: String,
    pub date: DateTime<Utc>,
    pub source_name: String,
    pub source_url: String,
    pub tags: Vec<String>,
    pub summary: String,
    pub created_at: String,
}

impl ContentRecord {
    pub fn new(candidate: &Candidate, item: &FeedItem, created_at: String) -> Self {
        Self {
            title: candidate.title.clone(),
            date: candidate.published,
            source_name: source_name(item),
            source_url: candidate.url.clone(),
            tags: vec![KEYWORD.to_string()],
            summary: summary_text(item),
            created_at,
        }
    }

    pub fn render_markdown(&self) -> String {
        let tags = serde_json::Value::from(self.tags.clone()).to_string();
        let extract = if self.summary.is_empty() {
            NO_SNIPPET_PLACEHOLDER
        } else {
            self.summary.as_str()
        };
        format!(
            "---\n\
             title: {title}\n\
             date: {date}\n\
             source_name: {source_name}\n\
             source_url: {source_url}\n\
             tags: {tags}\n\
             summary: {summary}\n\
             created_at: {created_at}\n\
             ---\n\
             \n\
             ## Source\n\
             \n\
             - {url}\n\
             \n\
             ## Extract\n\
             \n\
             {extract}\n",
            title = yaml_str(&self.title),
            date = yaml_str(&iso_instant(self.date)),
            source_name = yaml_str(&self.source_name),
            source_url = yaml_str(&self.source_url),
            summary = yaml_str(&self.summary),
            created_at = yaml_str(&self.created_at),
            url = self.source_url,
        )
    }
}

/// `2025-10-13T07:00:00.000Z`
pub fn iso_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// A JSON string literal is a valid YAML double-quoted scalar.
fn yaml_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

fn source_name(item: &FeedItem) -> String {
    non_empty(&item.creator)
        .or_else(|| non_empty(&item.author))
        .unwrap_or(DEFAULT_SOURCE_NAME)
        .to_string()
}

/// Snippet (else raw content), whitespace collapsed, capped at [`SUMMARY_MAX_CHARS`].
pub fn summary_text(item: &FeedItem) -> String {
    let raw = non_empty(&item.content_snippet)
        .or_else(|| non_empty(&item.content))
        .unwrap_or_default();
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(SUMMARY_MAX_CHARS)
        .collect()
}
