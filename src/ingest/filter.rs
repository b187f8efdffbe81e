// src/ingest/filter.rs
use chrono::{DateTime, Duration, Utc};

use crate::ingest::dates::published_at;
use crate::ingest::seen::SeenSet;
use crate::ingest::types::FeedItem;
use crate::ingest::{KEYWORD, RECENCY_DAYS};

/// Why an item did not become a content file. Filters run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Missing title, link or parseable publish time.
    Incomplete,
    /// Title does not mention the keyword.
    Irrelevant,
    /// Published outside the recency window.
    Stale,
    /// URL already in the seen-set.
    AlreadySeen,
    /// Output file already exists (slug collision).
    PathExists,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Incomplete => "incomplete",
            SkipReason::Irrelevant => "irrelevant",
            SkipReason::Stale => "stale",
            SkipReason::AlreadySeen => "already_seen",
            SkipReason::PathExists => "path_exists",
        }
    }
}

/// An item that passed the in-memory filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub published: DateTime<Utc>,
}

/// Redirector links are kept as-is; only surrounding whitespace goes.
pub fn normalize_url(url: Option<&str>) -> String {
    url.unwrap_or_default().trim().to_string()
}

pub fn is_relevant(title: &str) -> bool {
    title.to_lowercase().contains(KEYWORD)
}

/// Future-dated items count as recent.
pub fn within_days(published: DateTime<Utc>, now: DateTime<Utc>, days: i64) -> bool {
    now.signed_duration_since(published) <= Duration::days(days)
}

/// Completeness, relevance, recency and dedup, in that order.
/// The output-path check needs the filesystem and is left to the job.
pub fn check_item(
    item: &FeedItem,
    seen: &SeenSet,
    now: DateTime<Utc>,
) -> Result<Candidate, SkipReason> {
    let title = item.title.as_deref().unwrap_or_default().trim();
    let url = normalize_url(item.link.as_deref());
    if title.is_empty() || url.is_empty() {
        return Err(SkipReason::Incomplete);
    }
    let published = published_at(item).ok_or(SkipReason::Incomplete)?;

    if !is_relevant(title) {
        return Err(SkipReason::Irrelevant);
    }
    if !within_days(published, now, RECENCY_DAYS) {
        return Err(SkipReason::Stale);
    }
    if seen.contains(&url) {
        return Err(SkipReason::AlreadySeen);
    }

    Ok(Candidate {
        title: title.to_string(),
        url,
        published,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap()
    }

    fn item(title: &str, link: &str, iso: &str) -> FeedItem {
        FeedItem {
            title: Some(title.into()),
            link: Some(link.into()),
            iso_date: Some(iso.into()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_complete_relevant_recent_unseen() {
        let it = item("  BUPIVACAINE wins  ", " https://x/1 ", "2025-10-19T00:00:00Z");
        let c = check_item(&it, &SeenSet::default(), now()).unwrap();
        assert_eq!(c.title, "BUPIVACAINE wins");
        assert_eq!(c.url, "https://x/1");
    }

    #[test]
    fn missing_fields_are_incomplete_even_if_otherwise_valid() {
        let mut it = item("bupivacaine", "https://x/1", "2025-10-19T00:00:00Z");
        it.title = Some("   ".into());
        assert_eq!(check_item(&it, &SeenSet::default(), now()), Err(SkipReason::Incomplete));

        let mut it = item("bupivacaine", "https://x/1", "2025-10-19T00:00:00Z");
        it.link = None;
        assert_eq!(check_item(&it, &SeenSet::default(), now()), Err(SkipReason::Incomplete));

        let it = item("bupivacaine", "https://x/1", "not a date");
        assert_eq!(check_item(&it, &SeenSet::default(), now()), Err(SkipReason::Incomplete));
    }

    #[test]
    fn keyword_must_be_in_title() {
        let it = item("Lidocaine Update", "https://x/2", "2025-10-19T00:00:00Z");
        assert_eq!(check_item(&it, &SeenSet::default(), now()), Err(SkipReason::Irrelevant));
    }

    #[test]
    fn recency_window_is_inclusive_and_future_passes() {
        let edge = item("bupivacaine", "https://x/3", "2025-09-20T12:00:00Z");
        assert!(check_item(&edge, &SeenSet::default(), now()).is_ok());

        let old = item("bupivacaine", "https://x/3", "2025-09-20T11:59:59Z");
        assert_eq!(check_item(&old, &SeenSet::default(), now()), Err(SkipReason::Stale));

        let future = item("bupivacaine", "https://x/3", "2025-12-01T00:00:00Z");
        assert!(check_item(&future, &SeenSet::default(), now()).is_ok());
    }

    #[test]
    fn seen_url_is_rejected_after_trimming() {
        let seen = SeenSet::from_urls(["https://x/4"]);
        let it = item("bupivacaine", "https://x/4\n", "2025-10-19T00:00:00Z");
        assert_eq!(check_item(&it, &seen, now()), Err(SkipReason::AlreadySeen));
    }
}
