// src/ingest/dates.rs
//! Publish-time extraction. Feeds carry the timestamp in different fields;
//! extractors run in order and the first one that parses wins.

use chrono::{DateTime, NaiveDate, Utc};

use crate::ingest::types::FeedItem;

pub type DateExtractor = fn(&FeedItem) -> Option<DateTime<Utc>>;

/// Precedence: ISO field first, then the RSS pubDate.
pub const DATE_EXTRACTORS: &[DateExtractor] = &[from_iso_date, from_pub_date];

pub fn published_at(item: &FeedItem) -> Option<DateTime<Utc>> {
    DATE_EXTRACTORS.iter().find_map(|extract| extract(item))
}

pub fn from_iso_date(item: &FeedItem) -> Option<DateTime<Utc>> {
    item.iso_date.as_deref().and_then(parse_rfc3339)
}

pub fn from_pub_date(item: &FeedItem) -> Option<DateTime<Utc>> {
    let s = item.pub_date.as_deref()?;
    parse_rfc2822(s).or_else(|| parse_rfc3339(s))
}

fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // bare dates count as midnight UTC
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Strict RFC 2822 first; a weekday that disagrees with the date is dropped
/// and the rest parsed again (feeds get the weekday wrong often enough).
fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc2822(s)
        .or_else(|e| match s.split_once(',') {
            Some((day, rest)) if day.trim().chars().all(|c| c.is_ascii_alphabetic()) => {
                DateTime::parse_from_rfc2822(rest.trim())
            }
            _ => Err(e),
        })
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
