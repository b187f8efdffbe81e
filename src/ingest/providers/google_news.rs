// src/ingest/providers/google_news.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::Deserialize;

use crate::ingest::plain_text;
use crate::ingest::types::{FeedItem, FeedProvider};

// --- RSS 2.0 / RSS 1.0 ---

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

// RSS 1.0 keeps items next to the channel, not inside it.
#[derive(Debug, Deserialize)]
struct Rdf {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

// Element names are matched by local name, so `<atom:link>` lands on `link`
// and `<media:title>` on `title`. Every text field is therefore a list of
// nodes and the first one carrying text wins.
#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Vec<TextNode>,
    #[serde(default)]
    link: Vec<TextNode>,
    #[serde(rename = "pubDate", default)]
    pub_date: Vec<TextNode>,
    #[serde(rename = "dc:date", alias = "date", default)]
    dc_date: Vec<TextNode>,
    #[serde(rename = "dc:creator", alias = "creator", default)]
    creator: Vec<TextNode>,
    #[serde(default)]
    author: Vec<TextNode>,
    #[serde(default)]
    description: Vec<TextNode>,
    #[serde(rename = "content:encoded", alias = "encoded", default)]
    content_encoded: Vec<TextNode>,
}

/// Direct text of an element. Attributes and child elements are ignored,
/// so `<atom:link href=".."/>` and `<content type="xhtml"><div>..</div></content>`
/// both come out empty instead of failing the document.
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    text: Option<String>,
}

fn first_text(nodes: Vec<TextNode>) -> Option<String> {
    nodes
        .into_iter()
        .filter_map(|n| n.text)
        .find(|t| !t.trim().is_empty())
}

impl From<RssItem> for FeedItem {
    fn from(it: RssItem) -> Self {
        let content = first_text(it.description).or_else(|| first_text(it.content_encoded));
        FeedItem {
            title: first_text(it.title),
            link: first_text(it.link),
            iso_date: first_text(it.dc_date),
            pub_date: first_text(it.pub_date),
            creator: first_text(it.creator),
            author: first_text(it.author),
            content_snippet: content.as_deref().map(plain_text),
            content,
        }
    }
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Vec<TextNode>,
    #[serde(default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    #[serde(default)]
    author: Vec<AtomAuthor>,
    #[serde(default)]
    summary: Vec<TextNode>,
    #[serde(default)]
    content: Vec<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomAuthor {
    name: Option<String>,
}

impl From<AtomEntry> for FeedItem {
    fn from(e: AtomEntry) -> Self {
        // rel defaults to "alternate" when absent
        let link = e
            .link
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .or_else(|| e.link.first())
            .and_then(|l| l.href.clone());
        let content = first_text(e.content).or_else(|| first_text(e.summary));
        FeedItem {
            title: first_text(e.title),
            link,
            iso_date: e.published.or(e.updated),
            pub_date: None,
            creator: None,
            author: e.author.into_iter().find_map(|a| a.name),
            content_snippet: content.as_deref().map(plain_text),
            content,
        }
    }
}

/// Parse an RSS 2.0, RSS 1.0 or Atom document into feed items.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);

    let items: Vec<FeedItem> = match root_element(&xml_clean)?.as_str() {
        "rss" => {
            let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
            rss.channel.item.into_iter().map(FeedItem::from).collect()
        }
        "RDF" => {
            let rdf: Rdf = from_str(&xml_clean).context("parsing rdf xml")?;
            rdf.item.into_iter().map(FeedItem::from).collect()
        }
        "feed" => {
            let atom: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
            atom.entry.into_iter().map(FeedItem::from).collect()
        }
        other => bail!("unsupported feed root element <{other}>"),
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_items_total").increment(items.len() as u64);
    Ok(items)
}

fn root_element(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().context("reading feed root element")? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Event::Eof => bail!("feed document has no root element"),
            _ => {}
        }
    }
}

// HTML entities are not XML entities; some feeds leak them unescaped.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

pub struct GoogleNewsRssProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl GoogleNewsRssProvider {
    pub fn from_fixture(xml: &str) -> Self {
        Self {
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    /// Every request carries `user_agent`; the feed answers 403 to anonymous clients.
    pub fn from_url(url: impl Into<String>, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .context("building feed http client")?;
        Ok(Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        })
    }
}

#[async_trait]
impl FeedProvider for GoogleNewsRssProvider {
    async fn fetch_latest(&self) -> Result<Vec<FeedItem>> {
        match &self.mode {
            Mode::Fixture(s) => parse_feed(s),
            Mode::Http { url, client } => {
                let resp = match client.get(url.as_str()).send().await {
                    Ok(resp) => resp,
                    Err(e) => {
                        counter!("ingest_fetch_errors_total").increment(1);
                        return Err(e).context("feed http get()");
                    }
                };
                let status = resp.status();
                if !status.is_success() {
                    counter!("ingest_fetch_errors_total").increment(1);
                    bail!("HTTP {status} when fetching {url}");
                }
                let body = resp.text().await.context("feed http .text()")?;
                tracing::debug!(target: "ingest", bytes = body.len(), "feed downloaded");
                parse_feed(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "GoogleNews"
    }
}
