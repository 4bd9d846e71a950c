//! RSS 2.0 feed rendering.
//!
//! Takes the most recent entries of the diary document, newest first, and
//! renders them as `<item>` elements under a single `<channel>`:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <?xml-stylesheet type="text/xsl" href="feed.xsl"?>
//! <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
//!   <channel>
//!     <title>..</title> <link>..</link> <description>..</description>
//!     <language>en</language> <lastBuildDate>..</lastBuildDate>
//!     <atom:link href=".../feed.xml" rel="self" type="application/rss+xml"/>
//!     <item>..</item>
//!   </channel>
//! </rss>
//! ```
//!
//! Items are never filtered after selection. An item whose timestamp cannot
//! be parsed simply has no `<pubDate>`.

use crate::config::FeedConfig;
use crate::error::DiaryError;
use crate::models::DiaryEntry;
use crate::timestamp::to_rfc2822;
use crate::utils::{ensure_parent_dir, truncate_words};
use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
/// First lines at or above this many characters are left out of the title.
const TITLE_LINE_LIMIT: usize = 100;

/// One `<item>` before serialization. Text fields are unescaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: Option<String>,
}

impl FeedItem {
    pub fn from_entry(entry: &DiaryEntry, config: &FeedConfig) -> Self {
        let pub_date = to_rfc2822(&entry.timestamp);
        if pub_date.is_none() && !entry.timestamp.is_empty() {
            debug!(timestamp = %entry.timestamp, entry_num = ?entry.entry_num, "Omitting pubDate");
        }
        Self {
            title: item_title(entry),
            link: permalink(&config.site_url, entry.entry_num),
            description: truncate_words(&entry.content, config.description_limit),
            pub_date,
        }
    }
}

/// `Cycle N: first line`, `Cycle N`, or `Entry` when the entry has no number.
pub fn item_title(entry: &DiaryEntry) -> String {
    let Some(num) = entry.entry_num else {
        return "Entry".to_string();
    };
    let first_line = entry.first_line();
    if !first_line.is_empty() && first_line.chars().count() < TITLE_LINE_LIMIT {
        format!("Cycle {num}: {first_line}")
    } else {
        format!("Cycle {num}")
    }
}

/// `{site_url}/?entry={n}`; the value is empty when the entry has no number.
pub fn permalink(site_url: &str, entry_num: Option<u64>) -> String {
    let num = entry_num.map(|n| n.to_string()).unwrap_or_default();
    match Url::parse(site_url) {
        Ok(mut url) => {
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            url.query_pairs_mut().clear().append_pair("entry", &num);
            url.to_string()
        }
        Err(e) => {
            warn!(%site_url, error = %e, "Site URL does not parse; building permalink by hand");
            format!("{}/?entry={}", site_url.trim_end_matches('/'), num)
        }
    }
}

/// The last `max_items` entries, newest first.
pub fn select_recent(entries: &[DiaryEntry], max_items: usize) -> Vec<&DiaryEntry> {
    let start = entries.len().saturating_sub(max_items);
    entries[start..].iter().rev().collect()
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), Box<dyn Error>> {
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::from_escaped(escape(text))))?;
    writer.write_event(Event::End(end))?;
    Ok(())
}

fn write_item<W: Write>(writer: &mut Writer<W>, item: &FeedItem) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, BytesStart::new("title"), &item.title)?;
    write_text_element(writer, BytesStart::new("link"), &item.link)?;
    write_text_element(
        writer,
        BytesStart::new("guid").with_attributes([("isPermaLink", "true")]),
        &item.link,
    )?;
    write_text_element(writer, BytesStart::new("description"), &item.description)?;
    if let Some(pub_date) = &item.pub_date {
        write_text_element(writer, BytesStart::new("pubDate"), pub_date)?;
    }
    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

/// Render the full RSS document for `entries`.
///
/// # Arguments
///
/// * `entries` - Diary entries in chronological order, oldest first
/// * `config` - Channel metadata, item limit and description limit
/// * `now` - Build time, written as `<lastBuildDate>`
///
/// # Returns
///
/// The XML document as a string, ending in a newline. Fails only if the XML
/// writer does.
///
/// # Items
///
/// The last `config.max_items` entries, newest first. An entry whose
/// timestamp cannot be read as a date (or lies outside years 0-9999) gets no
/// `<pubDate>` but is still included.
pub fn render_feed(
    entries: &[DiaryEntry],
    config: &FeedConfig,
    now: DateTime<Utc>,
) -> Result<String, Box<dyn Error>> {
    let items: Vec<FeedItem> = select_recent(entries, config.max_items)
        .into_iter()
        .map(|entry| FeedItem::from_entry(entry, config))
        .collect();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::PI(BytesPI::new(format!(
        r#"xml-stylesheet type="text/xsl" href="{}""#,
        escape(config.stylesheet.as_str())
    ))))?;
    writer.write_event(Event::Start(
        BytesStart::new("rss").with_attributes([("version", "2.0"), ("xmlns:atom", ATOM_NS)]),
    ))?;
    writer.write_event(Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, BytesStart::new("title"), &config.title)?;
    write_text_element(&mut writer, BytesStart::new("link"), &config.site_url)?;
    write_text_element(&mut writer, BytesStart::new("description"), &config.description)?;
    write_text_element(&mut writer, BytesStart::new("language"), &config.language)?;
    write_text_element(&mut writer, BytesStart::new("lastBuildDate"), &now.to_rfc2822())?;
    let self_url = config.self_url();
    writer.write_event(Event::Empty(BytesStart::new("atom:link").with_attributes([
        ("href", self_url.as_str()),
        ("rel", "self"),
        ("type", "application/rss+xml"),
    ])))?;

    for item in &items {
        write_item(&mut writer, item)?;
    }

    writer.write_event(Event::End(BytesEnd::new("channel")))?;
    writer.write_event(Event::End(BytesEnd::new("rss")))?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// Render `entries` and overwrite `path` with the feed.
///
/// # Arguments
///
/// * `entries` - Diary entries in chronological order
/// * `config` - Feed settings passed through to [`render_feed`]
/// * `path` - Output file; missing parent directories are created
///
/// # Returns
///
/// The number of items written, or an error if rendering, directory
/// creation or the write fails. The old file is untouched on a render error.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_feed(
    entries: &[DiaryEntry],
    config: &FeedConfig,
    path: &Path,
) -> Result<usize, Box<dyn Error>> {
    let xml = render_feed(entries, config, Utc::now())?;
    let count = entries.len().min(config.max_items);

    ensure_parent_dir(path)
        .await
        .map_err(|e| DiaryError::Io(path.to_path_buf(), e))?;
    fs::write(path, xml)
        .await
        .map_err(|e| DiaryError::Io(path.to_path_buf(), e))?;

    info!(items = count, "Wrote RSS feed");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap()
    }

    fn numbered(n: u64, content: &str) -> DiaryEntry {
        DiaryEntry::new(format!("2026-02-{:02} 10:00 UTC", n), content).with_entry_num(Some(n))
    }

    #[test]
    fn test_single_entry_feed() {
        let doc: crate::models::DiaryDocument = serde_json::from_str(
            r#"{"entries":[{"entry_num":1,"content":"Hello world","timestamp":"2026-02-14 10:00 UTC"}]}"#,
        )
        .unwrap();
        let xml = render_feed(&doc.entries, &FeedConfig::default(), fixed_now()).unwrap();

        assert_eq!(xml.matches("<item>").count(), 1);
        assert!(xml.contains("<title>Cycle 1: Hello world</title>"));
        assert!(xml.contains("<pubDate>Sat, 14 Feb 2026 10:00:00 +0000</pubDate>"));
        assert!(xml.contains("<link>https://terminator2-agent.github.io/?entry=1</link>"));
        assert!(xml.contains(
            r#"<guid isPermaLink="true">https://terminator2-agent.github.io/?entry=1</guid>"#
        ));
        assert!(xml.contains("<description>Hello world</description>"));
    }

    #[test]
    fn test_document_header_and_channel() {
        let xml = render_feed(&[], &FeedConfig::default(), fixed_now()).unwrap();

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<?xml-stylesheet type="text/xsl" href="feed.xsl"?>"#));
        assert!(xml.contains(r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains("<title>Terminator2 — Diary</title>"));
        assert!(xml.contains("<language>en</language>"));
        assert!(xml.contains("<lastBuildDate>Fri, 20 Feb 2026 12:00:00 +0000</lastBuildDate>"));
        assert!(xml.contains(
            r#"<atom:link href="https://terminator2-agent.github.io/feed.xml" rel="self" type="application/rss+xml"/>"#
        ));
        assert!(!xml.contains("<item>"));
        assert!(xml.trim_end().ends_with("</rss>"));
    }

    #[test]
    fn test_selects_last_k_newest_first() {
        let entries: Vec<DiaryEntry> = (1..=25).map(|n| numbered(n, &format!("Day {n}"))).collect();
        let config = FeedConfig {
            max_items: 20,
            ..FeedConfig::default()
        };
        let xml = render_feed(&entries, &config, fixed_now()).unwrap();

        assert_eq!(xml.matches("<item>").count(), 20);
        let first = xml.find("Cycle 25: Day 25").unwrap();
        let second = xml.find("Cycle 24: Day 24").unwrap();
        let last = xml.find("Cycle 6: Day 6").unwrap();
        assert!(first < second && second < last);
        assert!(!xml.contains("Cycle 5: Day 5"));
    }

    #[test]
    fn test_select_recent() {
        let entries: Vec<DiaryEntry> = (1..=3).map(|n| numbered(n, "x")).collect();
        let nums: Vec<_> = select_recent(&entries, 2)
            .iter()
            .map(|e| e.entry_num.unwrap())
            .collect();
        assert_eq!(nums, vec![3, 2]);
        assert_eq!(select_recent(&entries, 10).len(), 3);
        assert!(select_recent(&entries, 0).is_empty());
    }

    #[test]
    fn test_titles() {
        assert_eq!(item_title(&numbered(3, "Short line\nbody")), "Cycle 3: Short line");
        assert_eq!(item_title(&numbered(3, &"x".repeat(100))), "Cycle 3");
        assert_eq!(item_title(&numbered(3, &"x".repeat(99))), format!("Cycle 3: {}", "x".repeat(99)));
        assert_eq!(item_title(&numbered(3, "")), "Cycle 3");
        assert_eq!(item_title(&DiaryEntry::new("", "Anything")), "Entry");
    }

    #[test]
    fn test_escaping() {
        let entry = numbered(4, "Tom & \"Jerry\" <b>'bold'</b>");
        let xml = render_feed(&[entry], &FeedConfig::default(), fixed_now()).unwrap();
        assert!(xml.contains(
            "<description>Tom &amp; &quot;Jerry&quot; &lt;b&gt;&apos;bold&apos;&lt;/b&gt;</description>"
        ));
        assert!(xml.contains("<title>Cycle 4: Tom &amp; &quot;Jerry&quot;"));
        assert!(!xml.contains("<b>"));
    }

    #[test]
    fn test_long_description_truncated() {
        let content = "word ".repeat(200);
        let item = FeedItem::from_entry(&numbered(1, content.trim()), &FeedConfig::default());
        assert!(item.description.ends_with("..."));
        assert!(item.description.chars().count() <= 503);
        assert!(item.description.trim_end_matches("...").split(' ').all(|w| w == "word"));
    }

    #[test]
    fn test_entry_without_content_or_timestamp_still_renders() {
        let entry = DiaryEntry::default().with_entry_num(Some(9));
        let xml = render_feed(&[entry], &FeedConfig::default(), fixed_now()).unwrap();
        assert_eq!(xml.matches("<item>").count(), 1);
        assert!(xml.contains("<title>Cycle 9</title>"));
        assert!(!xml.contains("<pubDate>"));
    }

    #[test]
    fn test_unparseable_timestamp_omits_pub_date() {
        let entry = DiaryEntry::new("sometime in February", "Body").with_entry_num(Some(2));
        let item = FeedItem::from_entry(&entry, &FeedConfig::default());
        assert_eq!(item.pub_date, None);
    }

    #[test]
    fn test_out_of_range_dates_render_without_pub_date() {
        let entries = vec![
            DiaryEntry::new("0000-01-01T00:30:00+01:00", "Before year zero").with_entry_num(Some(1)),
            DiaryEntry::new("+10000-01-01T00:00:00+0000", "Far future").with_entry_num(Some(2)),
            DiaryEntry::new("2026-02-14T11:00:00+01:00", "Shifted").with_entry_num(Some(3)),
        ];
        let xml = render_feed(&entries, &FeedConfig::default(), fixed_now()).unwrap();

        assert_eq!(xml.matches("<item>").count(), 3);
        assert_eq!(xml.matches("<pubDate>").count(), 1);
        assert!(xml.contains("<pubDate>Sat, 14 Feb 2026 10:00:00 +0000</pubDate>"));
        assert!(xml.contains("<description>Before year zero</description>"));
    }

    #[test]
    fn test_permalink() {
        assert_eq!(
            permalink("https://example.org", Some(7)),
            "https://example.org/?entry=7"
        );
        assert_eq!(
            permalink("https://example.org/blog", Some(7)),
            "https://example.org/blog/?entry=7"
        );
        assert_eq!(permalink("https://example.org/", None), "https://example.org/?entry=");
        assert_eq!(permalink("not a url", Some(1)), "not a url/?entry=1");
    }

    #[tokio::test]
    async fn test_write_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site/feed.xml");
        let entries: Vec<DiaryEntry> = (1..=3).map(|n| numbered(n, "x")).collect();

        let count = write_feed(&entries, &FeedConfig::default(), &path).await.unwrap();
        assert_eq!(count, 3);
        let xml = std::fs::read_to_string(&path).unwrap();
        assert_eq!(xml.matches("<item>").count(), 3);
    }
}
