//! Data models for diary entries and the JSON document shared by both pipelines.
//!
//! - [`DiaryEntry`]: one timestamped (or numbered) unit of diary content
//! - [`DiaryDocument`]: the `{"entries": [...]}` artifact written by `export`
//!   and read by `feed`

use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single diary entry.
///
/// Field order matches the JSON the website expects:
/// `{"timestamp": ..., "content": ..., "entry_num": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct DiaryEntry {
    /// Canonical `YYYY-MM-DD HH:MM UTC`, a pass-through fallback string, or
    /// empty when the source carried no timestamp.
    #[serde(default)]
    pub timestamp: String,
    /// Trimmed entry body.
    #[serde(default)]
    pub content: String,
    /// Numeric file stem in file-per-entry mode; absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_num: Option<u64>,
}

impl DiaryEntry {
    pub fn new(timestamp: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            content: content.into(),
            entry_num: None,
        }
    }

    pub fn with_entry_num(mut self, entry_num: Option<u64>) -> Self {
        self.entry_num = entry_num;
        self
    }

    /// First line of the content, trimmed.
    pub fn first_line(&self) -> &str {
        self.content.lines().next().unwrap_or_default().trim()
    }
}

/// The JSON artifact: entries in chronological order, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DiaryDocument {
    pub entries: Vec<DiaryEntry>,
}

/// Reads `{"entries": [...]}` and also a bare `[...]`.
///
/// Errors inside an entry are reported as is (`invalid type: string "x",
/// expected u64`) for either form. Keys other than `entries` are ignored.
impl<'de> Deserialize<'de> for DiaryDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = DiaryDocument;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(r#"an {"entries": [...]} object or an array of entries"#)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries: Option<Vec<DiaryEntry>> = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "entries" {
                if entries.is_some() {
                    return Err(de::Error::duplicate_field("entries"));
                }
                entries = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        let entries = entries.ok_or_else(|| de::Error::missing_field("entries"))?;
        Ok(DiaryDocument { entries })
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(entry) = seq.next_element::<DiaryEntry>()? {
            entries.push(entry);
        }
        Ok(DiaryDocument { entries })
    }
}
