//! Entry header detection.
//!
//! The diary's header line has changed shape several times. Each known shape
//! is a [`HeaderShape`]; the extractor tries them in order on every line and
//! the first one that matches wins.
//!
//! # Recognized shapes (default order)
//!
//! | Name | Example |
//! |------|---------|
//! | `dated-heading` | `## 2026-02-14 21:36 UTC` |
//! | `cycle-heading` | `## Cycle 12 — Feb 14, 2026 21:36 UTC` / `### Cycle 12 — ...` |
//! | `emphasis-dated` | `**Feb 14, 2026 ~21:36 UTC — Cycle 12**` |
//! | `emphasis-cycle` | `**Cycle 12 — 2026-02-14 21:36 UTC**` |
//!
//! Date text is either ISO (`2026-02-14`) or month-name (`Feb 14, 2026`,
//! `Feb 14 2026`), then an optional `~` and `HH:MM UTC`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Date text plus time, captured as `ts`.
const TS: &str = r"(?P<ts>(?:\d{4}-\d{2}-\d{2}|[A-Za-z]{3,9}\.? \d{1,2},? \d{4}) ~?\d{1,2}:\d{2} UTC)";
/// Em dash, en dash or hyphen run between header parts.
const DASH: &str = r"\s*[—–-]+\s*";

/// One way of recognizing an entry header line.
pub trait HeaderShape: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Raw date/time text when `line` (without its line terminator) is a header.
    fn match_line<'a>(&self, line: &'a str) -> Option<&'a str>;
}

/// A [`HeaderShape`] backed by a regex with a `ts` capture group.
#[derive(Debug, Clone)]
pub struct RegexHeader {
    name: String,
    pattern: Regex,
}

impl RegexHeader {
    /// Build a shape from `pattern`, which must define a `ts` group.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        if !pattern.capture_names().flatten().any(|n| n == "ts") {
            return Err(regex::Error::Syntax(format!(
                "header pattern `{pattern}` has no `ts` capture group"
            )));
        }
        Ok(Self {
            name: name.into(),
            pattern,
        })
    }
}

impl HeaderShape for RegexHeader {
    fn name(&self) -> &str {
        &self.name
    }

    fn match_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(line)
            .and_then(|caps| caps.name("ts"))
            .map(|m| m.as_str())
    }
}

static BUILTIN_SHAPES: Lazy<Vec<RegexHeader>> = Lazy::new(|| {
    let cycle_suffix = format!(r"(?:{DASH}Cycle\s+\d+)?");
    [
        ("dated-heading", format!(r"^##\s+{TS}{cycle_suffix}\s*$")),
        (
            "cycle-heading",
            format!(r"^#{{2,3}}\s+Cycle\s+\d+{DASH}{TS}{cycle_suffix}\s*\**\s*$"),
        ),
        (
            "emphasis-dated",
            format!(r"^\*\*{TS}{DASH}Cycle\s+\d+\s*\*\*\s*$"),
        ),
        (
            "emphasis-cycle",
            format!(r"^\*\*Cycle\s+\d+{DASH}{TS}\s*\*\*\s*$"),
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| RegexHeader::new(name, &pattern).unwrap())
    .collect()
});

/// The built-in shapes in priority order.
pub fn default_shapes() -> Vec<Box<dyn HeaderShape>> {
    BUILTIN_SHAPES
        .iter()
        .cloned()
        .map(|shape| Box::new(shape) as Box<dyn HeaderShape>)
        .collect()
}

/// A header located in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderHit<'a> {
    /// Byte offset where the header line starts.
    pub start: usize,
    /// Byte offset just past the header line, including its newline.
    pub end: usize,
    /// Raw captured date/time text.
    pub raw_timestamp: &'a str,
    /// Name of the shape that matched.
    pub shape: String,
}

/// Locate every header line in `text`, in document order.
///
/// Shapes are tried in slice order and the first match wins.
pub fn find_headers<'a>(text: &'a str, shapes: &[Box<dyn HeaderShape>]) -> Vec<HeaderHit<'a>> {
    let mut hits = Vec::new();
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let bare = line.trim_end_matches(['\n', '\r']);
        if let Some((shape, raw)) = shapes
            .iter()
            .find_map(|shape| shape.match_line(bare).map(|raw| (shape, raw)))
        {
            hits.push(HeaderHit {
                start,
                end: offset,
                raw_timestamp: raw,
                shape: shape.name().to_string(),
            });
        }
    }

    hits
}
