//! Minimal frontmatter for one-file-per-entry diaries.
//!
//! ```text
//! ---
//! timestamp: 2026-02-14 21:36 UTC
//! mood: calm
//! ---
//! Entry body...
//! ```
//!
//! Only flat `key: value` lines are understood; this is not a YAML parser.

/// Ordered `key: value` pairs from a frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pairs: Vec<(String, String)>,
}

impl Frontmatter {
    /// Value of the first occurrence of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of parsed pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    fn parse_block(block: &str) -> Self {
        let pairs = block
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                let key = key.trim();
                if key.is_empty() {
                    return None;
                }
                Some((key.to_string(), unquote(value.trim()).to_string()))
            })
            .collect();
        Self { pairs }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Split `text` into its frontmatter and body.
///
/// Returns `None` for the frontmatter when the text does not open with a
/// `---` line or the block is never closed; the body is then the whole text.
/// A leading byte-order mark is never part of the body.
pub fn split_frontmatter(text: &str) -> (Option<Frontmatter>, &str) {
    let text_no_bom = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut lines = text_no_bom.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, text_no_bom);
    };
    if !is_delimiter(first) {
        return (None, text_no_bom);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter(line) {
            let block = &text_no_bom[block_start..offset];
            let body = &text_no_bom[offset + line.len()..];
            return (Some(Frontmatter::parse_block(block)), body);
        }
        offset += line.len();
    }

    (None, text_no_bom)
}
