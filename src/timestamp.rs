//! Timestamp handling for both pipelines.
//!
//! The diary has used several header conventions over time, so the exporter
//! normalizes whatever date text it captured into the canonical
//! `YYYY-MM-DD HH:MM UTC` form. The feed later reparses that string (or any
//! ISO-8601 variant the JSON may carry) into RFC 2822 for `<pubDate>`.
//!
//! Both directions are best-effort: unrecognized input is passed through by
//! [`normalize_timestamp`] and yields `None` from [`to_rfc2822`].

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static CANONICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2} UTC$").unwrap());

static MONTH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<month>[A-Za-z]{3})[A-Za-z]*\.? (?P<day>\d{1,2}),? (?P<year>\d{4}) (?P<hour>\d{1,2}):(?P<minute>\d{2}) UTC$")
        .unwrap()
});

/// Map an English month name (or its three-letter abbreviation) to `1..=12`.
fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Normalize captured header date text to `YYYY-MM-DD HH:MM UTC`.
///
/// Tildes (meaning "approximately") are dropped. Already-canonical input is
/// returned unchanged, `Feb 14, 2026 21:36 UTC` style input is rewritten, and
/// anything else comes back trimmed but otherwise untouched.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_timestamp("Feb 14, 2026 21:36 UTC"), "2026-02-14 21:36 UTC");
/// assert_eq!(normalize_timestamp("2026-02-14 ~21:36 UTC"), "2026-02-14 21:36 UTC");
/// ```
pub fn normalize_timestamp(raw: &str) -> String {
    let cleaned = raw.replace('~', "").trim().to_string();

    if CANONICAL_RE.is_match(&cleaned) {
        return cleaned;
    }

    if let Some(caps) = MONTH_NAME_RE.captures(&cleaned) {
        if let Some(month) = month_number(&caps["month"]) {
            let day: u32 = caps["day"].parse().unwrap_or_default();
            let hour: u32 = caps["hour"].parse().unwrap_or_default();
            return format!(
                "{}-{:02}-{:02} {:02}:{} UTC",
                &caps["year"], month, day, hour, &caps["minute"]
            );
        }
    }

    debug!(timestamp = %cleaned, "Timestamp left as-is");
    cleaned
}

/// Reparse a stored timestamp into RFC 2822 (`Sat, 14 Feb 2026 10:00:00 +0000`).
///
/// Accepted inputs:
/// - `2026-02-14 10:00 UTC`
/// - `2026-02-14T10:00:00Z`
/// - `2026-02-14T10:00:00+0100`
/// - any RFC 3339 string (`2026-02-14T10:00:00.123+01:00`)
///
/// Offsets are converted to UTC. Returns `None` when nothing matches, or when
/// the UTC year falls outside `0..=9999` (RFC 2822 has no form for it).
pub fn to_rfc2822(timestamp: &str) -> Option<String> {
    let ts = timestamp.trim();
    if ts.is_empty() {
        return None;
    }

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M UTC", "%Y-%m-%dT%H:%M:%SZ"];
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(ts, fmt) {
            return format_rfc2822(naive.and_utc());
        }
    }

    let with_offset = DateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(ts));
    match with_offset {
        Ok(dt) => format_rfc2822(dt.with_timezone(&Utc)),
        Err(_) => {
            debug!(timestamp = %ts, "Timestamp not parseable as a feed date");
            None
        }
    }
}

fn format_rfc2822(dt: DateTime<Utc>) -> Option<String> {
    if !(0..=9999).contains(&dt.year()) {
        debug!(year = dt.year(), "Feed date year out of range");
        return None;
    }
    Some(dt.to_rfc2822())
}
