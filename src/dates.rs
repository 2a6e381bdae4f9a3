use chrono::{
    DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use chrono::Datelike;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// Month-name table, full names plus 3-letter abbreviations ("sept" is the
// one 4-letter abbreviation that shows up in the wild).
static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("jan", 1),
        ("january", 1),
        ("feb", 2),
        ("february", 2),
        ("mar", 3),
        ("march", 3),
        ("apr", 4),
        ("april", 4),
        ("may", 5),
        ("jun", 6),
        ("june", 6),
        ("jul", 7),
        ("july", 7),
        ("aug", 8),
        ("august", 8),
        ("sep", 9),
        ("sept", 9),
        ("september", 9),
        ("oct", 10),
        ("october", 10),
        ("nov", 11),
        ("november", 11),
        ("dec", 12),
        ("december", 12),
    ])
});

// "<weekday,> 25 March 19:30 pm 2025" with the time required; listing pages
// join date and time with "•", "-" or "|".
static DAY_MONTH_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b[[:alpha:]]{3,},?\s+)?(\d{1,2})\s+([[:alpha:]]{3,})\s*(?:[•\-|]\s*)?(\d{1,2}):(\d{2})(?:\s*(am|pm))?(?:\s*(\d{4}))?",
    )
    .unwrap()
});

// "25/March", "25 March 2025" and similar day-first month-name forms
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:\b[[:alpha:]]{3,},?\s+)?(\d{1,2})[/\s\-.]+([[:alpha:]]{3,})(?:[/\s\-.]+(\d{2,4}))?",
    )
    .unwrap()
});

// Strict day-first numeric "DD/MM/YYYY HH:MM:SS"
static NUMERIC_DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})(?:\s+(\d{1,2}):(\d{2})(?::(\d{2}))?)?")
        .unwrap()
});

/// Normalize an arbitrarily-formatted date string to an ISO-8601 instant.
///
/// Falls back to the cleaned original string when every parsing strategy
/// fails; downstream filtering excludes records whose start never resolved.
pub fn normalize_date(raw: &str) -> String {
    normalize_date_at(raw, Utc::now())
}

/// Light parse used by transform adapters: standard formats only,
/// otherwise the cleaned original text is kept for the orchestrator pass.
pub fn preparse_date(raw: &str) -> String {
    let s = clean(raw);
    match parse_standard(&s) {
        Some(dt) => to_iso(dt),
        None => s,
    }
}

/// True when the string is a parseable ISO-8601 instant.
pub fn is_resolved_instant(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

/// Parse an already-normalized start into an instant, if it resolved.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn normalize_date_at(raw: &str, now: DateTime<Utc>) -> String {
    let s = clean(raw);
    if s.is_empty() {
        return s;
    }

    if let Some(dt) = parse_standard(&s) {
        return to_iso(dt);
    }
    if let Some(iso) = parse_day_month_time(&s, now) {
        return iso;
    }
    if let Some(iso) = parse_day_month(&s, now) {
        return iso;
    }
    if let Some(iso) = parse_numeric_day_first(&s) {
        return iso;
    }

    // Last permissive attempt with decorative separators stripped
    let relaxed = clean(&s.replace(['•', '|'], " "));
    if relaxed != s {
        if let Some(dt) = parse_standard(&relaxed) {
            return to_iso(dt);
        }
    }

    s
}

fn clean(raw: &str) -> String {
    raw.replace('\u{00A0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Strategy 1: standard machine-generated formats. Naive values (no zone)
/// are taken as UTC so output does not depend on where ingest runs.
fn parse_standard(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for fmt in ["%Y-%m-%d", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }
    None
}

/// Strategy 2: "<weekday,> <day> <month-name> <HH:MM> [am/pm] [year]"
fn parse_day_month_time(s: &str, now: DateTime<Utc>) -> Option<String> {
    let caps = DAY_MONTH_TIME.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_index(&caps[2])?;
    let mut hour: u32 = caps[3].parse().ok()?;
    let minute: u32 = caps[4].parse().ok()?;

    if let Some(ampm) = caps.get(5) {
        match ampm.as_str().to_lowercase().as_str() {
            "pm" if hour < 12 => hour += 12,
            "am" if hour == 12 => hour = 0,
            _ => {}
        }
    }

    let explicit_year: Option<i32> = caps.get(6).and_then(|y| y.as_str().parse().ok());
    build_with_rollover(explicit_year, month, day, hour, minute, now).map(to_iso)
}

/// Strategy 3: "<day>/<month-name>[/<year>]"
fn parse_day_month(s: &str, now: DateTime<Utc>) -> Option<String> {
    let caps = DAY_MONTH.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = month_index(&caps[2])?;
    let explicit_year: Option<i32> = caps
        .get(3)
        .and_then(|y| y.as_str().parse().ok())
        .map(expand_two_digit_year);
    build_with_rollover(explicit_year, month, day, 0, 0, now).map(to_iso)
}

/// Strategy 4: strict numeric day-first "DD/MM/YYYY[ HH:MM[:SS]]"
fn parse_numeric_day_first(s: &str) -> Option<String> {
    let caps = NUMERIC_DAY_FIRST.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year = expand_two_digit_year(caps[3].parse().ok()?);
    let hour: u32 = caps.get(4).and_then(|h| h.as_str().parse().ok()).unwrap_or(0);
    let minute: u32 = caps.get(5).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let second: u32 = caps.get(6).and_then(|v| v.as_str().parse().ok()).unwrap_or(0);

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    Some(to_iso(Utc.from_utc_datetime(&naive)))
}

fn month_index(name: &str) -> Option<u32> {
    let key = name.to_lowercase();
    MONTHS.get(key.as_str()).copied().or_else(|| {
        let prefix: String = key.chars().take(3).collect();
        MONTHS.get(prefix.as_str()).copied()
    })
}

// Century pivot for 2-digit years: below 50 means 2000s
fn expand_two_digit_year(year: i32) -> i32 {
    if year < 100 {
        if year < 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

// Events pages conventionally omit the year for near-term upcoming events:
// with no explicit year, assume the current one, and roll forward when the
// resulting instant is already past.
fn build_with_rollover(
    explicit_year: Option<i32>,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let year = explicit_year.unwrap_or_else(|| now.year());
    let candidate = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;

    if explicit_year.is_none() && candidate < now.naive_utc() {
        let next = NaiveDate::from_ymd_opt(year + 1, month, day)?.and_hms_opt(hour, minute, 0)?;
        return Some(Utc.from_utc_datetime(&next));
    }

    Some(Utc.from_utc_datetime(&candidate))
}
