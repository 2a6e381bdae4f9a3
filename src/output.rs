use crate::dates;
use crate::error::Result;
use crate::types::CanonicalEvent;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CATEGORY: &str = "Event";

/// Flat record shape consumed by the map front end. Field order here is
/// the order the file carries.
#[derive(Debug, Clone, Serialize)]
pub struct FrontendEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub category: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub url: Option<String>,
}

impl FrontendEvent {
    /// Project a canonical record into the frontend shape. Records whose
    /// start never resolved to an instant, or that still lack
    /// coordinates, are dropped rather than emitted half-geolocated.
    pub fn from_canonical(event: &CanonicalEvent) -> Option<Self> {
        let start = event
            .start_date
            .as_deref()
            .filter(|s| dates::is_resolved_instant(s))?;
        let lat = event.lat?;
        let lng = event.lng?;

        Some(Self {
            id: event.id.trim().to_string(),
            title: event.title.trim().to_string(),
            start: start.to_string(),
            category: event
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(DEFAULT_CATEGORY)
                .to_string(),
            country: trimmed(event.country.as_deref()),
            city: trimmed(event.city.as_deref()),
            lat,
            lng,
            url: trimmed(event.source_url.as_deref()),
        })
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Write the primary event file consumed by the front end.
pub fn write_events(path: &Path, events: &[FrontendEvent]) -> Result<()> {
    write_atomic(path, &serde_json::to_string_pretty(events)?)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HorizonFile<'a> {
    generated_at: String,
    count: usize,
    events: &'a [&'a CanonicalEvent],
}

/// Write the diagnostic horizon file, full records including raw payloads.
/// Not a stable schema; for operator inspection only.
pub fn write_horizon(
    path: &Path,
    events: &[&CanonicalEvent],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let payload = HorizonFile {
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        count: events.len(),
        events,
    };
    write_atomic(path, &serde_json::to_string_pretty(&payload)?)
}

// A partial write must never be mistaken for a valid empty result:
// write to a sibling temp path, then rename into place.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);
    fs::write(tmp, contents)?;
    fs::rename(tmp, path)?;
    Ok(())
}
