use crate::geo;
use crate::types::{CanonicalEvent, RawItem, SourceDescriptor};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

pub mod all_events;
pub mod generic;
pub mod stockholm_live;
pub mod utsav;
pub mod visit_oslo;
pub mod visit_stockholm;

/// Placeholder title for items with no usable name; a record is never
/// dropped solely for missing its title.
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// Maps one raw source item to a canonical event, or None to drop it.
/// Implementations never fail the run: anything unusable inside one item
/// is logged and yields None, leaving sibling items untouched.
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;
    fn transform(&self, item: &RawItem, source: &SourceDescriptor) -> Option<CanonicalEvent>;
}

/// Startup-time registry from configured adapter id to implementation.
/// Sources with no adapter, or an unknown one, get the generic
/// structural adapter.
pub fn for_source(source: &SourceDescriptor) -> &'static dyn Transform {
    match source.transform.as_deref() {
        None => &generic::GenericTransform,
        Some("visit_stockholm") => &visit_stockholm::VisitStockholmTransform,
        Some("stockholm_live") => &stockholm_live::StockholmLiveTransform,
        Some("visit_oslo") => &visit_oslo::VisitOsloTransform,
        Some("all_events") => &all_events::AllEventsTransform,
        Some("utsav") => &utsav::UtsavTransform,
        Some(other) => {
            warn!(source = %source.id, transform = %other, "unknown transform adapter, using generic");
            &generic::GenericTransform
        }
    }
}

/// Deterministic record id from the stable identifying fields, so
/// re-running against unchanged upstream data reproduces the same id.
pub(crate) fn stable_event_id(
    source_id: &str,
    title: Option<&str>,
    url: Option<&str>,
    start: Option<&str>,
) -> String {
    let parts: Vec<&str> = [Some(source_id), title, url, start]
        .into_iter()
        .flatten()
        .collect();
    let joined = parts.join("||");

    let slug = slugify(&joined);
    if !slug.is_empty() {
        return slug;
    }
    // Identifying fields with no alphanumerics at all: hash instead
    let digest = Sha256::digest(joined.as_bytes());
    hex::encode(&digest[..8])
}

pub(crate) fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// First non-empty string value among the given keys.
pub(crate) fn string_field<'a>(item: &'a RawItem, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        item.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

/// Like string_field, but tolerates `{"text": ...}` wrappers used by API
/// shapes that wrap display strings in objects.
pub(crate) fn text_field<'a>(item: &'a RawItem, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        let value = item.get(key)?;
        value
            .as_str()
            .or_else(|| value.get("text").and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

/// First date-ish value among the keys; strings pass through, objects are
/// probed for the common `local` / `start` wrappers.
pub(crate) fn date_field<'a>(item: &'a RawItem, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        let value = item.get(key)?;
        value
            .as_str()
            .or_else(|| value.get("local").and_then(Value::as_str))
            .or_else(|| value.get("start").and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

/// Country name and default city configured for a source.
pub(crate) fn source_defaults(source: &SourceDescriptor) -> (Option<String>, Option<String>) {
    (
        Some(geo::country_name(&source.country)),
        source.region.clone(),
    )
}

/// Guard shared by adapters: anything that is not a JSON object cannot
/// carry named fields and is dropped with a warning.
pub(crate) fn require_object<'a>(
    item: &'a RawItem,
    adapter: &str,
    source: &SourceDescriptor,
) -> Option<&'a serde_json::Map<String, Value>> {
    match item.as_object() {
        Some(map) => Some(map),
        None => {
            warn!(source = %source.id, adapter = %adapter, "raw item is not an object, dropping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Jazz Night @ Fasching!"), "jazz-night-fasching");
        assert_eq!(slugify("  --  "), "");
        assert_eq!(slugify("Åre Market"), "re-market");
    }

    #[test]
    fn test_stable_event_id_is_deterministic() {
        let a = stable_event_id(
            "visitstockholm-events",
            Some("Jazz Night"),
            Some("https://x/1"),
            Some("2025-12-24T19:00:00Z"),
        );
        let b = stable_event_id(
            "visitstockholm-events",
            Some("Jazz Night"),
            Some("https://x/1"),
            Some("2025-12-24T19:00:00Z"),
        );
        assert_eq!(a, b);
        assert_eq!(
            a,
            "visitstockholm-events-jazz-night-https-x-1-2025-12-24t19-00-00z"
        );
    }

    #[test]
    fn test_stable_event_id_differs_on_identifying_fields() {
        let a = stable_event_id("src", Some("A"), Some("https://x/1"), None);
        let b = stable_event_id("src", Some("A"), Some("https://x/2"), None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_stable_event_id_hash_fallback() {
        // No alphanumerics anywhere: slug is empty, hash takes over
        let id = stable_event_id("--", None, None, None);
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
