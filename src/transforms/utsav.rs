use super::{
    date_field, require_object, source_defaults, stable_event_id, string_field, Transform,
    UNTITLED_EVENT,
};
use crate::dates;
use crate::types::{CanonicalEvent, RawItem, SourceDescriptor};

/// Adapter for Utsav festival listings, which mix several date formats
/// on one page; the full normalizer runs here rather than waiting for
/// the orchestrator pass.
pub struct UtsavTransform;

impl Transform for UtsavTransform {
    fn name(&self) -> &'static str {
        "utsav"
    }

    fn transform(&self, item: &RawItem, source: &SourceDescriptor) -> Option<CanonicalEvent> {
        require_object(item, self.name(), source)?;

        let title = string_field(item, &["title", "name"]);
        let source_url = string_field(item, &["link", "url"]);
        let start = date_field(item, &["date", "time", "datetime"]).map(dates::normalize_date);

        let (country, city) = source_defaults(source);
        let id = stable_event_id(&source.id, title, source_url, start.as_deref());

        Some(CanonicalEvent {
            id,
            title: title.unwrap_or(UNTITLED_EVENT).to_string(),
            start_date: start,
            end_date: None,
            location: string_field(item, &["location", "place", "venue"]).map(str::to_string),
            description: string_field(item, &["description", "summary"]).map(str::to_string),
            source_url: source_url.map(str::to_string),
            source: source.id.clone(),
            country,
            city,
            lat: None,
            lng: None,
            category: string_field(item, &["category"]).map(str::to_string),
            raw: item.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceType;
    use serde_json::json;

    fn source() -> SourceDescriptor {
        SourceDescriptor {
            id: "utsav-india".to_string(),
            source_type: SourceType::Scrape,
            url: "https://example.com/festivals".to_string(),
            country: "IN".to_string(),
            region: Some("Delhi".to_string()),
            selectors: None,
            transform: Some("utsav".to_string()),
            auth: None,
            params: None,
            result_path: None,
            enabled: true,
        }
    }

    #[test]
    fn test_day_first_numeric_date() {
        let item = json!({
            "title": "Diwali Mela",
            "date": "14/11/2026 18:00",
            "link": "https://example.com/diwali"
        });

        let event = UtsavTransform.transform(&item, &source()).unwrap();
        assert_eq!(event.start_date.as_deref(), Some("2026-11-14T18:00:00Z"));
        // Unsupported country code passes through as-is
        assert_eq!(event.country.as_deref(), Some("IN"));
    }
}
