use super::{
    date_field, require_object, source_defaults, stable_event_id, string_field, Transform,
    UNTITLED_EVENT,
};
use crate::dates;
use crate::types::{CanonicalEvent, RawItem, SourceDescriptor};

/// Adapter shared by the AllEvents city listings (Stockholm and Oslo
/// configs point here); the city comes from the source descriptor.
pub struct AllEventsTransform;

impl Transform for AllEventsTransform {
    fn name(&self) -> &'static str {
        "all_events"
    }

    fn transform(&self, item: &RawItem, source: &SourceDescriptor) -> Option<CanonicalEvent> {
        require_object(item, self.name(), source)?;

        let title = string_field(item, &["title", "name"]);
        let source_url = string_field(item, &["link", "url"]);
        let start = date_field(item, &["date", "time", "datetime"]).map(dates::preparse_date);

        let (country, city) = source_defaults(source);
        let id = stable_event_id(&source.id, title, source_url, start.as_deref());

        Some(CanonicalEvent {
            id,
            title: title.unwrap_or(UNTITLED_EVENT).to_string(),
            start_date: start,
            end_date: None,
            location: string_field(item, &["location", "city", "place"]).map(str::to_string),
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

    fn source(id: &str, country: &str, region: &str) -> SourceDescriptor {
        SourceDescriptor {
            id: id.to_string(),
            source_type: SourceType::Scrape,
            url: "https://example.com/events".to_string(),
            country: country.to_string(),
            region: Some(region.to_string()),
            selectors: None,
            transform: Some("all_events".to_string()),
            auth: None,
            params: None,
            result_path: None,
            enabled: true,
        }
    }

    #[test]
    fn test_city_comes_from_descriptor() {
        let item = json!({ "title": "Street Food Fest", "date": "2025-08-30" });

        let stockholm = AllEventsTransform
            .transform(&item, &source("allevents-stockholm", "SE", "Stockholm"))
            .unwrap();
        assert_eq!(stockholm.city.as_deref(), Some("Stockholm"));
        assert_eq!(stockholm.country.as_deref(), Some("Sweden"));

        let oslo = AllEventsTransform
            .transform(&item, &source("allevents-oslo", "NO", "Oslo"))
            .unwrap();
        assert_eq!(oslo.city.as_deref(), Some("Oslo"));
        assert_eq!(oslo.country.as_deref(), Some("Norway"));
        // Same payload under different sources keeps distinct ids
        assert_ne!(stockholm.id, oslo.id);
    }
}
