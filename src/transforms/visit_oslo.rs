use super::{
    date_field, require_object, stable_event_id, string_field, Transform, UNTITLED_EVENT,
};
use crate::dates;
use crate::geo;
use crate::types::{CanonicalEvent, RawItem, SourceDescriptor};

/// Adapter for VisitOslo "what's on" listings.
pub struct VisitOsloTransform;

impl Transform for VisitOsloTransform {
    fn name(&self) -> &'static str {
        "visit_oslo"
    }

    fn transform(&self, item: &RawItem, source: &SourceDescriptor) -> Option<CanonicalEvent> {
        require_object(item, self.name(), source)?;

        let title = string_field(item, &["title", "name", "headline"]);
        let source_url = string_field(item, &["link", "url"]);
        let start = date_field(item, &["date", "time", "datetime"]).map(dates::preparse_date);

        let id = stable_event_id(&source.id, title, source_url, start.as_deref());

        Some(CanonicalEvent {
            id,
            title: title.unwrap_or(UNTITLED_EVENT).to_string(),
            start_date: start,
            end_date: None,
            location: string_field(item, &["location", "venue", "place"]).map(str::to_string),
            description: string_field(item, &["description", "summary"]).map(str::to_string),
            source_url: source_url.map(str::to_string),
            source: source.id.clone(),
            country: Some(geo::country_name(&source.country)),
            city: source.region.clone().or_else(|| Some("Oslo".to_string())),
            lat: None,
            lng: None,
            category: string_field(item, &["category"]).map(str::to_string),
            raw: item.clone(),
        })
    }
}
