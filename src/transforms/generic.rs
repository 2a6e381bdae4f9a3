use super::{
    date_field, require_object, source_defaults, stable_event_id, string_field, text_field,
    Transform, UNTITLED_EVENT,
};
use crate::dates;
use crate::types::{CanonicalEvent, RawItem, SourceDescriptor};

/// Structural fallback used when a source has no dedicated adapter:
/// maps the common field-name guesses straight into the canonical shape.
pub struct GenericTransform;

impl Transform for GenericTransform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn transform(&self, item: &RawItem, source: &SourceDescriptor) -> Option<CanonicalEvent> {
        require_object(item, self.name(), source)?;

        let title = text_field(item, &["title", "name"]);
        let source_url = string_field(item, &["link", "url"]);
        let start = date_field(item, &["date", "time", "datetime", "startDate", "start"])
            .map(dates::preparse_date);
        let end = date_field(item, &["endDate", "end"]).map(dates::preparse_date);

        let (country, region) = source_defaults(source);
        let city = string_field(item, &["city"]).map(str::to_string).or(region);

        let id = stable_event_id(&source.id, title, source_url, start.as_deref());

        Some(CanonicalEvent {
            id,
            title: title.unwrap_or(UNTITLED_EVENT).to_string(),
            start_date: start,
            end_date: end,
            location: string_field(item, &["location", "venue", "place"]).map(str::to_string),
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
