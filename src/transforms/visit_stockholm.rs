use super::{
    date_field, require_object, stable_event_id, string_field, Transform, UNTITLED_EVENT,
};
use crate::dates;
use crate::geo;
use crate::types::{CanonicalEvent, RawItem, SourceDescriptor};
use serde_json::Value;

/// Adapter for the VisitStockholm events API, which nests dates in
/// `dates` / `occurrences` arrays and the venue in a `location` object.
pub struct VisitStockholmTransform;

impl Transform for VisitStockholmTransform {
    fn name(&self) -> &'static str {
        "visit_stockholm"
    }

    fn transform(&self, item: &RawItem, source: &SourceDescriptor) -> Option<CanonicalEvent> {
        require_object(item, self.name(), source)?;

        let title = string_field(item, &["title", "name", "headline"]);

        let source_url = string_field(item, &["url", "eventUrl"])
            .map(str::to_string)
            .or_else(|| first_link_href(item));

        let start = date_field(item, &["startDate", "start", "date"])
            .or_else(|| nested_date(item, "dates", "start"))
            .or_else(|| nested_date(item, "occurrences", "start"))
            .map(dates::preparse_date);
        let end = date_field(item, &["endDate", "end"])
            .or_else(|| nested_date(item, "dates", "end"))
            .or_else(|| nested_date(item, "occurrences", "end"))
            .map(dates::preparse_date);

        let location = item
            .get("location")
            .and_then(|loc| {
                ["name", "address", "city"]
                    .iter()
                    .find_map(|k| loc.get(k).and_then(Value::as_str))
            })
            .or_else(|| string_field(item, &["venue", "place"]));

        let city = item
            .get("location")
            .and_then(|l| l.get("city"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| source.region.clone())
            .or_else(|| Some("Stockholm".to_string()));

        let id = stable_event_id(&source.id, title, source_url.as_deref(), start.as_deref());

        Some(CanonicalEvent {
            id,
            title: title.unwrap_or(UNTITLED_EVENT).to_string(),
            start_date: start,
            end_date: end,
            location: location.map(str::to_string),
            description: string_field(item, &["description", "summary", "longDescription"])
                .map(str::to_string),
            source_url,
            source: source.id.clone(),
            country: Some(geo::country_name(&source.country)),
            city,
            lat: None,
            lng: None,
            category: string_field(item, &["category"]).map(str::to_string),
            raw: item.clone(),
        })
    }
}

fn first_link_href(item: &RawItem) -> Option<String> {
    item.get("links")?
        .get(0)?
        .get("href")?
        .as_str()
        .map(str::to_string)
}

fn nested_date<'a>(item: &'a RawItem, key: &str, field: &str) -> Option<&'a str> {
    item.get(key)?.get(0)?.get(field)?.as_str()
}
