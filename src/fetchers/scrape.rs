use super::SourceFetcher;
use crate::error::{IngestError, Result};
use crate::types::{RawItem, SourceDescriptor};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct ScrapeFetcher;

#[async_trait]
impl SourceFetcher for ScrapeFetcher {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawItem>> {
        let selectors = source.selectors.as_ref().ok_or_else(|| {
            IngestError::Config(format!("scrape source {} has no selectors", source.id))
        })?;

        debug!(source = %source.id, url = %source.url, "fetching page");
        let response = client.get(&source.url).send().await?;
        if !response.status().is_success() {
            return Err(IngestError::Source {
                message: format!("scrape fetch failed: HTTP {}", response.status().as_u16()),
            });
        }

        let html = response.text().await?;
        extract_items(&html, selectors, &source.id)
    }
}

/// Extract one flat string map per element matching the "item" selector.
/// A `selector@attribute` spec reads an attribute, a plain selector reads
/// trimmed text content; fields with no match come out null.
pub(crate) fn extract_items(
    html: &str,
    selectors: &HashMap<String, String>,
    source_id: &str,
) -> Result<Vec<RawItem>> {
    let item_spec = selectors.get("item").ok_or_else(|| {
        IngestError::Config(format!("scrape source {source_id} has no \"item\" selector"))
    })?;
    let item_selector = parse_selector(item_spec, source_id)?;

    let document = Html::parse_document(html);
    let mut items = Vec::new();
    for element in document.select(&item_selector) {
        let mut fields = serde_json::Map::new();
        for (field, spec) in selectors {
            if field == "item" {
                continue;
            }
            let value = extract_field(&element, spec);
            fields.insert(field.clone(), value.map(Value::String).unwrap_or(Value::Null));
        }
        items.push(Value::Object(fields));
    }

    if items.is_empty() {
        warn!(source = %source_id, selector = %item_spec, "item selector matched no elements");
    }
    Ok(items)
}

fn extract_field(element: &ElementRef, spec: &str) -> Option<String> {
    if let Some((sel, attr)) = spec.split_once('@') {
        let selector = Selector::parse(sel).ok()?;
        element
            .select(&selector)
            .next()
            .and_then(|node| node.value().attr(attr))
            .map(|v| v.to_string())
    } else {
        let selector = Selector::parse(spec).ok()?;
        let text = element
            .select(&selector)
            .next()?
            .text()
            .collect::<String>()
            .trim()
            .to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn parse_selector(spec: &str, source_id: &str) -> Result<Selector> {
    Selector::parse(spec).map_err(|e| IngestError::Source {
        message: format!("source {source_id}: invalid selector {spec:?}: {e}"),
    })
}
