use super::SourceFetcher;
use crate::error::{IngestError, Result};
use crate::types::{RawItem, SourceDescriptor};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

pub struct ApiFetcher;

#[async_trait]
impl SourceFetcher for ApiFetcher {
    async fn fetch(
        &self,
        client: &reqwest::Client,
        source: &SourceDescriptor,
    ) -> Result<Vec<RawItem>> {
        debug!(source = %source.id, url = %source.url, "fetching API");
        let mut request = client.get(&source.url);
        if let Some(params) = &source.params {
            request = request.query(params);
        }
        // Credential presence was validated at startup
        if let Some(auth) = &source.auth {
            if let Ok(key) = std::env::var(&auth.env_var) {
                request = request.header(auth.header_name.as_str(), key);
            }
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(IngestError::Source {
                message: format!("API fetch failed: HTTP {}", response.status().as_u16()),
            });
        }

        let body: Value = response.json().await?;
        Ok(locate_array(&body, source.result_path.as_deref()))
    }
}

/// Locate the item array inside an arbitrary API response envelope:
/// a configured dotted path wins; otherwise accept a bare array or the
/// common `.items` / `.events` conventions.
fn locate_array(body: &Value, result_path: Option<&str>) -> Vec<RawItem> {
    if let Some(path) = result_path {
        let mut cursor = body;
        for part in path.split('.') {
            match cursor.get(part) {
                Some(next) => cursor = next,
                None => return Vec::new(),
            }
        }
        return cursor.as_array().cloned().unwrap_or_default();
    }

    if let Some(items) = body.as_array() {
        return items.clone();
    }
    for key in ["items", "events"] {
        if let Some(items) = body.get(key).and_then(Value::as_array) {
            return items.clone();
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_locate_bare_array() {
        let body = json!([{"title": "A"}, {"title": "B"}]);
        assert_eq!(locate_array(&body, None).len(), 2);
    }

    #[test]
    fn test_locate_common_envelope_keys() {
        let body = json!({"items": [{"title": "A"}]});
        assert_eq!(locate_array(&body, None).len(), 1);

        let body = json!({"events": [{"title": "A"}, {"title": "B"}]});
        assert_eq!(locate_array(&body, None).len(), 2);
    }

    #[test]
    fn test_locate_dotted_result_path() {
        let body = json!({"data": {"events": [{"title": "A"}]}});
        assert_eq!(locate_array(&body, Some("data.events")).len(), 1);
    }

    #[test]
    fn test_missing_path_segment_yields_empty() {
        let body = json!({"data": {"events": []}});
        assert!(locate_array(&body, Some("data.missing")).is_empty());
    }

    #[test]
    fn test_path_to_non_array_yields_empty() {
        let body = json!({"data": {"events": {"nested": true}}});
        assert!(locate_array(&body, Some("data.events")).is_empty());
    }

    #[test]
    fn test_unrecognized_envelope_yields_empty() {
        let body = json!({"results": [{"title": "A"}]});
        assert!(locate_array(&body, None).is_empty());
    }
}
