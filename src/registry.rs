use crate::error::{IngestError, Result};
use crate::types::{SourceDescriptor, SourceType};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct SourcesFile {
    sources: Vec<SourceDescriptor>,
}

/// Load the source registry from a JSON configuration file.
///
/// Any problem here is a startup error: the run aborts before network
/// activity rather than ingesting from a half-understood config.
pub fn load_sources(path: &Path) -> Result<Vec<SourceDescriptor>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        IngestError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;

    let parsed: SourcesFile = serde_json::from_str(&raw).map_err(|e| {
        IngestError::Config(format!("failed to parse {}: {}", path.display(), e))
    })?;

    validate(&parsed.sources)?;

    let (enabled, disabled): (Vec<_>, Vec<_>) =
        parsed.sources.into_iter().partition(|s| s.enabled);
    for source in &disabled {
        info!(source = %source.id, "skipping disabled source");
    }

    Ok(enabled)
}

fn validate(sources: &[SourceDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(source.id.as_str()) {
            return Err(IngestError::Config(format!(
                "duplicate source id: {}",
                source.id
            )));
        }

        if source.source_type == SourceType::Scrape {
            let has_item_selector = source
                .selectors
                .as_ref()
                .map(|s| s.contains_key("item"))
                .unwrap_or(false);
            if !has_item_selector {
                return Err(IngestError::Config(format!(
                    "scrape source {} has no \"item\" selector",
                    source.id
                )));
            }
        }

        // Credential presence is checked up front so a missing key fails
        // the run before any fetch, not mid-pipeline. Disabled sources
        // may sit in the config without their key being set.
        if source.enabled {
            if let Some(auth) = &source.auth {
                if std::env::var(&auth.env_var).is_err() {
                    return Err(IngestError::Config(format!(
                        "source {} requires credential in ${}, which is not set",
                        source.id, auth.env_var
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(
            r#"{
                "sources": [
                    {
                        "id": "visitstockholm-events",
                        "type": "api",
                        "url": "https://example.com/api/events",
                        "country": "SE",
                        "region": "Stockholm",
                        "transform": "visit_stockholm",
                        "resultPath": "data.events"
                    },
                    {
                        "id": "stockholmlive-events",
                        "type": "scrape",
                        "url": "https://example.com/events",
                        "country": "SE",
                        "region": "Stockholm",
                        "selectors": { "item": "article", "title": "h3" }
                    }
                ]
            }"#,
        );

        let sources = load_sources(file.path()).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id, "visitstockholm-events");
        assert_eq!(sources[0].source_type, SourceType::Api);
        assert_eq!(sources[0].result_path.as_deref(), Some("data.events"));
        assert!(sources[1].enabled);
    }

    #[test]
    fn test_malformed_config_is_fatal() {
        let file = write_config(r#"{ "sources": [ { "id": "broken" "#);
        assert!(load_sources(file.path()).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let file = write_config(
            r#"{
                "sources": [
                    { "id": "a", "type": "feed", "url": "https://x/1", "country": "SE" },
                    { "id": "a", "type": "feed", "url": "https://x/2", "country": "SE" }
                ]
            }"#,
        );
        let err = load_sources(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate source id"));
    }

    #[test]
    fn test_scrape_requires_item_selector() {
        let file = write_config(
            r#"{
                "sources": [
                    {
                        "id": "no-item",
                        "type": "scrape",
                        "url": "https://x/events",
                        "country": "NO",
                        "selectors": { "title": "h2" }
                    }
                ]
            }"#,
        );
        let err = load_sources(file.path()).unwrap_err();
        assert!(err.to_string().contains("item"));
    }

    #[test]
    fn test_disabled_sources_filtered_and_not_credential_checked() {
        let file = write_config(
            r#"{
                "sources": [
                    { "id": "live", "type": "feed", "url": "https://x/feed", "country": "SE" },
                    {
                        "id": "keyed-but-off",
                        "type": "api",
                        "url": "https://x/api",
                        "country": "SE",
                        "auth": { "envVar": "URNAVI_TEST_UNSET_KEY", "headerName": "X-Api-Key" },
                        "enabled": false
                    }
                ]
            }"#,
        );
        let sources = load_sources(file.path()).unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id, "live");
    }

    #[test]
    fn test_missing_credential_is_fatal() {
        let file = write_config(
            r#"{
                "sources": [
                    {
                        "id": "keyed",
                        "type": "api",
                        "url": "https://x/api",
                        "country": "SE",
                        "auth": { "envVar": "URNAVI_TEST_MISSING_KEY", "headerName": "X-Api-Key" }
                    }
                ]
            }"#,
        );
        let err = load_sources(file.path()).unwrap_err();
        assert!(err.to_string().contains("URNAVI_TEST_MISSING_KEY"));
    }
}
