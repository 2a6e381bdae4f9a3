use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw item as returned by a source fetcher, before transformation
pub type RawItem = serde_json::Value;

/// Fetch strategy for a configured source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Feed,
    Api,
    Scrape,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Feed => write!(f, "feed"),
            SourceType::Api => write!(f, "api"),
            SourceType::Scrape => write!(f, "scrape"),
        }
    }
}

/// API credential passed as a request header, with the secret supplied
/// via the named environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub env_var: String,
    pub header_name: String,
}

/// Configuration describing one upstream data source: how to fetch it
/// and which transform adapter maps its items into canonical events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub url: String,
    /// ISO country code (e.g. "SE"), resolved to a human-readable name
    /// before records enter the shared pool
    pub country: String,
    /// Default city applied when an item carries no city of its own
    #[serde(default)]
    pub region: Option<String>,
    /// Scrape field map; must contain an "item" key for scrape sources
    #[serde(default)]
    pub selectors: Option<HashMap<String, String>>,
    /// Transform adapter id; the generic adapter is used when absent
    #[serde(default)]
    pub transform: Option<String>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub params: Option<HashMap<String, String>>,
    /// Dotted path to the item array inside an API response envelope
    #[serde(default)]
    pub result_path: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Normalized, pipeline-output representation of one event.
///
/// `start_date` holds the cleaned source text until the date pass runs;
/// records whose start never resolves to an instant are dropped before
/// the frontend file is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    pub id: String,
    pub title: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub source_url: Option<String>,
    pub source: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub category: Option<String>,
    /// Original source payload, kept for the diagnostic output only
    pub raw: RawItem,
}
