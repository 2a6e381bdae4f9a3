use crate::config::Settings;
use crate::dates;
use crate::error::{IngestError, Result};
use crate::fetchers;
use crate::geo;
use crate::output::{self, FrontendEvent};
use crate::transforms;
use crate::types::{CanonicalEvent, SourceDescriptor};
use chrono::{DateTime, Months, Utc};
use metrics::{counter, histogram};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

pub const EVENTS_FILE: &str = "events.json";
pub const HORIZON_FILE: &str = "upcoming-12mo.json";

/// Result of a complete ingest run
#[derive(Debug)]
pub struct RunSummary {
    pub sources: usize,
    pub failed_sources: usize,
    pub collected: usize,
    pub unique: usize,
    pub written: usize,
    pub upcoming: usize,
    pub output_file: PathBuf,
    pub horizon_file: PathBuf,
}

/// Outcome of one source's fetch+transform task. Failures are data here,
/// not propagated errors, so one bad source never aborts its siblings.
struct SourceOutcome {
    source_id: String,
    result: Result<Vec<CanonicalEvent>>,
}

pub struct Pipeline {
    settings: Settings,
    client: reqwest::Client,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.source_timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    /// Run the full pipeline: fetch and transform every source under the
    /// concurrency bound, pool, dedupe, normalize dates, fill
    /// coordinates, then write both output files.
    pub async fn run(
        &self,
        sources: Vec<SourceDescriptor>,
        output_dir: &Path,
    ) -> Result<RunSummary> {
        let started = std::time::Instant::now();
        counter!("ingest_runs_total").increment(1);
        info!(
            sources = sources.len(),
            concurrency = self.settings.concurrency,
            "starting ingest run"
        );

        let source_count = sources.len();
        let outcomes = self.collect_all(sources).await;

        let mut failed_sources = 0;
        let mut collected: Vec<CanonicalEvent> = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(events) => collected.extend(events),
                Err(e) => {
                    failed_sources += 1;
                    warn!(source = %outcome.source_id, error = %e, "source failed, contributing zero events");
                    counter!("ingest_source_failures_total", "source" => outcome.source_id.clone())
                        .increment(1);
                }
            }
        }
        let collected_count = collected.len();
        counter!("ingest_events_collected_total").increment(collected_count as u64);

        let now = Utc::now();
        let mut events = dedupe(collected);
        normalize_dates(&mut events, now);
        fill_coordinates(&mut events);

        let frontend: Vec<FrontendEvent> = events
            .iter()
            .filter_map(FrontendEvent::from_canonical)
            .collect();
        let upcoming: Vec<&CanonicalEvent> = events
            .iter()
            .filter(|ev| starts_within_months(ev, now, self.settings.horizon_months))
            .collect();

        let dropped = events.len() - frontend.len();
        counter!("ingest_events_dropped_total").increment(dropped as u64);

        std::fs::create_dir_all(output_dir)?;
        let output_file = output_dir.join(EVENTS_FILE);
        let horizon_file = output_dir.join(HORIZON_FILE);
        output::write_events(&output_file, &frontend)?;
        output::write_horizon(&horizon_file, &upcoming, now)?;

        histogram!("ingest_run_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            collected = collected_count,
            unique = events.len(),
            written = frontend.len(),
            dropped,
            upcoming = upcoming.len(),
            failed_sources,
            "ingest run complete"
        );

        Ok(RunSummary {
            sources: source_count,
            failed_sources,
            collected: collected_count,
            unique: events.len(),
            written: frontend.len(),
            upcoming: upcoming.len(),
            output_file,
            horizon_file,
        })
    }

    /// Fan out per-source tasks under the global concurrency bound and
    /// wait for all of them to settle.
    async fn collect_all(&self, sources: Vec<SourceDescriptor>) -> Vec<SourceOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.settings.concurrency));
        let mut handles = Vec::with_capacity(sources.len());

        for source in sources {
            let semaphore = semaphore.clone();
            let client = self.client.clone();
            let timeout = self.settings.source_timeout;
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let result =
                    match tokio::time::timeout(timeout, collect_source(&client, &source)).await {
                        Ok(result) => result,
                        Err(_) => Err(IngestError::Source {
                            message: format!("timed out after {}s", timeout.as_secs()),
                        }),
                    };
                SourceOutcome {
                    source_id: source.id,
                    result,
                }
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(error = %e, "source task aborted");
                    outcomes.push(SourceOutcome {
                        source_id: "<unknown>".to_string(),
                        result: Err(IngestError::Source {
                            message: format!("task join error: {e}"),
                        }),
                    });
                }
            }
        }
        outcomes
    }
}

/// Fetch one source's raw items and transform them into canonical
/// events, fully attributed with the source's country and city.
#[instrument(skip(client, source), fields(source = %source.id))]
async fn collect_source(
    client: &reqwest::Client,
    source: &SourceDescriptor,
) -> Result<Vec<CanonicalEvent>> {
    let fetcher = fetchers::fetcher_for(source.source_type);
    let raw_items = fetcher.fetch(client, source).await?;

    let adapter = transforms::for_source(source);
    let mut events: Vec<CanonicalEvent> = raw_items
        .iter()
        .filter_map(|item| adapter.transform(item, source))
        .collect();

    // Attribute records before they enter the shared pool, so dedup keys
    // and geocode fill operate on fully-attributed records even from
    // bare adapters.
    let country = geo::country_name(&source.country);
    for event in &mut events {
        if event.country.is_none() {
            event.country = Some(country.clone());
        }
        if event.city.is_none() {
            event.city = source.region.clone();
        }
    }

    info!(
        raw = raw_items.len(),
        normalized = events.len(),
        adapter = adapter.name(),
        "source collected"
    );
    Ok(events)
}

/// Deduplicate the full combined pool; first occurrence wins. The key is
/// the normalized (source, sourceUrl) pair when a URL is present, else
/// the record id.
pub fn dedupe(events: Vec<CanonicalEvent>) -> Vec<CanonicalEvent> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(events.len());
    for event in events {
        let key = match &event.source_url {
            Some(url) => format!("{}|{}", event.source, normalize_url_key(url)),
            None => event.id.clone(),
        };
        if seen.insert(key) {
            unique.push(event);
        }
    }
    unique
}

// Case and trailing-slash variants of the same page compare equal;
// genuinely distinct events differ in path or query, which survive.
fn normalize_url_key(url: &str) -> String {
    url.trim().trim_end_matches('/').to_lowercase()
}

/// Run every record's start through the date normalizer.
pub fn normalize_dates(events: &mut [CanonicalEvent], now: DateTime<Utc>) {
    for event in events.iter_mut() {
        if let Some(start) = event.start_date.take() {
            event.start_date = Some(dates::normalize_date_at(&start, now));
        }
    }
}

/// Backfill missing coordinates from the static city/country tables.
/// Records that still lack coordinates afterwards are excluded from the
/// frontend file by the output projection.
pub fn fill_coordinates(events: &mut [CanonicalEvent]) {
    for event in events.iter_mut() {
        if event.lat.is_some() && event.lng.is_some() {
            continue;
        }
        if let Some((lat, lng)) =
            geo::resolve_coords(event.city.as_deref(), event.country.as_deref())
        {
            event.lat = Some(lat);
            event.lng = Some(lng);
        }
    }
}

/// Horizon check: start within [now, now + months]. chrono's month
/// arithmetic clamps end-of-month overflow to the last valid day, so a
/// window opened on Jan 31 closes on Feb 28/29 for a one-month horizon.
pub fn starts_within_months(event: &CanonicalEvent, now: DateTime<Utc>, months: u32) -> bool {
    let Some(start) = event.start_date.as_deref().and_then(dates::parse_instant) else {
        return false;
    };
    let Some(limit) = now.checked_add_months(Months::new(months)) else {
        return false;
    };
    start >= now && start <= limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(source: &str, id: &str, url: Option<&str>) -> CanonicalEvent {
        CanonicalEvent {
            id: id.to_string(),
            title: format!("Event {id}"),
            start_date: None,
            end_date: None,
            location: None,
            description: None,
            source_url: url.map(str::to_string),
            source: source.to_string(),
            country: None,
            city: None,
            lat: None,
            lng: None,
            category: None,
            raw: json!({}),
        }
    }

    fn fixed_now(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_dedupe_first_occurrence_wins() {
        let a = event("src", "a", Some("https://x/1"));
        let b = event("src", "b", Some("https://x/1"));
        let unique = dedupe(vec![a, b]);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].id, "a");
    }

    #[test]
    fn test_dedupe_distinct_urls_survive() {
        let a = event("src", "a", Some("https://x/1"));
        let b = event("src", "b", Some("https://x/2"));
        assert_eq!(dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_dedupe_same_url_different_sources_survive() {
        let a = event("src-a", "a", Some("https://x/1"));
        let b = event("src-b", "b", Some("https://x/1"));
        assert_eq!(dedupe(vec![a, b]).len(), 2);
    }

    #[test]
    fn test_dedupe_normalizes_url_variants() {
        let a = event("src", "a", Some("https://x/Jazz-Night/"));
        let b = event("src", "b", Some("  https://x/jazz-night"));
        let unique = dedupe(vec![a, b]);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].id, "a");
    }

    #[test]
    fn test_dedupe_without_url_falls_back_to_id() {
        let a = event("src", "same", None);
        let b = event("src", "same", None);
        let c = event("src", "other", None);
        assert_eq!(dedupe(vec![a, b, c]).len(), 2);
    }

    #[test]
    fn test_fill_coordinates_city_then_country() {
        let mut events = vec![event("src", "a", None), event("src", "b", None)];
        events[0].city = Some("Stockholm".to_string());
        events[0].country = Some("Sweden".to_string());
        events[1].city = Some("Unknown Town".to_string());
        events[1].country = Some("Norway".to_string());

        fill_coordinates(&mut events);
        assert_eq!(events[0].lat, Some(59.3293));
        assert_eq!(events[0].lng, Some(18.0686));
        // Country centroid fallback
        assert_eq!(events[1].lat, Some(64.5));
        assert_eq!(events[1].lng, Some(11.0));
    }

    #[test]
    fn test_fill_coordinates_leaves_unresolvable_empty() {
        let mut events = vec![event("src", "a", None)];
        events[0].city = Some("Berlin".to_string());
        events[0].country = Some("Germany".to_string());
        fill_coordinates(&mut events);
        assert_eq!(events[0].lat, None);
        assert_eq!(events[0].lng, None);
    }

    #[test]
    fn test_normalize_dates_resolves_human_text() {
        let now = fixed_now("2025-06-01T12:00:00Z");
        let mut events = vec![event("src", "a", None)];
        events[0].start_date = Some("Wed, 25 Dec 7:30pm".to_string());
        normalize_dates(&mut events, now);
        assert_eq!(events[0].start_date.as_deref(), Some("2025-12-25T19:30:00Z"));
    }

    #[test]
    fn test_horizon_window() {
        let now = fixed_now("2025-06-01T00:00:00Z");
        let mut inside = event("src", "a", None);
        inside.start_date = Some("2025-12-24T19:00:00Z".to_string());
        let mut outside = event("src", "b", None);
        outside.start_date = Some("2026-07-01T00:00:00Z".to_string());
        let mut past = event("src", "c", None);
        past.start_date = Some("2025-05-31T00:00:00Z".to_string());
        let mut unresolved = event("src", "d", None);
        unresolved.start_date = Some("25 March".to_string());

        assert!(starts_within_months(&inside, now, 12));
        assert!(!starts_within_months(&outside, now, 12));
        assert!(!starts_within_months(&past, now, 12));
        assert!(!starts_within_months(&unresolved, now, 12));
    }

    #[test]
    fn test_horizon_window_clamps_month_end() {
        // Window opened on Jan 31: one month lands on Feb 28 (2025 is not
        // a leap year)
        let now = fixed_now("2025-01-31T00:00:00Z");
        let mut on_edge = event("src", "a", None);
        on_edge.start_date = Some("2025-02-28T00:00:00Z".to_string());
        let mut beyond = event("src", "b", None);
        beyond.start_date = Some("2025-03-01T00:00:00Z".to_string());

        assert!(starts_within_months(&on_edge, now, 1));
        assert!(!starts_within_months(&beyond, now, 1));
    }
}
