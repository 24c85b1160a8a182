use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::{
    Config,
    cache::{ContentCache, TtlCache},
    error::FeedError,
    model::{ClosureEvent, WeatherSnapshot},
    provider::{national_highways::NationalHighwaysFeed, open_meteo::OpenMeteoFeed},
};

pub mod national_highways;
pub mod open_meteo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedId {
    NationalHighways,
    OpenMeteo,
}

impl FeedId {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedId::NationalHighways => "nationalhighways",
            FeedId::OpenMeteo => "openmeteo",
        }
    }

    pub const fn all() -> &'static [FeedId] {
        &[FeedId::NationalHighways, FeedId::OpenMeteo]
    }
}

impl std::fmt::Display for FeedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of raw road-management events.
#[async_trait]
pub trait ClosureFeed: Send + Sync + Debug {
    async fn fetch_events(&self) -> Result<Vec<ClosureEvent>, FeedError>;
}

/// Source of today's weather at the crossings.
#[async_trait]
pub trait WeatherFeed: Send + Sync + Debug {
    async fn fetch_weather(&self, now: DateTime<Utc>) -> Result<WeatherSnapshot, FeedError>;
}

/// Build the closures feed from config. Fails when no API key is set.
pub fn closure_feed_from_config(
    config: &Config,
    cache: Arc<ContentCache<Vec<ClosureEvent>>>,
) -> Result<NationalHighwaysFeed, FeedError> {
    let api_key = config
        .api_key()
        .ok_or(FeedError::MissingApiKey(FeedId::NationalHighways))?;

    let http = http_client(FeedId::NationalHighways, config.timeout())?;
    Ok(NationalHighwaysFeed::new(api_key.to_owned(), config.closures_url.clone(), http, cache))
}

pub fn weather_feed_from_config(
    config: &Config,
    cache: Arc<TtlCache<WeatherSnapshot>>,
) -> Result<OpenMeteoFeed, FeedError> {
    let http = http_client(FeedId::OpenMeteo, config.timeout())?;
    Ok(OpenMeteoFeed::new(
        config.weather_url.clone(),
        config.latitude,
        config.longitude,
        http,
        cache,
    ))
}

pub(crate) fn http_client(feed: FeedId, timeout: Duration) -> Result<Client, FeedError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("severn/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FeedError::transport(feed, e))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_ids_have_distinct_names() {
        let names: Vec<_> = FeedId::all().iter().map(FeedId::as_str).collect();
        assert_eq!(names, ["nationalhighways", "openmeteo"]);
        assert_eq!(FeedId::OpenMeteo.to_string(), "openmeteo");
    }

    #[test]
    fn closure_feed_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = closure_feed_from_config(&cfg, Arc::new(ContentCache::new())).unwrap_err();
        assert!(matches!(err, FeedError::MissingApiKey(FeedId::NationalHighways)));
    }

    #[test]
    fn closure_feed_builds_when_key_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        assert!(closure_feed_from_config(&cfg, Arc::new(ContentCache::new())).is_ok());
    }

    #[test]
    fn weather_feed_needs_no_key() {
        let cfg = Config::default();
        let cache = Arc::new(TtlCache::new(cfg.weather_cache_ttl()));
        assert!(weather_feed_from_config(&cfg, cache).is_ok());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "tiny";
        assert_eq!(truncate_body(short), "tiny");

        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
