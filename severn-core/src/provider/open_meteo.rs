use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    cache::TtlCache,
    error::FeedError,
    model::WeatherSnapshot,
    provider::{FeedId, truncate_body},
    weather::WeatherReadings,
};

use super::WeatherFeed;

const FEED: FeedId = FeedId::OpenMeteo;

/// Open-Meteo forecast for a single point, today only.
#[derive(Debug, Clone)]
pub struct OpenMeteoFeed {
    url: String,
    latitude: f64,
    longitude: f64,
    http: Client,
    cache: Arc<TtlCache<WeatherSnapshot>>,
}

impl OpenMeteoFeed {
    pub fn new(
        url: String,
        latitude: f64,
        longitude: f64,
        http: Client,
        cache: Arc<TtlCache<WeatherSnapshot>>,
    ) -> Self {
        Self { url, latitude, longitude, http, cache }
    }

    async fn fetch_readings(&self) -> Result<WeatherReadings, FeedError> {
        info!(url = %self.url, "fetching weather");

        let res = self
            .http
            .get(&self.url)
            .query(&[
                ("latitude", self.latitude.to_string().as_str()),
                ("longitude", self.longitude.to_string().as_str()),
                ("hourly", "temperature_2m,precipitation_probability,windgusts_10m"),
                ("timezone", "Europe/London"),
                ("forecast_days", "1"),
                ("current_weather", "true"),
            ])
            .send()
            .await
            .map_err(|e| FeedError::transport(FEED, e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| FeedError::transport(FEED, e))?;

        if !status.is_success() {
            return Err(FeedError::Status {
                feed: FEED,
                status: status.as_u16(),
                message: format!("status {}: {}", status, truncate_body(&body)),
            });
        }

        debug!(bytes = body.len(), "weather response received");
        parse_forecast(&body)
    }
}

#[async_trait]
impl WeatherFeed for OpenMeteoFeed {
    async fn fetch_weather(&self, now: DateTime<Utc>) -> Result<WeatherSnapshot, FeedError> {
        self.cache
            .get_or_try_refresh(now, move || async move {
                let readings = self.fetch_readings().await?;
                Ok::<_, FeedError>(readings.into_snapshot(now))
            })
            .await
    }
}

pub fn parse_forecast(body: &str) -> Result<WeatherReadings, FeedError> {
    let parsed: OmResponse = serde_json::from_str(body).map_err(|e| FeedError::Parse {
        feed: FEED,
        message: e.to_string(),
    })?;

    let current = parsed.current_weather.unwrap_or_default();
    let hourly = parsed.hourly.unwrap_or_default();

    Ok(WeatherReadings {
        current_temperature_c: current.temperature,
        current_wind_kmh: current.windspeed,
        times: hourly.time,
        temperatures_c: hourly.temperature_2m,
        rain_probabilities_pct: hourly.precipitation_probability,
        gusts_kmh: hourly.windgusts_10m,
    })
}

#[derive(Debug, Default, Deserialize)]
struct OmCurrent {
    temperature: Option<f64>,
    windspeed: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OmHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    precipitation_probability: Vec<Option<u8>>,
    windgusts_10m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: Option<OmCurrent>,
    hourly: Option<OmHourly>,
}
