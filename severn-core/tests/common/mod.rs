#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use severn_core::{
    Config, ContentCache, TtlCache,
    provider::{
        closure_feed_from_config, national_highways::NationalHighwaysFeed,
        open_meteo::OpenMeteoFeed, weather_feed_from_config,
    },
};

pub const API_KEY: &str = "TEST-KEY";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap()
}

pub fn config_for(server_uri: &str) -> Config {
    let mut cfg = Config::default();
    cfg.set_api_key(API_KEY.into());
    cfg.closures_url = format!("{server_uri}/closures");
    cfg.weather_url = format!("{server_uri}/forecast");
    cfg.timeout_secs = 1;
    cfg
}

pub fn closure_feed(cfg: &Config) -> NationalHighwaysFeed {
    closure_feed_from_config(cfg, Arc::new(ContentCache::new())).expect("api key set")
}

pub fn weather_feed(cfg: &Config) -> OpenMeteoFeed {
    weather_feed_from_config(cfg, Arc::new(TtlCache::new(cfg.weather_cache_ttl())))
        .expect("client builds")
}

/// Wrap management records in a minimal DATEX II document.
pub fn closures_xml(records: &[&str]) -> String {
    let situations: String = records
        .iter()
        .map(|r| {
            format!(
                "<situation><situationRecord>\
                 <sitRoadOrCarriagewayOrLaneManagement>{r}</sitRoadOrCarriagewayOrLaneManagement>\
                 </situationRecord></situation>"
            )
        })
        .collect();

    format!(
        "<d2LogicalModel><payloadPublication>{situations}</payloadPublication></d2LogicalModel>"
    )
}

pub const M48_ACTIVE_CLOSURE: &str = "<validityStatus>active</validityStatus>\
    <roadName>M48</roadName>\
    <locationDescription>M48 J1 Aust to J2 Chepstow</locationDescription>\
    <comment>Carriageway closure 201/5-196/0 due to high winds</comment>\
    <causeType>poorEnvironment</causeType>\
    <directionOnLinearSection>bothDirections</directionOnLinearSection>";

pub const M4_PLANNED_TONIGHT: &str = "<validityStatus>planned</validityStatus>\
    <overallStartTime>2026-01-29T20:00:00Z</overallStartTime>\
    <overallEndTime>2026-01-30T06:00:00Z</overallEndTime>\
    <roadName>M4</roadName>\
    <locationDescription>M4 J23 Magor to J22 Severn Crossing</locationDescription>\
    <comment>Lane closure for resurfacing</comment>\
    <directionOnLinearSection>eastBound</directionOnLinearSection>";

pub const A38_CLOSURE: &str = "<validityStatus>active</validityStatus>\
    <roadName>A38</roadName>\
    <locationDescription>A38 near Severn Beach</locationDescription>\
    <posList>51.60 -2.64</posList>";

pub const FORECAST_JSON: &str = r#"{
    "current_weather": {"temperature": 9.0, "windspeed": 24.0},
    "hourly": {
        "time": ["2026-01-29T10:00", "2026-01-29T11:00", "2026-01-29T12:00"],
        "temperature_2m": [8.0, 9.5, 9.0],
        "precipitation_probability": [10, 30, 70],
        "windgusts_10m": [35.0, 48.0, 44.0]
    }
}"#;
