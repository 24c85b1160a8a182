//! Wind risk tiers and the daily weather snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::WeatherSnapshot;

pub const KMH_TO_MPH: f64 = 0.621371;

/// Lower bound (inclusive) of the HIGH tier, mph.
pub const HIGH_RISK_MPH: f64 = 41.0;
/// Lower bound (inclusive) of the MONITOR tier, mph.
pub const MONITOR_RISK_MPH: f64 = 26.0;

pub fn kmh_to_mph(kmh: f64) -> f64 {
    kmh * KMH_TO_MPH
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe,
    Monitor,
    High,
    Unknown,
}

impl RiskLevel {
    pub fn from_speed(speed_mph: Option<f64>) -> Self {
        match speed_mph {
            Some(mph) if mph >= HIGH_RISK_MPH => RiskLevel::High,
            Some(mph) if mph >= MONITOR_RISK_MPH => RiskLevel::Monitor,
            Some(mph) if mph.is_finite() => RiskLevel::Safe,
            _ => RiskLevel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Monitor => "MONITOR",
            RiskLevel::High => "HIGH",
            RiskLevel::Unknown => "UNKNOWN",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "Normal conditions",
            RiskLevel::Monitor => "Possible restrictions",
            RiskLevel::High => "Likely closure",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw readings for today, in the feed's units (°C, km/h, %).
///
/// The hourly series are parallel to `times`; gaps in the feed show up as
/// `None` entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherReadings {
    pub current_temperature_c: Option<f64>,
    pub current_wind_kmh: Option<f64>,
    pub times: Vec<String>,
    pub temperatures_c: Vec<Option<f64>>,
    pub rain_probabilities_pct: Vec<Option<u8>>,
    pub gusts_kmh: Vec<Option<f64>>,
}

impl WeatherReadings {
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>) -> WeatherSnapshot {
        let current_wind_mph = self.current_wind_kmh.filter(|v| v.is_finite()).map(kmh_to_mph);

        let high = extreme(&self.temperatures_c, |candidate, best| candidate > best);
        let low = extreme(&self.temperatures_c, |candidate, best| candidate < best);

        let rain: Vec<Option<f64>> =
            self.rain_probabilities_pct.iter().map(|p| p.map(f64::from)).collect();
        let max_rain = extreme(&rain, |candidate, best| candidate > best).filter(|(p, _)| *p > 0.0);

        let max_gust =
            extreme(&self.gusts_kmh, |candidate, best| candidate > best).filter(|(g, _)| *g > 0.0);
        let max_gust_mph = max_gust.map(|(kmh, _)| kmh_to_mph(kmh));

        // Gusts close bridges before sustained wind does.
        let wind_risk = RiskLevel::from_speed(max_gust_mph.or(current_wind_mph));

        WeatherSnapshot {
            current_temperature_c: self.current_temperature_c.filter(|v| v.is_finite()),
            current_wind_mph,
            current_rain_probability_pct: self
                .rain_probabilities_pct
                .first()
                .map(|p| p.unwrap_or(0)),
            high_temperature_c: high.map(|(t, _)| t),
            high_temperature_time: high.and_then(|(_, i)| self.time_of_day(i)),
            low_temperature_c: low.map(|(t, _)| t),
            low_temperature_time: low.and_then(|(_, i)| self.time_of_day(i)),
            max_rain_probability_pct: max_rain.map(|(p, _)| p as u8),
            max_rain_time: max_rain.and_then(|(_, i)| self.time_of_day(i)),
            max_gust_mph,
            max_gust_time: max_gust.and_then(|(_, i)| self.time_of_day(i)),
            wind_risk,
            fetched_at,
        }
    }

    fn time_of_day(&self, index: usize) -> Option<String> {
        self.times.get(index).map(|t| time_of_day(t))
    }
}

/// `2026-01-29T14:00` -> `14:00`. Strings without a `T` pass through.
pub fn time_of_day(iso: &str) -> String {
    match iso.split_once('T') {
        Some((_, time)) => time.to_string(),
        None => iso.to_string(),
    }
}

/// First value that beats every earlier one under `better`, with its index.
fn extreme(values: &[Option<f64>], better: impl Fn(f64, f64) -> bool) -> Option<(f64, usize)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.filter(|v| v.is_finite()).map(|v| (v, i)))
        .fold(None, |best, (v, i)| match best {
            Some((b, _)) if !better(v, b) => best,
            _ => Some((v, i)),
        })
}
