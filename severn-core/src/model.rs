use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::weather::RiskLevel;

/// A raw road-management record as it comes off the closures feed.
///
/// Fields the feed leaves out are filled with sentinel values by the parser
/// ("Unknown", "No description", "unknown") rather than failing the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosureEvent {
    pub road: String,
    pub location: String,
    pub description: String,
    pub status: String,
    pub probability: String,
    pub cause: String,
    pub management_type: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Space separated `lat lon lat lon ...` sequence.
    pub coordinates: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Eastbound,
    Westbound,
    Both,
    Unknown,
}

impl Direction {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Direction::Unknown;
        };

        match raw.trim().to_lowercase().as_str() {
            "eastbound" => Direction::Eastbound,
            "westbound" => Direction::Westbound,
            "bothdirections" | "both" => Direction::Both,
            _ => Direction::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Eastbound => "eastbound",
            Direction::Westbound => "westbound",
            Direction::Both => "both directions",
            Direction::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a bridge or one carriageway. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Open,
    Restricted,
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "OPEN",
            Status::Restricted => "RESTRICTED",
            Status::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BridgeId {
    M48,
    M4,
}

impl BridgeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            BridgeId::M48 => "M48",
            BridgeId::M4 => "M4",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            BridgeId::M48 => "M48 Severn Bridge (Original Bridge, 1966)",
            BridgeId::M4 => "M4 Prince of Wales Bridge (Second Severn Crossing, 1996)",
        }
    }

    pub const fn all() -> &'static [BridgeId] {
        &[BridgeId::M48, BridgeId::M4]
    }
}

impl std::fmt::Display for BridgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A corridor event after classification. Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedClosure {
    pub bridge: BridgeId,
    pub road: String,
    pub location: String,
    /// Comment text with mile-marker references stripped.
    pub description: String,
    pub is_active: bool,
    pub reason: String,
    /// Raw validity status from the feed.
    pub status: String,
    pub probability: String,
    pub cause: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub direction: Direction,
}

impl ClassifiedClosure {
    pub fn is_planned(&self) -> bool {
        self.status.eq_ignore_ascii_case("planned")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeStatus {
    pub bridge: BridgeId,
    pub overall: Status,
    pub eastbound: Status,
    pub westbound: Status,
    /// Short human summary, e.g. "Open - 2 planned closure(s)".
    pub summary: String,
    pub closures: Vec<ClassifiedClosure>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub current_temperature_c: Option<f64>,
    pub current_wind_mph: Option<f64>,
    pub current_rain_probability_pct: Option<u8>,
    pub high_temperature_c: Option<f64>,
    pub high_temperature_time: Option<String>,
    pub low_temperature_c: Option<f64>,
    pub low_temperature_time: Option<String>,
    pub max_rain_probability_pct: Option<u8>,
    pub max_rain_time: Option<String>,
    pub max_gust_mph: Option<f64>,
    pub max_gust_time: Option<String>,
    pub wind_risk: RiskLevel,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub weather: Option<WeatherSnapshot>,
    pub m48: BridgeStatus,
    pub m4: BridgeStatus,
    /// Corridor closures that are planned but not in effect, in feed order.
    pub upcoming: Vec<ClassifiedClosure>,
    pub total_closures: usize,
}

impl Report {
    pub fn bridges(&self) -> [&BridgeStatus; 2] {
        [&self.m48, &self.m4]
    }
}
