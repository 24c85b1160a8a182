//! Corridor membership for M4/M48 events around the Severn crossings.
//!
//! Keyword checks run before the coordinate fallback and the first match
//! wins. The two can disagree, so the order is part of the contract.

use thiserror::Error;

use crate::model::ClosureEvent;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoordinateError {
    #[error("coordinate value '{0}' is not a number")]
    InvalidNumber(String),

    #[error("coordinate sequence has odd length {0}")]
    OddLength(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Covers both the M48 Severn Bridge (51.61N 2.64W) and the
    /// Prince of Wales Bridge (51.57N 2.64W).
    pub const SEVERN: BoundingBox = BoundingBox {
        lat_min: 51.55,
        lat_max: 51.65,
        lon_min: -2.75,
        lon_max: -2.55,
    };

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat) && (self.lon_min..=self.lon_max).contains(&lon)
    }
}

/// Static corridor definition: bounding box plus per-road location tokens.
///
/// Tokens are matched as lowercase substrings of the location text.
#[derive(Debug, Clone, PartialEq)]
pub struct Geofence {
    pub bbox: BoundingBox,
    pub m48_tokens: Vec<String>,
    pub m4_tokens: Vec<String>,
    /// Extra M4 tokens for events described relative to the border.
    pub m4_border_tokens: Vec<String>,
}

impl Default for Geofence {
    fn default() -> Self {
        Self::severn()
    }
}

impl Geofence {
    pub fn severn() -> Self {
        Self {
            bbox: BoundingBox::SEVERN,
            m48_tokens: tokens(&["j1", "j2", "junction 1", "junction 2", "severn"]),
            m4_tokens: tokens(&[
                "j21",
                "j22",
                "j23",
                "j24",
                "junction 21",
                "junction 22",
                "junction 23",
                "junction 24",
                "severn",
            ]),
            m4_border_tokens: tokens(&["wales", "welsh border"]),
        }
    }

    pub fn is_in_corridor(&self, event: &ClosureEvent) -> bool {
        let location = event.location.to_lowercase();

        match event.road.as_str() {
            "M48" if contains_any(&location, &self.m48_tokens) => return true,
            "M4" if contains_any(&location, &self.m4_tokens)
                || contains_any(&location, &self.m4_border_tokens) =>
            {
                return true;
            }
            _ => {}
        }

        match event.coordinates.as_deref().map(parse_coordinates) {
            Some(Ok(pairs)) => pairs.iter().any(|&(lat, lon)| self.bbox.contains(lat, lon)),
            Some(Err(err)) => {
                tracing::debug!(
                    road = %event.road,
                    location = %event.location,
                    "ignoring coordinates: {err}"
                );
                false
            }
            None => false,
        }
    }
}

/// Parse a flat `lat lon lat lon ...` sequence into pairs.
pub fn parse_coordinates(raw: &str) -> Result<Vec<(f64, f64)>, CoordinateError> {
    let values = raw
        .split_whitespace()
        .map(|v| v.parse::<f64>().map_err(|_| CoordinateError::InvalidNumber(v.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    if values.len() % 2 != 0 {
        return Err(CoordinateError::OddLength(values.len()));
    }

    Ok(values.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect())
}

fn tokens(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}
