//! Core library for the `severn` bridge status tool.
//!
//! This crate defines:
//! - Corridor classification, closure timing and per-direction aggregation
//! - Wind risk for the crossings
//! - HTTP feeds for National Highways closures and Open-Meteo weather
//! - Configuration & credentials handling
//!
//! It is used by `severn-cli`, but can also be reused by other binaries or services.

pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod clock;
pub mod config;
pub mod error;
pub mod geofence;
pub mod model;
pub mod provider;
pub mod report;
pub mod temporal;
pub mod weather;

pub use cache::{ContentCache, TtlCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{FeedError, ReportError};
pub use geofence::Geofence;
pub use model::{
    BridgeId, BridgeStatus, ClassifiedClosure, ClosureEvent, Direction, Report, Status,
    WeatherSnapshot,
};
pub use provider::{ClosureFeed, FeedId, WeatherFeed};
pub use report::ReportAssembler;
pub use weather::RiskLevel;
