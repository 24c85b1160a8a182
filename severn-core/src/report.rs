use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::{
    aggregate::bridge_status,
    classify::classify_all,
    clock::Clock,
    error::ReportError,
    geofence::Geofence,
    model::{BridgeId, ClassifiedClosure, ClosureEvent, Report, WeatherSnapshot},
    provider::{ClosureFeed, WeatherFeed},
};

/// Builds a [`Report`] from the two feeds.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    geofence: Geofence,
}

impl ReportAssembler {
    pub fn new(geofence: Geofence) -> Self {
        Self { geofence }
    }

    /// Fetch weather, then closures, and assemble the report.
    ///
    /// A missing weather feed or a weather failure leaves the weather
    /// section empty. A closures failure aborts: an empty bridge report
    /// would read as "all open".
    pub async fn generate(
        &self,
        closures: &dyn ClosureFeed,
        weather: Option<&dyn WeatherFeed>,
        clock: &dyn Clock,
    ) -> Result<Report, ReportError> {
        let now = clock.now();

        let snapshot = match weather {
            Some(feed) => match feed.fetch_weather(now).await {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    warn!("weather unavailable: {err}");
                    None
                }
            },
            None => {
                warn!("weather unavailable: no weather feed");
                None
            }
        };

        let events = closures.fetch_events().await.map_err(ReportError::ClosuresUnavailable)?;
        info!(records = events.len(), "closure records received");

        Ok(self.assemble(&events, snapshot, now))
    }

    /// Classify, resolve and aggregate a set of events. Pure: the same
    /// inputs always give the same report.
    pub fn assemble(
        &self,
        events: &[ClosureEvent],
        weather: Option<WeatherSnapshot>,
        now: DateTime<Utc>,
    ) -> Report {
        let classified = classify_all(events, &self.geofence, now);
        let total_closures = classified.len();

        let upcoming: Vec<ClassifiedClosure> =
            classified.iter().filter(|c| !c.is_active && c.is_planned()).cloned().collect();

        let (m48, m4): (Vec<_>, Vec<_>) =
            classified.into_iter().partition(|c| c.bridge == BridgeId::M48);

        Report {
            generated_at: now,
            weather,
            m48: bridge_status(BridgeId::M48, m48),
            m4: bridge_status(BridgeId::M4, m4),
            upcoming,
            total_closures,
        }
    }
}
