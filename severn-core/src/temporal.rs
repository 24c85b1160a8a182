//! Decides whether a closure is in effect at a given instant.
//!
//! `now` is always passed in; nothing in here reads the system clock.

use chrono::{DateTime, FixedOffset, Utc};
use thiserror::Error;

use crate::model::ClosureEvent;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("timestamp missing")]
    Missing,

    #[error("unparseable timestamp '{0}'")]
    Invalid(String),
}

/// Outcome of resolving an event against `now`.
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    /// Operator marked the closure active.
    Confirmed,
    Suspended,
    /// Planned, and `now` falls inside `[start, end]`.
    WithinWindow,
    Scheduled { start: DateTime<FixedOffset> },
    Past,
    /// Planned, but the window could not be established.
    Uncertain(TemporalError),
    Unknown(String),
}

impl Activity {
    pub fn is_active(&self) -> bool {
        matches!(self, Activity::Confirmed | Activity::WithinWindow)
    }

    pub fn reason(&self) -> String {
        match self {
            Activity::Confirmed => "ACTIVE (confirmed by operator)".to_string(),
            Activity::Suspended => "Suspended/Cancelled".to_string(),
            Activity::WithinWindow => "ACTIVE (within planned time window)".to_string(),
            Activity::Scheduled { start } => {
                format!("Planned for later (starts {})", format_clock_time(start))
            }
            Activity::Past => "Past closure".to_string(),
            Activity::Uncertain(_) => "Planned (time uncertain)".to_string(),
            Activity::Unknown(status) => format!("Unknown status: {status}"),
        }
    }
}

pub fn resolve(event: &ClosureEvent, now: DateTime<Utc>) -> Activity {
    let status = event.status.trim().to_lowercase();

    match status.as_str() {
        "active" => Activity::Confirmed,
        "suspended" => Activity::Suspended,
        "planned" => resolve_planned(event, now),
        _ => Activity::Unknown(status),
    }
}

fn resolve_planned(event: &ClosureEvent, now: DateTime<Utc>) -> Activity {
    let window = parse_timestamp(event.start.as_deref())
        .and_then(|start| parse_timestamp(event.end.as_deref()).map(|end| (start, end)));

    let (start, end) = match window {
        Ok(window) => window,
        Err(err) => {
            tracing::debug!(
                location = %event.location,
                "planned closure without usable window: {err}"
            );
            return Activity::Uncertain(err);
        }
    };

    if start <= now && now <= end {
        Activity::WithinWindow
    } else if now < start {
        Activity::Scheduled { start }
    } else {
        Activity::Past
    }
}

/// Parse an ISO-8601 timestamp carrying an explicit offset (`Z`, `+hh:mm` or `+hhmm`).
///
/// Timestamps without an offset are rejected: they cannot be compared
/// against a UTC instant without guessing.
pub fn parse_timestamp(raw: Option<&str>) -> Result<DateTime<FixedOffset>, TemporalError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or(TemporalError::Missing)?;

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
        // "+0100" without the colon
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%z"))
        .or_else(|_| {
            // "2026-01-29T20:00Z" has no seconds and rfc3339 insists on them
            let without_z = raw.strip_suffix('Z').ok_or(TemporalError::Invalid(raw.to_string()))?;
            DateTime::parse_from_str(&format!("{without_z}+00:00"), "%Y-%m-%dT%H:%M%:z")
                .map_err(|_| TemporalError::Invalid(raw.to_string()))
        })
}

/// `HH:MM` followed by the zone, e.g. `20:00 UTC` or `21:00 UTC+01:00`.
pub fn format_clock_time(ts: &DateTime<FixedOffset>) -> String {
    format!("{} {}", ts.format("%H:%M"), zone_label(ts))
}

/// Date and time with zone, e.g. `2026-01-29 20:00 UTC`.
pub fn format_date_time(ts: &DateTime<FixedOffset>) -> String {
    format!("{} {}", ts.format("%Y-%m-%d %H:%M"), zone_label(ts))
}

fn zone_label(ts: &DateTime<FixedOffset>) -> String {
    if ts.offset().local_minus_utc() == 0 {
        "UTC".to_string()
    } else {
        format!("UTC{}", ts.format("%:z"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 29, 12, 0, 0).unwrap()
    }

    fn iso(ts: DateTime<Utc>) -> Option<String> {
        Some(ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }

    fn planned(start: Option<String>, end: Option<String>) -> ClosureEvent {
        ClosureEvent {
            status: "planned".into(),
            start,
            end,
            ..Default::default()
        }
    }

    #[test]
    fn active_status_ignores_timestamps() {
        for (start, end) in [
            (None, None),
            (iso(now() - Duration::days(3)), iso(now() - Duration::days(2))),
            (Some("garbage".into()), None),
        ] {
            let e = ClosureEvent { status: "Active".into(), start, end, ..Default::default() };
            let activity = resolve(&e, now());
            assert!(activity.is_active());
            assert_eq!(activity.reason(), "ACTIVE (confirmed by operator)");
        }
    }

    #[test]
    fn planned_inside_window_is_active() {
        let e = planned(iso(now() - Duration::hours(1)), iso(now() + Duration::hours(1)));
        let activity = resolve(&e, now());
        assert_eq!(activity, Activity::WithinWindow);
        assert!(activity.is_active());
        assert_eq!(activity.reason(), "ACTIVE (within planned time window)");
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let e = planned(iso(now()), iso(now() + Duration::hours(1)));
        assert!(resolve(&e, now()).is_active());

        let e = planned(iso(now() - Duration::hours(1)), iso(now()));
        assert!(resolve(&e, now()).is_active());
    }

    #[test]
    fn planned_in_future_reports_start_time() {
        let e = planned(iso(now() + Duration::hours(1)), iso(now() + Duration::hours(2)));
        let activity = resolve(&e, now());
        assert!(!activity.is_active());
        assert_eq!(activity.reason(), "Planned for later (starts 13:00 UTC)");
    }

    #[test]
    fn planned_start_keeps_its_offset() {
        let e = planned(
            Some("2026-06-01T21:00:00+01:00".into()),
            Some("2026-06-02T05:00:00+01:00".into()),
        );
        assert_eq!(resolve(&e, now()).reason(), "Planned for later (starts 21:00 UTC+01:00)");
    }

    #[test]
    fn planned_in_past() {
        let e = planned(iso(now() - Duration::hours(2)), iso(now() - Duration::hours(1)));
        let activity = resolve(&e, now());
        assert_eq!(activity, Activity::Past);
        assert_eq!(activity.reason(), "Past closure");
    }

    #[test]
    fn planned_with_bad_or_missing_times_is_uncertain() {
        let cases = [
            (None, iso(now())),
            (iso(now()), None),
            (Some("next tuesday".into()), iso(now())),
            (Some("2026-01-29T10:00:00".into()), Some("2026-01-29T14:00:00".into())),
        ];

        for (start, end) in cases {
            let activity = resolve(&planned(start.clone(), end.clone()), now());
            assert!(matches!(activity, Activity::Uncertain(_)), "{start:?} {end:?}");
            assert!(!activity.is_active());
            assert_eq!(activity.reason(), "Planned (time uncertain)");
        }
    }

    #[test]
    fn suspended_ignores_timestamps() {
        let e = ClosureEvent {
            status: "suspended".into(),
            start: iso(now() - Duration::hours(1)),
            end: iso(now() + Duration::hours(1)),
            ..Default::default()
        };
        let activity = resolve(&e, now());
        assert!(!activity.is_active());
        assert_eq!(activity.reason(), "Suspended/Cancelled");
    }

    #[test]
    fn unknown_status_is_reported_lowercased() {
        let e = ClosureEvent { status: "Unknown".into(), ..Default::default() };
        assert_eq!(resolve(&e, now()).reason(), "Unknown status: unknown");
    }

    #[test]
    fn resolution_is_deterministic() {
        let e = planned(iso(now() + Duration::minutes(30)), iso(now() + Duration::hours(4)));
        assert_eq!(resolve(&e, now()), resolve(&e, now()));
    }

    #[test]
    fn parse_timestamp_accepts_zulu_and_offsets() {
        let z = parse_timestamp(Some("2026-01-29T20:00:00Z")).unwrap();
        let offset = parse_timestamp(Some("2026-01-29T20:00:00+00:00")).unwrap();
        let short = parse_timestamp(Some("2026-01-29T20:00Z")).unwrap();
        let fractional = parse_timestamp(Some("2026-01-29T20:00:00.000Z")).unwrap();
        assert_eq!(z, offset);
        assert_eq!(z, short);
        assert_eq!(z, fractional);
        assert_eq!(parse_timestamp(None), Err(TemporalError::Missing));
        assert_eq!(parse_timestamp(Some("  ")), Err(TemporalError::Missing));
        assert_eq!(parse_timestamp(Some("soon")), Err(TemporalError::Invalid("soon".into())));
    }

    #[test]
    fn parse_timestamp_accepts_offsets_without_colon() {
        let compact = parse_timestamp(Some("2026-01-29T20:00:00+0100")).unwrap();
        let no_seconds = parse_timestamp(Some("2026-01-29T20:00+0100")).unwrap();
        let expected = parse_timestamp(Some("2026-01-29T19:00:00Z")).unwrap();
        assert_eq!(compact, expected);
        assert_eq!(no_seconds, expected);
        assert_eq!(compact.offset().local_minus_utc(), 3600);

        let event = planned(
            Some("2026-01-29T20:00:00+0100".into()),
            Some("2026-01-30T06:00:00+0100".into()),
        );
        let activity = resolve(&event, now());
        assert!(!activity.is_active());
        assert_eq!(activity.reason(), "Planned for later (starts 20:00 UTC+01:00)");
    }

    #[test]
    fn formats_date_time_with_zone() {
        let ts = parse_timestamp(Some("2026-01-29T20:05:00Z")).unwrap();
        assert_eq!(format_date_time(&ts), "2026-01-29 20:05 UTC");
    }
}
