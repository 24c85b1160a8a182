//! Per-direction and overall status for one bridge.

use crate::model::{BridgeId, BridgeStatus, ClassifiedClosure, Direction, Status};

/// Phrases in a closure description that mean the carriageway is shut
/// rather than narrowed.
pub const FULL_CLOSURE_PHRASES: [&str; 2] = ["carriageway closure", "bridge closed"];

pub fn is_full_closure(description: &str) -> bool {
    let lower = description.to_lowercase();
    FULL_CLOSURE_PHRASES.iter().any(|p| lower.contains(p))
}

/// Severity contributed by a single closure.
fn severity(closure: &ClassifiedClosure) -> Status {
    if !closure.is_active {
        Status::Open
    } else if is_full_closure(&closure.description) {
        Status::Closed
    } else {
        Status::Restricted
    }
}

fn worst<'a>(closures: impl IntoIterator<Item = &'a ClassifiedClosure>) -> Status {
    closures.into_iter().map(severity).max().unwrap_or(Status::Open)
}

/// Status for one carriageway. Closures flagged for both directions count
/// against either.
pub fn directional_status(closures: &[ClassifiedClosure], target: Direction) -> Status {
    worst(closures.iter().filter(|c| c.direction == target || c.direction == Direction::Both))
}

/// Worst status across every closure for the bridge, whatever its direction.
pub fn overall_status(closures: &[ClassifiedClosure]) -> Status {
    worst(closures)
}

/// Overall status as the feed-order accumulation computes it: the last
/// active closure decides. Only used to detect disagreement with
/// [`overall_status`].
pub fn feed_order_status(closures: &[ClassifiedClosure]) -> Status {
    closures
        .iter()
        .rev()
        .find(|c| c.is_active)
        .map(severity)
        .unwrap_or(Status::Open)
}

pub fn summarize(overall: Status, closures: &[ClassifiedClosure]) -> String {
    let active = closures.iter().filter(|c| c.is_active).count();

    match overall {
        Status::Closed => format!("CLOSED - {active} active closure(s)"),
        Status::Restricted => format!("Restricted - {active} lane closure(s)"),
        Status::Open => {
            let planned = closures.iter().filter(|c| !c.is_active && c.is_planned()).count();
            if planned > 0 {
                format!("Open - {planned} planned closure(s)")
            } else {
                "Open - No restrictions".to_string()
            }
        }
    }
}

pub fn bridge_status(bridge: BridgeId, closures: Vec<ClassifiedClosure>) -> BridgeStatus {
    let overall = overall_status(&closures);

    let legacy = feed_order_status(&closures);
    if legacy != overall {
        tracing::warn!(
            %bridge,
            %overall,
            feed_order = %legacy,
            "overall status depends on feed order; reporting the most severe"
        );
    }

    BridgeStatus {
        bridge,
        overall,
        eastbound: directional_status(&closures, Direction::Eastbound),
        westbound: directional_status(&closures, Direction::Westbound),
        summary: summarize(overall, &closures),
        closures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closure(direction: Direction, active: bool, description: &str) -> ClassifiedClosure {
        ClassifiedClosure {
            bridge: BridgeId::M4,
            road: "M4".into(),
            location: "M4 J23".into(),
            description: description.into(),
            is_active: active,
            reason: String::new(),
            status: if active { "active".into() } else { "planned".into() },
            probability: "certain".into(),
            cause: "roadMaintenance".into(),
            start: None,
            end: None,
            direction,
        }
    }

    #[test]
    fn no_closures_is_open_everywhere() {
        let status = bridge_status(BridgeId::M4, vec![]);
        assert_eq!(status.overall, Status::Open);
        assert_eq!(status.eastbound, Status::Open);
        assert_eq!(status.westbound, Status::Open);
        assert_eq!(status.summary, "Open - No restrictions");
    }

    #[test]
    fn inactive_closures_keep_bridge_open() {
        let closures = vec![
            closure(Direction::Both, false, "Carriageway closure"),
            closure(Direction::Eastbound, false, "Lane closure"),
        ];
        let status = bridge_status(BridgeId::M4, closures);
        assert_eq!(
            (status.overall, status.eastbound, status.westbound),
            (Status::Open, Status::Open, Status::Open)
        );
        assert_eq!(status.summary, "Open - 2 planned closure(s)");
    }

    #[test]
    fn both_directions_carriageway_closure_closes_everything() {
        let closures = vec![closure(Direction::Both, true, "Full Carriageway Closure")];
        let status = bridge_status(BridgeId::M48, closures);
        assert_eq!(status.overall, Status::Closed);
        assert_eq!(status.eastbound, Status::Closed);
        assert_eq!(status.westbound, Status::Closed);
        assert_eq!(status.summary, "CLOSED - 1 active closure(s)");
    }

    #[test]
    fn directions_are_independent() {
        let closures = vec![
            closure(Direction::Eastbound, true, "Lane closure"),
            closure(Direction::Westbound, false, "Carriageway closure"),
        ];
        assert_eq!(directional_status(&closures, Direction::Eastbound), Status::Restricted);
        assert_eq!(directional_status(&closures, Direction::Westbound), Status::Open);
        assert_eq!(overall_status(&closures), Status::Restricted);
    }

    #[test]
    fn unknown_direction_only_affects_overall() {
        let closures = vec![closure(Direction::Unknown, true, "Lane closure")];
        let status = bridge_status(BridgeId::M4, closures);
        assert_eq!(status.overall, Status::Restricted);
        assert_eq!(status.eastbound, Status::Open);
        assert_eq!(status.westbound, Status::Open);
        assert_eq!(status.summary, "Restricted - 1 lane closure(s)");
    }

    #[test]
    fn bridge_closed_phrase_counts_as_full_closure() {
        assert!(is_full_closure("Bridge closed due to high winds"));
        assert!(!is_full_closure("Lane closure, hard shoulder"));
    }

    #[test]
    fn overall_uses_precedence_not_feed_order() {
        let closures = vec![
            closure(Direction::Eastbound, true, "Carriageway closure"),
            closure(Direction::Westbound, true, "Lane closure"),
        ];
        assert_eq!(feed_order_status(&closures), Status::Restricted);
        assert_eq!(overall_status(&closures), Status::Closed);
        assert_eq!(bridge_status(BridgeId::M4, closures).overall, Status::Closed);
    }
}
