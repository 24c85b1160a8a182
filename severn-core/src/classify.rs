use chrono::{DateTime, Utc};

use crate::{
    geofence::Geofence,
    model::{BridgeId, ClassifiedClosure, ClosureEvent, Direction},
    temporal,
};

/// Roads the monitor cares about. Everything else is dropped before the
/// geofence runs.
pub const MONITORED_ROADS: [&str; 2] = ["M4", "M48"];

pub fn is_monitored_road(road: &str) -> bool {
    MONITORED_ROADS.contains(&road)
}

/// Classify a single event, or `None` when it is outside the corridor.
pub fn classify(
    event: &ClosureEvent,
    geofence: &Geofence,
    now: DateTime<Utc>,
) -> Option<ClassifiedClosure> {
    if !is_monitored_road(&event.road) || !geofence.is_in_corridor(event) {
        return None;
    }

    let activity = temporal::resolve(event, now);

    Some(ClassifiedClosure {
        bridge: bridge_for(event),
        road: event.road.clone(),
        location: event.location.clone(),
        description: clean_description(&event.description),
        is_active: activity.is_active(),
        reason: activity.reason(),
        status: event.status.clone(),
        probability: event.probability.clone(),
        cause: event.cause.clone(),
        start: event.start.clone(),
        end: event.end.clone(),
        direction: Direction::parse(event.direction.as_deref()),
    })
}

/// Classify a whole feed, keeping feed order.
pub fn classify_all(
    events: &[ClosureEvent],
    geofence: &Geofence,
    now: DateTime<Utc>,
) -> Vec<ClassifiedClosure> {
    events.iter().filter_map(|e| classify(e, geofence, now)).collect()
}

fn bridge_for(event: &ClosureEvent) -> BridgeId {
    if event.road == "M48" || event.location.to_uppercase().contains("M48") {
        BridgeId::M48
    } else {
        BridgeId::M4
    }
}

/// Punctuation that closes up against the preceding word.
const CLOSING_PUNCTUATION: [char; 5] = [',', '.', ';', ':', ')'];

/// Strip mile-marker references from a feed comment.
///
/// Ranges like `201/5-196/0` go wherever they appear, punctuation around
/// them or not. A single marker like `201/5` only goes at the very end,
/// ahead of any closing punctuation.
pub fn clean_description(description: &str) -> String {
    let without_ranges = strip_marker_ranges(description);
    let without_trailing = strip_trailing_marker(&without_ranges);
    tidy(&without_trailing)
}

/// End index of a digit run starting at `from`, if there is one.
fn digits_end(bytes: &[u8], from: usize) -> Option<usize> {
    let len = bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    (len > 0).then_some(from + len)
}

/// `201/5`
fn marker_end(bytes: &[u8], from: usize) -> Option<usize> {
    let slash = digits_end(bytes, from)?;
    if bytes.get(slash) != Some(&b'/') {
        return None;
    }
    digits_end(bytes, slash + 1)
}

/// `201/5-196/0`
fn marker_range_end(bytes: &[u8], from: usize) -> Option<usize> {
    let dash = marker_end(bytes, from)?;
    if bytes.get(dash) != Some(&b'-') {
        return None;
    }
    marker_end(bytes, dash + 1)
}

fn strip_marker_ranges(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let run_start = bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit());
        if let Some(end) = marker_range_end(bytes, i).filter(|_| run_start) {
            // Matches start and end on ASCII digits, so slicing stays on char boundaries.
            out.push_str(&text[copied..i]);
            out.push(' ');
            copied = end;
            i = end;
        } else {
            i += 1;
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn strip_trailing_marker(text: &str) -> String {
    let trimmed = text.trim_end();
    let body = trimmed.trim_end_matches(CLOSING_PUNCTUATION);
    let suffix = &trimmed[body.len()..];
    let bytes = body.as_bytes();

    let second = bytes.iter().rev().take_while(|b| b.is_ascii_digit()).count();
    let Some(slash) = bytes.len().checked_sub(second + 1) else {
        return trimmed.to_string();
    };
    if second == 0 || bytes[slash] != b'/' {
        return trimmed.to_string();
    }

    let first = bytes[..slash].iter().rev().take_while(|b| b.is_ascii_digit()).count();
    if first == 0 {
        return trimmed.to_string();
    }

    format!("{}{suffix}", body[..slash - first].trim_end())
}

/// Collapse whitespace, close up punctuation and drop brackets left empty.
fn tidy(text: &str) -> String {
    let text = close_up_punctuation(&collapse_whitespace(text));
    if !text.contains("()") {
        return text;
    }
    close_up_punctuation(&collapse_whitespace(&text.replace("()", "")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn close_up_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if CLOSING_PUNCTUATION.contains(&c) && out.ends_with(' ') {
            out.pop();
        }
        out.push(c);
    }
    out
}
