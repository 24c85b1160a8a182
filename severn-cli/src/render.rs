//! Plain-text rendering of a [`Report`] for the terminal.

use std::fmt::{self, Write};

use chrono::Local;
use severn_core::{
    BridgeStatus, ClassifiedClosure, Direction, Report, RiskLevel, Status, WeatherSnapshot,
    temporal::{format_date_time, parse_timestamp},
};

const RULE: &str = "======================================================================";

pub fn report(report: &Report) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut impl Write, report: &Report) -> fmt::Result {
    writeln!(out, "{RULE}")?;
    writeln!(out, "🌉 SEVERN BRIDGES - CURRENT STATUS")?;
    writeln!(out, "{RULE}")?;
    let local = report.generated_at.with_timezone(&Local);
    writeln!(out, "Current time: {} (Local)", local.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "              {} (UTC)", report.generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out)?;

    write_weather(out, report.weather.as_ref())?;
    writeln!(out)?;

    writeln!(out, "{RULE}")?;
    writeln!(out, "⚠️  CURRENT STATUS - RIGHT NOW")?;
    writeln!(out, "{RULE}")?;
    for bridge in report.bridges() {
        writeln!(out)?;
        write_bridge(out, bridge)?;
    }
    writeln!(out)?;

    write_upcoming(out, &report.upcoming)?;

    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "ℹ️  NOTES:")?;
    writeln!(out, "   • 'active' status = closure confirmed by operator")?;
    writeln!(out, "   • 'planned' status = scheduled closure, may not have started yet")?;
    writeln!(out, "   • Ad-hoc closures (e.g., high winds) appear with 'active' status")?;
    writeln!(out, "   • Check 'cause' field for reason (e.g., poorEnvironment for weather)")?;
    writeln!(out, "{RULE}")
}

fn write_weather(out: &mut impl Write, weather: Option<&WeatherSnapshot>) -> fmt::Result {
    writeln!(out, "🌤️  WEATHER AT THE CROSSINGS")?;

    let Some(w) = weather else {
        return writeln!(out, "   Weather unavailable");
    };

    if let Some(temp) = w.current_temperature_c {
        write!(out, "   Temperature: {temp:.1}°C")?;
        if let (Some(high), Some(low)) = (w.high_temperature_c, w.low_temperature_c) {
            write!(
                out,
                " (high {high:.1}°C{}, low {low:.1}°C{})",
                at(w.high_temperature_time.as_deref()),
                at(w.low_temperature_time.as_deref()),
            )?;
        }
        writeln!(out)?;
    }
    if let Some(wind) = w.current_wind_mph {
        writeln!(out, "   Wind: {wind:.1} mph")?;
    }
    if let Some(gust) = w.max_gust_mph {
        writeln!(out, "   Max gust today: {gust:.1} mph{}", at(w.max_gust_time.as_deref()))?;
    }
    match w.max_rain_probability_pct {
        Some(rain) => {
            writeln!(out, "   Max rain chance: {rain}%{}", at(w.max_rain_time.as_deref()))?
        }
        None => writeln!(out, "   No rain expected today")?,
    }

    writeln!(
        out,
        "   Wind risk: {} {} - {}",
        risk_glyph(w.wind_risk),
        w.wind_risk,
        w.wind_risk.label()
    )
}

fn write_bridge(out: &mut impl Write, bridge: &BridgeStatus) -> fmt::Result {
    writeln!(out, "{} {}", status_glyph(bridge.overall), bridge.bridge.full_name())?;
    writeln!(out, "   Status: {} ({})", bridge.overall, bridge.summary)?;
    writeln!(out, "   → Eastbound: {}", bridge.eastbound)?;
    writeln!(out, "   ← Westbound: {}", bridge.westbound)?;

    if bridge.closures.is_empty() {
        return writeln!(out, "   ✓ No closures or restrictions");
    }

    for closure in &bridge.closures {
        if closure.is_active {
            writeln!(
                out,
                "   ⚠️  ACTIVE CLOSURE{}: {}",
                direction_tag(closure.direction),
                closure.location
            )?;
            writeln!(out, "      {}", closure.description)?;
            writeln!(out, "      Reason: {}", closure.reason)?;
            writeln!(out, "      Cause: {}", closure.cause)?;
            write_window(out, closure, "      From: ", "      Until: ")?;
        } else {
            writeln!(
                out,
                "   ℹ️  Planned{}: {}",
                direction_tag(closure.direction),
                closure.description
            )?;
            writeln!(out, "      {}", closure.reason)?;
        }
    }

    Ok(())
}

fn write_upcoming(out: &mut impl Write, upcoming: &[ClassifiedClosure]) -> fmt::Result {
    writeln!(out, "{RULE}")?;
    writeln!(out, "📅 UPCOMING PLANNED CLOSURES (Severn Bridge Area)")?;
    writeln!(out, "{RULE}")?;

    if upcoming.is_empty() {
        return writeln!(out, "\n✓ No upcoming planned closures");
    }

    for (idx, closure) in upcoming.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "{}. {} - {}", idx + 1, closure.road, closure.location)?;
        writeln!(out, "   {}", closure.description)?;
        write_window(out, closure, "   Starts: ", "   Ends: ")?;
    }

    Ok(())
}

fn write_window(
    out: &mut impl Write,
    closure: &ClassifiedClosure,
    start_label: &str,
    end_label: &str,
) -> fmt::Result {
    if let Some(start) = closure.start.as_deref() {
        writeln!(out, "{start_label}{}", display_time(start))?;
    }
    if let Some(end) = closure.end.as_deref() {
        writeln!(out, "{end_label}{}", display_time(end))?;
    }
    Ok(())
}

/// Feed timestamp as `2026-01-29 20:00 UTC`, or verbatim when unparseable.
fn display_time(raw: &str) -> String {
    parse_timestamp(Some(raw))
        .map(|ts| format_date_time(&ts))
        .unwrap_or_else(|_| raw.to_string())
}

fn at(time: Option<&str>) -> String {
    time.map(|t| format!(" at {t}")).unwrap_or_default()
}

fn direction_tag(direction: Direction) -> String {
    match direction {
        Direction::Unknown => String::new(),
        other => format!(" ({other})"),
    }
}

fn status_glyph(status: Status) -> &'static str {
    match status {
        Status::Open => "🟢",
        Status::Restricted => "🟡",
        Status::Closed => "🔴",
    }
}

fn risk_glyph(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Safe => "🟢",
        RiskLevel::Monitor => "🟡",
        RiskLevel::High => "🔴",
        RiskLevel::Unknown => "⚪",
    }
}
