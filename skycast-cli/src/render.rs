//! Plain-text rendering of a session for the terminal.

use std::fmt::Write;

use chrono::{Duration, Local, NaiveDateTime};
use skycast_core::{
    HistoryLog, HistorySlot, QueryOutcome, Session, TemperatureUnit,
    display::{self, HOURLY_WINDOW_HOURS},
};

pub fn session<S: HistorySlot>(session: &Session<S>) -> String {
    let mut out = String::new();

    match session.displayed() {
        Some(outcome) => {
            let now = outcome.forecast.local_time.unwrap_or_else(|| Local::now().naive_local());
            out.push_str(&report(outcome, session.unit(), now));
        }
        None => out.push_str("No weather loaded yet.\n"),
    }

    out.push('\n');
    out.push_str(&history(session.history(), session.unit()));
    out
}

pub fn report(outcome: &QueryOutcome, unit: TemperatureUnit, now: NaiveDateTime) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", display::current_conditions(&outcome.current, unit));

    let _ = writeln!(out, "\nHourly forecast (next {HOURLY_WINDOW_HOURS} hours)");
    let window = Duration::hours(HOURLY_WINDOW_HOURS);
    let hours = display::upcoming_hours(&outcome.forecast, now, window);
    if hours.is_empty() {
        let _ = writeln!(out, "  (no hourly data)");
    }
    for hour in hours {
        let _ = writeln!(out, "  {}", display::hour_line(hour, unit));
    }

    let _ = writeln!(out, "\n{}-day forecast", outcome.forecast.days.len());
    for day in &outcome.forecast.days {
        let _ = writeln!(out, "  {}", display::day_line(day, unit));
    }

    out
}

pub fn history(log: &HistoryLog, unit: TemperatureUnit) -> String {
    let mut out = String::from("Search history\n");

    if log.is_empty() {
        out.push_str("  (empty)\n");
    }
    for entry in log.iter() {
        let _ = writeln!(out, "  {}", display::history_line(entry, unit));
    }

    out
}
