//! Unit-aware text projections of snapshots, forecasts and history.
//!
//! Everything here is read-only: the unit selects a pre-computed field.

use chrono::{Duration, NaiveDateTime};

use crate::{
    condition::ConditionTag,
    history::HistoryEntry,
    model::{Forecast, ForecastDay, ForecastHour, QuerySnapshot, TemperatureUnit},
};

/// How far ahead the hourly outlook looks.
pub const HOURLY_WINDOW_HOURS: i64 = 2;

pub fn format_temperature(value: f64, unit: TemperatureUnit) -> String {
    format!("{value}{}", unit.symbol())
}

pub fn current_conditions(snapshot: &QuerySnapshot, unit: TemperatureUnit) -> String {
    let tag = ConditionTag::from_condition_text(&snapshot.condition);

    format!(
        "{} {}\n  Temperature: {}\n  Condition: {}",
        tag.glyph(),
        snapshot.location_name,
        format_temperature(snapshot.temperature(unit), unit),
        snapshot.condition,
    )
}

pub fn history_line(entry: &HistoryEntry, unit: TemperatureUnit) -> String {
    format!(
        "{}: {}, {}",
        entry.city,
        entry.weather.condition,
        format_temperature(entry.weather.temperature(unit), unit),
    )
}

/// Forecast hours strictly after `now` and no more than `window` ahead.
pub fn upcoming_hours(
    forecast: &Forecast,
    now: NaiveDateTime,
    window: Duration,
) -> Vec<&ForecastHour> {
    let until = now + window;

    forecast
        .days
        .iter()
        .flat_map(|day| day.hours.iter())
        .filter(|hour| hour.time > now && hour.time <= until)
        .collect()
}

pub fn hour_line(hour: &ForecastHour, unit: TemperatureUnit) -> String {
    let tag = ConditionTag::from_condition_text(&hour.condition);

    format!(
        "{} {} {} {}",
        hour.time.format("%H:%M"),
        tag.glyph(),
        format_temperature(hour.temperature(unit), unit),
        hour.condition,
    )
}

pub fn day_line(day: &ForecastDay, unit: TemperatureUnit) -> String {
    let tag = ConditionTag::from_condition_text(&day.condition);

    format!(
        "{} {} High: {} Low: {} {}",
        day.date.format("%a %Y-%m-%d"),
        tag.glyph(),
        format_temperature(day.max_temp(unit), unit),
        format_temperature(day.min_temp(unit), unit),
        day.condition,
    )
}
