use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display unit for temperatures. Both values are always stored; the unit only
/// selects which one is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggle(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "Celsius",
            TemperatureUnit::Fahrenheit => "Fahrenheit",
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "c" | "celsius" => Ok(TemperatureUnit::Celsius),
            "f" | "fahrenheit" => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: c (celsius), f (fahrenheit)."
            )),
        }
    }
}

/// Current conditions for a location at query time.
///
/// Serialized in the provider's current-conditions shape (see
/// [`CurrentConditionsDocument`]) so the persisted history keeps the same
/// layout as the raw API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurrentConditionsDocument", into = "CurrentConditionsDocument")]
pub struct QuerySnapshot {
    pub location_name: String,
    pub observed_at: DateTime<Utc>,
    pub condition: String,
    pub temperature_c: f64,
    pub temperature_f: f64,
}

impl QuerySnapshot {
    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.temperature_c,
            TemperatureUnit::Fahrenheit => self.temperature_f,
        }
    }
}

/// Forecast for one calendar day, with its hourly breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub condition: String,
    pub max_temp_c: f64,
    pub max_temp_f: f64,
    pub min_temp_c: f64,
    pub min_temp_f: f64,
    pub hours: Vec<ForecastHour>,
}

impl ForecastDay {
    pub fn max_temp(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.max_temp_c,
            TemperatureUnit::Fahrenheit => self.max_temp_f,
        }
    }

    pub fn min_temp(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.min_temp_c,
            TemperatureUnit::Fahrenheit => self.min_temp_f,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastHour {
    /// Local time at the forecast location.
    pub time: NaiveDateTime,
    pub condition: String,
    pub temp_c: f64,
    pub temp_f: f64,
}

impl ForecastHour {
    pub fn temperature(&self, unit: TemperatureUnit) -> f64 {
        match unit {
            TemperatureUnit::Celsius => self.temp_c,
            TemperatureUnit::Fahrenheit => self.temp_f,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub location_name: String,
    /// Location-local "now" as reported by the provider, if it parsed.
    pub local_time: Option<NaiveDateTime>,
    pub days: Vec<ForecastDay>,
}

/// Provider-shaped current-conditions document.
///
/// This is both the subset of `current.json` the gateway reads and the
/// `weather` value stored for each history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditionsDocument {
    pub location: DocumentLocation,
    pub current: DocumentCurrent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLocation {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCurrent {
    pub temp_c: f64,
    pub temp_f: f64,
    pub condition: DocumentCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_epoch: Option<i64>,
    /// Sub-second part of the observation time; absent when it is zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_nanos: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCondition {
    pub text: String,
}

impl TryFrom<CurrentConditionsDocument> for QuerySnapshot {
    type Error = String;

    fn try_from(doc: CurrentConditionsDocument) -> Result<Self, Self::Error> {
        let epoch = doc
            .current
            .last_updated_epoch
            .ok_or_else(|| "current conditions carry no observation time".to_string())?;

        let nanos = doc.current.last_updated_nanos.unwrap_or(0);
        let observed_at = DateTime::<Utc>::from_timestamp(epoch, nanos)
            .ok_or_else(|| format!("observation time {epoch}.{nanos:09} is out of range"))?;

        Ok(QuerySnapshot {
            location_name: doc.location.name,
            observed_at,
            condition: doc.current.condition.text,
            temperature_c: doc.current.temp_c,
            temperature_f: doc.current.temp_f,
        })
    }
}

impl From<QuerySnapshot> for CurrentConditionsDocument {
    fn from(snapshot: QuerySnapshot) -> Self {
        CurrentConditionsDocument {
            location: DocumentLocation { name: snapshot.location_name },
            current: DocumentCurrent {
                temp_c: snapshot.temperature_c,
                temp_f: snapshot.temperature_f,
                condition: DocumentCondition { text: snapshot.condition },
                last_updated_epoch: Some(snapshot.observed_at.timestamp()),
                last_updated_nanos: Some(snapshot.observed_at.timestamp_subsec_nanos())
                    .filter(|nanos| *nanos != 0),
            },
        }
    }
}
