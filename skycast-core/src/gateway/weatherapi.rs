use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::{
    error::QueryError,
    model::{CurrentConditionsDocument, Forecast, ForecastDay, ForecastHour, QuerySnapshot},
};

use super::WeatherGateway;

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// WeatherAPI.com error code for "No matching location found."
const NO_LOCATION_FOUND: i64 = 1006;

const DATE_FORMAT: &str = "%Y-%m-%d";
const HOUR_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone)]
pub struct WeatherApiGateway {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiGateway {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    /// Issue a GET against `endpoint` and return the body of a successful response.
    async fn get(
        &self,
        endpoint: &str,
        location: &str,
        extra: &[(&str, String)],
    ) -> Result<String, QueryError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, location, "requesting weather data");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", location)])
            .query(extra)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        if is_location_not_found(status, &body) {
            return Err(QueryError::NotFound(location.to_string()));
        }

        Err(QueryError::Network(format!(
            "{endpoint} request failed with status {status}: {}",
            truncate_body(&body)
        )))
    }
}

#[async_trait]
impl WeatherGateway for WeatherApiGateway {
    async fn fetch_current(&self, location: &str) -> Result<QuerySnapshot, QueryError> {
        let body = self.get("current.json", location, &[]).await?;
        parse_current(&body)
    }

    async fn fetch_forecast(&self, location: &str, days: u8) -> Result<Forecast, QueryError> {
        let body = self.get("forecast.json", location, &[("days", days.to_string())]).await?;
        parse_forecast(&body)
    }
}

pub(crate) fn parse_current(body: &str) -> Result<QuerySnapshot, QueryError> {
    let mut doc: CurrentConditionsDocument = serde_json::from_str(body)
        .map_err(|e| QueryError::MalformedResponse(format!("current conditions: {e}")))?;

    // Fall back to fetch time when the provider omits the observation time.
    if doc.current.last_updated_epoch.is_none() {
        doc.current.last_updated_epoch = Some(Utc::now().timestamp());
    }

    QuerySnapshot::try_from(doc).map_err(QueryError::MalformedResponse)
}

pub(crate) fn parse_forecast(body: &str) -> Result<Forecast, QueryError> {
    let parsed: WaForecastResponse = serde_json::from_str(body)
        .map_err(|e| QueryError::MalformedResponse(format!("forecast: {e}")))?;

    let days = parsed
        .forecast
        .forecastday
        .into_iter()
        .map(WaForecastDay::into_model)
        .collect::<Result<Vec<_>, _>>()?;

    let local_time = parsed
        .location
        .localtime
        .as_deref()
        .and_then(|t| NaiveDateTime::parse_from_str(t, HOUR_FORMAT).ok());

    Ok(Forecast { location_name: parsed.location.name, local_time, days })
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaError,
}

#[derive(Debug, Deserialize)]
struct WaError {
    code: i64,
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: f64,
    maxtemp_f: f64,
    mintemp_c: f64,
    mintemp_f: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastHour {
    time: String,
    temp_c: f64,
    temp_f: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    hour: Vec<WaForecastHour>,
}

impl WaForecastDay {
    fn into_model(self) -> Result<ForecastDay, QueryError> {
        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            QueryError::MalformedResponse(format!("forecast date '{}': {e}", self.date))
        })?;

        let hours = self
            .hour
            .into_iter()
            .map(|h| {
                let time = NaiveDateTime::parse_from_str(&h.time, HOUR_FORMAT).map_err(|e| {
                    QueryError::MalformedResponse(format!("forecast hour '{}': {e}", h.time))
                })?;

                Ok(ForecastHour {
                    time,
                    condition: h.condition.text,
                    temp_c: h.temp_c,
                    temp_f: h.temp_f,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        Ok(ForecastDay {
            date,
            condition: self.day.condition.text,
            max_temp_c: self.day.maxtemp_c,
            max_temp_f: self.day.maxtemp_f,
            min_temp_c: self.day.mintemp_c,
            min_temp_f: self.day.mintemp_f,
            hours,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    forecast: WaForecast,
}

fn is_location_not_found(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }

    status == StatusCode::BAD_REQUEST
        && serde_json::from_str::<WaErrorResponse>(body)
            .map(|r| r.error.code == NO_LOCATION_FOUND)
            .unwrap_or(false)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const CURRENT: &str = r#"{
        "location": {"name": "Paris", "country": "France", "localtime": "2024-06-01 9:05"},
        "current": {
            "last_updated_epoch": 1717225200,
            "temp_c": 18.5,
            "temp_f": 65.3,
            "condition": {"text": "Partly cloudy", "code": 1003},
            "humidity": 60
        }
    }"#;

    #[test]
    fn parses_current_conditions_and_ignores_extra_fields() {
        let snapshot = parse_current(CURRENT).unwrap();

        assert_eq!(snapshot.location_name, "Paris");
        assert_eq!(snapshot.condition, "Partly cloudy");
        assert_eq!(snapshot.temperature_c, 18.5);
        assert_eq!(snapshot.temperature_f, 65.3);
        assert_eq!(snapshot.observed_at.timestamp(), 1_717_225_200);
    }

    #[test]
    fn missing_observation_time_falls_back_to_now() {
        let body = r#"{"location":{"name":"Oslo"},"current":{"temp_c":2.0,"temp_f":35.6,"condition":{"text":"Snow"}}}"#;
        let before = Utc::now().timestamp();

        let snapshot = parse_current(body).unwrap();
        assert!(snapshot.observed_at.timestamp() >= before);
    }

    #[test]
    fn missing_current_is_malformed() {
        let err = parse_current(r#"{"location":{"name":"Paris"}}"#).unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)));
    }

    #[test]
    fn parses_forecast_days_and_hours() {
        let body = r#"{
            "location": {"name": "Paris", "localtime": "2024-06-01 9:05"},
            "forecast": {"forecastday": [{
                "date": "2024-06-01",
                "day": {"maxtemp_c": 22.0, "maxtemp_f": 71.6, "mintemp_c": 12.0, "mintemp_f": 53.6,
                        "condition": {"text": "Sunny"}},
                "hour": [
                    {"time": "2024-06-01 10:00", "temp_c": 17.0, "temp_f": 62.6, "condition": {"text": "Clear"}}
                ]
            }]}
        }"#;

        let forecast = parse_forecast(body).unwrap();
        assert_eq!(forecast.location_name, "Paris");
        assert_eq!(forecast.local_time.map(|t| t.hour()), Some(9));
        assert_eq!(forecast.days.len(), 1);

        let day = &forecast.days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(day.max_temp_f, 71.6);
        assert_eq!(day.hours[0].time.hour(), 10);
        assert_eq!(day.hours[0].condition, "Clear");
    }

    #[test]
    fn bad_forecast_date_is_malformed() {
        let body = r#"{
            "location": {"name": "Paris"},
            "forecast": {"forecastday": [{
                "date": "yesterday",
                "day": {"maxtemp_c": 1.0, "maxtemp_f": 1.0, "mintemp_c": 1.0, "mintemp_f": 1.0,
                        "condition": {"text": "Sunny"}},
                "hour": []
            }]}
        }"#;

        let err = parse_forecast(body).unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn recognises_not_found_responses() {
        let body = r#"{"error":{"code":1006,"message":"No matching location found."}}"#;
        assert!(is_location_not_found(StatusCode::BAD_REQUEST, body));
        assert!(is_location_not_found(StatusCode::NOT_FOUND, ""));

        let bad_key = r#"{"error":{"code":2006,"message":"API key is invalid."}}"#;
        assert!(!is_location_not_found(StatusCode::UNAUTHORIZED, bad_key));
        assert!(!is_location_not_found(StatusCode::BAD_REQUEST, "not json"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
