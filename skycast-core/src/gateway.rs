use crate::{
    Config,
    error::QueryError,
    model::{Forecast, QuerySnapshot},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod weatherapi;

pub use weatherapi::WeatherApiGateway;

/// Source of current conditions and forecasts for a free-form location.
///
/// Implementations convert provider payloads into the typed model before
/// returning; nothing untyped crosses this boundary.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    async fn fetch_current(&self, location: &str) -> Result<QuerySnapshot, QueryError>;

    async fn fetch_forecast(&self, location: &str, days: u8) -> Result<Forecast, QueryError>;
}

/// Construct the gateway from config. Fails when no API key is available.
pub fn gateway_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherGateway>> {
    let api_key = config.api_key()?;
    let gateway = WeatherApiGateway::with_base_url(api_key, config.base_url());

    Ok(Arc::new(gateway))
}
