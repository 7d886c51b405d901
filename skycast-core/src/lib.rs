//! Core library for the `skycast` weather lookup tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather query gateway (WeatherAPI.com)
//! - The bounded, persisted search history
//! - Condition classification and unit-aware display helpers
//! - The session that ties queries, history and display state together
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod condition;
pub mod config;
pub mod display;
pub mod error;
pub mod gateway;
pub mod history;
pub mod model;
pub mod session;

pub use condition::ConditionTag;
pub use config::Config;
pub use error::{PersistenceError, QueryError};
pub use gateway::{WeatherApiGateway, WeatherGateway};
pub use history::{
    FileSlot, HISTORY_CAPACITY, HistoryCache, HistoryEntry, HistoryLog, HistorySlot, MemorySlot,
};
pub use model::{Forecast, ForecastDay, ForecastHour, QuerySnapshot, TemperatureUnit};
pub use session::{Completion, QueryOutcome, QueryTicket, Session};
