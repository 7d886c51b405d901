//! The single owner of history, displayed result and unit preference.
//!
//! A query cycle is split in three so that its network half can run without
//! borrowing the session:
//!
//! 1. [`Session::begin_query`] hands out a [`QueryTicket`] with the next
//!    sequence number.
//! 2. [`Session::fetch`] returns an owned future running both gateway calls.
//! 3. [`Session::complete`] applies the result, unless a newer ticket has been
//!    issued in the meantime.
//!
//! [`Session::search`] chains the three for callers that do not overlap queries.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    error::QueryError,
    gateway::WeatherGateway,
    history::{HistoryCache, HistoryEntry, HistoryLog, HistorySlot},
    model::{Forecast, QuerySnapshot, TemperatureUnit},
};

/// Both halves of a successful query cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub current: QuerySnapshot,
    pub forecast: Forecast,
}

/// Handle for one issued query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    location: String,
}

impl QueryTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// What [`Session::complete`] did with a result.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// Recorded in history, persisted and now displayed.
    Applied,
    /// A newer query was issued; the result was dropped.
    Stale,
    /// One of the gateway calls failed; state is unchanged.
    Failed(QueryError),
}

#[derive(Debug)]
pub struct Session<S: HistorySlot> {
    gateway: Arc<dyn WeatherGateway>,
    cache: HistoryCache<S>,
    history: HistoryLog,
    displayed: Option<QueryOutcome>,
    unit: TemperatureUnit,
    forecast_days: u8,
    last_issued: u64,
}

impl<S: HistorySlot> Session<S> {
    /// Create a session, restoring history from `cache`.
    pub fn new(
        gateway: Arc<dyn WeatherGateway>,
        cache: HistoryCache<S>,
        unit: TemperatureUnit,
        forecast_days: u8,
    ) -> Self {
        let history = cache.restore();

        Self {
            gateway,
            cache,
            history,
            displayed: None,
            unit,
            forecast_days,
            last_issued: 0,
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn displayed(&self) -> Option<&QueryOutcome> {
        self.displayed.as_ref()
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggle();
        self.unit
    }

    pub fn begin_query(&mut self, location: &str) -> QueryTicket {
        self.last_issued += 1;

        QueryTicket { seq: self.last_issued, location: location.trim().to_string() }
    }

    pub fn fetch(
        &self,
        ticket: &QueryTicket,
    ) -> impl Future<Output = Result<QueryOutcome, QueryError>> + Send + use<S> {
        let gateway = Arc::clone(&self.gateway);
        let location = ticket.location.clone();
        let days = self.forecast_days;

        async move { run_query(gateway.as_ref(), &location, days).await }
    }

    pub fn complete(
        &mut self,
        ticket: QueryTicket,
        result: Result<QueryOutcome, QueryError>,
    ) -> Completion {
        if ticket.seq < self.last_issued {
            debug!(
                seq = ticket.seq,
                latest = self.last_issued,
                location = %ticket.location,
                "discarding stale query result"
            );
            return Completion::Stale;
        }

        match result {
            Ok(outcome) => {
                info!(location = %ticket.location, "query completed");

                let entry = HistoryEntry::new(ticket.location, outcome.current.clone());
                self.history = self.history.record(entry);
                self.cache.persist(&self.history);
                self.displayed = Some(outcome);

                Completion::Applied
            }
            Err(err) => {
                warn!(location = %ticket.location, error = %err, "query failed");
                Completion::Failed(err)
            }
        }
    }

    /// Run one full query cycle for `location`.
    pub async fn search(&mut self, location: &str) -> Completion {
        let ticket = self.begin_query(location);
        let result = self.fetch(&ticket).await;
        self.complete(ticket, result)
    }
}

/// Fetch current conditions and forecast concurrently; either failure fails both.
pub async fn run_query(
    gateway: &dyn WeatherGateway,
    location: &str,
    days: u8,
) -> Result<QueryOutcome, QueryError> {
    let (current, forecast) = tokio::try_join!(
        gateway.fetch_current(location),
        gateway.fetch_forecast(location, days),
    )?;

    Ok(QueryOutcome { current, forecast })
}
