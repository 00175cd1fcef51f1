//! Historical Service Performance (HSP) lookups.

mod client;
mod wire;

pub use client::HspClient;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::future::Future;

/// Source of historical service data used to resolve delays.
pub trait PerformanceLookup: Send + Sync {
    /// Services between two CRS codes within the query's window.
    fn find_services(
        &self,
        query: &ServiceQuery,
    ) -> impl Future<Output = Result<Vec<ServiceSummary>, UpstreamApiError>> + Send;

    /// Calling-point detail for one service run.
    fn service_detail(
        &self,
        rid: &str,
    ) -> impl Future<Output = Result<ServiceDetail, UpstreamApiError>> + Send;
}

/// Failure talking to the performance API. Always retryable by the caller.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamApiError {
    #[error("performance API request timed out")]
    Timeout,
    #[error("performance API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("performance API transport failure: {0}")]
    Transport(String),
    #[error("unexpected performance API payload: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// HSP day filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayClass {
    Weekday,
    Saturday,
    Sunday,
}

impl DayClass {
    pub fn for_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat => DayClass::Saturday,
            Weekday::Sun => DayClass::Sunday,
            _ => DayClass::Weekday,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            DayClass::Weekday => "WEEKDAY",
            DayClass::Saturday => "SATURDAY",
            DayClass::Sunday => "SUNDAY",
        }
    }
}

/// Inclusive "HHMM" search window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: String,
    pub to: String,
}

impl TimeWindow {
    /// One hour either side of `hour`, clamped to the service day.
    pub fn around(hour: u32) -> Self {
        let from = hour.saturating_sub(1);
        let to = (hour + 1).min(23);
        Self {
            from: format!("{from:02}00"),
            to: format!("{to:02}59"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceQuery {
    pub from_crs: String,
    pub to_crs: String,
    pub window: TimeWindow,
    pub date: NaiveDate,
    pub days: DayClass,
}

/// One service matched by a metrics query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSummary {
    pub scheduled_departure: String,
    pub scheduled_arrival: Option<String>,
    pub toc_code: String,
    pub rids: Vec<String>,
}

impl ServiceSummary {
    pub fn primary_rid(&self) -> Option<&str> {
        self.rids.first().map(String::as_str)
    }
}

/// Timings recorded at a single calling point. Times are "HHMM".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTiming {
    pub location: String,
    pub scheduled_departure: Option<String>,
    pub scheduled_arrival: Option<String>,
    pub actual_departure: Option<String>,
    pub actual_arrival: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDetail {
    pub rid: String,
    pub toc_code: String,
    pub locations: Vec<LocationTiming>,
}

impl ServiceDetail {
    pub fn location(&self, crs: &str) -> Option<&LocationTiming> {
        let crs = crs.trim();
        self.locations
            .iter()
            .rev()
            .find(|timing| timing.location.eq_ignore_ascii_case(crs))
    }
}

impl From<wire::MetricsService> for ServiceSummary {
    fn from(service: wire::MetricsService) -> Self {
        let attributes = service.attributes;
        Self {
            scheduled_departure: attributes.gbtt_ptd,
            scheduled_arrival: non_empty(attributes.gbtt_pta),
            toc_code: attributes.toc_code,
            rids: attributes
                .rids
                .into_iter()
                .map(|rid| rid.trim().to_string())
                .filter(|rid| !rid.is_empty())
                .collect(),
        }
    }
}

impl From<wire::DetailsResponse> for ServiceDetail {
    fn from(response: wire::DetailsResponse) -> Self {
        let attributes = response.attributes;
        Self {
            rid: attributes.rid,
            toc_code: attributes.toc_code,
            locations: attributes
                .locations
                .into_iter()
                .map(|location| LocationTiming {
                    location: location.location,
                    scheduled_departure: non_empty(location.gbtt_ptd),
                    scheduled_arrival: non_empty(location.gbtt_pta),
                    actual_departure: non_empty(location.actual_td),
                    actual_arrival: non_empty(location.actual_ta),
                })
                .collect(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
