use chrono::{NaiveDate, NaiveTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::evaluation::Verdict;

/// How the ticket was presented. Anything other than "Paper" is treated as digital,
/// including a missing or null field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum TicketFormat {
    #[serde(rename = "Paper")]
    Paper,
    #[default]
    #[serde(rename = "E-ticket")]
    ETicket,
}

impl<'de> Deserialize<'de> for TicketFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let format = match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(label)) if label.trim().eq_ignore_ascii_case("paper") => {
                TicketFormat::Paper
            }
            _ => TicketFormat::ETicket,
        };
        Ok(format)
    }
}

impl TicketFormat {
    pub const fn label(self) -> &'static str {
        match self {
            TicketFormat::Paper => "Paper",
            TicketFormat::ETicket => "E-ticket",
        }
    }
}

/// One journey leg exactly as the ticket gateway extracted it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub ticket_date: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub departure_station: Option<String>,
    #[serde(default)]
    pub departure_crs: Option<String>,
    #[serde(default)]
    pub arrival_station: Option<String>,
    #[serde(default)]
    pub arrival_crs: Option<String>,
    #[serde(default)]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub railcard: Option<String>,
    #[serde(default)]
    pub ticket_format: TicketFormat,
    #[serde(default)]
    pub ctr: Option<String>,
}

/// Which end of a leg a field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Departure,
    Arrival,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Departure => f.write_str("departure"),
            Endpoint::Arrival => f.write_str("arrival"),
        }
    }
}

/// A leg whose fields cannot be turned into a performance query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("ticket date is missing")]
    MissingDate,
    #[error("ticket date '{0}' is not in DD Mon YYYY form")]
    InvalidDate(String),
    #[error("departure time is missing")]
    MissingTime,
    #[error("departure time '{0}' is not in HH:MM form")]
    InvalidTime(String),
    #[error("{0} station is missing")]
    MissingStation(Endpoint),
    #[error("{0} station code is missing")]
    MissingCrs(Endpoint),
}

impl RawSegment {
    /// Each endpoint needs a station name or a CRS code.
    pub fn validate_endpoints(&self) -> Result<(), ValidationError> {
        if is_blank(&self.departure_station) && is_blank(&self.departure_crs) {
            return Err(ValidationError::MissingStation(Endpoint::Departure));
        }
        if is_blank(&self.arrival_station) && is_blank(&self.arrival_crs) {
            return Err(ValidationError::MissingStation(Endpoint::Arrival));
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |value| value.trim().is_empty())
}

/// Extraction output: a single leg or an ordered list of legs.
///
/// A `segments` key selects the multi-leg form. A leg that fails to decode is kept
/// as an empty segment so it still receives its own verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TicketDocument {
    MultiLeg { segments: Vec<RawSegment> },
    Single(RawSegment),
}

impl<'de> Deserialize<'de> for TicketDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut value = Value::deserialize(deserializer)?;
        let Some(segments) = value.get_mut("segments").map(Value::take) else {
            return RawSegment::deserialize(value)
                .map(TicketDocument::Single)
                .map_err(de::Error::custom);
        };

        let Value::Array(segments) = segments else {
            return Err(de::Error::custom("`segments` must be a list of journey legs"));
        };
        let segments = segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                RawSegment::deserialize(segment).unwrap_or_else(|err| {
                    warn!(segment = index, error = %err, "journey leg could not be decoded");
                    RawSegment::default()
                })
            })
            .collect();
        Ok(TicketDocument::MultiLeg { segments })
    }
}

impl TicketDocument {
    pub fn segments(&self) -> &[RawSegment] {
        match self {
            TicketDocument::MultiLeg { segments } => segments,
            TicketDocument::Single(segment) => std::slice::from_ref(segment),
        }
    }
}

/// A leg whose date, time and station codes parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyLeg {
    pub date: NaiveDate,
    pub departure: NaiveTime,
    pub departure_crs: String,
    pub arrival_crs: String,
}

impl JourneyLeg {
    /// Scheduled departure in the zero-padded "HHMM" form HSP uses.
    pub fn departure_hhmm(&self) -> String {
        self.departure.format("%H%M").to_string()
    }
}

/// Timings of the matched service at the passenger's stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub rid: String,
    pub toc_code: String,
    pub scheduled_departure: Option<String>,
    pub actual_departure: Option<String>,
    pub scheduled_arrival: Option<String>,
    pub actual_arrival: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelayResult {
    pub arrival_delay_minutes: Option<f64>,
    pub toc_code: String,
}

/// A raw segment with everything the engine learned about it layered on top.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedSegment {
    pub raw: RawSegment,
    pub departure_crs: Option<String>,
    pub arrival_crs: Option<String>,
    pub service: Option<ServiceRecord>,
    pub delay: Option<DelayResult>,
    pub operator: Option<String>,
    pub verdict: Verdict,
}

impl EnrichedSegment {
    /// A segment that was settled before any service data was resolved.
    pub(crate) fn settled(raw: &RawSegment, verdict: Verdict) -> Self {
        Self {
            raw: raw.clone(),
            departure_crs: None,
            arrival_crs: None,
            service: None,
            delay: None,
            operator: None,
            verdict,
        }
    }

    pub fn delay_minutes(&self) -> Option<f64> {
        self.delay
            .as_ref()
            .and_then(|delay| delay.arrival_delay_minutes)
    }
}
