use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::eligibility::domain::{RawSegment, TicketFormat};
use crate::eligibility::evaluation::EligibilityEngine;
use crate::eligibility::gateway::JsonTicketGateway;
use crate::eligibility::service::EligibilityService;
use crate::performance::{
    LocationTiming, PerformanceLookup, ServiceDetail, ServiceQuery, ServiceSummary,
    UpstreamApiError,
};
use crate::reference::{CompensationRow, CompensationTable, OperatorCodeTable, ReferenceData};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

fn row(values: [&str; 4]) -> CompensationRow {
    CompensationRow {
        minutes_15_to_29: values[0].to_string(),
        minutes_30_to_59: values[1].to_string(),
        minutes_60_to_119: values[2].to_string(),
        minutes_120_plus: values[3].to_string(),
    }
}

pub(super) fn reference_data() -> ReferenceData {
    let mut names = BTreeMap::new();
    names.insert("XC".to_string(), "CrossCountry".to_string());
    names.insert("GW".to_string(), "Great Western Railway".to_string());
    names.insert("VT".to_string(), "Avanti West Coast".to_string());
    names.insert("HT".to_string(), "Hull Trains".to_string());
    names.insert("GX".to_string(), "Gatwick Express".to_string());

    let mut rows = BTreeMap::new();
    rows.insert("CrossCountry".to_string(), row(["0%", "50%", "100%", "100%"]));
    rows.insert(
        "Great Western Railway".to_string(),
        row(["25%", "50%", "100%", "100%"]),
    );
    rows.insert(
        "Avanti West Coast".to_string(),
        row(["25%", "50%", "100%", "100%"]),
    );
    rows.insert("Hull Trains".to_string(), row(["0%", "0%", "0%", "0%"]));
    rows.insert("Gatwick Express".to_string(), row(["25%", "0%", "100%", "100%"]));

    ReferenceData::new(OperatorCodeTable::new(names), CompensationTable::new(rows))
}

/// Journey from Bristol to Birmingham on 12 Oct 2026, departing 10:00.
pub(super) fn segment() -> RawSegment {
    RawSegment {
        ticket_date: Some("12 Oct 2026".to_string()),
        departure_time: Some("10:00".to_string()),
        departure_station: Some("Bristol Temple Meads".to_string()),
        departure_crs: Some("BRI".to_string()),
        arrival_station: Some("Birmingham New Street".to_string()),
        arrival_crs: Some("BHM".to_string()),
        ticket_type: Some("Anytime Day Single".to_string()),
        railcard: None,
        ticket_format: TicketFormat::ETicket,
        ctr: Some("CTR12345678".to_string()),
    }
}

pub(super) fn paper_segment() -> RawSegment {
    RawSegment {
        ticket_format: TicketFormat::Paper,
        ..segment()
    }
}

pub(super) fn summary(departure: &str, toc: &str, rid: &str) -> ServiceSummary {
    ServiceSummary {
        scheduled_departure: departure.to_string(),
        scheduled_arrival: Some("1130".to_string()),
        toc_code: toc.to_string(),
        rids: vec![rid.to_string()],
    }
}

/// Service detail for a BRI → BHM run arriving at `actual_arrival`.
pub(super) fn detail(rid: &str, toc: &str, actual_arrival: Option<&str>) -> ServiceDetail {
    ServiceDetail {
        rid: rid.to_string(),
        toc_code: toc.to_string(),
        locations: vec![
            LocationTiming {
                location: "BRI".to_string(),
                scheduled_departure: Some("1000".to_string()),
                actual_departure: Some("1001".to_string()),
                ..LocationTiming::default()
            },
            LocationTiming {
                location: "BHM".to_string(),
                scheduled_arrival: Some("1130".to_string()),
                actual_arrival: actual_arrival.map(str::to_string),
                ..LocationTiming::default()
            },
        ],
    }
}

#[derive(Clone, Copy)]
pub(super) enum Failure {
    Metrics,
    Details,
}

/// In-memory performance source keyed by origin CRS.
#[derive(Default)]
pub(super) struct FakeLookup {
    services: Mutex<HashMap<String, Vec<ServiceSummary>>>,
    details: Mutex<HashMap<String, ServiceDetail>>,
    failure: Mutex<Option<Failure>>,
    queries: Mutex<Vec<ServiceQuery>>,
    metrics_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeLookup {
    pub(super) fn with_service(self, from_crs: &str, service: ServiceSummary) -> Self {
        self.services
            .lock()
            .expect("services mutex poisoned")
            .entry(from_crs.to_string())
            .or_default()
            .push(service);
        self
    }

    pub(super) fn with_detail(self, detail: ServiceDetail) -> Self {
        self.details
            .lock()
            .expect("details mutex poisoned")
            .insert(detail.rid.clone(), detail);
        self
    }

    pub(super) fn failing(self, failure: Failure) -> Self {
        *self.failure.lock().expect("failure mutex poisoned") = Some(failure);
        self
    }

    /// BRI → BHM 10:00 CrossCountry service arriving `actual_arrival`.
    pub(super) fn cross_country(actual_arrival: &str) -> Self {
        FakeLookup::default()
            .with_service("BRI", summary("1000", "XC", "202610128800001"))
            .with_detail(detail("202610128800001", "XC", Some(actual_arrival)))
    }

    pub(super) fn metrics_calls(&self) -> usize {
        self.metrics_calls.load(Ordering::SeqCst)
    }

    pub(super) fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub(super) fn queries(&self) -> Vec<ServiceQuery> {
        self.queries.lock().expect("queries mutex poisoned").clone()
    }
}

impl PerformanceLookup for FakeLookup {
    async fn find_services(
        &self,
        query: &ServiceQuery,
    ) -> Result<Vec<ServiceSummary>, UpstreamApiError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("queries mutex poisoned")
            .push(query.clone());
        if matches!(
            *self.failure.lock().expect("failure mutex poisoned"),
            Some(Failure::Metrics)
        ) {
            return Err(UpstreamApiError::Timeout);
        }
        Ok(self
            .services
            .lock()
            .expect("services mutex poisoned")
            .get(&query.from_crs)
            .cloned()
            .unwrap_or_default())
    }

    async fn service_detail(&self, rid: &str) -> Result<ServiceDetail, UpstreamApiError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if matches!(
            *self.failure.lock().expect("failure mutex poisoned"),
            Some(Failure::Details)
        ) {
            return Err(UpstreamApiError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        self.details
            .lock()
            .expect("details mutex poisoned")
            .get(rid)
            .cloned()
            .ok_or_else(|| UpstreamApiError::Decode(format!("unknown rid {rid}")))
    }
}

pub(super) fn engine(lookup: FakeLookup) -> (EligibilityEngine<FakeLookup>, Arc<FakeLookup>) {
    let lookup = Arc::new(lookup);
    let engine = EligibilityEngine::new(lookup.clone(), Arc::new(reference_data()));
    (engine, lookup)
}

pub(super) fn service(
    lookup: FakeLookup,
) -> (
    EligibilityService<FakeLookup, JsonTicketGateway>,
    Arc<FakeLookup>,
) {
    let lookup = Arc::new(lookup);
    let service = EligibilityService::new(
        lookup.clone(),
        Arc::new(JsonTicketGateway),
        Arc::new(reference_data()),
    );
    (service, lookup)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
