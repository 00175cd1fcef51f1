use serde::{Deserialize, Serialize};

use super::evaluation::EligibilityStatus;
use super::report::{EligibilityReport, SegmentReport};
use crate::reference::DelayBracket;

/// Operators whose claim portal the automated submitter can drive.
const SUPPORTED_PORTALS: [(&str, &str); 7] = [
    (
        "CrossCountry",
        "https://delayrepay.crosscountrytrains.co.uk/en/login",
    ),
    (
        "Transport for Wales",
        "https://delayrepay.tfwrail.wales/en/login",
    ),
    (
        "TransPennine Express",
        "https://delayrepay.tpexpress.co.uk/en/login?loginTarget=%2F",
    ),
    (
        "Great Western Railway",
        "https://delayrepay.gwr.com/en/login?loginTarget=%2F",
    ),
    (
        "Northern",
        "https://delayrepay.northernrailway.co.uk/en/login?loginTarget=%2F",
    ),
    (
        "South Western Railway",
        "https://delayrepay.southwesternrailway.com/en/login?loginTarget=%2F",
    ),
    (
        "Island Line",
        "https://delayrepay.southwesternrailway.com/en/login?loginTarget=%2F",
    ),
];

pub fn supported_portal(operator: &str) -> Option<&'static str> {
    SUPPORTED_PORTALS
        .iter()
        .find(|(name, _)| *name == operator)
        .map(|(_, url)| *url)
}

/// Journey facts the claim submitter types into an operator portal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyDetails {
    pub train_operator: String,
    pub date: String,
    pub departure_time: String,
    pub departure_station: String,
    pub arrival_station: String,
    pub delay_minutes: f64,
    pub delay_range: String,
}

impl JourneyDetails {
    fn from_report(report: &SegmentReport, operator: &str) -> Self {
        let delay_minutes = report.delay_minutes.unwrap_or_default();
        let delay_range = DelayBracket::for_delay(delay_minutes)
            .map(|bracket| format!("{} minutes", bracket.label()))
            .unwrap_or_default();

        Self {
            train_operator: operator.to_string(),
            date: report.ticket_date.clone().unwrap_or_default(),
            departure_time: report.departure_time.clone().unwrap_or_default(),
            departure_station: station(report.departure_station.as_ref(), report.departure_crs.as_ref()),
            arrival_station: station(report.arrival_station.as_ref(), report.arrival_crs.as_ref()),
            delay_minutes,
            delay_range,
        }
    }
}

fn station(name: Option<&String>, crs: Option<&String>) -> String {
    name.or(crs).cloned().unwrap_or_default()
}

/// How a verdict should be handed to the claim orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum ClaimRoute {
    Automated {
        portal_url: String,
        journey: JourneyDetails,
    },
    Manual {
        train_operator: String,
    },
    Ineligible,
    NotApplicable,
}

impl ClaimRoute {
    pub const fn label(&self) -> &'static str {
        match self {
            ClaimRoute::Automated { .. } => "automated",
            ClaimRoute::Manual { .. } => "manual",
            ClaimRoute::Ineligible => "ineligible",
            ClaimRoute::NotApplicable => "not_applicable",
        }
    }
}

pub fn route_segment(report: &SegmentReport) -> ClaimRoute {
    let status = report.status;
    if status == EligibilityStatus::Eligible {
        let operator = report.train_operator.clone().unwrap_or_default();
        return match supported_portal(&operator) {
            Some(portal_url) => ClaimRoute::Automated {
                portal_url: portal_url.to_string(),
                journey: JourneyDetails::from_report(report, &operator),
            },
            None => ClaimRoute::Manual {
                train_operator: operator,
            },
        };
    }

    if status.is_ineligible() {
        ClaimRoute::Ineligible
    } else {
        ClaimRoute::NotApplicable
    }
}

/// One route per evaluated leg, in report order.
pub fn route_claims(report: &EligibilityReport) -> Vec<ClaimRoute> {
    match report {
        EligibilityReport::Journey(segment) => vec![route_segment(segment)],
        EligibilityReport::MultiLeg(multi) => multi.segments.iter().map(route_segment).collect(),
        EligibilityReport::Rejected(_) => vec![ClaimRoute::NotApplicable],
    }
}
