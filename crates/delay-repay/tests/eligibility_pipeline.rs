use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use delay_repay::eligibility::{
    ClaimRoute, EligibilityReport, EligibilityService, EligibilityStatus, JsonTicketGateway,
    NextAction,
};
use delay_repay::performance::{
    LocationTiming, PerformanceLookup, ServiceDetail, ServiceQuery, ServiceSummary,
    UpstreamApiError,
};
use delay_repay::reference::{
    compensation_table_from_reader, operator_codes_from_reader, MinimumDelay, ReferenceData,
};

const TOC_CODES: &[u8] = include_bytes!("../../../data/reference/toc_code.csv");
const COMPENSATION: &[u8] =
    include_bytes!("../../../data/reference/delay_repay_percentages_single_tickets.csv");

fn reference_data() -> ReferenceData {
    let operators = operator_codes_from_reader(TOC_CODES).expect("toc codes load");
    let compensation = compensation_table_from_reader(COMPENSATION).expect("compensation loads");
    ReferenceData::new(operators, compensation)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date")
}

/// Answers every query with one service run by `toc_code`, arriving `actual_arrival`.
struct ScriptedLookup {
    toc_code: &'static str,
    actual_arrival: &'static str,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    fn new(toc_code: &'static str, actual_arrival: &'static str) -> Self {
        Self {
            toc_code,
            actual_arrival,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PerformanceLookup for ScriptedLookup {
    async fn find_services(
        &self,
        query: &ServiceQuery,
    ) -> Result<Vec<ServiceSummary>, UpstreamApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![ServiceSummary {
            scheduled_departure: "1000".to_string(),
            scheduled_arrival: Some("1130".to_string()),
            toc_code: self.toc_code.to_string(),
            // The RID carries both CRS codes so the detail call can rebuild the calling points.
            rids: vec![format!("{}{}", query.from_crs, query.to_crs)],
        }])
    }

    async fn service_detail(&self, rid: &str) -> Result<ServiceDetail, UpstreamApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ServiceDetail {
            rid: rid.to_string(),
            toc_code: self.toc_code.to_string(),
            locations: vec![
                LocationTiming {
                    location: rid[..3].to_string(),
                    scheduled_departure: Some("1000".to_string()),
                    actual_departure: Some("1000".to_string()),
                    ..LocationTiming::default()
                },
                LocationTiming {
                    location: rid[3..].to_string(),
                    scheduled_arrival: Some("1130".to_string()),
                    actual_arrival: Some(self.actual_arrival.to_string()),
                    ..LocationTiming::default()
                },
            ],
        })
    }
}

fn service(
    lookup: ScriptedLookup,
) -> (
    EligibilityService<ScriptedLookup, JsonTicketGateway>,
    Arc<ScriptedLookup>,
) {
    let lookup = Arc::new(lookup);
    let service = EligibilityService::new(
        lookup.clone(),
        Arc::new(JsonTicketGateway),
        Arc::new(reference_data()),
    );
    (service, lookup)
}

const GWR_TICKET: &str = r#"```json
{
  "ticket_date": "12 Oct 2026",
  "departure_time": "10:00",
  "departure_station": "Bath Spa",
  "departure_crs": "BTH",
  "arrival_station": "London Paddington",
  "arrival_crs": "PAD",
  "ticket_type": "Off-Peak Return",
  "railcard": "16-25 Railcard",
  "ticket_format": "E-ticket",
  "ctr": "ABC12345"
}
```"#;

#[test]
fn bundled_reference_tables_load() {
    let reference = reference_data();
    assert_eq!(reference.operators.name_for("XC"), Some("CrossCountry"));
    assert_eq!(reference.operators.name_for("ZZ"), None);
    assert_eq!(
        reference.compensation.minimum_delay("CrossCountry"),
        MinimumDelay::Minutes(30)
    );
    assert_eq!(
        reference.compensation.minimum_delay("Great Western Railway"),
        MinimumDelay::Minutes(15)
    );
}

#[tokio::test]
async fn great_western_delay_is_routed_to_automated_claim() {
    let (service, lookup) = service(ScriptedLookup::new("GW", "1205"));

    let assessment = service.assess(GWR_TICKET.as_bytes(), today()).await;

    let EligibilityReport::Journey(report) = &assessment.report else {
        panic!("expected single journey report, got {:?}", assessment.report);
    };
    assert_eq!(report.status, EligibilityStatus::Eligible);
    assert_eq!(report.delay_minutes, Some(35.0));
    assert_eq!(report.train_operator.as_deref(), Some("Great Western Railway"));
    assert_eq!(report.compensation_percentage.as_deref(), Some("50%"));
    assert_eq!(report.railcard.as_deref(), Some("16-25 Railcard"));
    assert_eq!(report.next_action, NextAction::ProceedClaim);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 2);

    match &assessment.claims[..] {
        [ClaimRoute::Automated { portal_url, journey }] => {
            assert!(portal_url.starts_with("https://delayrepay.gwr.com/"));
            assert_eq!(journey.departure_station, "Bath Spa");
            assert_eq!(journey.delay_range, "30-59 minutes");
        }
        other => panic!("expected automated route, got {other:?}"),
    }
}

#[tokio::test]
async fn operator_without_compensation_row_is_manual_with_unknown_percentage() {
    let (service, _) = service(ScriptedLookup::new("ES", "1300"));

    let assessment = service.assess(GWR_TICKET.as_bytes(), today()).await;

    let EligibilityReport::Journey(report) = &assessment.report else {
        panic!("expected single journey report");
    };
    assert_eq!(report.status, EligibilityStatus::Eligible);
    assert_eq!(report.train_operator.as_deref(), Some("Eurostar"));
    assert_eq!(report.compensation_percentage.as_deref(), Some("Unknown"));
    assert_eq!(
        assessment.claims,
        vec![ClaimRoute::Manual {
            train_operator: "Eurostar".to_string()
        }]
    );
}

#[tokio::test]
async fn report_json_uses_snake_case_tokens() {
    let (service, _) = service(ScriptedLookup::new("XC", "1150"));

    let assessment = service.assess(GWR_TICKET.as_bytes(), today()).await;
    let value = serde_json::to_value(&assessment).expect("serialize");

    assert_eq!(value["report"]["status"], "ineligible_duration");
    assert_eq!(value["report"]["learn_more_topic"], "toc_policies");
    assert_eq!(value["report"]["delay_status"], "Delay does not qualify");
    assert_eq!(value["claims"][0]["route"], "ineligible");
}
