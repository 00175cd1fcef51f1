use chrono::NaiveDate;
use delay_repay::config::AppConfig;
use delay_repay::eligibility::{EligibilityService, JsonTicketGateway};
use delay_repay::error::AppError;
use delay_repay::performance::HspClient;
use delay_repay::reference::ReferenceData;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

/// Service wired to the live HSP API and the JSON extraction gateway.
pub(crate) type LiveEligibilityService = EligibilityService<HspClient, JsonTicketGateway>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<LiveEligibilityService>, AppError> {
    let reference = ReferenceData::load(&config.reference)?;
    if !config.performance.credentials.is_configured() {
        warn!("HSP_EMAIL / HSP_PASSWORD not set; performance lookups will be rejected");
    }
    let client = HspClient::new(&config.performance)?;

    Ok(Arc::new(EligibilityService::new(
        Arc::new(client),
        Arc::new(JsonTicketGateway),
        Arc::new(reference),
    )))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
