use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::gateway::TicketGateway;
use super::service::EligibilityService;
use crate::performance::PerformanceLookup;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssessParams {
    #[serde(default)]
    pub(crate) today: Option<String>,
}

/// Router builder exposing ticket assessment and operator policy endpoints.
pub fn eligibility_router<L, G>(service: Arc<EligibilityService<L, G>>) -> Router
where
    L: PerformanceLookup + 'static,
    G: TicketGateway + 'static,
{
    Router::new()
        .route("/api/v1/eligibility", post(assess_handler::<L, G>))
        .route(
            "/api/v1/operators/:operator/policy",
            get(policy_handler::<L, G>),
        )
        .with_state(service)
}

pub(crate) async fn assess_handler<L, G>(
    State(service): State<Arc<EligibilityService<L, G>>>,
    Query(params): Query<AssessParams>,
    body: Bytes,
) -> Response
where
    L: PerformanceLookup + 'static,
    G: TicketGateway + 'static,
{
    let today = match params.today.as_deref() {
        None => Local::now().date_naive(),
        Some(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                let payload = json!({
                    "error": format!("'{raw}' is not a YYYY-MM-DD date"),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
            }
        },
    };

    let assessment = service.assess(&body, today).await;
    (StatusCode::OK, axum::Json(assessment)).into_response()
}

pub(crate) async fn policy_handler<L, G>(
    State(service): State<Arc<EligibilityService<L, G>>>,
    Path(operator): Path<String>,
) -> Response
where
    L: PerformanceLookup + 'static,
    G: TicketGateway + 'static,
{
    match service.operator_policy(&operator) {
        Some(policy) => (StatusCode::OK, axum::Json(policy)).into_response(),
        None => {
            let payload = json!({
                "operator": operator,
                "error": "operator not found in compensation table",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
