use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::claims::{route_claims, supported_portal, ClaimRoute};
use super::evaluation::EligibilityEngine;
use super::gateway::TicketGateway;
use super::report::EligibilityReport;
use crate::performance::PerformanceLookup;
use crate::reference::{DelayBracket, MinimumDelay, ReferenceData};

/// Service composing the ticket gateway, the eligibility engine and claim routing.
pub struct EligibilityService<L, G> {
    engine: Arc<EligibilityEngine<L>>,
    gateway: Arc<G>,
}

impl<L, G> EligibilityService<L, G>
where
    L: PerformanceLookup + 'static,
    G: TicketGateway + 'static,
{
    pub fn new(lookup: Arc<L>, gateway: Arc<G>, reference: Arc<ReferenceData>) -> Self {
        Self {
            engine: Arc::new(EligibilityEngine::new(lookup, reference)),
            gateway,
        }
    }

    pub fn engine(&self) -> &EligibilityEngine<L> {
        &self.engine
    }

    /// Extract, evaluate and route one uploaded ticket.
    pub async fn assess(&self, payload: &[u8], today: NaiveDate) -> Assessment {
        let document = match self.gateway.extract(payload).await {
            Ok(document) => document,
            Err(error) => {
                warn!(error = %error, "ticket extraction failed");
                let report = EligibilityReport::extraction_failed(&error);
                let claims = route_claims(&report);
                return Assessment { report, claims };
            }
        };

        let evaluated = self.engine.evaluate_document(&document, today).await;
        let report = EligibilityReport::from(&evaluated);
        let claims = route_claims(&report);

        info!(
            status = report.status().label(),
            segments = evaluated.segments().len(),
            automated = claims
                .iter()
                .filter(|route| matches!(route, ClaimRoute::Automated { .. }))
                .count(),
            "ticket assessed"
        );
        Assessment { report, claims }
    }

    /// Compensation policy for an operator display name.
    pub fn operator_policy(&self, operator: &str) -> Option<OperatorPolicy> {
        OperatorPolicy::lookup(self.engine.reference(), operator)
    }
}

/// Filtered report plus the claim route for each evaluated leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub report: EligibilityReport,
    pub claims: Vec<ClaimRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketPercentage {
    pub bracket: String,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorPolicy {
    pub operator: String,
    /// `None` when no bracket pays out.
    pub minimum_delay_minutes: Option<u32>,
    pub brackets: Vec<BracketPercentage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claim_portal: Option<String>,
}

impl OperatorPolicy {
    pub fn lookup(reference: &ReferenceData, operator: &str) -> Option<Self> {
        let operator = operator.trim();
        let row = reference.compensation.row(operator)?;
        let minimum_delay_minutes = match row.minimum_delay() {
            MinimumDelay::Minutes(minutes) => Some(minutes),
            MinimumDelay::NoCompensation => None,
        };
        let brackets = DelayBracket::ALL
            .into_iter()
            .map(|bracket| BracketPercentage {
                bracket: bracket.label().to_string(),
                percentage: row.percentage(bracket).to_string(),
            })
            .collect();

        Some(Self {
            operator: operator.to_string(),
            minimum_delay_minutes,
            brackets,
            claim_portal: supported_portal(operator).map(str::to_string),
        })
    }
}
