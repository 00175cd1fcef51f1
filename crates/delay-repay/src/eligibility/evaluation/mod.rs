mod delay;
mod policy;
mod rules;

pub use delay::arrival_delay;
pub use policy::{
    EligibilityStatus, LearnMoreTopic, NextAction, Verdict, CLAIM_WINDOW_DAYS,
};

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::info;

use super::domain::{DelayResult, EnrichedSegment, RawSegment, TicketDocument};
use crate::performance::PerformanceLookup;
use crate::reference::ReferenceData;
use policy::decide_compensation;
use rules::{screen_segment, Screening};

/// Evaluates journey legs against historical performance and the reference tables.
pub struct EligibilityEngine<L> {
    lookup: Arc<L>,
    reference: Arc<ReferenceData>,
}

impl<L> EligibilityEngine<L>
where
    L: PerformanceLookup,
{
    pub fn new(lookup: Arc<L>, reference: Arc<ReferenceData>) -> Self {
        Self { lookup, reference }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Run one leg through the gates, the lookups and the compensation table.
    pub async fn evaluate(&self, segment: &RawSegment, today: NaiveDate) -> EnrichedSegment {
        let leg = match screen_segment(segment, today) {
            Screening::Settled(verdict) => return EnrichedSegment::settled(segment, verdict),
            Screening::Proceed(leg) => leg,
        };

        let mut enriched = EnrichedSegment::settled(segment, Verdict::NoDelayData);
        enriched.departure_crs = Some(leg.departure_crs.clone());
        enriched.arrival_crs = Some(leg.arrival_crs.clone());

        let service = match delay::resolve_service(self.lookup.as_ref(), &leg).await {
            Ok(service) => service,
            Err(verdict) => {
                enriched.verdict = verdict;
                return enriched;
            }
        };

        let operator = self.reference.operators.resolve(&service.toc_code).to_string();
        let delay_minutes = arrival_delay(
            service.scheduled_arrival.as_deref(),
            service.actual_arrival.as_deref(),
        );

        enriched.delay = Some(DelayResult {
            arrival_delay_minutes: delay_minutes,
            toc_code: service.toc_code.clone(),
        });
        enriched.operator = Some(operator.clone());
        enriched.service = Some(service);

        enriched.verdict = match delay_minutes {
            Some(minutes) => decide_compensation(minutes, &operator, &self.reference.compensation),
            None => Verdict::NoDelayData,
        };

        info!(
            from = %leg.departure_crs,
            to = %leg.arrival_crs,
            date = %leg.date,
            status = enriched.verdict.status().label(),
            "segment evaluated"
        );
        enriched
    }

    /// Evaluate every leg of a document concurrently, keeping input order.
    pub async fn evaluate_document(
        &self,
        document: &TicketDocument,
        today: NaiveDate,
    ) -> EvaluatedDocument {
        match document {
            TicketDocument::Single(segment) => {
                EvaluatedDocument::Single(self.evaluate(segment, today).await)
            }
            TicketDocument::MultiLeg { segments } => {
                let evaluated = join_all(
                    segments
                        .iter()
                        .map(|segment| self.evaluate(segment, today)),
                )
                .await;
                let aggregate = AggregateVerdict::from_segments(&evaluated);
                EvaluatedDocument::MultiLeg {
                    segments: evaluated,
                    aggregate,
                }
            }
        }
    }
}

/// Engine output for a whole ticket document.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatedDocument {
    Single(EnrichedSegment),
    MultiLeg {
        segments: Vec<EnrichedSegment>,
        aggregate: AggregateVerdict,
    },
}

impl EvaluatedDocument {
    pub fn segments(&self) -> &[EnrichedSegment] {
        match self {
            EvaluatedDocument::Single(segment) => std::slice::from_ref(segment),
            EvaluatedDocument::MultiLeg { segments, .. } => segments,
        }
    }

    pub fn status(&self) -> EligibilityStatus {
        match self {
            EvaluatedDocument::Single(segment) => segment.verdict.status(),
            EvaluatedDocument::MultiLeg { aggregate, .. } => aggregate.status(),
        }
    }
}

/// Journey-level outcome for multi-leg tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateVerdict {
    AnyEligible { eligible: usize, total: usize },
    NoneEligible { total: usize },
}

impl AggregateVerdict {
    pub fn from_segments(segments: &[EnrichedSegment]) -> Self {
        let total = segments.len();
        let eligible = segments
            .iter()
            .filter(|segment| segment.verdict.is_eligible())
            .count();
        if eligible > 0 {
            AggregateVerdict::AnyEligible { eligible, total }
        } else {
            AggregateVerdict::NoneEligible { total }
        }
    }

    pub const fn status(self) -> EligibilityStatus {
        match self {
            AggregateVerdict::AnyEligible { .. } => EligibilityStatus::EligibleMultileg,
            AggregateVerdict::NoneEligible { .. } => EligibilityStatus::IneligibleMultileg,
        }
    }

    pub fn message(self) -> String {
        match self {
            AggregateVerdict::AnyEligible { eligible, total } => format!(
                "Found {eligible} eligible segment(s) for compensation out of {total} total segments."
            ),
            AggregateVerdict::NoneEligible { .. } => {
                "None of your journey segments qualify for delay repay compensation.".to_string()
            }
        }
    }

    pub const fn next_action(self) -> NextAction {
        match self {
            AggregateVerdict::AnyEligible { .. } => NextAction::ProceedClaim,
            AggregateVerdict::NoneEligible { .. } => NextAction::LearnMore,
        }
    }
}
