//! Delay Repay eligibility: ticket screening, delay resolution, compensation
//! policy and claim routing.

pub mod claims;
pub mod domain;
pub(crate) mod evaluation;
pub mod gateway;
pub mod report;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use claims::{route_claims, route_segment, supported_portal, ClaimRoute, JourneyDetails};
pub use domain::{
    DelayResult, EnrichedSegment, Endpoint, JourneyLeg, RawSegment, ServiceRecord,
    TicketDocument, TicketFormat, ValidationError,
};
pub use evaluation::{
    arrival_delay, AggregateVerdict, EligibilityEngine, EligibilityStatus, EvaluatedDocument,
    LearnMoreTopic, NextAction, Verdict, CLAIM_WINDOW_DAYS,
};
pub use gateway::{ExtractionError, JsonTicketGateway, TicketGateway};
pub use report::{EligibilityReport, MultiLegReport, RejectedTicket, SegmentReport};
pub use router::eligibility_router;
pub use service::{Assessment, BracketPercentage, EligibilityService, OperatorPolicy};
