//! Caller-facing views of evaluated tickets.
//!
//! Only allow-listed ticket and verdict fields make it into these views; service
//! identifiers and raw HSP timestamps stay inside the engine.

use serde::{Deserialize, Serialize};

use super::domain::{EnrichedSegment, TicketFormat};
use super::evaluation::{EligibilityStatus, EvaluatedDocument, LearnMoreTopic, NextAction, Verdict};
use super::gateway::ExtractionError;

const NOT_APPLICABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_crs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_crs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub railcard: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<String>,
    pub ticket_format: TicketFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival_delay_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toc_code: Option<String>,
    pub delay_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compensation_percentage: Option<String>,
    pub status: EligibilityStatus,
    pub message: String,
    pub next_action: NextAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learn_more_topic: Option<LearnMoreTopic>,
}

impl From<&EnrichedSegment> for SegmentReport {
    fn from(segment: &EnrichedSegment) -> Self {
        let raw = &segment.raw;
        let verdict = &segment.verdict;
        let train_operator = match verdict {
            Verdict::BlockedPaper => Some(NOT_APPLICABLE.to_string()),
            _ => segment.operator.clone(),
        };

        Self {
            ticket_date: raw.ticket_date.clone(),
            departure_time: raw.departure_time.clone(),
            departure_station: raw.departure_station.clone(),
            departure_crs: segment
                .departure_crs
                .clone()
                .or_else(|| raw.departure_crs.clone()),
            arrival_station: raw.arrival_station.clone(),
            arrival_crs: segment
                .arrival_crs
                .clone()
                .or_else(|| raw.arrival_crs.clone()),
            ticket_type: raw.ticket_type.clone(),
            railcard: raw.railcard.clone(),
            ctr: raw.ctr.clone(),
            ticket_format: raw.ticket_format,
            delay_minutes: segment.delay_minutes(),
            arrival_delay_minutes: segment.delay_minutes(),
            train_operator,
            toc_code: segment.delay.as_ref().map(|delay| delay.toc_code.clone()),
            delay_status: verdict.delay_status(),
            compensation_percentage: verdict.compensation_percentage().map(str::to_string),
            status: verdict.status(),
            message: verdict.message(),
            next_action: verdict.next_action(),
            learn_more_topic: verdict.learn_more_topic(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiLegReport {
    pub segments: Vec<SegmentReport>,
    pub status: EligibilityStatus,
    pub message: String,
    pub next_action: NextAction,
}

/// Extraction failed, so there is nothing to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedTicket {
    pub status: EligibilityStatus,
    pub message: String,
    pub next_action: NextAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EligibilityReport {
    MultiLeg(MultiLegReport),
    Journey(SegmentReport),
    Rejected(RejectedTicket),
}

impl EligibilityReport {
    pub fn status(&self) -> EligibilityStatus {
        match self {
            EligibilityReport::MultiLeg(report) => report.status,
            EligibilityReport::Journey(report) => report.status,
            EligibilityReport::Rejected(report) => report.status,
        }
    }

    pub fn extraction_failed(error: &ExtractionError) -> Self {
        EligibilityReport::Rejected(RejectedTicket {
            status: EligibilityStatus::ErrorExtraction,
            message: format!("Could not read your ticket: {}", error.reason()),
            next_action: NextAction::UploadClearerPhoto,
        })
    }
}

impl From<&EvaluatedDocument> for EligibilityReport {
    fn from(document: &EvaluatedDocument) -> Self {
        match document {
            EvaluatedDocument::Single(segment) => {
                EligibilityReport::Journey(SegmentReport::from(segment))
            }
            EvaluatedDocument::MultiLeg {
                segments,
                aggregate,
            } => EligibilityReport::MultiLeg(MultiLegReport {
                segments: segments.iter().map(SegmentReport::from).collect(),
                status: aggregate.status(),
                message: aggregate.message(),
                next_action: aggregate.next_action(),
            }),
        }
    }
}
