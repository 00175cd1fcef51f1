use serde::{Deserialize, Serialize};

use crate::reference::{CompensationTable, DelayBracket, MinimumDelay, ZERO_PERCENT};

/// Age limit for a claim, counted in whole days from the journey date.
pub const CLAIM_WINDOW_DAYS: i64 = 28;

const NOT_APPLICABLE: &str = "N/A";

/// Canonical status tokens surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    Eligible,
    EligibleMultileg,
    IneligibleAge,
    IneligibleDuration,
    IneligibleNoCompensation,
    IneligibleBracket,
    IneligibleMultileg,
    BlockedPaper,
    ErrorExtraction,
    ErrorInvalidTicket,
    ErrorApi,
    ErrorNoServices,
    ErrorNoMatch,
    ErrorNoDelayData,
}

impl EligibilityStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EligibilityStatus::Eligible => "eligible",
            EligibilityStatus::EligibleMultileg => "eligible_multileg",
            EligibilityStatus::IneligibleAge => "ineligible_age",
            EligibilityStatus::IneligibleDuration => "ineligible_duration",
            EligibilityStatus::IneligibleNoCompensation => "ineligible_no_compensation",
            EligibilityStatus::IneligibleBracket => "ineligible_bracket",
            EligibilityStatus::IneligibleMultileg => "ineligible_multileg",
            EligibilityStatus::BlockedPaper => "blocked_paper",
            EligibilityStatus::ErrorExtraction => "error_extraction",
            EligibilityStatus::ErrorInvalidTicket => "error_invalid_ticket",
            EligibilityStatus::ErrorApi => "error_api",
            EligibilityStatus::ErrorNoServices => "error_no_services",
            EligibilityStatus::ErrorNoMatch => "error_no_match",
            EligibilityStatus::ErrorNoDelayData => "error_no_delay_data",
        }
    }

    pub const fn is_eligible(self) -> bool {
        matches!(
            self,
            EligibilityStatus::Eligible | EligibilityStatus::EligibleMultileg
        )
    }

    pub const fn is_ineligible(self) -> bool {
        matches!(
            self,
            EligibilityStatus::IneligibleAge
                | EligibilityStatus::IneligibleDuration
                | EligibilityStatus::IneligibleNoCompensation
                | EligibilityStatus::IneligibleBracket
                | EligibilityStatus::IneligibleMultileg
        )
    }

    pub const fn is_error(self) -> bool {
        matches!(
            self,
            EligibilityStatus::ErrorExtraction
                | EligibilityStatus::ErrorInvalidTicket
                | EligibilityStatus::ErrorApi
                | EligibilityStatus::ErrorNoServices
                | EligibilityStatus::ErrorNoMatch
                | EligibilityStatus::ErrorNoDelayData
        )
    }

    /// Only upstream API failures are worth retrying unchanged.
    pub const fn is_retryable(self) -> bool {
        matches!(self, EligibilityStatus::ErrorApi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    ProceedClaim,
    LearnMore,
    UploadEticket,
    UploadClearerPhoto,
    Retry,
    ManualCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnMoreTopic {
    ClaimDeadlines,
    TocPolicies,
    CompensationBrackets,
}

/// Outcome of evaluating one journey leg. Each variant carries only the
/// facts its message needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    BlockedPaper,
    InvalidTicket {
        reason: String,
    },
    TooOld {
        days_old: i64,
    },
    UpstreamUnavailable {
        reason: String,
    },
    NoServices,
    NoMatchingService {
        departure_time: String,
    },
    NoDelayData,
    NoCompensation {
        operator: String,
    },
    BelowMinimum {
        delay_minutes: f64,
        operator: String,
        minimum_delay: u32,
    },
    ZeroBracket {
        delay_minutes: f64,
        operator: String,
        bracket: DelayBracket,
    },
    Eligible {
        delay_minutes: f64,
        operator: String,
        compensation: String,
    },
}

impl Verdict {
    pub const fn status(&self) -> EligibilityStatus {
        match self {
            Verdict::BlockedPaper => EligibilityStatus::BlockedPaper,
            Verdict::InvalidTicket { .. } => EligibilityStatus::ErrorInvalidTicket,
            Verdict::TooOld { .. } => EligibilityStatus::IneligibleAge,
            Verdict::UpstreamUnavailable { .. } => EligibilityStatus::ErrorApi,
            Verdict::NoServices => EligibilityStatus::ErrorNoServices,
            Verdict::NoMatchingService { .. } => EligibilityStatus::ErrorNoMatch,
            Verdict::NoDelayData => EligibilityStatus::ErrorNoDelayData,
            Verdict::NoCompensation { .. } => EligibilityStatus::IneligibleNoCompensation,
            Verdict::BelowMinimum { .. } => EligibilityStatus::IneligibleDuration,
            Verdict::ZeroBracket { .. } => EligibilityStatus::IneligibleBracket,
            Verdict::Eligible { .. } => EligibilityStatus::Eligible,
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Verdict::BlockedPaper => "Paper tickets are not supported yet. Please upload an e-ticket or m-ticket (digital screenshot) instead.".to_string(),
            Verdict::InvalidTicket { reason } => {
                format!("Could not read your ticket details: {reason}.")
            }
            Verdict::TooOld { days_old } => format!(
                "Your journey was {days_old} days ago, which exceeds the {CLAIM_WINDOW_DAYS}-day claim window. UK delay repay claims must be submitted within {CLAIM_WINDOW_DAYS} days of travel."
            ),
            Verdict::UpstreamUnavailable { reason } => format!(
                "Unable to verify delays due to a technical issue: {reason}. Please try again later."
            ),
            Verdict::NoServices => "No matching train services found for your journey. This may be due to incomplete schedule data.".to_string(),
            Verdict::NoMatchingService { departure_time } => format!(
                "Could not find the {departure_time} service for your journey. Please ensure your ticket details are clear and try again."
            ),
            Verdict::NoDelayData => "Delay information is not available for this journey. This may be due to incomplete performance data.".to_string(),
            Verdict::NoCompensation { operator } => {
                format!("{operator} does not offer delay repay compensation for any delay duration.")
            }
            Verdict::BelowMinimum {
                delay_minutes,
                operator,
                minimum_delay,
            } => format!(
                "Your {delay_minutes:.1}min delay with {operator} doesn't qualify. {operator} requires delays of {minimum_delay}+ minutes for compensation."
            ),
            Verdict::ZeroBracket {
                delay_minutes,
                operator,
                bracket,
            } => format!(
                "Your {delay_minutes:.1}min delay falls in a 0% compensation bracket ({} minutes) for {operator}.",
                bracket.label()
            ),
            Verdict::Eligible {
                delay_minutes,
                operator,
                compensation,
            } => format!(
                "Your {delay_minutes:.1}min delay with {operator} qualifies for {compensation} compensation."
            ),
        }
    }

    pub const fn next_action(&self) -> NextAction {
        match self {
            Verdict::BlockedPaper => NextAction::UploadEticket,
            Verdict::InvalidTicket { .. } | Verdict::NoMatchingService { .. } => {
                NextAction::UploadClearerPhoto
            }
            Verdict::UpstreamUnavailable { .. } => NextAction::Retry,
            Verdict::NoServices | Verdict::NoDelayData => NextAction::ManualCheck,
            Verdict::TooOld { .. }
            | Verdict::NoCompensation { .. }
            | Verdict::BelowMinimum { .. }
            | Verdict::ZeroBracket { .. } => NextAction::LearnMore,
            Verdict::Eligible { .. } => NextAction::ProceedClaim,
        }
    }

    pub const fn learn_more_topic(&self) -> Option<LearnMoreTopic> {
        match self {
            Verdict::TooOld { .. } => Some(LearnMoreTopic::ClaimDeadlines),
            Verdict::NoCompensation { .. } | Verdict::BelowMinimum { .. } => {
                Some(LearnMoreTopic::TocPolicies)
            }
            Verdict::ZeroBracket { .. } => Some(LearnMoreTopic::CompensationBrackets),
            _ => None,
        }
    }

    pub fn compensation_percentage(&self) -> Option<&str> {
        match self {
            Verdict::Eligible { compensation, .. } => Some(compensation),
            Verdict::NoCompensation { .. }
            | Verdict::BelowMinimum { .. }
            | Verdict::ZeroBracket { .. } => Some(ZERO_PERCENT),
            Verdict::BlockedPaper => Some(NOT_APPLICABLE),
            _ => None,
        }
    }

    /// Short human summary of the delay lookup itself.
    pub fn delay_status(&self) -> String {
        match self {
            Verdict::BlockedPaper => "Paper tickets are not supported".to_string(),
            Verdict::InvalidTicket { .. } => "Ticket details invalid".to_string(),
            Verdict::TooOld { .. } => {
                format!("Ticket is older than {CLAIM_WINDOW_DAYS} days")
            }
            Verdict::UpstreamUnavailable { reason } => format!("Performance API error: {reason}"),
            Verdict::NoServices => "No matching services".to_string(),
            Verdict::NoMatchingService { .. } => "No matching service found".to_string(),
            Verdict::NoDelayData => "Delay data unavailable".to_string(),
            Verdict::NoCompensation { .. }
            | Verdict::BelowMinimum { .. }
            | Verdict::ZeroBracket { .. } => "Delay does not qualify".to_string(),
            Verdict::Eligible { .. } => "Delayed".to_string(),
        }
    }
}

/// Apply the operator's bracket table to a resolved delay.
pub(crate) fn decide_compensation(
    delay_minutes: f64,
    operator: &str,
    table: &CompensationTable,
) -> Verdict {
    let minimum = table.minimum_delay(operator);
    if !minimum.admits(delay_minutes) {
        return match minimum {
            MinimumDelay::NoCompensation => Verdict::NoCompensation {
                operator: operator.to_string(),
            },
            MinimumDelay::Minutes(minimum_delay) => Verdict::BelowMinimum {
                delay_minutes,
                operator: operator.to_string(),
                minimum_delay,
            },
        };
    }

    let Some(bracket) = DelayBracket::for_delay(delay_minutes) else {
        return Verdict::BelowMinimum {
            delay_minutes,
            operator: operator.to_string(),
            minimum_delay: minimum.as_minutes(),
        };
    };

    let compensation = table.percentage_for(operator, delay_minutes);
    if compensation == ZERO_PERCENT {
        return Verdict::ZeroBracket {
            delay_minutes,
            operator: operator.to_string(),
            bracket,
        };
    }

    Verdict::Eligible {
        delay_minutes,
        operator: operator.to_string(),
        compensation,
    }
}
