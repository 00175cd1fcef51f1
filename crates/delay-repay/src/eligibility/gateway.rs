use std::future::Future;

use serde_json::Value;
use tracing::debug;

use super::domain::TicketDocument;

/// Source of structured ticket fields for an uploaded ticket.
pub trait TicketGateway: Send + Sync {
    fn extract(
        &self,
        payload: &[u8],
    ) -> impl Future<Output = Result<TicketDocument, ExtractionError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    /// The extractor looked at the ticket and reported it could not read it.
    #[error("ticket could not be read: {0}")]
    Rejected(String),
    #[error("extraction output is not a ticket document: {0}")]
    Malformed(String),
}

impl ExtractionError {
    pub fn reason(&self) -> &str {
        match self {
            ExtractionError::Rejected(reason) | ExtractionError::Malformed(reason) => reason,
        }
    }
}

/// Accepts the vision model's JSON reply verbatim.
///
/// Replies may be wrapped in a Markdown code fence, and an unreadable ticket
/// comes back as `{"error": "..."}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTicketGateway;

impl JsonTicketGateway {
    pub fn parse(payload: &[u8]) -> Result<TicketDocument, ExtractionError> {
        let text = std::str::from_utf8(payload)
            .map_err(|err| ExtractionError::Malformed(err.to_string()))?;
        let body = strip_code_fence(text);
        if body.is_empty() {
            return Err(ExtractionError::Malformed("empty extraction output".to_string()));
        }

        let value: Value =
            serde_json::from_str(body).map_err(|err| ExtractionError::Malformed(err.to_string()))?;
        if !value.is_object() {
            return Err(ExtractionError::Malformed(
                "expected a JSON object".to_string(),
            ));
        }
        if let Some(error) = value.get("error") {
            let reason = match error {
                Value::String(reason) => reason.clone(),
                other => other.to_string(),
            };
            return Err(ExtractionError::Rejected(reason));
        }

        let document: TicketDocument = serde_json::from_value(value)
            .map_err(|err| ExtractionError::Malformed(err.to_string()))?;
        debug!(segments = document.segments().len(), "ticket extraction decoded");
        Ok(document)
    }
}

impl TicketGateway for JsonTicketGateway {
    async fn extract(&self, payload: &[u8]) -> Result<TicketDocument, ExtractionError> {
        Self::parse(payload)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
