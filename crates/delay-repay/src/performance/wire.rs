//! JSON bodies exchanged with the HSP `serviceMetrics` / `serviceDetails` endpoints.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct MetricsRequest<'a> {
    pub(crate) from_loc: &'a str,
    pub(crate) to_loc: &'a str,
    pub(crate) from_time: &'a str,
    pub(crate) to_time: &'a str,
    pub(crate) from_date: String,
    pub(crate) to_date: String,
    pub(crate) days: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DetailsRequest<'a> {
    pub(crate) rid: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricsResponse {
    #[serde(rename = "Services", default)]
    pub(crate) services: Vec<MetricsService>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MetricsService {
    #[serde(rename = "serviceAttributesMetrics")]
    pub(crate) attributes: ServiceAttributesMetrics,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceAttributesMetrics {
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) gbtt_ptd: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) gbtt_pta: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) toc_code: String,
    #[serde(default)]
    pub(crate) rids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    #[serde(rename = "serviceAttributesDetails")]
    pub(crate) attributes: ServiceAttributesDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceAttributesDetails {
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) rid: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) toc_code: String,
    #[serde(default)]
    pub(crate) locations: Vec<DetailsLocation>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsLocation {
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) location: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) gbtt_ptd: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) gbtt_pta: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) actual_td: String,
    #[serde(default, deserialize_with = "trimmed")]
    pub(crate) actual_ta: String,
}

/// HSP sends blank strings (and occasionally nulls) for absent times.
fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.map(|value| value.trim().to_string()).unwrap_or_default())
}
