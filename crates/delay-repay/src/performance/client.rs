use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::wire::{DetailsRequest, DetailsResponse, MetricsRequest, MetricsResponse};
use super::{PerformanceLookup, ServiceDetail, ServiceQuery, ServiceSummary, UpstreamApiError};
use crate::config::{HspCredentials, PerformanceConfig};

const SERVICE_METRICS_PATH: &str = "/api/v1/serviceMetrics";
const SERVICE_DETAILS_PATH: &str = "/api/v1/serviceDetails";

/// HTTP client for the Rail Data Marketplace HSP API.
#[derive(Debug, Clone)]
pub struct HspClient {
    client: reqwest::Client,
    base_url: String,
    credentials: HspCredentials,
}

impl HspClient {
    /// Build a client with the configured base URL, credentials and request timeout.
    pub fn new(config: &PerformanceConfig) -> Result<Self, UpstreamApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "calling performance API");

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.credentials.email, Some(&self.credentials.password))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<T>().await?)
    }
}

impl PerformanceLookup for HspClient {
    async fn find_services(
        &self,
        query: &ServiceQuery,
    ) -> Result<Vec<ServiceSummary>, UpstreamApiError> {
        let date = query.date.format("%Y-%m-%d").to_string();
        let request = MetricsRequest {
            from_loc: query.from_crs.trim(),
            to_loc: query.to_crs.trim(),
            from_time: &query.window.from,
            to_time: &query.window.to,
            from_date: date.clone(),
            to_date: date,
            days: query.days.as_str(),
        };

        let response: MetricsResponse = self.post(SERVICE_METRICS_PATH, &request).await?;
        let services: Vec<ServiceSummary> = response
            .services
            .into_iter()
            .map(ServiceSummary::from)
            .collect();

        info!(
            from = %query.from_crs,
            to = %query.to_crs,
            date = %query.date,
            count = services.len(),
            "service metrics retrieved"
        );
        Ok(services)
    }

    async fn service_detail(&self, rid: &str) -> Result<ServiceDetail, UpstreamApiError> {
        let request = DetailsRequest { rid: rid.trim() };
        let response: DetailsResponse = self.post(SERVICE_DETAILS_PATH, &request).await?;
        let detail = ServiceDetail::from(response);
        debug!(rid = %detail.rid, locations = detail.locations.len(), "service detail retrieved");
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(base_url: &str) -> PerformanceConfig {
        PerformanceConfig {
            base_url: base_url.to_string(),
            credentials: HspCredentials {
                email: "ops@example.com".to_string(),
                password: "secret".to_string(),
            },
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoints_join_without_double_slash() {
        let client = HspClient::new(&config("https://hsp.example.com/")).expect("client builds");
        assert_eq!(
            client.endpoint(SERVICE_METRICS_PATH),
            "https://hsp.example.com/api/v1/serviceMetrics"
        );
        assert_eq!(
            client.endpoint(SERVICE_DETAILS_PATH),
            "https://hsp.example.com/api/v1/serviceDetails"
        );
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_upstream_error() {
        let client = HspClient::new(&config("http://127.0.0.1:9")).expect("client builds");
        let error = client
            .service_detail("201607013361753")
            .await
            .expect_err("connection refused");
        assert!(matches!(
            error,
            UpstreamApiError::Transport(_) | UpstreamApiError::Timeout
        ));
    }
}
