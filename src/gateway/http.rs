use crate::config::GatewayConfig;
use crate::gateway::query::{field_specs, Query};
use crate::gateway::traits::RecordGateway;
use crate::gateway::types::Envelope;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

const PROJECT_HEADER: &str = "X-Project-Id";
const KEY_HEADER: &str = "X-Public-Key";

/// Record gateway reached over HTTPS with JSON bodies
pub struct HttpRecordGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpRecordGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("housing-rentals/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, table: &str, action: &str) -> String {
        format!("{}/tables/{}/{}", self.config.base_url, table, action)
    }

    async fn call<B: Serialize + ?Sized>(&self, url: String, body: &B) -> Result<Envelope> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(PROJECT_HEADER, &self.config.project_id)
            .header(KEY_HEADER, &self.config.public_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach record gateway at {}", url))?;

        if !response.status().is_success() {
            warn!("Record gateway returned status: {}", response.status());
            anyhow::bail!("Record gateway request failed: {}", response.status());
        }

        response
            .json::<Envelope>()
            .await
            .context("Failed to decode record gateway envelope")
    }
}

#[async_trait]
impl RecordGateway for HttpRecordGateway {
    async fn fetch_records(&self, table: &str, query: &Query) -> Result<Envelope> {
        self.call(self.endpoint(table, "fetch"), &query.to_params())
            .await
    }

    async fn get_record_by_id(&self, table: &str, id: i64, fields: &[&str]) -> Result<Envelope> {
        let body = json!({ "fields": field_specs(fields) });
        self.call(self.endpoint(table, &format!("records/{}", id)), &body)
            .await
    }

    async fn create_record(&self, table: &str, records: Vec<Value>) -> Result<Envelope> {
        self.call(self.endpoint(table, "create"), &json!({ "records": records }))
            .await
    }

    async fn update_record(&self, table: &str, records: Vec<Value>) -> Result<Envelope> {
        self.call(self.endpoint(table, "update"), &json!({ "records": records }))
            .await
    }

    async fn delete_record(&self, table: &str, ids: Vec<i64>) -> Result<Envelope> {
        self.call(self.endpoint(table, "delete"), &json!({ "RecordIds": ids }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> GatewayConfig {
        GatewayConfig {
            base_url: "https://records.example.com/v1".to_string(),
            project_id: "proj".to_string(),
            public_key: "key".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_endpoint_layout() {
        let gateway = HttpRecordGateway::new(config()).unwrap();
        assert_eq!(
            gateway.endpoint("review_c", "fetch"),
            "https://records.example.com/v1/tables/review_c/fetch"
        );
        assert_eq!(
            gateway.endpoint("property_c", "records/12"),
            "https://records.example.com/v1/tables/property_c/records/12"
        );
    }

    #[tokio::test]
    #[ignore = "opens a local TCP connection"]
    async fn test_unreachable_gateway_is_transport_error() {
        let gateway = HttpRecordGateway::new(GatewayConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..config()
        })
        .unwrap();

        let result = gateway.delete_record("review_c", vec![1]).await;
        assert!(result.is_err());
    }
}
