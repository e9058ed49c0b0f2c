use crate::gateway::query::Query;
use crate::gateway::types::Envelope;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Hosted record store the access layers read from and write to.
///
/// `Err` means the call never produced an envelope (transport failure);
/// an envelope with `success: false` is a gateway-level rejection.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn fetch_records(&self, table: &str, query: &Query) -> Result<Envelope>;

    async fn get_record_by_id(&self, table: &str, id: i64, fields: &[&str]) -> Result<Envelope>;

    async fn create_record(&self, table: &str, records: Vec<Value>) -> Result<Envelope>;

    async fn update_record(&self, table: &str, records: Vec<Value>) -> Result<Envelope>;

    async fn delete_record(&self, table: &str, ids: Vec<i64>) -> Result<Envelope>;
}
