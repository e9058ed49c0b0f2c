//! Scripted in-memory gateway for tests

use crate::gateway::query::Query;
use crate::gateway::traits::RecordGateway;
use crate::gateway::types::Envelope;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum Call {
    Fetch { table: String, query: Query },
    GetById { table: String, id: i64, fields: Vec<String> },
    Create { table: String, records: Vec<Value> },
    Update { table: String, records: Vec<Value> },
    Delete { table: String, ids: Vec<i64> },
}

/// Replies with queued responses in order; `Err(msg)` entries become
/// transport failures.
#[derive(Default)]
pub struct FakeGateway {
    replies: Mutex<VecDeque<Result<Envelope, String>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, envelope: Envelope) -> Self {
        self.replies.lock().unwrap().push_back(Ok(envelope));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, call: Call) -> Result<Envelope> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(envelope)) => Ok(envelope),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("no scripted reply left"),
        }
    }
}

#[async_trait]
impl RecordGateway for FakeGateway {
    async fn fetch_records(&self, table: &str, query: &Query) -> Result<Envelope> {
        self.respond(Call::Fetch {
            table: table.to_string(),
            query: query.clone(),
        })
    }

    async fn get_record_by_id(&self, table: &str, id: i64, fields: &[&str]) -> Result<Envelope> {
        self.respond(Call::GetById {
            table: table.to_string(),
            id,
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        })
    }

    async fn create_record(&self, table: &str, records: Vec<Value>) -> Result<Envelope> {
        self.respond(Call::Create {
            table: table.to_string(),
            records,
        })
    }

    async fn update_record(&self, table: &str, records: Vec<Value>) -> Result<Envelope> {
        self.respond(Call::Update {
            table: table.to_string(),
            records,
        })
    }

    async fn delete_record(&self, table: &str, ids: Vec<i64>) -> Result<Envelope> {
        self.respond(Call::Delete {
            table: table.to_string(),
            ids,
        })
    }
}
