use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response wrapper returned by every gateway call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RecordResult>>,
}

/// Outcome of one record inside a batch write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Envelope-level failure, carrying the gateway's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeFailure(pub String);

/// A write envelope split into per-record outcomes
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<Value>,
    pub failed: Vec<RecordResult>,
}

impl BatchOutcome {
    /// Messages of the failed records that carried one
    pub fn failure_messages(&self) -> Vec<String> {
        self.failed.iter().filter_map(|r| r.message.clone()).collect()
    }

    pub fn first_success(self) -> Option<Value> {
        self.succeeded.into_iter().next()
    }
}

impl Envelope {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_results(results: Vec<RecordResult>) -> Self {
        Self {
            success: true,
            results: Some(results),
            ..Self::default()
        }
    }

    pub fn failure_message(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "Record gateway request failed".to_string())
    }

    /// Records of a fetch response; anything other than an array is empty
    pub fn records(self) -> Vec<Value> {
        match self.data {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        }
    }

    /// Check both failure levels of a write response
    pub fn settle(self) -> Result<BatchOutcome, EnvelopeFailure> {
        if !self.success {
            return Err(EnvelopeFailure(self.failure_message()));
        }
        let mut outcome = BatchOutcome::default();
        for result in self.results.unwrap_or_default() {
            if result.success {
                outcome.succeeded.push(result.data.unwrap_or(Value::Null));
            } else {
                outcome.failed.push(result);
            }
        }
        Ok(outcome)
    }
}

impl RecordResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settle_envelope_failure() {
        let envelope: Envelope =
            serde_json::from_value(json!({"success": false, "message": "quota exceeded"})).unwrap();
        assert_eq!(
            envelope.settle().unwrap_err(),
            EnvelopeFailure("quota exceeded".to_string())
        );
    }

    #[test]
    fn test_settle_splits_record_results() {
        let envelope: Envelope = serde_json::from_value(json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 7}},
                {"success": false, "message": "rating_c is required"},
                {"success": false}
            ]
        }))
        .unwrap();

        let outcome = envelope.settle().unwrap();
        assert_eq!(outcome.succeeded, vec![json!({"Id": 7})]);
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failure_messages(), vec!["rating_c is required".to_string()]);
    }

    #[test]
    fn test_records_tolerates_missing_data() {
        assert!(Envelope::default().records().is_empty());
        assert!(Envelope::ok(json!({"Id": 1})).records().is_empty());
        assert_eq!(Envelope::ok(json!([{"Id": 1}])).records().len(), 1);
    }
}
