//! Public output types for torchdock command responses.
//!
//! These are serialized into the JSON response envelope by the CLI and are
//! also what library consumers get back from a matrix run.

use serde::Serialize;

/// Standardized bulk execution result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult<T: Serialize> {
    pub action: String,
    pub results: Vec<ItemOutcome<T>>,
    pub summary: BulkSummary,
}

/// Outcome for a single item in a bulk operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome<T: Serialize> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ItemOutcome<T> {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of bulk operation results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T: Serialize> BulkResult<T> {
    pub fn new(action: impl Into<String>, results: Vec<ItemOutcome<T>>) -> Self {
        let succeeded = results.iter().filter(|r| r.succeeded()).count();
        let summary = BulkSummary {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
        };

        Self {
            action: action.into(),
            results,
            summary,
        }
    }

    /// Ids of the items that failed, in result order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.succeeded())
            .map(|r| r.id.as_str())
            .collect()
    }
}
