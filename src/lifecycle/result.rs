use serde::Serialize;

use crate::error::{AppError, FailureKind};

/// Outcome of one contest's transition attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    pub contest_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl OperationResult {
    pub fn succeeded(contest_id: &str, transaction_hash: String) -> Self {
        Self {
            success: true,
            contest_id: contest_id.to_string(),
            transaction_hash: Some(transaction_hash),
            error: None,
            failure: None,
        }
    }

    pub fn failed(contest_id: &str, error: &AppError, transaction_hash: Option<String>) -> Self {
        Self {
            success: false,
            contest_id: contest_id.to_string(),
            transaction_hash,
            error: Some(error.to_string()),
            failure: Some(error.kind()),
        }
    }
}

/// Aggregate of one batch invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOperationResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<OperationResult>,
}

impl BatchOperationResult {
    pub fn empty() -> Self {
        Self::from_results(Vec::new())
    }

    pub fn from_results(results: Vec<OperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }
}
