//! Deletion outcome and audit types.

use billflow_shared::types::{DealId, DocumentId, DocumentNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::Document;

/// Terminal state of one deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeletionOutcome {
    /// Document removed from the backend and marked deleted in the ledger.
    Deleted,
    /// The accounting backend refused or failed the deletion.
    BackendError,
    /// Backend deletion succeeded but the ledger update failed.
    LedgerError,
    /// No candidate document could be found for the deal.
    NotFound,
    /// Candidates exist but none matched the explicitly requested numbers.
    NumberMismatch,
    /// The attempt failed before any candidate could be examined.
    UnexpectedError,
}

impl DeletionOutcome {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::BackendError => "backend-error",
            Self::LedgerError => "ledger-error",
            Self::NotFound => "not-found",
            Self::NumberMismatch => "number-mismatch",
            Self::UnexpectedError => "unexpected-error",
        }
    }

    /// Parses an outcome from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "deleted" => Some(Self::Deleted),
            "backend-error" => Some(Self::BackendError),
            "ledger-error" => Some(Self::LedgerError),
            "not-found" => Some(Self::NotFound),
            "number-mismatch" => Some(Self::NumberMismatch),
            "unexpected-error" => Some(Self::UnexpectedError),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeletionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One append-only audit record of a deletion attempt.
///
/// Every attempt, success or failure, produces exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionLogEntry {
    /// Local identifier of this log entry.
    pub id: Uuid,
    /// Candidate document, if one was identified.
    pub document_id: Option<DocumentId>,
    /// Deal the deletion was requested for.
    pub deal_id: DealId,
    /// Terminal state of the attempt.
    pub outcome: DeletionOutcome,
    /// Error detail for failed attempts.
    pub error: Option<String>,
    /// Snapshot of the document at the time of the attempt, if known.
    pub document_snapshot: Option<Document>,
    /// Document numbers explicitly requested for deletion.
    pub expected_numbers: Vec<DocumentNumber>,
    /// Numbers actually removed from the deal so far in this run.
    pub removed_numbers: Vec<DocumentNumber>,
    /// When the attempt was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl DeletionLogEntry {
    /// Creates a new entry with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(deal_id: DealId, outcome: DeletionOutcome) -> Self {
        Self {
            id: Uuid::now_v7(),
            document_id: None,
            deal_id,
            outcome,
            error: None,
            document_snapshot: None,
            expected_numbers: Vec::new(),
            removed_numbers: Vec::new(),
            recorded_at: Utc::now(),
        }
    }
}

/// Per-candidate result within one deal's deletion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateResult {
    /// Candidate document, if one was identified.
    pub document_id: Option<DocumentId>,
    /// Terminal state the candidate reached.
    pub outcome: DeletionOutcome,
    /// Error detail for failed candidates.
    pub error: Option<String>,
}

/// Summary of one deal's deletion pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    /// Deal the pass ran for.
    pub deal_id: DealId,
    /// One result per candidate (or a single terminal result when the pass
    /// ended before per-candidate processing).
    pub results: Vec<CandidateResult>,
    /// Numbers of the documents deleted in this pass.
    pub removed_numbers: Vec<DocumentNumber>,
}

impl DeletionReport {
    /// Returns true if at least one candidate was processed and every
    /// candidate reached the deleted state. Only then may the deal's
    /// deletion trigger be cleared.
    #[must_use]
    pub fn all_deleted(&self) -> bool {
        !self.results.is_empty()
            && self
                .results
                .iter()
                .all(|r| r.outcome == DeletionOutcome::Deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_roundtrip() {
        for outcome in [
            DeletionOutcome::Deleted,
            DeletionOutcome::BackendError,
            DeletionOutcome::LedgerError,
            DeletionOutcome::NotFound,
            DeletionOutcome::NumberMismatch,
            DeletionOutcome::UnexpectedError,
        ] {
            assert_eq!(DeletionOutcome::parse(outcome.as_str()), Some(outcome));
        }
        assert_eq!(DeletionOutcome::parse("gone"), None);
    }

    #[test]
    fn test_all_deleted() {
        let deal_id = DealId::new("42");
        let deleted = CandidateResult {
            document_id: Some(DocumentId::new("D1")),
            outcome: DeletionOutcome::Deleted,
            error: None,
        };
        let failed = CandidateResult {
            document_id: Some(DocumentId::new("D2")),
            outcome: DeletionOutcome::BackendError,
            error: Some("boom".to_string()),
        };

        let report = DeletionReport {
            deal_id: deal_id.clone(),
            results: vec![deleted.clone()],
            removed_numbers: vec![],
        };
        assert!(report.all_deleted());

        let report = DeletionReport {
            deal_id: deal_id.clone(),
            results: vec![deleted, failed],
            removed_numbers: vec![],
        };
        assert!(!report.all_deleted());

        let report = DeletionReport {
            deal_id,
            results: vec![],
            removed_numbers: vec![],
        };
        assert!(!report.all_deleted());
    }
}
