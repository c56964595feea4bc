//! Deletion resolver: multi-system document removal for a single deal.
//!
//! A deletion touches up to three systems (accounting backend, local
//! ledger, trigger source) and none of them share a transaction. The
//! resolver therefore processes candidates one at a time, records every
//! attempt in the append-only audit log, and reports a per-candidate
//! outcome so the caller can decide whether the deal's trigger may be
//! cleared. A partial failure never blocks the remaining candidates.

use std::time::Duration;

use billflow_shared::types::{DocumentId, DocumentNumber};
use tracing::{debug, error, info, warn};

use crate::deal::Deal;
use crate::document::Document;
use crate::gateway::{AccountingBackend, GatewayError, LedgerStore, TriggerSource, with_timeout};

use super::tasks::note_references_number;
use super::types::{CandidateResult, DeletionLogEntry, DeletionOutcome, DeletionReport};

/// A document considered for deletion. The ledger snapshot is carried
/// when the ledger knows the document; explicit-id candidates may lack it.
struct Candidate {
    id: DocumentId,
    document: Option<Document>,
}

/// Drives the deletion of all documents a deal's deletion request covers.
pub struct DeletionResolver<'a, T, A, L> {
    trigger: &'a T,
    backend: &'a A,
    ledger: &'a L,
    timeout: Duration,
}

impl<'a, T, A, L> DeletionResolver<'a, T, A, L>
where
    T: TriggerSource,
    A: AccountingBackend,
    L: LedgerStore,
{
    /// Creates a resolver borrowing the run's collaborators.
    pub const fn new(trigger: &'a T, backend: &'a A, ledger: &'a L, timeout: Duration) -> Self {
        Self {
            trigger,
            backend,
            ledger,
            timeout,
        }
    }

    /// Processes the deal's deletion request.
    ///
    /// Candidates are gathered from the ledger (by deal link), from the
    /// deal's explicit document-id field, and, as a last resort, from the
    /// document numbers recorded on the deal. When the request names
    /// specific numbers, only matching candidates are touched.
    ///
    /// Every attempt appends exactly one audit-log entry; a log write
    /// failure is reported but never aborts the deletion itself.
    pub async fn process(&self, deal: &Deal) -> DeletionReport {
        let expected: Vec<DocumentNumber> = deal
            .deletion
            .as_ref()
            .map(|req| req.requested_numbers.clone())
            .unwrap_or_default();

        let candidates = match self.gather_candidates(deal).await {
            Ok(candidates) => candidates,
            Err(error) => {
                let result = CandidateResult {
                    document_id: None,
                    outcome: DeletionOutcome::UnexpectedError,
                    error: Some(error.to_string()),
                };
                self.append_log(deal, &result, None, &expected, &[]).await;
                return DeletionReport {
                    deal_id: deal.id.clone(),
                    results: vec![result],
                    removed_numbers: vec![],
                };
            }
        };

        if candidates.is_empty() {
            info!(deal_id = %deal.id, "deletion requested but no candidate documents found");
            let result = CandidateResult {
                document_id: None,
                outcome: DeletionOutcome::NotFound,
                error: None,
            };
            self.append_log(deal, &result, None, &expected, &[]).await;
            return DeletionReport {
                deal_id: deal.id.clone(),
                results: vec![result],
                removed_numbers: vec![],
            };
        }

        let selected: Vec<Candidate> = if expected.is_empty() {
            candidates
        } else {
            let matching: Vec<Candidate> = candidates
                .into_iter()
                .filter(|c| Self::matches_expected(c, &expected))
                .collect();
            if matching.is_empty() {
                warn!(
                    deal_id = %deal.id,
                    expected = ?expected,
                    "no candidate matches the requested document numbers"
                );
                let result = CandidateResult {
                    document_id: None,
                    outcome: DeletionOutcome::NumberMismatch,
                    error: None,
                };
                self.append_log(deal, &result, None, &expected, &[]).await;
                return DeletionReport {
                    deal_id: deal.id.clone(),
                    results: vec![result],
                    removed_numbers: vec![],
                };
            }
            matching
        };

        let mut results = Vec::with_capacity(selected.len());
        let mut removed_numbers = Vec::new();

        for candidate in &selected {
            let result = self.delete_candidate(candidate).await;
            if result.outcome == DeletionOutcome::Deleted {
                if let Some(number) = candidate.document.as_ref().and_then(|d| d.number.clone()) {
                    removed_numbers.push(number);
                }
            }
            self.append_log(
                deal,
                &result,
                candidate.document.clone(),
                &expected,
                &removed_numbers,
            )
            .await;
            results.push(result);
        }

        self.complete_follow_up_tasks(deal, &selected).await;

        DeletionReport {
            deal_id: deal.id.clone(),
            results,
            removed_numbers,
        }
    }

    /// Gathers deletion candidates for the deal, deduplicated by id.
    async fn gather_candidates(&self, deal: &Deal) -> Result<Vec<Candidate>, GatewayError> {
        let linked = with_timeout(
            self.timeout,
            "ledger find_by_deal_id",
            self.ledger.find_by_deal_id(&deal.id),
        )
        .await?;

        let mut candidates: Vec<Candidate> = linked
            .into_iter()
            .filter(Document::is_active)
            .map(|doc| Candidate {
                id: doc.id.clone(),
                document: Some(doc),
            })
            .collect();

        let extra_ids: Vec<_> = deal
            .deletion_document_ids
            .iter()
            .filter(|id| candidates.iter().all(|c| c.id != **id))
            .cloned()
            .collect();
        if !extra_ids.is_empty() {
            let known = match with_timeout(
                self.timeout,
                "ledger find_by_ids",
                self.ledger.find_by_ids(&extra_ids),
            )
            .await
            {
                Ok(docs) => docs,
                Err(error) => {
                    // Explicit ids are still deletable without a snapshot.
                    warn!(deal_id = %deal.id, %error, "ledger lookup of explicit ids failed");
                    Vec::new()
                }
            };
            for id in extra_ids {
                let document = known.iter().find(|d| d.id == id).cloned();
                // Already deleted in a previous pass; not retried.
                if document.as_ref().is_some_and(|d| !d.is_active()) {
                    continue;
                }
                candidates.push(Candidate { id, document });
            }
        }

        if candidates.is_empty() && !deal.document_numbers.is_empty() {
            let by_number = with_timeout(
                self.timeout,
                "ledger find_by_numbers",
                self.ledger.find_by_numbers(&deal.document_numbers),
            )
            .await?;
            candidates.extend(by_number.into_iter().filter(Document::is_active).map(|doc| {
                Candidate {
                    id: doc.id.clone(),
                    document: Some(doc),
                }
            }));
        }

        Ok(candidates)
    }

    /// Returns true if the candidate is covered by the requested numbers.
    ///
    /// Raw values in the deletion field sometimes carry document ids
    /// instead of numbers, so both are accepted.
    fn matches_expected(candidate: &Candidate, expected: &[DocumentNumber]) -> bool {
        expected.iter().any(|wanted| {
            candidate.id.as_str() == wanted.as_str()
                || candidate
                    .document
                    .as_ref()
                    .and_then(|d| d.number.as_ref())
                    .is_some_and(|n| n == wanted)
        })
    }

    /// Deletes one candidate from the backend, then the ledger.
    ///
    /// A document already gone from the backend counts as deleted, so a
    /// rerun after a partial failure converges instead of erroring.
    async fn delete_candidate(&self, candidate: &Candidate) -> CandidateResult {
        match with_timeout(
            self.timeout,
            "backend delete_document",
            self.backend.delete_document(&candidate.id),
        )
        .await
        {
            Ok(()) => {}
            Err(GatewayError::NotFound(_)) => {
                debug!(document_id = %candidate.id, "document already absent from backend");
            }
            Err(error) => {
                warn!(document_id = %candidate.id, %error, "backend deletion failed");
                return CandidateResult {
                    document_id: Some(candidate.id.clone()),
                    outcome: DeletionOutcome::BackendError,
                    error: Some(error.to_string()),
                };
            }
        }

        if candidate.document.is_some() {
            if let Err(error) = with_timeout(
                self.timeout,
                "ledger mark_deleted",
                self.ledger.mark_deleted(&candidate.id),
            )
            .await
            {
                warn!(document_id = %candidate.id, %error, "ledger update after deletion failed");
                return CandidateResult {
                    document_id: Some(candidate.id.clone()),
                    outcome: DeletionOutcome::LedgerError,
                    error: Some(error.to_string()),
                };
            }
        }

        info!(document_id = %candidate.id, "document deleted");
        CandidateResult {
            document_id: Some(candidate.id.clone()),
            outcome: DeletionOutcome::Deleted,
            error: None,
        }
    }

    /// Appends one audit-log entry for an attempt. Best effort: a failed
    /// append is logged and swallowed so deletion progress is never lost.
    async fn append_log(
        &self,
        deal: &Deal,
        result: &CandidateResult,
        snapshot: Option<Document>,
        expected: &[DocumentNumber],
        removed: &[DocumentNumber],
    ) {
        let mut entry = DeletionLogEntry::new(deal.id.clone(), result.outcome);
        entry.document_id = result.document_id.clone();
        entry.error = result.error.clone();
        entry.document_snapshot = snapshot;
        entry.expected_numbers = expected.to_vec();
        entry.removed_numbers = removed.to_vec();

        if let Err(log_error) = with_timeout(
            self.timeout,
            "ledger append_deletion_log",
            self.ledger.append_deletion_log(&entry),
        )
        .await
        {
            error!(
                deal_id = %deal.id,
                outcome = %result.outcome,
                %log_error,
                "failed to append deletion-log entry"
            );
        }
    }

    /// Completes open follow-up tasks that reference any candidate's
    /// document number. Runs regardless of deletion outcome: a reminder
    /// for a document in teardown is stale either way. Failures are
    /// logged and never surfaced.
    async fn complete_follow_up_tasks(&self, deal: &Deal, candidates: &[Candidate]) {
        let numbers: Vec<DocumentNumber> = candidates
            .iter()
            .filter_map(|c| c.document.as_ref().and_then(|d| d.number.clone()))
            .collect();
        if numbers.is_empty() {
            return;
        }

        let tasks = match with_timeout(
            self.timeout,
            "trigger list_open_tasks",
            self.trigger.list_open_tasks(&deal.id),
        )
        .await
        {
            Ok(tasks) => tasks,
            Err(error) => {
                warn!(deal_id = %deal.id, %error, "could not list follow-up tasks");
                return;
            }
        };

        for task in tasks {
            if !numbers.iter().any(|n| note_references_number(&task.note, n)) {
                continue;
            }
            match with_timeout(
                self.timeout,
                "trigger complete_task",
                self.trigger.complete_task(&task.id),
            )
            .await
            {
                Ok(()) => info!(deal_id = %deal.id, task_id = %task.id, "follow-up task completed"),
                Err(error) => {
                    warn!(deal_id = %deal.id, task_id = %task.id, %error, "could not complete follow-up task");
                }
            }
        }
    }
}
