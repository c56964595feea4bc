//! Reconciliation driver.
//!
//! One run lists the flagged deals and processes each independently: a
//! failing deal is logged and skipped, never allowed to poison the rest
//! of the batch. Deletion takes precedence over billing when a deal
//! carries both triggers; the billing trigger survives the run and is
//! picked up next time, against a ledger that already reflects the
//! deletion.

use std::time::Duration;

use billflow_shared::config::{AppConfig, ScheduleConfig};
use billflow_shared::types::{Currency, DocumentId, DocumentNumber, Money};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::deal::{BillingTrigger, Deal};
use crate::deletion::DeletionResolver;
use crate::document::{Buyer, Document, DocumentStatus, LineItem, merge_buyer};
use crate::gateway::{
    AccountingBackend, CreateDocumentRequest, DealPatch, GatewayError, LedgerStore, TriggerSource,
    with_timeout,
};
use crate::resolver::{DocumentNumberCache, ExistingDocumentResolver};
use crate::schedule;
use crate::sync::{RetryPolicy, Sleeper, WriteBackService};

use super::cache::BankAccountCache;
use super::error::{ProcessError, ValidationError};

/// Tunables the driver reads from configuration.
#[derive(Debug, Clone, Copy)]
pub struct DriverSettings {
    /// Payment schedule constants.
    pub schedule: ScheduleConfig,
    /// Retry policy for trigger-source write-backs.
    pub retry: RetryPolicy,
    /// Per-request timeout for collaborator calls.
    pub timeout: Duration,
}

impl DriverSettings {
    /// Builds driver settings from the application configuration.
    #[must_use]
    pub const fn from_config(config: &AppConfig) -> Self {
        Self {
            schedule: config.schedule,
            retry: RetryPolicy::from_config(&config.retry),
            timeout: Duration::from_secs(config.timeouts.request_timeout_secs),
        }
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// What happened to one deal during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DealOutcome {
    /// A new document was created and mirrored.
    Created(DocumentId),
    /// An existing document was confirmed; no new one was created.
    AlreadyBilled(DocumentId),
    /// Every requested document was deleted and the trigger cleared.
    DeletionCompleted,
    /// Deletion did not fully succeed; the trigger stays set for retry.
    DeletionIncomplete,
    /// The deal carried no actionable trigger.
    Skipped,
}

/// Aggregate counts of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Deals examined.
    pub processed: usize,
    /// Documents created.
    pub documents_created: usize,
    /// Deals confirmed as already billed.
    pub already_billed: usize,
    /// Deletion requests fully completed.
    pub deletions_completed: usize,
    /// Deals with no actionable trigger.
    pub skipped: usize,
    /// Deals that failed or whose deletion stayed incomplete.
    pub failures: usize,
}

/// Orchestrates one reconciliation run across all flagged deals.
pub struct ReconciliationDriver<'a, T, A, L, S> {
    trigger: &'a T,
    backend: &'a A,
    ledger: &'a L,
    sleeper: &'a S,
    settings: DriverSettings,
}

impl<'a, T, A, L, S> ReconciliationDriver<'a, T, A, L, S>
where
    T: TriggerSource,
    A: AccountingBackend,
    L: LedgerStore,
    S: Sleeper,
{
    /// Creates a driver over the given collaborators.
    pub const fn new(
        trigger: &'a T,
        backend: &'a A,
        ledger: &'a L,
        sleeper: &'a S,
        settings: DriverSettings,
    ) -> Self {
        Self {
            trigger,
            backend,
            ledger,
            sleeper,
            settings,
        }
    }

    /// Runs one reconciliation pass.
    ///
    /// `today` becomes the issue date of any documents created in this
    /// run. Per-deal failures are counted, logged, and do not stop the
    /// run; only a failure to list the deals at all surfaces as an error.
    pub async fn run(&self, today: NaiveDate) -> Result<RunSummary, GatewayError> {
        let deals = with_timeout(
            self.settings.timeout,
            "trigger list_billable_deals",
            self.trigger.list_billable_deals(),
        )
        .await?;
        info!(deals = deals.len(), "reconciliation run started");

        let write_back = WriteBackService::new(
            self.trigger,
            self.sleeper,
            self.settings.retry,
            self.settings.timeout,
        );
        let number_cache = DocumentNumberCache::new();
        let bank_accounts = BankAccountCache::new();

        let mut summary = RunSummary::default();
        for deal in &deals {
            write_back.seed_from_deal(deal);
            summary.processed += 1;
            match self
                .process_deal(deal, today, &write_back, &number_cache, &bank_accounts)
                .await
            {
                Ok(DealOutcome::Created(document_id)) => {
                    info!(deal_id = %deal.id, %document_id, "document created");
                    summary.documents_created += 1;
                }
                Ok(DealOutcome::AlreadyBilled(document_id)) => {
                    info!(deal_id = %deal.id, %document_id, "deal already billed");
                    summary.already_billed += 1;
                }
                Ok(DealOutcome::DeletionCompleted) => summary.deletions_completed += 1,
                Ok(DealOutcome::DeletionIncomplete) => summary.failures += 1,
                Ok(DealOutcome::Skipped) => summary.skipped += 1,
                Err(error) => {
                    warn!(deal_id = %deal.id, %error, "deal processing failed");
                    summary.failures += 1;
                }
            }
        }

        info!(
            processed = summary.processed,
            created = summary.documents_created,
            already_billed = summary.already_billed,
            deletions = summary.deletions_completed,
            failures = summary.failures,
            "reconciliation run finished"
        );
        Ok(summary)
    }

    /// Processes one deal. Deletion wins when both triggers are set.
    async fn process_deal(
        &self,
        deal: &Deal,
        today: NaiveDate,
        write_back: &WriteBackService<'a, T, S>,
        number_cache: &DocumentNumberCache,
        bank_accounts: &BankAccountCache,
    ) -> Result<DealOutcome, ProcessError> {
        if deal.needs_deletion() {
            return self.process_deletion(deal, write_back).await;
        }

        let BillingTrigger::Requested(kind) = deal.billing_trigger else {
            return Ok(DealOutcome::Skipped);
        };
        let (currency, buyer) = Self::validate(deal)?;

        let resolver = ExistingDocumentResolver::new(
            self.ledger,
            self.backend,
            number_cache,
            self.settings.timeout,
        );
        let resolution = resolver.resolve(deal).await;
        if let Some(existing) = resolution.existing {
            // The backend confirmed a document the ledger does not hold.
            // Restore the mirror first; the trigger stays set until every
            // side effect for the deal is in place.
            if let Some(copy) = &existing.backend_copy {
                with_timeout(
                    self.settings.timeout,
                    "ledger upsert",
                    self.ledger.upsert(copy),
                )
                .await?;
                info!(deal_id = %deal.id, document_id = %copy.id, "ledger mirror restored");
            }
            let patch = DealPatch {
                billing_trigger: Some(BillingTrigger::Done),
                document_id: Some(existing.document_id.clone()),
                document_numbers: existing
                    .number
                    .as_ref()
                    .and_then(|n| Self::appended_numbers(deal, n)),
                ..DealPatch::default()
            };
            write_back.apply(&deal.id, patch).await?;
            info!(
                deal_id = %deal.id,
                document_id = %existing.document_id,
                source = existing.source.as_str(),
                "existing document confirmed"
            );
            return Ok(DealOutcome::AlreadyBilled(existing.document_id));
        }
        if let Some(stale) = &resolution.stale_document_id {
            info!(deal_id = %deal.id, document_id = %stale, "stale document id will be replaced");
        }

        let total = Money::new(deal.amount, currency).rounded();
        let payment = schedule::compute(today, total, deal.close_date, &self.settings.schedule);
        let bank_account = bank_accounts
            .get_or_fetch(self.backend, currency, self.settings.timeout)
            .await?;

        let line_items = vec![LineItem {
            name: deal.title.clone(),
            quantity: Decimal::ONE,
            unit_price: total.amount,
        }];
        let request = CreateDocumentRequest {
            deal_id: deal.id.clone(),
            kind,
            buyer: buyer.clone(),
            line_items: line_items.clone(),
            currency,
            issue_date: today,
            due_date: payment.first_due_date().unwrap_or(today),
            bank_account,
            description: payment.summary(),
        };
        let created = with_timeout(
            self.settings.timeout,
            "backend create_document",
            self.backend.create_document(&request),
        )
        .await?;

        let mirror = Document {
            id: created.id.clone(),
            number: created.number.clone(),
            deal_id: deal.id.clone(),
            total,
            issue_date: today,
            buyer,
            line_items,
            status: DocumentStatus::Active,
        };
        if let Err(error) = with_timeout(
            self.settings.timeout,
            "ledger upsert",
            self.ledger.upsert(&mirror),
        )
        .await
        {
            // Record the identifiers so the next run resolves instead of
            // issuing a duplicate, but leave the trigger requested.
            let patch = DealPatch {
                document_id: Some(created.id.clone()),
                document_numbers: created
                    .number
                    .as_ref()
                    .and_then(|n| Self::appended_numbers(deal, n)),
                ..DealPatch::default()
            };
            if let Err(write_error) = write_back.apply(&deal.id, patch).await {
                warn!(
                    deal_id = %deal.id,
                    document_id = %created.id,
                    %write_error,
                    "could not record identifiers after ledger failure"
                );
            }
            return Err(error.into());
        }

        let patch = DealPatch {
            billing_trigger: Some(BillingTrigger::Done),
            document_id: Some(created.id.clone()),
            document_numbers: created
                .number
                .as_ref()
                .and_then(|n| Self::appended_numbers(deal, n)),
            ..DealPatch::default()
        };
        write_back.apply(&deal.id, patch).await?;
        Ok(DealOutcome::Created(created.id))
    }

    /// Runs the deletion flow and clears the trigger only on full success.
    async fn process_deletion(
        &self,
        deal: &Deal,
        write_back: &WriteBackService<'a, T, S>,
    ) -> Result<DealOutcome, ProcessError> {
        let resolver = DeletionResolver::new(
            self.trigger,
            self.backend,
            self.ledger,
            self.settings.timeout,
        );
        let report = resolver.process(deal).await;
        if !report.all_deleted() {
            warn!(deal_id = %deal.id, "deletion incomplete, trigger stays set for retry");
            return Ok(DealOutcome::DeletionIncomplete);
        }

        let remaining: Vec<DocumentNumber> = deal
            .document_numbers
            .iter()
            .filter(|n| !report.removed_numbers.contains(n))
            .cloned()
            .collect();
        let linked_id_deleted = deal.document_id.as_ref().is_some_and(|id| {
            report
                .results
                .iter()
                .any(|r| r.document_id.as_ref() == Some(id))
        });
        let patch = DealPatch {
            clear_deletion_trigger: true,
            clear_document_id: linked_id_deleted,
            document_numbers: (remaining != deal.document_numbers).then_some(remaining),
            ..DealPatch::default()
        };
        write_back.apply(&deal.id, patch).await?;
        Ok(DealOutcome::DeletionCompleted)
    }

    /// Checks the deal data needed to issue a document.
    fn validate(deal: &Deal) -> Result<(Currency, Buyer), ValidationError> {
        let currency = deal
            .currency
            .parse::<Currency>()
            .map_err(|_| ValidationError::UnsupportedCurrency(deal.currency.clone()))?;
        if deal.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(deal.amount));
        }
        let buyer = merge_buyer(deal.contact.as_ref(), deal.organization.as_ref())
            .ok_or(ValidationError::MissingBuyer)?;
        if buyer.email.is_none() {
            return Err(ValidationError::MissingBuyerEmail);
        }
        Ok((currency, buyer))
    }

    /// Returns the deal's number list with `number` appended, or `None`
    /// when the list already carries it and needs no write.
    fn appended_numbers(deal: &Deal, number: &DocumentNumber) -> Option<Vec<DocumentNumber>> {
        if deal.document_numbers.contains(number) {
            return None;
        }
        let mut numbers = deal.document_numbers.clone();
        numbers.push(number.clone());
        Some(numbers)
    }
}
