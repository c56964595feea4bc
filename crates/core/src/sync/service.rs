//! Idempotent field write-back to the trigger source.
//!
//! The trigger source is external and rate-limited, so the engine avoids
//! writing values a deal record is already known to carry. Known values
//! are seeded from the deal as listed and refreshed after every
//! successful write, so a redelivered deal in the same run produces no
//! duplicate writes. Transient failures are retried with linear backoff.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use billflow_shared::types::{DealId, DocumentId, DocumentNumber};
use tracing::{debug, warn};

use crate::deal::{BillingTrigger, Deal};
use crate::gateway::{DealPatch, GatewayError, TriggerSource, with_timeout};

use super::retry::{RetryPolicy, Sleeper};

/// Last-known field values for one deal. An outer `None` means the
/// value has not been observed, not that the field is empty.
#[derive(Debug, Clone, Default)]
struct KnownFields {
    billing_trigger: Option<BillingTrigger>,
    document_id: Option<Option<DocumentId>>,
    document_numbers: Option<Vec<DocumentNumber>>,
    deletion_cleared: bool,
}

/// Writes field patches to the trigger source, skipping no-op writes and
/// retrying transient failures.
pub struct WriteBackService<'a, T, S> {
    trigger: &'a T,
    sleeper: &'a S,
    policy: RetryPolicy,
    timeout: Duration,
    known: Mutex<HashMap<DealId, KnownFields>>,
}

impl<'a, T, S> WriteBackService<'a, T, S>
where
    T: TriggerSource,
    S: Sleeper,
{
    /// Creates a write-back service for one run.
    pub fn new(trigger: &'a T, sleeper: &'a S, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            trigger,
            sleeper,
            policy,
            timeout,
            known: Mutex::new(HashMap::new()),
        }
    }

    /// Records the field values observed on a freshly listed deal.
    pub fn seed_from_deal(&self, deal: &Deal) {
        let fields = KnownFields {
            billing_trigger: Some(deal.billing_trigger),
            document_id: Some(deal.document_id.clone()),
            document_numbers: Some(deal.document_numbers.clone()),
            deletion_cleared: deal.deletion.is_none(),
        };
        if let Ok(mut known) = self.known.lock() {
            known.insert(deal.id.clone(), fields);
        }
    }

    /// Applies a patch to a deal record.
    ///
    /// Fields whose value is already known to be current are dropped
    /// first; if nothing remains, no call is made at all. Transient
    /// failures are retried up to the policy's attempt limit; permanent
    /// failures and exhaustion surface to the caller.
    pub async fn apply(&self, deal_id: &DealId, patch: DealPatch) -> Result<(), GatewayError> {
        let patch = self.prune(deal_id, patch);
        if patch.is_empty() {
            debug!(deal_id = %deal_id, "write-back skipped, all fields already current");
            return Ok(());
        }

        let mut attempt = 1;
        loop {
            match with_timeout(
                self.timeout,
                "trigger update_deal",
                self.trigger.update_deal(deal_id, &patch),
            )
            .await
            {
                Ok(()) => {
                    self.record(deal_id, &patch);
                    return Ok(());
                }
                Err(error) if error.is_transient() && attempt < self.policy.max_attempts => {
                    warn!(
                        deal_id = %deal_id,
                        attempt,
                        %error,
                        "write-back failed, retrying"
                    );
                    self.sleeper.sleep(self.policy.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(error) => {
                    warn!(deal_id = %deal_id, attempt, %error, "write-back failed permanently");
                    return Err(error);
                }
            }
        }
    }

    /// Drops patch fields whose target value is already on the record.
    fn prune(&self, deal_id: &DealId, mut patch: DealPatch) -> DealPatch {
        let Ok(known) = self.known.lock() else {
            return patch;
        };
        let Some(fields) = known.get(deal_id) else {
            return patch;
        };

        if let Some(trigger) = patch.billing_trigger
            && fields.billing_trigger == Some(trigger)
        {
            patch.billing_trigger = None;
        }
        if let Some(id) = &patch.document_id
            && fields.document_id.as_ref() == Some(&Some(id.clone()))
        {
            patch.document_id = None;
        }
        if patch.clear_document_id && fields.document_id == Some(None) {
            patch.clear_document_id = false;
        }
        if let Some(numbers) = &patch.document_numbers
            && fields.document_numbers.as_ref() == Some(numbers)
        {
            patch.document_numbers = None;
        }
        if patch.clear_deletion_trigger && fields.deletion_cleared {
            patch.clear_deletion_trigger = false;
        }

        patch
    }

    /// Updates the known values after a successful write.
    fn record(&self, deal_id: &DealId, patch: &DealPatch) {
        let Ok(mut known) = self.known.lock() else {
            return;
        };
        let fields = known.entry(deal_id.clone()).or_default();

        if let Some(trigger) = patch.billing_trigger {
            fields.billing_trigger = Some(trigger);
        }
        if let Some(id) = &patch.document_id {
            fields.document_id = Some(Some(id.clone()));
        } else if patch.clear_document_id {
            fields.document_id = Some(None);
        }
        if let Some(numbers) = &patch.document_numbers {
            fields.document_numbers = Some(numbers.clone());
        }
        if patch.clear_deletion_trigger {
            fields.deletion_cleared = true;
        }
    }
}
