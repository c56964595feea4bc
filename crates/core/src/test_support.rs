//! In-memory collaborator fakes and builders shared across engine tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use billflow_shared::types::{Currency, DealId, DocumentId, DocumentNumber, Money};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::deal::{BillingTrigger, Deal};
use crate::deletion::DeletionLogEntry;
use crate::document::{Buyer, Document, DocumentStatus};
use crate::gateway::{
    AccountingBackend, BankAccountRef, CreateDocumentRequest, CreatedDocument, DealPatch,
    FollowUpTask, GatewayError, LedgerStore, TriggerSource,
};

/// Builds a minimal open deal with no triggers set.
pub fn deal(id: &str) -> Deal {
    Deal {
        id: DealId::new(id),
        title: "Spring campaign".to_string(),
        amount: dec!(1000),
        currency: "EUR".to_string(),
        close_date: None,
        billing_trigger: BillingTrigger::Unset,
        document_id: None,
        document_numbers: vec![],
        deletion: None,
        deletion_document_ids: vec![],
        contact: None,
        organization: None,
    }
}

/// Builds an active ledger document for the given deal.
pub fn document(id: &str, deal_id: &str, number: Option<&str>) -> Document {
    Document {
        id: DocumentId::new(id),
        number: number.map(DocumentNumber::new),
        deal_id: DealId::new(deal_id),
        total: Money::new(dec!(1000), Currency::Eur),
        issue_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        buyer: Buyer {
            name: "Acme s.r.o.".to_string(),
            email: Some("billing@acme.test".to_string()),
            ..Buyer::default()
        },
        line_items: vec![],
        status: DocumentStatus::Active,
    }
}

fn transient(context: &str) -> GatewayError {
    GatewayError::Transient(format!("{context}: injected failure"))
}

/// In-memory trigger source recording every patch and task completion.
#[derive(Default)]
pub struct FakeTrigger {
    pub deals: Mutex<Vec<Deal>>,
    pub patches: Mutex<Vec<(DealId, DealPatch)>>,
    pub tasks: Mutex<Vec<FollowUpTask>>,
    pub completed_tasks: Mutex<Vec<String>>,
    /// Number of leading `update_deal` calls that fail transiently.
    pub update_failures: AtomicU32,
    pub fail_list_tasks: AtomicBool,
}

impl FakeTrigger {
    pub fn with_deals(deals: Vec<Deal>) -> Self {
        Self {
            deals: Mutex::new(deals),
            ..Self::default()
        }
    }

    pub fn add_task(&self, id: &str, note: &str) {
        self.tasks.lock().unwrap().push(FollowUpTask {
            id: id.to_string(),
            note: note.to_string(),
        });
    }

    pub fn recorded_patches(&self) -> Vec<(DealId, DealPatch)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed_tasks.lock().unwrap().clone()
    }
}

#[async_trait]
impl TriggerSource for FakeTrigger {
    async fn list_billable_deals(&self) -> Result<Vec<Deal>, GatewayError> {
        Ok(self.deals.lock().unwrap().clone())
    }

    async fn update_deal(&self, id: &DealId, patch: &DealPatch) -> Result<(), GatewayError> {
        let remaining = self.update_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.update_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(transient("update_deal"));
        }
        self.patches
            .lock()
            .unwrap()
            .push((id.clone(), patch.clone()));
        Ok(())
    }

    async fn list_open_tasks(&self, _deal_id: &DealId) -> Result<Vec<FollowUpTask>, GatewayError> {
        if self.fail_list_tasks.load(Ordering::SeqCst) {
            return Err(transient("list_open_tasks"));
        }
        Ok(self.tasks.lock().unwrap().clone())
    }

    async fn complete_task(&self, task_id: &str) -> Result<(), GatewayError> {
        self.completed_tasks.lock().unwrap().push(task_id.to_string());
        Ok(())
    }
}

/// In-memory ledger over a plain vector, upserting by document id.
#[derive(Default)]
pub struct InMemoryLedger {
    pub documents: Mutex<Vec<Document>>,
    pub log: Mutex<Vec<DeletionLogEntry>>,
    pub fail_find_by_deal_id: AtomicBool,
    pub fail_mark_deleted: AtomicBool,
    pub fail_upsert: AtomicBool,
    pub fail_append_log: AtomicBool,
}

impl InMemoryLedger {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn document(&self, id: &DocumentId) -> Option<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == *id)
            .cloned()
    }

    pub fn log_entries(&self) -> Vec<DeletionLogEntry> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn find_by_deal_id(&self, deal_id: &DealId) -> Result<Vec<Document>, GatewayError> {
        if self.fail_find_by_deal_id.load(Ordering::SeqCst) {
            return Err(transient("find_by_deal_id"));
        }
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.deal_id == *deal_id)
            .cloned()
            .collect())
    }

    async fn find_by_ids(&self, ids: &[DocumentId]) -> Result<Vec<Document>, GatewayError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect())
    }

    async fn find_by_numbers(
        &self,
        numbers: &[DocumentNumber],
    ) -> Result<Vec<Document>, GatewayError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.number.as_ref().is_some_and(|n| numbers.contains(n)))
            .cloned()
            .collect())
    }

    async fn upsert(&self, document: &Document) -> Result<(), GatewayError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(transient("upsert"));
        }
        let mut documents = self.documents.lock().unwrap();
        if let Some(existing) = documents.iter_mut().find(|d| d.id == document.id) {
            *existing = document.clone();
        } else {
            documents.push(document.clone());
        }
        Ok(())
    }

    async fn mark_deleted(&self, id: &DocumentId) -> Result<(), GatewayError> {
        if self.fail_mark_deleted.load(Ordering::SeqCst) {
            return Err(transient("mark_deleted"));
        }
        let mut documents = self.documents.lock().unwrap();
        match documents.iter_mut().find(|d| d.id == *id) {
            Some(doc) => {
                doc.status = DocumentStatus::Deleted;
                Ok(())
            }
            None => Err(GatewayError::NotFound(id.to_string())),
        }
    }

    async fn append_deletion_log(&self, entry: &DeletionLogEntry) -> Result<(), GatewayError> {
        if self.fail_append_log.load(Ordering::SeqCst) {
            return Err(transient("append_deletion_log"));
        }
        self.log.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

/// In-memory accounting backend with injectable failures.
///
/// `create_document` assigns ids `D1`, `D2`, ... and numbers `FA-1`,
/// `FA-2`, ... unless `withhold_numbers` is set.
#[derive(Default)]
pub struct FakeBackend {
    pub documents: Mutex<Vec<Document>>,
    pub created: Mutex<Vec<CreateDocumentRequest>>,
    pub deleted: Mutex<Vec<DocumentId>>,
    next_id: AtomicU32,
    pub withhold_numbers: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_bank_account: AtomicBool,
    pub get_calls: AtomicU32,
    pub bank_account_calls: AtomicU32,
}

impl FakeBackend {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: Mutex::new(documents),
            ..Self::default()
        }
    }

    pub fn deleted_ids(&self) -> Vec<DocumentId> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn created_requests(&self) -> Vec<CreateDocumentRequest> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountingBackend for FakeBackend {
    async fn create_document(
        &self,
        request: &CreateDocumentRequest,
    ) -> Result<CreatedDocument, GatewayError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(transient("create_document"));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = DocumentId::new(format!("D{n}"));
        let number = if self.withhold_numbers.load(Ordering::SeqCst) {
            None
        } else {
            Some(DocumentNumber::new(format!("FA-{n}")))
        };
        self.created.lock().unwrap().push(request.clone());
        self.documents.lock().unwrap().push(Document {
            id: id.clone(),
            number: number.clone(),
            deal_id: request.deal_id.clone(),
            total: Money::zero(request.currency),
            issue_date: request.issue_date,
            buyer: request.buyer.clone(),
            line_items: request.line_items.clone(),
            status: DocumentStatus::Active,
        });
        Ok(CreatedDocument { id, number })
    }

    async fn get_document(&self, id: &DocumentId) -> Result<Option<Document>, GatewayError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(transient("get_document"));
        }
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == *id)
            .cloned())
    }

    async fn delete_document(&self, id: &DocumentId) -> Result<(), GatewayError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(transient("delete_document"));
        }
        let mut documents = self.documents.lock().unwrap();
        let Some(pos) = documents.iter().position(|d| d.id == *id) else {
            return Err(GatewayError::NotFound(id.to_string()));
        };
        documents.remove(pos);
        self.deleted.lock().unwrap().push(id.clone());
        Ok(())
    }

    async fn default_bank_account(
        &self,
        currency: Currency,
    ) -> Result<BankAccountRef, GatewayError> {
        self.bank_account_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_bank_account.load(Ordering::SeqCst) {
            return Err(transient("default_bank_account"));
        }
        Ok(BankAccountRef {
            id: format!("acct-{currency}"),
            currency,
        })
    }
}
