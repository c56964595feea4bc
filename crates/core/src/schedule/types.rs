//! Payment schedule value objects.
//!
//! A schedule is derived deterministically from deal metadata plus the
//! document's issue date. It is recomputed whenever needed and never
//! stored as authoritative state.

use billflow_shared::types::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shape of a payment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    /// One installment covering the full amount.
    Single,
    /// A deposit installment followed by a balance installment.
    Split,
}

/// Role of an installment within its schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentLabel {
    /// The only installment of a single schedule.
    Full,
    /// First half of a split schedule.
    Deposit,
    /// Second half of a split schedule.
    Balance,
}

impl InstallmentLabel {
    /// Returns the string representation of the label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Deposit => "deposit",
            Self::Balance => "balance",
        }
    }
}

/// One (due date, amount) pair of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// Role within the schedule.
    pub label: InstallmentLabel,
    /// Date the installment is due.
    pub due_date: NaiveDate,
    /// Amount due.
    pub amount: Money,
}

/// A computed payment schedule for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSchedule {
    /// Shape of the schedule.
    pub kind: ScheduleKind,
    /// Total amount across all installments.
    pub total: Money,
    /// One or two installments, ordered by due date.
    pub installments: Vec<Installment>,
}

impl PaymentSchedule {
    /// Due date of the first installment.
    ///
    /// Schedules always carry at least one installment, so this falls back
    /// to the issue-date-derived first entry rather than panicking.
    #[must_use]
    pub fn first_due_date(&self) -> Option<NaiveDate> {
        self.installments.first().map(|i| i.due_date)
    }

    /// Returns the installment with the given label, if present.
    #[must_use]
    pub fn installment(&self, label: InstallmentLabel) -> Option<&Installment> {
        self.installments.iter().find(|i| i.label == label)
    }

    /// Human-readable one-line summary for document descriptions.
    #[must_use]
    pub fn summary(&self) -> String {
        match self.kind {
            ScheduleKind::Single => match self.first_due_date() {
                Some(due) => format!("Payable in full by {due}"),
                None => "Payable in full".to_string(),
            },
            ScheduleKind::Split => {
                let deposit = self.installment(InstallmentLabel::Deposit);
                let balance = self.installment(InstallmentLabel::Balance);
                match (deposit, balance) {
                    (Some(d), Some(b)) => format!(
                        "Deposit {} due {}; balance {} due {}",
                        d.amount, d.due_date, b.amount, b.due_date
                    ),
                    _ => "Split payment".to_string(),
                }
            }
        }
    }
}
