//! Payment schedule calculator.

use billflow_shared::config::ScheduleConfig;
use billflow_shared::types::Money;
use chrono::{Duration, Months, NaiveDate};

use super::types::{Installment, InstallmentLabel, PaymentSchedule, ScheduleKind};

/// Computes the payment schedule for a document.
///
/// Pure function of its inputs. `issue_date` must be the date the document
/// was actually issued with, never "now", so repeated calls (e.g. for
/// follow-up task generation) agree with the document.
///
/// With `days` = calendar days from `issue_date` to `close_date`:
/// - close date absent or `days` below the configured threshold: a single
///   installment of the full amount, due at issue date plus the payment
///   term;
/// - otherwise a split: a rounded half ("deposit") due at issue date plus
///   the payment term, and the remainder ("balance") due one calendar month
///   before the close date. The balance is `total - deposit`, so the two
///   sum exactly to the total regardless of rounding.
#[must_use]
pub fn compute(
    issue_date: NaiveDate,
    total: Money,
    close_date: Option<NaiveDate>,
    config: &ScheduleConfig,
) -> PaymentSchedule {
    let term_due = issue_date + Duration::days(config.payment_term_days);

    let split_close = close_date.filter(|close| {
        close.signed_duration_since(issue_date).num_days() >= config.split_threshold_days
    });

    match split_close {
        None => PaymentSchedule {
            kind: ScheduleKind::Single,
            total: total.rounded(),
            installments: vec![Installment {
                label: InstallmentLabel::Full,
                due_date: term_due,
                amount: total.rounded(),
            }],
        },
        Some(close) => {
            let (deposit, balance) = total.rounded().split_half();
            let balance_due = close.checked_sub_months(Months::new(1)).unwrap_or(close);
            // Short months near the threshold can push the balance before the
            // deposit; the deposit must always come first.
            let balance_due = balance_due.max(term_due + Duration::days(1));

            PaymentSchedule {
                kind: ScheduleKind::Split,
                total: total.rounded(),
                installments: vec![
                    Installment {
                        label: InstallmentLabel::Deposit,
                        due_date: term_due,
                        amount: deposit,
                    },
                    Installment {
                        label: InstallmentLabel::Balance,
                        due_date: balance_due,
                        amount: balance,
                    },
                ],
            }
        }
    }
}
