//! Property-based tests for the payment schedule calculator.

use billflow_shared::config::ScheduleConfig;
use billflow_shared::types::{Currency, Money};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::compute;
use super::types::{InstallmentLabel, ScheduleKind};

/// Strategy to generate positive amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate issue dates across several years.
fn issue_date() -> impl Strategy<Value = NaiveDate> {
    (0i64..1500).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    })
}

/// Strategy to generate close-date offsets at or above the split threshold.
fn split_offset_days() -> impl Strategy<Value = i64> {
    30i64..720
}

/// Strategy to generate close-date offsets below the split threshold.
fn single_offset_days() -> impl Strategy<Value = i64> {
    0i64..30
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For any split schedule, deposit + balance equals the total exactly.
    #[test]
    fn prop_split_sums_exactly(
        amount in positive_amount(),
        issue in issue_date(),
        offset in split_offset_days(),
    ) {
        let config = ScheduleConfig::default();
        let total = Money::new(amount, Currency::Eur);
        let schedule = compute(issue, total, Some(issue + Duration::days(offset)), &config);

        prop_assert_eq!(schedule.kind, ScheduleKind::Split);
        let deposit = schedule.installment(InstallmentLabel::Deposit).unwrap();
        let balance = schedule.installment(InstallmentLabel::Balance).unwrap();
        prop_assert_eq!(
            deposit.amount.amount + balance.amount.amount,
            schedule.total.amount
        );
    }

    /// For any split schedule, the deposit is due before the balance.
    #[test]
    fn prop_deposit_precedes_balance(
        amount in positive_amount(),
        issue in issue_date(),
        offset in split_offset_days(),
    ) {
        let config = ScheduleConfig::default();
        let schedule = compute(
            issue,
            Money::new(amount, Currency::Eur),
            Some(issue + Duration::days(offset)),
            &config,
        );

        let deposit = schedule.installment(InstallmentLabel::Deposit).unwrap();
        let balance = schedule.installment(InstallmentLabel::Balance).unwrap();
        prop_assert!(deposit.due_date < balance.due_date);
    }

    /// Close dates below the threshold always produce a single schedule
    /// due at issue date plus the payment term.
    #[test]
    fn prop_short_horizon_is_single(
        amount in positive_amount(),
        issue in issue_date(),
        offset in single_offset_days(),
    ) {
        let config = ScheduleConfig::default();
        let schedule = compute(
            issue,
            Money::new(amount, Currency::Eur),
            Some(issue + Duration::days(offset)),
            &config,
        );

        prop_assert_eq!(schedule.kind, ScheduleKind::Single);
        prop_assert_eq!(schedule.installments.len(), 1);
        prop_assert_eq!(
            schedule.first_due_date(),
            Some(issue + Duration::days(config.payment_term_days))
        );
        prop_assert_eq!(schedule.installments[0].amount.amount, schedule.total.amount);
    }

    /// Installment amounts never carry more than two decimal places.
    #[test]
    fn prop_installments_have_two_decimal_places(
        amount in positive_amount(),
        issue in issue_date(),
        offset in split_offset_days(),
    ) {
        let config = ScheduleConfig::default();
        let schedule = compute(
            issue,
            Money::new(amount, Currency::Eur),
            Some(issue + Duration::days(offset)),
            &config,
        );

        for installment in &schedule.installments {
            prop_assert!(installment.amount.amount.scale() <= 2);
        }
    }
}
