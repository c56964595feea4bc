//! Payment schedule calculation.

pub mod calculator;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::compute;
pub use types::{Installment, InstallmentLabel, PaymentSchedule, ScheduleKind};
