//! Idempotent trigger-source write-back with retry.

pub mod retry;
pub mod service;

pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use service::WriteBackService;
