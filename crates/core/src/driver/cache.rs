//! Per-run cache of bank-account lookups.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use billflow_shared::types::Currency;
use tracing::debug;

use crate::gateway::{AccountingBackend, BankAccountRef, GatewayError, with_timeout};

/// Caches the default bank account per currency for one run.
///
/// Accounts change rarely but are configured by humans, so the cache is
/// scoped to a run rather than the process lifetime.
#[derive(Default)]
pub struct BankAccountCache {
    accounts: Mutex<HashMap<Currency, BankAccountRef>>,
}

impl BankAccountCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the default account for the currency, fetching it from the
    /// backend at most once per run.
    pub async fn get_or_fetch<A>(
        &self,
        backend: &A,
        currency: Currency,
        timeout: Duration,
    ) -> Result<BankAccountRef, GatewayError>
    where
        A: AccountingBackend,
    {
        if let Ok(accounts) = self.accounts.lock()
            && let Some(account) = accounts.get(&currency)
        {
            return Ok(account.clone());
        }

        let account = with_timeout(
            timeout,
            "backend default_bank_account",
            backend.default_bank_account(currency),
        )
        .await?;
        debug!(%currency, account_id = %account.id, "fetched default bank account");

        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(currency, account.clone());
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use crate::test_support::FakeBackend;

    use super::*;

    #[tokio::test]
    async fn test_fetches_once_per_currency() {
        let backend = FakeBackend::default();
        let cache = BankAccountCache::new();
        let timeout = Duration::from_secs(5);

        let first = cache
            .get_or_fetch(&backend, Currency::Eur, timeout)
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(&backend, Currency::Eur, timeout)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.bank_account_calls.load(Ordering::SeqCst), 1);

        cache
            .get_or_fetch(&backend, Currency::Usd, timeout)
            .await
            .unwrap();
        assert_eq!(backend.bank_account_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let backend = FakeBackend::default();
        backend.fail_bank_account.store(true, Ordering::SeqCst);
        let cache = BankAccountCache::new();
        let timeout = Duration::from_secs(5);

        assert!(
            cache
                .get_or_fetch(&backend, Currency::Eur, timeout)
                .await
                .is_err()
        );

        backend.fail_bank_account.store(false, Ordering::SeqCst);
        assert!(
            cache
                .get_or_fetch(&backend, Currency::Eur, timeout)
                .await
                .is_ok()
        );
    }
}
