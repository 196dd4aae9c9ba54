//! Storage backends implementing the domain ports.

use crate::domain::account::{AccountId, UserAccount};
use crate::error::{PaymentError, Result};
use std::collections::HashSet;

pub mod credentials;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

/// Fails unless `expected` matches the version currently stored for `id`
/// (zero when nothing is stored).
pub(crate) fn check_version(
    current: Option<&UserAccount>,
    id: &AccountId,
    expected: u64,
) -> Result<()> {
    let stored = current.map_or(0, |a| a.version);
    if stored == expected {
        Ok(())
    } else {
        Err(PaymentError::ConcurrentModification(id.clone()))
    }
}

/// A batch may name each account only once.
pub(crate) fn check_batch(accounts: &[UserAccount]) -> Result<()> {
    let mut seen = HashSet::with_capacity(accounts.len());
    for account in accounts {
        if !seen.insert(&account.email) {
            return Err(PaymentError::internal(format!(
                "Account {} appears twice in one batch",
                account.email
            )));
        }
    }
    Ok(())
}
