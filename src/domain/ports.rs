use super::account::{AccountId, UserAccount};
use super::transaction::TransactionRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage for user accounts.
///
/// Writes use compare-and-save: an account is accepted only if its `version`
/// matches the stored one (zero for an account that does not exist yet). The
/// stored and returned copy carries `version + 1`. A mismatch fails with
/// [`crate::error::PaymentError::ConcurrentModification`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn get(&self, id: &AccountId) -> Result<Option<UserAccount>>;
    async fn save(&self, account: UserAccount) -> Result<UserAccount>;
    /// Saves every account or none of them.
    async fn save_all(&self, accounts: Vec<UserAccount>) -> Result<Vec<UserAccount>>;
    /// Removes the account if its stored version still equals `version`.
    async fn delete(&self, id: &AccountId, version: u64) -> Result<()>;
    async fn all(&self) -> Result<Vec<UserAccount>>;
}

/// Append-only log of completed transfers.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord>;
    async fn find_by_sender(&self, sender: &AccountId) -> Result<Vec<TransactionRecord>>;
}

/// Password hashing capability.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    fn verify(&self, password: &str, hash: &str) -> bool;
}

pub type AccountStoreRef = Arc<dyn AccountStore>;
pub type TransactionLogRef = Arc<dyn TransactionLog>;
pub type CredentialHasherRef = Arc<dyn CredentialHasher>;

/// Builds a fresh account store, e.g. one per test or per tenant.
pub type AccountStoreFactory = Box<dyn Fn() -> AccountStoreRef + Send + Sync>;
