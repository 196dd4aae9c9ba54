use super::{check_batch, check_version};
use crate::domain::account::{AccountId, UserAccount};
use crate::domain::ports::{AccountStore, TransactionLog};
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for user accounts.
///
/// Uses `Arc<RwLock<HashMap<AccountId, UserAccount>>>` so clones share state.
/// Ideal for testing or for one-shot batch runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<AccountId, UserAccount>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn get(&self, id: &AccountId) -> Result<Option<UserAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(id).cloned())
    }

    async fn save(&self, account: UserAccount) -> Result<UserAccount> {
        let mut saved = self.save_all(vec![account]).await?;
        saved
            .pop()
            .ok_or_else(|| PaymentError::internal("save_all returned no account"))
    }

    async fn save_all(&self, accounts: Vec<UserAccount>) -> Result<Vec<UserAccount>> {
        check_batch(&accounts)?;
        let mut stored = self.accounts.write().await;
        for account in &accounts {
            check_version(stored.get(&account.email), &account.email, account.version)?;
        }

        let mut saved = Vec::with_capacity(accounts.len());
        for mut account in accounts {
            account.version += 1;
            stored.insert(account.email.clone(), account.clone());
            saved.push(account);
        }
        Ok(saved)
    }

    async fn delete(&self, id: &AccountId, version: u64) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        check_version(accounts.get(id), id, version)?;
        accounts.remove(id);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<UserAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().cloned().collect())
    }
}

/// A thread-safe in-memory transaction log, indexed by sender.
#[derive(Default, Clone)]
pub struct InMemoryTransactionLog {
    by_sender: Arc<RwLock<HashMap<AccountId, Vec<TransactionRecord>>>>,
}

impl InMemoryTransactionLog {
    /// Creates a new, empty in-memory transaction log.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord> {
        let mut by_sender = self.by_sender.write().await;
        by_sender
            .entry(record.sender.clone())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn find_by_sender(&self, sender: &AccountId) -> Result<Vec<TransactionRecord>> {
        let by_sender = self.by_sender.read().await;
        Ok(by_sender.get(sender).cloned().unwrap_or_default())
    }
}
