use super::{check_batch, check_version};
use crate::domain::account::{AccountId, UserAccount};
use crate::domain::ports::{AccountStore, TransactionLog};
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Column Family for storing user accounts.
pub const CF_ACCOUNTS: &str = "accounts";
/// Column Family for storing the transfer log.
pub const CF_TRANSACTIONS: &str = "transactions";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `UserAccount` and `TransactionRecord` entities using
/// separate Column Families. Transfer records are keyed by `sender \0 id`, so
/// the records of one sender are contiguous and can be read with a prefix scan.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    // Serializes the version check and the batch write of `save_all`.
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("accounts" and "transactions") exist.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts, cf_transactions])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| PaymentError::internal(format!("Column family {name} not found")))
    }

    fn read_account(&self, cf: &ColumnFamily, id: &AccountId) -> Result<Option<UserAccount>> {
        match self.db.get_cf(&cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

fn sender_prefix(sender: &AccountId) -> Vec<u8> {
    let mut prefix = sender.as_str().as_bytes().to_vec();
    prefix.push(0);
    prefix
}

#[async_trait]
impl AccountStore for RocksDBStore {
    async fn get(&self, id: &AccountId) -> Result<Option<UserAccount>> {
        let cf = self.cf(CF_ACCOUNTS)?;
        self.read_account(cf, id)
    }

    async fn save(&self, account: UserAccount) -> Result<UserAccount> {
        let mut saved = self.save_all(vec![account]).await?;
        saved
            .pop()
            .ok_or_else(|| PaymentError::internal("save_all returned no account"))
    }

    async fn save_all(&self, accounts: Vec<UserAccount>) -> Result<Vec<UserAccount>> {
        check_batch(&accounts)?;
        let cf = self.cf(CF_ACCOUNTS)?;
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| PaymentError::internal("Commit lock poisoned"))?;

        for account in &accounts {
            let current = self.read_account(cf, &account.email)?;
            check_version(current.as_ref(), &account.email, account.version)?;
        }

        let mut batch = WriteBatch::default();
        let mut saved = Vec::with_capacity(accounts.len());
        for mut account in accounts {
            account.version += 1;
            batch.put_cf(&cf, account.email.as_str().as_bytes(), encode(&account)?);
            saved.push(account);
        }
        self.db.write(batch)?;

        Ok(saved)
    }

    async fn delete(&self, id: &AccountId, version: u64) -> Result<()> {
        let cf = self.cf(CF_ACCOUNTS)?;
        let _guard = self
            .commit_lock
            .lock()
            .map_err(|_| PaymentError::internal("Commit lock poisoned"))?;
        let current = self.read_account(cf, id)?;
        check_version(current.as_ref(), id, version)?;
        self.db.delete_cf(&cf, id.as_str().as_bytes())?;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<UserAccount>> {
        let cf = self.cf(CF_ACCOUNTS)?;

        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(decode(&value)?);
        }

        Ok(accounts)
    }
}

#[async_trait]
impl TransactionLog for RocksDBStore {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord> {
        let cf = self.cf(CF_TRANSACTIONS)?;

        let mut key = sender_prefix(&record.sender);
        key.extend_from_slice(record.id.as_bytes());
        self.db.put_cf(&cf, key, encode(&record)?)?;

        Ok(record)
    }

    async fn find_by_sender(&self, sender: &AccountId) -> Result<Vec<TransactionRecord>> {
        let cf = self.cf(CF_TRANSACTIONS)?;
        let prefix = sender_prefix(sender);

        let mut records = Vec::new();
        let iter = self
            .db
            .iterator_cf(&cf, IteratorMode::From(&prefix, Direction::Forward));
        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            records.push(decode(&value)?);
        }

        Ok(records)
    }
}
