#![allow(dead_code)]

use paymybuddy::application::engine::LedgerEngine;
use paymybuddy::config::LedgerConfig;
use paymybuddy::domain::account::{AccountId, Balance, UserAccount};
use paymybuddy::domain::ports::{AccountStore, AccountStoreRef, TransactionLogRef};
use paymybuddy::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransactionLog};
use rust_decimal::Decimal;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub fn id(email: &str) -> AccountId {
    AccountId::new(email).unwrap()
}

pub struct Ledger {
    pub engine: Arc<LedgerEngine>,
    pub accounts: AccountStoreRef,
    pub transactions: TransactionLogRef,
}

impl Ledger {
    pub async fn balance(&self, email: &str) -> Decimal {
        self.accounts
            .get(&id(email))
            .await
            .unwrap()
            .unwrap()
            .balance
            .value()
    }

    pub async fn total(&self) -> Decimal {
        self.accounts
            .all()
            .await
            .unwrap()
            .iter()
            .map(|a| a.balance.value())
            .sum()
    }
}

/// Builds a ledger over in-memory stores holding `wallets` and the operator.
pub async fn ledger_with(wallets: &[(&str, Decimal)]) -> Ledger {
    let config = LedgerConfig::default();
    let store = InMemoryAccountStore::new();
    store
        .save(UserAccount::new(config.operator.clone(), "PayMyBuddy", "Operator", "x"))
        .await
        .unwrap();
    seed(&store, wallets).await;

    let accounts: AccountStoreRef = Arc::new(store);
    let transactions: TransactionLogRef = Arc::new(InMemoryTransactionLog::new());
    Ledger {
        engine: Arc::new(LedgerEngine::new(accounts.clone(), transactions.clone(), config)),
        accounts,
        transactions,
    }
}

pub async fn seed(store: &dyn AccountStore, wallets: &[(&str, Decimal)]) {
    for (email, balance) in wallets {
        let mut account = UserAccount::new(id(email), "First", "Last", "x");
        account.balance = Balance::new(*balance);
        store.save(account).await.unwrap();
    }
}

/// Writes an operations CSV with the standard header.
pub fn write_operations(path: &Path, rows: &[[&str; 5]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["type", "user", "arg", "amount", "description"])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
