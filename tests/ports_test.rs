mod common;

use chrono::NaiveDate;
use common::id;
use paymybuddy::domain::account::{Amount, UserAccount};
use paymybuddy::domain::ports::{
    AccountStoreFactory, AccountStoreRef, CredentialHasherRef, TransactionLogRef,
};
use paymybuddy::domain::transaction::TransactionRecord;
use paymybuddy::error::PaymentError;
use paymybuddy::infrastructure::credentials::Pbkdf2Hasher;
use paymybuddy::infrastructure::in_memory::{InMemoryAccountStore, InMemoryTransactionLog};
use rust_decimal_macros::dec;
use std::num::NonZeroU32;
use std::sync::Arc;

#[tokio::test]
async fn test_stores_as_trait_objects() {
    let account_store: AccountStoreRef = Arc::new(InMemoryAccountStore::new());
    let transaction_log: TransactionLogRef = Arc::new(InMemoryTransactionLog::new());

    let account = UserAccount::new(id("alice@mail.com"), "Alice", "Liddell", "hash");
    let record = TransactionRecord::new(
        id("alice@mail.com"),
        id("bob@mail.com"),
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        "rent",
        Amount::new(dec!(300)).unwrap(),
    );

    // Verify Send + Sync by spawning tasks
    let as_handle = tokio::spawn(async move {
        account_store.save(account).await.unwrap();
        account_store.get(&id("alice@mail.com")).await.unwrap().unwrap()
    });

    let tl_handle = tokio::spawn(async move {
        transaction_log.append(record).await.unwrap();
        transaction_log.find_by_sender(&id("alice@mail.com")).await.unwrap()
    });

    let retrieved_account = as_handle.await.unwrap();
    assert_eq!(retrieved_account.email, id("alice@mail.com"));
    assert_eq!(retrieved_account.version, 1);

    let retrieved_records = tl_handle.await.unwrap();
    assert_eq!(retrieved_records.len(), 1);
    assert_eq!(retrieved_records[0].description, "rent");
}

#[tokio::test]
async fn test_stale_version_is_rejected_through_trait_object() {
    let store: AccountStoreRef = Arc::new(InMemoryAccountStore::new());
    let saved = store
        .save(UserAccount::new(id("alice@mail.com"), "Alice", "Liddell", "hash"))
        .await
        .unwrap();

    let mut first = saved.clone();
    first.first_name = "Alicia".to_string();
    store.save(first).await.unwrap();

    let err = store.save(saved).await.unwrap_err();
    assert!(matches!(err, PaymentError::ConcurrentModification(_)));
    let current = store.get(&id("alice@mail.com")).await.unwrap().unwrap();
    assert_eq!(current.first_name, "Alicia");
}

#[tokio::test]
async fn test_factory_in_task() {
    let factory: AccountStoreFactory =
        Box::new(|| Arc::new(InMemoryAccountStore::new()) as AccountStoreRef);

    let handle = tokio::spawn(async move {
        let store = factory();
        store
            .save(UserAccount::new(id("bob@mail.com"), "Bob", "Dylan", "hash"))
            .await
            .unwrap();
        // Each call yields an independent store.
        assert!(factory().get(&id("bob@mail.com")).await.unwrap().is_none());
        store.get(&id("bob@mail.com")).await.unwrap().unwrap()
    });

    let retrieved = handle.await.unwrap();
    assert_eq!(retrieved.first_name, "Bob");
}

#[test]
fn test_hasher_as_trait_object() {
    let hasher: CredentialHasherRef =
        Arc::new(Pbkdf2Hasher::with_iterations(NonZeroU32::new(10).unwrap()));
    let hash = hasher.hash("hunter2").unwrap();
    assert!(hasher.verify("hunter2", &hash));
    assert!(!hasher.verify("hunter3", &hash));
}
