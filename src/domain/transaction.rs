use super::account::{AccountId, Amount};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed peer-to-peer transfer.
///
/// `amount` is the gross amount credited to the receiver; the fee the sender
/// paid on top of it is not recorded here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Amount,
}

impl TransactionRecord {
    pub fn new(
        sender: AccountId,
        receiver: AccountId,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            receiver,
            date,
            description: description.into(),
            amount,
        }
    }
}
