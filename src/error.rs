use crate::domain::account::{AccountId, Balance};
use thiserror::Error;

/// Coarse classification of a [`PaymentError`].
///
/// Callers that present errors to users branch on this instead of on the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    InsufficientFunds,
    /// Deployment defect, e.g. the operator account is missing.
    Fatal,
    /// A concurrent writer changed an account between read and save.
    Conflict,
    Infrastructure,
}

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Insufficient funds on {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        required: Balance,
        available: Balance,
    },
    #[error("Operator account {0} is not provisioned")]
    OperatorAccountMisconfigured(AccountId),
    #[error("Account already exists: {0}")]
    AccountExists(AccountId),
    #[error("Bank account {iban} is not linked to {account}")]
    BankAccountMismatch { account: AccountId, iban: String },
    #[error("Buddy already added: {0}")]
    BuddyExists(AccountId),
    #[error("Buddy not found: {0}")]
    BuddyNotFound(AccountId),
    #[error("Account {0} was modified concurrently")]
    ConcurrentModification(AccountId),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_) | Self::BuddyNotFound(_) => ErrorKind::NotFound,
            Self::ValidationError(_)
            | Self::AccountExists(_)
            | Self::BankAccountMismatch { .. }
            | Self::BuddyExists(_) => ErrorKind::Validation,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::OperatorAccountMisconfigured(_) => ErrorKind::Fatal,
            Self::ConcurrentModification(_) => ErrorKind::Conflict,
            _ => ErrorKind::Infrastructure,
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub(crate) fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(msg.into())))
    }
}

pub type Result<T> = std::result::Result<T, PaymentError>;
