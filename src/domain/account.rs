use super::bank_account::BankAccount;
use super::buddy::Buddy;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a party able to hold a balance (an email address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(PaymentError::validation("Account identity must not be empty"));
        }
        Ok(Self(value.to_string()))
    }

    /// For identities fixed at compile time, which are known to be non-empty.
    pub(crate) fn from_static(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for AccountId {
    type Error = PaymentError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

/// Represents a wallet balance.
///
/// This is a wrapper around `rust_decimal::Decimal`; arithmetic is exact, so the
/// fee split of a transfer never loses a fraction of a cent.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount moved by an operation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::validation("Amount must be positive"))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// `None` when the sum does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A registered user together with their wallet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UserAccount {
    pub email: AccountId,
    pub first_name: String,
    pub last_name: String,
    /// Opaque hash produced by a [`crate::domain::ports::CredentialHasher`].
    pub password_hash: String,
    pub balance: Balance,
    pub bank_account: Option<BankAccount>,
    #[serde(default)]
    pub buddies: Vec<Buddy>,
    /// Optimistic concurrency counter. Zero until the account is first stored.
    #[serde(default)]
    pub version: u64,
}

impl UserAccount {
    pub fn new(
        email: AccountId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            email,
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            balance: Balance::ZERO,
            bank_account: None,
            buddies: Vec::new(),
            version: 0,
        }
    }

    /// Credits funds to the wallet. The balance is left untouched if the
    /// result would not be representable.
    pub fn credit(&mut self, amount: Balance) -> Result<()> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            PaymentError::ValidationError(format!(
                "Crediting {amount} would overflow the balance of {}",
                self.email
            ))
        })?;
        Ok(())
    }

    /// Debits funds from the wallet if the balance covers them.
    pub fn debit(&mut self, amount: Balance) -> Result<()> {
        match self.balance.checked_sub(amount) {
            Some(rest) if self.balance >= amount => {
                self.balance = rest;
                Ok(())
            }
            _ => Err(PaymentError::InsufficientFunds {
                account: self.email.clone(),
                required: amount,
                available: self.balance,
            }),
        }
    }

    pub fn buddy(&self, email: &AccountId) -> Option<&Buddy> {
        self.buddies.iter().find(|b| &b.email == email)
    }

    /// Checks that `iban` is the bank account linked to this user.
    pub fn ensure_bank_account(&self, iban: &str) -> Result<&BankAccount> {
        let normalized = BankAccount::normalize_iban(iban);
        match &self.bank_account {
            Some(bank) if bank.iban == normalized => Ok(bank),
            _ => Err(PaymentError::BankAccountMismatch {
                account: self.email.clone(),
                iban: normalized,
            }),
        }
    }
}
