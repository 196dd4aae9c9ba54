//! Pure transfer arithmetic.
//!
//! Nothing in here touches storage. The engine quotes a transfer, stages every
//! balance change on in-memory copies of the accounts, and only then commits the
//! staged accounts in one write.

use super::account::{AccountId, Amount, Balance, UserAccount};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

pub const DEFAULT_FEE_RATE: Decimal = dec!(0.05);
pub const DEFAULT_MINIMUM_AMOUNT: Decimal = dec!(1);

/// Fee rate and minimum transferable amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub rate: Decimal,
    pub minimum: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            rate: DEFAULT_FEE_RATE,
            minimum: DEFAULT_MINIMUM_AMOUNT,
        }
    }
}

/// The money movements implied by one transfer request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    /// Gross amount credited to the receiver.
    pub amount: Amount,
    /// Collected by the operator.
    pub fee: Balance,
    /// `amount + fee`, debited from the sender.
    pub total_debit: Balance,
}

impl FeeSchedule {
    pub fn quote(&self, amount: Decimal) -> Result<Quote> {
        if amount < self.minimum {
            return Err(PaymentError::ValidationError(format!(
                "Transfer amount {} is below the minimum of {}",
                amount.normalize(),
                self.minimum.normalize()
            )));
        }
        let amount = Amount::new(amount)?;
        let too_large = || {
            PaymentError::ValidationError(format!(
                "Transfer amount {} plus fee exceeds the largest representable balance",
                amount
            ))
        };
        let fee = amount
            .value()
            .checked_mul(self.rate)
            .map(Balance::new)
            .ok_or_else(too_large)?;
        let total_debit = Balance::from(amount)
            .checked_add(fee)
            .ok_or_else(too_large)?;
        Ok(Quote {
            amount,
            fee,
            total_debit,
        })
    }
}

/// Balance changes applied to copies of the accounts involved in one operation.
///
/// Accounts are keyed by identity, so when the same account appears twice (a
/// self-transfer) both movements land on a single copy.
#[derive(Debug, Default)]
pub struct StagedChanges {
    accounts: BTreeMap<AccountId, UserAccount>,
    opening: BTreeMap<AccountId, Balance>,
}

impl StagedChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account to the stage. A copy already staged under the same
    /// identity is kept.
    pub fn include(&mut self, account: UserAccount) {
        self.opening
            .entry(account.email.clone())
            .or_insert(account.balance);
        self.accounts.entry(account.email.clone()).or_insert(account);
    }

    pub fn get(&self, id: &AccountId) -> Option<&UserAccount> {
        self.accounts.get(id)
    }

    pub fn debit(&mut self, id: &AccountId, amount: Balance) -> Result<()> {
        self.staged_mut(id)?.debit(amount)
    }

    pub fn credit(&mut self, id: &AccountId, amount: Balance) -> Result<()> {
        self.staged_mut(id)?.credit(amount)
    }

    /// Net balance change of every staged account, in identity order.
    pub fn deltas(&self) -> Vec<(AccountId, Balance)> {
        self.accounts
            .iter()
            .map(|(id, account)| {
                let opening = self.opening.get(id).copied().unwrap_or_default();
                // Both sides are non-negative, so the difference cannot overflow.
                let delta = account.balance.value() - opening.value();
                (id.clone(), Balance::new(delta))
            })
            .collect()
    }

    pub fn into_accounts(self) -> Vec<UserAccount> {
        self.accounts.into_values().collect()
    }

    fn staged_mut(&mut self, id: &AccountId) -> Result<&mut UserAccount> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| PaymentError::internal(format!("Account {id} was not staged")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str, balance: Decimal) -> UserAccount {
        let mut account = UserAccount::new(AccountId::new(email).unwrap(), "First", "Last", "");
        account.balance = Balance::new(balance);
        account
    }

    #[test]
    fn test_quote_applies_five_percent_fee() {
        let quote = FeeSchedule::default().quote(dec!(10.0)).unwrap();
        assert_eq!(quote.amount.value(), dec!(10.0));
        assert_eq!(quote.fee, Balance::new(dec!(0.5)));
        assert_eq!(quote.total_debit, Balance::new(dec!(10.5)));
    }

    #[test]
    fn test_quote_enforces_minimum() {
        let fees = FeeSchedule::default();
        assert!(matches!(
            fees.quote(dec!(0.99)),
            Err(PaymentError::ValidationError(_))
        ));
        assert!(fees.quote(dec!(1.00)).is_ok());
        assert!(matches!(
            fees.quote(dec!(-5)),
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[test]
    fn test_quote_is_exact_for_fractional_amounts() {
        let quote = FeeSchedule::default().quote(dec!(19.05)).unwrap();
        assert_eq!(quote.fee, Balance::new(dec!(0.9525)));
        assert_eq!(quote.total_debit, Balance::new(dec!(20.0025)));
    }

    #[test]
    fn test_quote_rejects_unrepresentable_total() {
        let err = FeeSchedule::default().quote(Decimal::MAX).unwrap_err();
        assert!(matches!(err, PaymentError::ValidationError(_)));
    }

    #[test]
    fn test_staged_credit_overflow_is_rejected() {
        let mut stage = StagedChanges::new();
        let rich = user("rich@mail.com", Decimal::MAX);
        stage.include(rich.clone());

        assert!(stage.credit(&rich.email, Balance::new(dec!(1))).is_err());
        assert_eq!(stage.get(&rich.email).unwrap().balance, Balance::new(Decimal::MAX));
    }

    #[test]
    fn test_custom_schedule() {
        let fees = FeeSchedule {
            rate: dec!(0),
            minimum: dec!(0.01),
        };
        let quote = fees.quote(dec!(0.5)).unwrap();
        assert_eq!(quote.fee, Balance::ZERO);
        assert_eq!(quote.total_debit, Balance::new(dec!(0.5)));
    }

    #[test]
    fn test_staged_changes_merge_same_identity() {
        let mut stage = StagedChanges::new();
        let alice = user("alice@mail.com", dec!(20));
        stage.include(alice.clone());
        stage.include(alice.clone());

        stage.debit(&alice.email, Balance::new(dec!(10.5))).unwrap();
        stage.credit(&alice.email, Balance::new(dec!(10))).unwrap();

        assert_eq!(
            stage.deltas(),
            vec![(alice.email.clone(), Balance::new(dec!(-0.5)))]
        );
        let accounts = stage.into_accounts();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].balance, Balance::new(dec!(19.5)));
    }

    #[test]
    fn test_staged_debit_keeps_copy_on_failure() {
        let mut stage = StagedChanges::new();
        let bob = user("bob@mail.com", dec!(5));
        stage.include(bob.clone());

        assert!(stage.debit(&bob.email, Balance::new(dec!(6))).is_err());
        assert_eq!(stage.get(&bob.email).unwrap().balance, Balance::new(dec!(5)));
    }

    #[test]
    fn test_unstaged_account_is_an_internal_error() {
        let mut stage = StagedChanges::new();
        let ghost = AccountId::new("ghost@mail.com").unwrap();
        assert!(matches!(
            stage.credit(&ghost, Balance::new(dec!(1))),
            Err(PaymentError::InternalError(_))
        ));
    }
}
