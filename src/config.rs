use crate::domain::account::AccountId;
use crate::domain::ledger::{DEFAULT_FEE_RATE, DEFAULT_MINIMUM_AMOUNT, FeeSchedule};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

/// Identity of the account collecting transfer fees unless configured otherwise.
pub const DEFAULT_OPERATOR: &str = "paymybuddy@paymybuddy.com";

/// Settings of the ledger engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Account credited with every transfer fee.
    pub operator: AccountId,
    pub fee_rate: Decimal,
    /// Smallest gross amount a user may transfer.
    pub minimum_amount: Decimal,
    pub allow_self_transfer: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            operator: AccountId::from_static(DEFAULT_OPERATOR),
            fee_rate: DEFAULT_FEE_RATE,
            minimum_amount: DEFAULT_MINIMUM_AMOUNT,
            allow_self_transfer: false,
        }
    }
}

impl LedgerConfig {
    pub fn validate(self) -> Result<Self> {
        if self.fee_rate.is_sign_negative() && !self.fee_rate.is_zero() {
            return Err(PaymentError::ValidationError(format!(
                "Fee rate must not be negative, got {}",
                self.fee_rate
            )));
        }
        if self.minimum_amount <= Decimal::ZERO {
            return Err(PaymentError::ValidationError(format!(
                "Minimum transfer amount must be positive, got {}",
                self.minimum_amount
            )));
        }
        Ok(self)
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule {
            rate: self.fee_rate,
            minimum: self.minimum_amount,
        }
    }
}
