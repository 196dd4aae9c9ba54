use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

/// External bank account a user funds their wallet from.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct BankAccount {
    pub iban: String,
    pub description: String,
}

impl BankAccount {
    pub fn new(iban: &str, description: impl Into<String>) -> Result<Self> {
        let iban = Self::normalize_iban(iban);
        if iban.is_empty() {
            return Err(PaymentError::validation("IBAN must not be empty"));
        }
        Ok(Self {
            iban,
            description: description.into(),
        })
    }

    /// Strips whitespace and upper-cases, so "fr76 3000" and "FR763000" compare equal.
    pub fn normalize_iban(iban: &str) -> String {
        iban.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iban_normalization() {
        let bank = BankAccount::new(" fr76 3000 6000 ", "savings").unwrap();
        assert_eq!(bank.iban, "FR7630006000");
        assert_eq!(bank.description, "savings");
    }

    #[test]
    fn test_empty_iban_rejected() {
        assert!(matches!(
            BankAccount::new("  ", "nothing"),
            Err(PaymentError::ValidationError(_))
        ));
    }
}
