use crate::domain::account::{AccountId, UserAccount};
use crate::domain::bank_account::BankAccount;
use crate::domain::ports::AccountStoreRef;
use crate::error::{PaymentError, Result};
use tracing::info;

/// Links and unlinks the bank account a user funds their wallet from.
pub struct BankAccountService {
    accounts: AccountStoreRef,
}

impl BankAccountService {
    pub fn new(accounts: AccountStoreRef) -> Self {
        Self { accounts }
    }

    /// Links `iban` to the user, replacing any previously linked account.
    pub async fn link(&self, email: &AccountId, iban: &str, description: &str) -> Result<UserAccount> {
        let bank = BankAccount::new(iban, description.trim())?;
        let mut account = self.require(email).await?;
        account.bank_account = Some(bank);

        let saved = self.accounts.save(account).await?;
        info!(%email, "Bank account linked");
        Ok(saved)
    }

    pub async fn unlink(&self, email: &AccountId, iban: &str) -> Result<UserAccount> {
        let mut account = self.require(email).await?;
        account.ensure_bank_account(iban)?;
        account.bank_account = None;

        let saved = self.accounts.save(account).await?;
        info!(%email, "Bank account unlinked");
        Ok(saved)
    }

    async fn require(&self, email: &AccountId) -> Result<UserAccount> {
        self.accounts
            .get(email)
            .await?
            .ok_or_else(|| PaymentError::AccountNotFound(email.clone()))
    }
}
