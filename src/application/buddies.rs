use crate::domain::account::{AccountId, UserAccount};
use crate::domain::buddy::Buddy;
use crate::domain::ports::AccountStoreRef;
use crate::error::{PaymentError, Result};
use tracing::info;

/// Maintains each user's list of contacts.
pub struct BuddyService {
    accounts: AccountStoreRef,
}

impl BuddyService {
    pub fn new(accounts: AccountStoreRef) -> Self {
        Self { accounts }
    }

    /// Adds `buddy_email` to the user's contacts, copying the buddy's name.
    pub async fn add(
        &self,
        email: &AccountId,
        buddy_email: &AccountId,
        description: &str,
    ) -> Result<UserAccount> {
        let mut account = self.require(email).await?;
        let buddy_account = self.require(buddy_email).await?;
        if email == buddy_email {
            return Err(PaymentError::validation("A user cannot be their own buddy"));
        }
        if account.buddy(buddy_email).is_some() {
            return Err(PaymentError::BuddyExists(buddy_email.clone()));
        }

        account.buddies.push(Buddy {
            email: buddy_account.email,
            first_name: buddy_account.first_name,
            last_name: buddy_account.last_name,
            description: description.trim().to_string(),
        });
        let saved = self.accounts.save(account).await?;
        info!(%email, buddy = %buddy_email, "Buddy added");
        Ok(saved)
    }

    pub async fn update(
        &self,
        email: &AccountId,
        buddy_email: &AccountId,
        description: &str,
    ) -> Result<UserAccount> {
        let mut account = self.require(email).await?;
        let buddy = account
            .buddies
            .iter_mut()
            .find(|b| &b.email == buddy_email)
            .ok_or_else(|| PaymentError::BuddyNotFound(buddy_email.clone()))?;
        buddy.description = description.trim().to_string();

        self.accounts.save(account).await
    }

    pub async fn remove(&self, email: &AccountId, buddy_email: &AccountId) -> Result<UserAccount> {
        let mut account = self.require(email).await?;
        let before = account.buddies.len();
        account.buddies.retain(|b| &b.email != buddy_email);
        if account.buddies.len() == before {
            return Err(PaymentError::BuddyNotFound(buddy_email.clone()));
        }

        let saved = self.accounts.save(account).await?;
        info!(%email, buddy = %buddy_email, "Buddy removed");
        Ok(saved)
    }

    pub async fn list(&self, email: &AccountId) -> Result<Vec<Buddy>> {
        Ok(self.require(email).await?.buddies)
    }

    async fn require(&self, email: &AccountId) -> Result<UserAccount> {
        self.accounts
            .get(email)
            .await?
            .ok_or_else(|| PaymentError::AccountNotFound(email.clone()))
    }
}
