use crate::domain::account::{AccountId, Balance, UserAccount};
use crate::domain::ports::{AccountStoreRef, CredentialHasherRef};
use crate::error::{PaymentError, Result};
use tracing::{info, warn};

/// Registration form for a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// User lifecycle: registration, profile edits, credentials and removal.
pub struct UserService {
    accounts: AccountStoreRef,
    hasher: CredentialHasherRef,
    operator: AccountId,
}

impl UserService {
    pub fn new(accounts: AccountStoreRef, hasher: CredentialHasherRef, operator: AccountId) -> Self {
        Self {
            accounts,
            hasher,
            operator,
        }
    }

    pub async fn register(&self, form: NewUser) -> Result<UserAccount> {
        let email = AccountId::new(&form.email)?;
        if !email.as_str().contains('@') {
            return Err(PaymentError::ValidationError(format!(
                "{email} is not an email address"
            )));
        }
        if form.password.is_empty() {
            return Err(PaymentError::validation("Password must not be empty"));
        }
        if self.accounts.get(&email).await?.is_some() {
            return Err(PaymentError::AccountExists(email));
        }

        let hash = self.hasher.hash(&form.password)?;
        let account = UserAccount::new(
            email,
            form.first_name.trim(),
            form.last_name.trim(),
            hash,
        );
        // A concurrent registration of the same email loses the version check.
        let saved = self.accounts.save(account).await.map_err(|e| match e {
            PaymentError::ConcurrentModification(id) => PaymentError::AccountExists(id),
            other => other,
        })?;
        info!(email = %saved.email, "User registered");
        Ok(saved)
    }

    pub async fn get(&self, email: &AccountId) -> Result<UserAccount> {
        self.accounts
            .get(email)
            .await?
            .ok_or_else(|| PaymentError::AccountNotFound(email.clone()))
    }

    /// Every account, sorted by email.
    pub async fn all(&self) -> Result<Vec<UserAccount>> {
        let mut accounts = self.accounts.all().await?;
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }

    pub async fn update_profile(
        &self,
        email: &AccountId,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserAccount> {
        let mut account = self.get(email).await?;
        account.first_name = first_name.trim().to_string();
        account.last_name = last_name.trim().to_string();
        self.accounts.save(account).await
    }

    pub async fn change_password(&self, email: &AccountId, password: &str) -> Result<UserAccount> {
        if password.is_empty() {
            return Err(PaymentError::validation("Password must not be empty"));
        }
        let mut account = self.get(email).await?;
        account.password_hash = self.hasher.hash(password)?;
        self.accounts.save(account).await
    }

    /// Unknown users never verify.
    pub async fn verify_credentials(&self, email: &AccountId, password: &str) -> Result<bool> {
        Ok(match self.accounts.get(email).await? {
            Some(account) => self.hasher.verify(password, &account.password_hash),
            None => false,
        })
    }

    pub async fn delete(&self, email: &AccountId) -> Result<()> {
        if email == &self.operator {
            return Err(PaymentError::validation("The operator account cannot be deleted"));
        }
        let account = self.get(email).await?;
        if account.balance != Balance::ZERO {
            return Err(PaymentError::ValidationError(format!(
                "{email} still holds {}, withdraw it before closing the account",
                account.balance
            )));
        }
        // Fails if a transfer credited the account since it was read.
        self.accounts.delete(email, account.version).await?;
        info!(%email, "User deleted");
        Ok(())
    }

    /// Creates the operator account if it does not exist yet.
    ///
    /// Its password hash is derived from a random value nobody knows, so it can
    /// never log in.
    pub async fn ensure_operator(&self) -> Result<UserAccount> {
        if let Some(existing) = self.accounts.get(&self.operator).await? {
            return Ok(existing);
        }
        warn!(operator = %self.operator, "Operator account missing, provisioning it");
        let secret = uuid::Uuid::new_v4().to_string();
        let account = UserAccount::new(
            self.operator.clone(),
            "PayMyBuddy",
            "Operator",
            self.hasher.hash(&secret)?,
        );
        self.accounts.save(account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_OPERATOR;
    use crate::domain::ports::{AccountStore, CredentialHasher};
    use crate::infrastructure::in_memory::InMemoryAccountStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    /// Reversible stand-in, keeps the tests fast.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{password}")
        }
    }

    fn service() -> (UserService, InMemoryAccountStore) {
        let store = InMemoryAccountStore::new();
        let service = UserService::new(
            Arc::new(store.clone()),
            Arc::new(PlainHasher),
            AccountId::new(DEFAULT_OPERATOR).unwrap(),
        );
        (service, store)
    }

    /// Credits the account right before forwarding a delete, like a transfer
    /// committing between the balance check and the removal.
    struct CreditBeforeDelete(InMemoryAccountStore);

    #[async_trait]
    impl AccountStore for CreditBeforeDelete {
        async fn get(&self, id: &AccountId) -> Result<Option<UserAccount>> {
            self.0.get(id).await
        }

        async fn save(&self, account: UserAccount) -> Result<UserAccount> {
            self.0.save(account).await
        }

        async fn save_all(&self, accounts: Vec<UserAccount>) -> Result<Vec<UserAccount>> {
            self.0.save_all(accounts).await
        }

        async fn delete(&self, id: &AccountId, version: u64) -> Result<()> {
            if let Some(mut account) = self.0.get(id).await? {
                account.balance = Balance::new(dec!(10));
                self.0.save(account).await?;
            }
            self.0.delete(id, version).await
        }

        async fn all(&self) -> Result<Vec<UserAccount>> {
            self.0.all().await
        }
    }

    fn form(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: " Alice ".to_string(),
            last_name: "Liddell".to_string(),
            password: "wonderland".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (service, _store) = service();
        let user = service.register(form("alice@mail.com")).await.unwrap();

        assert_eq!(user.first_name, "Alice");
        assert_eq!(user.balance, Balance::ZERO);
        assert_eq!(user.password_hash, "plain:wonderland");

        let email = AccountId::new("alice@mail.com").unwrap();
        assert!(service.verify_credentials(&email, "wonderland").await.unwrap());
        assert!(!service.verify_credentials(&email, "looking-glass").await.unwrap());
        let ghost = AccountId::new("ghost@mail.com").unwrap();
        assert!(!service.verify_credentials(&ghost, "wonderland").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let (service, _store) = service();
        service.register(form("alice@mail.com")).await.unwrap();

        assert!(matches!(
            service.register(form("alice@mail.com")).await,
            Err(PaymentError::AccountExists(_))
        ));
        assert!(matches!(
            service.register(form("not-an-email")).await,
            Err(PaymentError::ValidationError(_))
        ));
        let mut no_password = form("bob@mail.com");
        no_password.password.clear();
        assert!(matches!(
            service.register(no_password).await,
            Err(PaymentError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_and_password_updates() {
        let (service, _store) = service();
        service.register(form("alice@mail.com")).await.unwrap();
        let email = AccountId::new("alice@mail.com").unwrap();

        let updated = service
            .update_profile(&email, "Alicia", "Liddell-Hargreaves")
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Alicia");
        assert_eq!(updated.last_name, "Liddell-Hargreaves");

        service.change_password(&email, "rabbit-hole").await.unwrap();
        assert!(service.verify_credentials(&email, "rabbit-hole").await.unwrap());
        assert!(!service.verify_credentials(&email, "wonderland").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let (service, store) = service();
        service.register(form("alice@mail.com")).await.unwrap();
        let email = AccountId::new("alice@mail.com").unwrap();

        let mut funded = store.get(&email).await.unwrap().unwrap();
        funded.balance = Balance::new(dec!(3));
        let funded = store.save(funded).await.unwrap();
        assert!(matches!(
            service.delete(&email).await,
            Err(PaymentError::ValidationError(_))
        ));

        let mut empty = funded;
        empty.balance = Balance::ZERO;
        store.save(empty).await.unwrap();
        service.delete(&email).await.unwrap();
        assert!(matches!(
            service.get(&email).await,
            Err(PaymentError::AccountNotFound(_))
        ));

        service.ensure_operator().await.unwrap();
        let operator = AccountId::new(DEFAULT_OPERATOR).unwrap();
        assert!(service.delete(&operator).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_loses_to_concurrent_credit() {
        let store = InMemoryAccountStore::new();
        let service = UserService::new(
            Arc::new(CreditBeforeDelete(store.clone())),
            Arc::new(PlainHasher),
            AccountId::new(DEFAULT_OPERATOR).unwrap(),
        );
        service.register(form("alice@mail.com")).await.unwrap();
        let email = AccountId::new("alice@mail.com").unwrap();

        let err = service.delete(&email).await.unwrap_err();

        assert!(matches!(err, PaymentError::ConcurrentModification(_)));
        let kept = store.get(&email).await.unwrap().unwrap();
        assert_eq!(kept.balance, Balance::new(dec!(10)));
    }

    #[tokio::test]
    async fn test_ensure_operator_is_idempotent() {
        let (service, _store) = service();
        let first = service.ensure_operator().await.unwrap();
        let second = service.ensure_operator().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.email.as_str(), DEFAULT_OPERATOR);
        assert_eq!(service.all().await.unwrap().len(), 1);
    }
}
