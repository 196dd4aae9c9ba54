use super::bank::BankAccountService;
use super::buddies::BuddyService;
use super::engine::LedgerEngine;
use super::users::{NewUser, UserService};
use crate::config::LedgerConfig;
use crate::domain::account::AccountId;
use crate::domain::ports::{AccountStoreRef, CredentialHasherRef, TransactionLogRef};
use crate::error::Result;
use rust_decimal::Decimal;

/// One user-initiated request, as read by an interface adapter.
#[derive(Debug, Clone)]
pub enum Operation {
    Register(NewUser),
    LinkBank {
        user: AccountId,
        iban: String,
        description: String,
    },
    UnlinkBank {
        user: AccountId,
        iban: String,
    },
    Deposit {
        user: AccountId,
        iban: String,
        amount: Decimal,
    },
    Withdraw {
        user: AccountId,
        iban: String,
        amount: Decimal,
    },
    AddBuddy {
        user: AccountId,
        buddy: AccountId,
        description: String,
    },
    UpdateBuddy {
        user: AccountId,
        buddy: AccountId,
        description: String,
    },
    RemoveBuddy {
        user: AccountId,
        buddy: AccountId,
    },
    Transfer {
        sender: AccountId,
        receiver: AccountId,
        description: String,
        amount: Decimal,
    },
}

/// Every service of the application wired to one set of stores.
pub struct PayMyBuddy {
    pub users: UserService,
    pub bank: BankAccountService,
    pub buddies: BuddyService,
    pub ledger: LedgerEngine,
}

impl PayMyBuddy {
    pub fn new(
        accounts: AccountStoreRef,
        transactions: TransactionLogRef,
        hasher: CredentialHasherRef,
        config: LedgerConfig,
    ) -> Self {
        Self {
            users: UserService::new(accounts.clone(), hasher, config.operator.clone()),
            bank: BankAccountService::new(accounts.clone()),
            buddies: BuddyService::new(accounts.clone()),
            ledger: LedgerEngine::new(accounts, transactions, config),
        }
    }

    /// Dispatches `operation` to the service that owns it.
    pub async fn apply(&self, operation: Operation) -> Result<()> {
        match operation {
            Operation::Register(form) => {
                self.users.register(form).await?;
            }
            Operation::LinkBank {
                user,
                iban,
                description,
            } => {
                self.bank.link(&user, &iban, &description).await?;
            }
            Operation::UnlinkBank { user, iban } => {
                self.bank.unlink(&user, &iban).await?;
            }
            Operation::Deposit { user, iban, amount } => {
                self.ledger.deposit_from_bank(&user, &iban, amount).await?;
            }
            Operation::Withdraw { user, iban, amount } => {
                self.ledger.withdraw_to_bank(&user, &iban, amount).await?;
            }
            Operation::AddBuddy {
                user,
                buddy,
                description,
            } => {
                self.buddies.add(&user, &buddy, &description).await?;
            }
            Operation::UpdateBuddy {
                user,
                buddy,
                description,
            } => {
                self.buddies.update(&user, &buddy, &description).await?;
            }
            Operation::RemoveBuddy { user, buddy } => {
                self.buddies.remove(&user, &buddy).await?;
            }
            Operation::Transfer {
                sender,
                receiver,
                description,
                amount,
            } => {
                self.ledger
                    .transfer(&sender, &receiver, &description, amount)
                    .await?;
            }
        }
        Ok(())
    }
}
