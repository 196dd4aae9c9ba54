use crate::config::LedgerConfig;
use crate::domain::account::{AccountId, Amount, Balance, UserAccount};
use crate::domain::ledger::{FeeSchedule, StagedChanges};
use crate::domain::ports::{AccountStoreRef, TransactionLogRef};
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Moves money between wallets.
///
/// `LedgerEngine` is the only writer of balances. Every operation stages its
/// changes on copies of the accounts involved, validates all preconditions
/// (including that the operator account exists) and only then commits the
/// copies with a single compare-and-save batch. Operations are serialized
/// through an async mutex so two transfers touching the same wallet never race.
pub struct LedgerEngine {
    accounts: AccountStoreRef,
    transactions: TransactionLogRef,
    config: LedgerConfig,
    fees: FeeSchedule,
    write_lock: Mutex<()>,
}

impl LedgerEngine {
    /// Creates a new `LedgerEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `accounts` - The store for user accounts.
    /// * `transactions` - The log completed transfers are appended to.
    /// * `config` - Operator identity and fee policy.
    pub fn new(
        accounts: AccountStoreRef,
        transactions: TransactionLogRef,
        config: LedgerConfig,
    ) -> Self {
        let fees = config.fee_schedule();
        Self {
            accounts,
            transactions,
            config,
            fees,
            write_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Transfers `amount` from `sender` to `receiver`.
    ///
    /// The sender pays `amount` plus the fee; the receiver gains exactly
    /// `amount`; the operator account collects the fee. Either all three
    /// balances change and one [`TransactionRecord`] is appended, or nothing
    /// changes.
    pub async fn transfer(
        &self,
        sender: &AccountId,
        receiver: &AccountId,
        description: &str,
        amount: Decimal,
    ) -> Result<TransactionRecord> {
        let _guard = self.write_lock.lock().await;

        let sender_account = self.require(sender).await?;
        let receiver_account = self.require(receiver).await?;
        self.check_parties(sender, receiver)?;

        let quote = self.fees.quote(amount).inspect_err(|e| {
            warn!(%sender, %receiver, "Transfer rejected: {}", e);
        })?;
        debug!(
            %sender,
            %receiver,
            amount = %quote.amount,
            fee = %quote.fee,
            "Staging transfer"
        );

        let mut stage = StagedChanges::new();
        stage.include(sender_account);
        stage.include(receiver_account);
        stage
            .debit(sender, quote.total_debit)
            .inspect_err(|e| warn!(%sender, "Transfer rejected: {}", e))?;
        stage.credit(receiver, quote.amount.into())?;

        let operator = self.require_operator().await?;
        stage.include(operator);
        stage.credit(&self.config.operator, quote.fee)?;

        let deltas = stage.deltas();
        self.accounts.save_all(stage.into_accounts()).await?;

        let record = TransactionRecord::new(
            sender.clone(),
            receiver.clone(),
            Utc::now().date_naive(),
            description,
            quote.amount,
        );
        let record = match self.transactions.append(record).await {
            Ok(record) => record,
            Err(e) => return Err(self.compensate(&deltas, e).await),
        };

        info!(
            id = %record.id,
            %sender,
            %receiver,
            amount = %quote.amount,
            fee = %quote.fee,
            "Transfer committed"
        );
        Ok(record)
    }

    /// Returns every transfer sent by `sender`, oldest day first.
    ///
    /// Each call reads a fresh snapshot of the log. An unknown sender simply has
    /// no transfers.
    pub async fn list_transfers_by_sender(
        &self,
        sender: &AccountId,
    ) -> Result<Vec<TransactionRecord>> {
        let mut records = self.transactions.find_by_sender(sender).await?;
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Funds a wallet from the user's linked bank account.
    pub async fn deposit_from_bank(
        &self,
        user: &AccountId,
        iban: &str,
        amount: Decimal,
    ) -> Result<UserAccount> {
        let amount = Amount::new(amount)?;
        let _guard = self.write_lock.lock().await;

        let mut account = self.require(user).await?;
        account.ensure_bank_account(iban)?;
        account.credit(amount.into())?;

        let saved = self.accounts.save(account).await?;
        info!(%user, %amount, balance = %saved.balance, "Deposit from bank committed");
        Ok(saved)
    }

    /// Moves funds from a wallet back to the user's linked bank account.
    pub async fn withdraw_to_bank(
        &self,
        user: &AccountId,
        iban: &str,
        amount: Decimal,
    ) -> Result<UserAccount> {
        let amount = Amount::new(amount)?;
        let _guard = self.write_lock.lock().await;

        let mut account = self.require(user).await?;
        account.ensure_bank_account(iban)?;
        account.debit(amount.into())?;

        let saved = self.accounts.save(account).await?;
        info!(%user, %amount, balance = %saved.balance, "Withdrawal to bank committed");
        Ok(saved)
    }

    async fn require(&self, id: &AccountId) -> Result<UserAccount> {
        self.accounts
            .get(id)
            .await?
            .ok_or_else(|| PaymentError::AccountNotFound(id.clone()))
    }

    async fn require_operator(&self) -> Result<UserAccount> {
        let operator = &self.config.operator;
        match self.accounts.get(operator).await? {
            Some(account) => Ok(account),
            None => {
                error!(%operator, "Operator account is missing, no fee can be collected");
                Err(PaymentError::OperatorAccountMisconfigured(operator.clone()))
            }
        }
    }

    fn check_parties(&self, sender: &AccountId, receiver: &AccountId) -> Result<()> {
        let operator = &self.config.operator;
        if sender == operator || receiver == operator {
            return Err(PaymentError::ValidationError(format!(
                "The operator account {operator} cannot take part in a transfer"
            )));
        }
        if sender == receiver && !self.config.allow_self_transfer {
            return Err(PaymentError::ValidationError(format!(
                "{sender} cannot transfer money to themselves"
            )));
        }
        Ok(())
    }

    /// Reverts committed balance changes after the log refused the record.
    ///
    /// Returns the error to hand back to the caller: the original failure, or an
    /// internal error naming both failures if the revert did not go through.
    async fn compensate(
        &self,
        deltas: &[(AccountId, Balance)],
        cause: PaymentError,
    ) -> PaymentError {
        error!("Transaction log append failed: {}, reverting balances", cause);

        let result: Result<()> = async {
            let mut restored = Vec::with_capacity(deltas.len());
            for (id, delta) in deltas {
                let mut account = self.require(id).await?;
                account.balance = account.balance.checked_sub(*delta).ok_or_else(|| {
                    PaymentError::internal(format!("Reverting {delta} on {id} overflowed"))
                })?;
                restored.push(account);
            }
            self.accounts.save_all(restored).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("Balances reverted after failed append");
                cause
            }
            Err(revert) => {
                error!("Failed to revert balances: {}", revert);
                PaymentError::internal(format!(
                    "Transaction log append failed ({cause}) and balances could not be reverted ({revert})"
                ))
            }
        }
    }
}
