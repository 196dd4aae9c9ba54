use crate::application::service::Operation;
use crate::application::users::NewUser;
use crate::domain::account::AccountId;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Register,
    LinkBank,
    UnlinkBank,
    Deposit,
    Withdraw,
    AddBuddy,
    UpdateBuddy,
    RemoveBuddy,
    Transfer,
}

/// One CSV line: `type, user, arg, amount, description`.
///
/// The meaning of `arg` depends on the type: a password for `register`, an
/// IBAN for bank operations, the counterpart's email otherwise.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OperationRow {
    pub r#type: OperationType,
    pub user: String,
    #[serde(default)]
    pub arg: String,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<OperationRow> for Operation {
    type Error = PaymentError;

    fn try_from(row: OperationRow) -> Result<Self> {
        let user = AccountId::new(&row.user)?;
        let description = row.description.unwrap_or_default();
        let amount = |kind: &str| {
            row.amount
                .ok_or_else(|| PaymentError::ValidationError(format!("{kind} requires an amount")))
        };

        Ok(match row.r#type {
            OperationType::Register => {
                let (first_name, last_name) = description
                    .trim()
                    .split_once(char::is_whitespace)
                    .map(|(first, last)| (first.to_string(), last.trim().to_string()))
                    .unwrap_or_else(|| (description.trim().to_string(), String::new()));
                Operation::Register(NewUser {
                    email: user.to_string(),
                    first_name,
                    last_name,
                    password: row.arg,
                })
            }
            OperationType::LinkBank => Operation::LinkBank {
                user,
                iban: row.arg,
                description,
            },
            OperationType::UnlinkBank => Operation::UnlinkBank {
                user,
                iban: row.arg,
            },
            OperationType::Deposit => Operation::Deposit {
                amount: amount("deposit")?,
                user,
                iban: row.arg,
            },
            OperationType::Withdraw => Operation::Withdraw {
                amount: amount("withdraw")?,
                user,
                iban: row.arg,
            },
            OperationType::AddBuddy => Operation::AddBuddy {
                user,
                buddy: AccountId::new(&row.arg)?,
                description,
            },
            OperationType::UpdateBuddy => Operation::UpdateBuddy {
                user,
                buddy: AccountId::new(&row.arg)?,
                description,
            },
            OperationType::RemoveBuddy => Operation::RemoveBuddy {
                user,
                buddy: AccountId::new(&row.arg)?,
            },
            OperationType::Transfer => Operation::Transfer {
                amount: amount("transfer")?,
                sender: user,
                receiver: AccountId::new(&row.arg)?,
                description,
            },
        })
    }
}

/// Reads operations from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Operation>`.
/// It handles whitespace trimming and short records (missing trailing columns)
/// automatically.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    /// Creates a new `OperationReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and converts operations.
    ///
    /// Large files are processed in a streaming fashion without loading the
    /// entire dataset into memory.
    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize::<OperationRow>()
            .map(|result| result.map_err(PaymentError::from).and_then(Operation::try_from))
    }
}
