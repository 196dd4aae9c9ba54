use crate::domain::account::UserAccount;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct AccountRow<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    balance: String,
    bank_account: &'a str,
    buddies: String,
}

impl<'a> From<&'a UserAccount> for AccountRow<'a> {
    fn from(account: &'a UserAccount) -> Self {
        let buddies = account
            .buddies
            .iter()
            .map(|b| b.email.as_str())
            .collect::<Vec<_>>()
            .join(";");
        Self {
            email: account.email.as_str(),
            first_name: &account.first_name,
            last_name: &account.last_name,
            balance: account.balance.to_string(),
            bank_account: account
                .bank_account
                .as_ref()
                .map(|bank| bank.iban.as_str())
                .unwrap_or_default(),
            buddies,
        }
    }
}

/// Writes the final account snapshot, one row per account sorted by email.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts(&mut self, mut accounts: Vec<UserAccount>) -> Result<()> {
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        for account in &accounts {
            self.writer.serialize(AccountRow::from(account))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
