use crate::domain::transaction::TransactionRecord;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    id: String,
    sender: &'a str,
    receiver: &'a str,
    date: String,
    description: &'a str,
    amount: String,
}

/// Writes a sender's transfer history in the order it is given.
pub struct HistoryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> HistoryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_records(&mut self, records: &[TransactionRecord]) -> Result<()> {
        if records.is_empty() {
            self.writer.write_record(["id", "sender", "receiver", "date", "description", "amount"])?;
        }
        for record in records {
            self.writer.serialize(HistoryRow {
                id: record.id.to_string(),
                sender: record.sender.as_str(),
                receiver: record.receiver.as_str(),
                date: record.date.format("%Y-%m-%d").to_string(),
                description: &record.description,
                amount: record.amount.value().normalize().to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountId, Amount};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writes_header_and_rows() {
        let record = TransactionRecord::new(
            AccountId::new("alice@mail.com").unwrap(),
            AccountId::new("bob@mail.com").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            "pizza, drinks".to_string(),
            Amount::new(dec!(12.50)).unwrap(),
        );
        let mut out = Vec::new();
        HistoryWriter::new(&mut out)
            .write_records(std::slice::from_ref(&record))
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "id,sender,receiver,date,description,amount");
        assert_eq!(
            lines[1],
            format!("{},alice@mail.com,bob@mail.com,2024-03-09,\"pizza, drinks\",12.5", record.id)
        );
    }

    #[test]
    fn test_empty_history_still_has_header() {
        let mut out = Vec::new();
        HistoryWriter::new(&mut out).write_records(&[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "id,sender,receiver,date,description,amount\n"
        );
    }
}
