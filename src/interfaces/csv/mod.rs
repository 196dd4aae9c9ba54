//! CSV batch interface: operations in, account and history snapshots out.

pub mod account_writer;
pub mod history_writer;
pub mod operation_reader;
