//! Domain model: accounts, transfers and the ports the application layer
//! talks to storage through.

pub mod account;
pub mod bank_account;
pub mod buddy;
pub mod ledger;
pub mod ports;
pub mod transaction;
