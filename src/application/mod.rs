//! Application layer containing the business operations.
//!
//! [`engine::LedgerEngine`] owns every balance change. The user, bank account
//! and buddy services edit the rest of the account record; all of them share
//! the same storage ports and rely on their compare-and-save semantics.

pub mod bank;
pub mod buddies;
pub mod engine;
pub mod service;
pub mod users;
