use super::account::AccountId;
use serde::{Deserialize, Serialize};

/// A contact in a user's buddy list.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Buddy {
    pub email: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub description: String,
}
