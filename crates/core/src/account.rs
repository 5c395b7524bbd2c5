//! # Account Module
//!
//! `AccountType` and the transient `Registration` record sent to the
//! server-side `register` procedure.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// Kind of account requested at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    /// Bank customer
    Client,
    /// Bank staff
    Employee,
}

impl AccountType {
    /// Label understood by the `register` procedure
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Client => "client",
            AccountType::Employee => "employee",
        }
    }
}

impl FromStr for AccountType {
    type Err = CoreError;

    /// Only the exact labels are accepted; the server compares them verbatim.
    fn from_str(s: &str) -> CoreResult<Self> {
        match s.trim() {
            "client" => Ok(AccountType::Client),
            "employee" => Ok(AccountType::Employee),
            other => Err(CoreError::InvalidAccountType(other.to_string())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the `register` procedure needs, in the order it needs it.
///
/// Not stored by the client: built from prompts, sent once, dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub national_id: String,
    /// Free-form "yy/mm/dd"; the server decides whether it is valid
    pub date_of_birth: String,
    pub account_type: AccountType,
    pub interest_rate: i32,
}
