//! # Procedure Module
//!
//! The server-side procedures the client may call, with their positional
//! argument orders. The client never sees what they do; it only builds the
//! call and hands it to a `ProcedureExecutor`.

use crate::account::Registration;
use std::fmt;

/// A single positional argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureArg {
    Text(String),
    Integer(i64),
}

impl From<&str> for ProcedureArg {
    fn from(value: &str) -> Self {
        ProcedureArg::Text(value.to_string())
    }
}

impl From<String> for ProcedureArg {
    fn from(value: String) -> Self {
        ProcedureArg::Text(value)
    }
}

impl From<i64> for ProcedureArg {
    fn from(value: i64) -> Self {
        ProcedureArg::Integer(value)
    }
}

impl From<i32> for ProcedureArg {
    fn from(value: i32) -> Self {
        ProcedureArg::Integer(i64::from(value))
    }
}

impl fmt::Display for ProcedureArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureArg::Text(s) => write!(f, "'{}'", s),
            ProcedureArg::Integer(n) => write!(f, "{}", n),
        }
    }
}

/// A call to a named stored procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCall {
    pub name: &'static str,
    pub args: Vec<ProcedureArg>,
}

impl ProcedureCall {
    pub fn new(name: &'static str, args: Vec<ProcedureArg>) -> Self {
        Self { name, args }
    }

    /// `register(username, password, firstname, lastname, nationalID, dateOfBirth, accountType, interestRate)`
    pub fn register(reg: &Registration) -> Self {
        Self::new(
            "register",
            vec![
                reg.username.as_str().into(),
                reg.password.as_str().into(),
                reg.first_name.as_str().into(),
                reg.last_name.as_str().into(),
                reg.national_id.as_str().into(),
                reg.date_of_birth.as_str().into(),
                reg.account_type.as_str().into(),
                reg.interest_rate.into(),
            ],
        )
    }

    /// `login(username, password)`
    pub fn login(username: &str, password: &str) -> Self {
        Self::new("login", vec![username.into(), password.into()])
    }

    /// `deposit(amount)`
    pub fn deposit(amount: i64) -> Self {
        Self::new("deposit", vec![amount.into()])
    }

    /// `withdraw(amount)`
    pub fn withdraw(amount: i64) -> Self {
        Self::new("withdraw", vec![amount.into()])
    }

    /// `transfer(amount, destinationAccountNumber)`
    pub fn transfer(amount: i64, to_account: i32) -> Self {
        Self::new("transfer", vec![amount.into(), to_account.into()])
    }

    /// `updateBalances()`
    pub fn update_balances() -> Self {
        Self::new("updateBalances", Vec::new())
    }

    /// `checkBalance()`
    pub fn check_balance() -> Self {
        Self::new("checkBalance", Vec::new())
    }

    /// SQL text with numbered placeholders, e.g. `CALL transfer($1, $2)`
    pub fn sql(&self) -> String {
        let placeholders = (1..=self.args.len())
            .map(|i| format!("${}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CALL {}({})", self.name, placeholders)
    }

    fn masks_arg(&self, index: usize) -> bool {
        matches!((self.name, index), ("register", 1) | ("login", 1))
    }
}

/// Human-readable form for logs. Passwords are masked.
impl fmt::Display for ProcedureCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if self.masks_arg(i) {
                write!(f, "'***'")?;
            } else {
                write!(f, "{}", arg)?;
            }
        }
        write!(f, ")")
    }
}
