//! Menu commands understood by the interactive client.

use std::fmt;

/// Menu shown before every prompt
pub const MENU: &str = "Choose one of the following options:\n\
1) register\n\
2) login\n\
3) deposit\n\
4) withdraw\n\
5) transfer\n\
6) update balances\n\
7) check balance\n\
q) quit";

/// One menu selection, mapped once from the raw input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register,
    Login,
    Deposit,
    Withdraw,
    Transfer,
    UpdateBalances,
    CheckBalance,
    Quit,
    /// Anything else, kept for the error message
    Unknown(String),
}

impl Command {
    /// Map a raw input line to a command. Surrounding whitespace is ignored.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "1" => Command::Register,
            "2" => Command::Login,
            "3" => Command::Deposit,
            "4" => Command::Withdraw,
            "5" => Command::Transfer,
            "6" => Command::UpdateBalances,
            "7" => Command::CheckBalance,
            "q" | "quit" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }

    /// Whether the command needs a logged-in session
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Command::Deposit
                | Command::Withdraw
                | Command::Transfer
                | Command::UpdateBalances
                | Command::CheckBalance
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Register => write!(f, "register"),
            Command::Login => write!(f, "login"),
            Command::Deposit => write!(f, "deposit"),
            Command::Withdraw => write!(f, "withdraw"),
            Command::Transfer => write!(f, "transfer"),
            Command::UpdateBalances => write!(f, "update balances"),
            Command::CheckBalance => write!(f, "check balance"),
            Command::Quit => write!(f, "quit"),
            Command::Unknown(raw) => write!(f, "unknown ({})", raw),
        }
    }
}
