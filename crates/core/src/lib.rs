//! # Kimbank Core
//!
//! Domain types shared by the persistence layer and the interactive client.
//!
//! The bank's ledger lives in stored procedures on the server; this crate only
//! models what the client sends to them ([`ProcedureCall`]), the menu commands
//! it understands ([`Command`]) and who is currently logged in ([`Session`]).

pub mod account;
pub mod command;
pub mod error;
pub mod procedure;
pub mod session;

pub use account::{AccountType, Registration};
pub use command::Command;
pub use error::{CoreError, CoreResult};
pub use procedure::{ProcedureArg, ProcedureCall};
pub use session::Session;
