//! # Kimbank Persistence
//!
//! Everything that talks to PostgreSQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       PostgreSQL                         │
//! │  ┌──────────────────────┐      ┌──────────────────────┐  │
//! │  │  command connection  │      │ listener connection  │  │
//! │  │  SET search_path     │      │ LISTEN raise_notice  │  │
//! │  │  CALL deposit($1)... │      │ SELECT 1 (idle ping) │  │
//! │  └──────────────────────┘      └──────────────────────┘  │
//! │        PgDatabase                PgNotificationSource     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kimbank_persistence::{DbConfig, PgDatabase, ProcedureExecutor};
//!
//! let config = DbConfig::default();
//! let db = PgDatabase::connect(&config).await?;
//! db.set_namespace(&config.schema).await?;
//! db.invoke(&ProcedureCall::deposit(500)).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod listener;

pub use config::{DbConfig, SslMode};
pub use connection::PgDatabase;
pub use error::{PersistenceError, PersistenceResult};
pub use executor::ProcedureExecutor;
pub use listener::{run_listener, Notification, NotificationSource, PgNotificationSource};
