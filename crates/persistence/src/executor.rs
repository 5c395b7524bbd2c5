//! The seam between the interactive client and the database.

use crate::error::PersistenceResult;
use async_trait::async_trait;
use kimbank_core::ProcedureCall;

/// Runs stored procedure calls.
///
/// `PgDatabase` is the production implementation; tests substitute a
/// recorder so dispatch can be checked without a server.
#[async_trait]
pub trait ProcedureExecutor: Send + Sync {
    /// Execute the call with its arguments in order. Returns rows affected.
    async fn invoke(&self, call: &ProcedureCall) -> PersistenceResult<u64>;
}
