//! Connection manager for the command connection.

use crate::config::DbConfig;
use crate::error::{PersistenceError, PersistenceResult};
use crate::executor::ProcedureExecutor;
use async_trait::async_trait;
use bytes::BytesMut;
use chrono::NaiveDate;
use futures::StreamExt;
use kimbank_core::{ProcedureArg, ProcedureCall};
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{to_sql_checked, IsNull, Kind, ToSql, Type};
use tokio_postgres::{AsyncMessage, Client, NoTls};

/// The single connection used for stored procedure calls.
pub struct PgDatabase {
    client: Client,
}

impl PgDatabase {
    /// Open the connection and make sure the server answers.
    ///
    /// The connection is driven by a spawned task which also surfaces server
    /// `NOTICE` messages (e.g. `RAISE NOTICE` inside a procedure) as log lines.
    pub async fn connect(config: &DbConfig) -> PersistenceResult<Self> {
        let (client, mut connection) = config
            .pg_config()
            .connect(NoTls)
            .await
            .map_err(PersistenceError::Connect)?;

        tokio::spawn(async move {
            let mut messages =
                std::pin::pin!(futures::stream::poll_fn(move |cx| connection.poll_message(cx)));
            while let Some(message) = messages.next().await {
                match message {
                    Ok(AsyncMessage::Notice(notice)) => {
                        tracing::info!(severity = notice.severity(), "{}", notice.message());
                    }
                    Ok(AsyncMessage::Notification(n)) => {
                        tracing::debug!(channel = n.channel(), "{}", n.payload());
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!("Connection error: {}", e);
                        break;
                    }
                }
            }
        });

        let db = Self { client };
        db.ping().await?;
        tracing::info!("Connected to {}", config.describe());
        Ok(db)
    }

    /// Round trip to check the server is alive
    pub async fn ping(&self) -> PersistenceResult<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(PersistenceError::Ping)?;
        Ok(())
    }

    /// Select the schema the procedures live in, for the rest of the session
    pub async fn set_namespace(&self, schema: &str) -> PersistenceResult<()> {
        self.client
            .batch_execute(&format!("SET search_path TO {}", quote_ident(schema)))
            .await
            .map_err(|source| PersistenceError::Namespace {
                schema: schema.to_string(),
                source,
            })?;
        tracing::debug!(schema, "search_path set");
        Ok(())
    }
}

#[async_trait]
impl ProcedureExecutor for PgDatabase {
    async fn invoke(&self, call: &ProcedureCall) -> PersistenceResult<u64> {
        let args: Vec<SqlArg<'_>> = call.args.iter().map(SqlArg).collect();
        let params: Vec<&(dyn ToSql + Sync)> =
            args.iter().map(|a| a as &(dyn ToSql + Sync)).collect();

        tracing::debug!(sql = %call.sql(), "invoking {}", call);
        self.client
            .execute(call.sql().as_str(), &params)
            .await
            .map_err(|e| PersistenceError::procedure(call.name, &e))
    }
}

/// Quote an SQL identifier (schema or channel name)
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Date layouts accepted for `date` parameters, prompt format first
const DATE_FORMATS: [&str; 2] = ["%y/%m/%d", "%Y-%m-%d"];

/// Binds a `ProcedureArg` to whatever parameter type the server declared.
///
/// Integers fit `int2`/`int4`/`int8` (range-checked), `numeric`, or travel as
/// text. Text fits text types and enums, so `account_type` may be a server
/// enum, and `date` when it reads as yy/mm/dd or yyyy-mm-dd.
#[derive(Debug)]
struct SqlArg<'a>(&'a ProcedureArg);

impl ToSql for SqlArg<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self.0 {
            ProcedureArg::Integer(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql(ty, out)
                } else if *ty == Type::INT8 {
                    v.to_sql(ty, out)
                } else if *ty == Type::NUMERIC {
                    Decimal::from(*v).to_sql(ty, out)
                } else {
                    v.to_string().as_str().to_sql_checked(ty, out)
                }
            }
            ProcedureArg::Text(s) => {
                if let Kind::Enum(_) = ty.kind() {
                    // Binary enum values are their label bytes
                    out.extend_from_slice(s.as_bytes());
                    Ok(IsNull::No)
                } else if *ty == Type::DATE {
                    parse_date(s)?.to_sql(ty, out)
                } else {
                    s.as_str().to_sql_checked(ty, out)
                }
            }
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
            || *ty == Type::INT2
            || *ty == Type::INT4
            || *ty == Type::INT8
            || *ty == Type::NUMERIC
            || *ty == Type::DATE
            || <&str as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

fn parse_date(s: &str) -> Result<NaiveDate, Box<dyn Error + Sync + Send>> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("invalid date '{}', expected yy/mm/dd", s).into())
}
