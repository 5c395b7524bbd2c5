//! # Notification Listener
//!
//! Subscribes to one `LISTEN` channel on a dedicated connection and hands
//! every payload to a callback, pinging the connection when it has been idle.
//!
//! Any transport error, a closed connection or a failed ping ends the listener
//! with an error. It never recovers on its own: the caller decides what a dead
//! listener means (the `kimbank` binary shuts down).

use crate::config::DbConfig;
use crate::connection::quote_ident;
use crate::error::{PersistenceError, PersistenceResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_postgres::{AsyncMessage, Client, NoTls};

/// A message received on the subscribed channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: String,
    pub payload: String,
    /// Backend process that sent the NOTIFY
    pub process_id: i32,
}

/// Something that yields notifications and can be pinged.
#[async_trait]
pub trait NotificationSource: Send {
    /// Wait for the next notification. Errors are transport failures.
    async fn next_notification(&mut self) -> PersistenceResult<Notification>;

    /// Keep-alive round trip
    async fn ping(&mut self) -> PersistenceResult<()>;
}

/// Listener connection to PostgreSQL
pub struct PgNotificationSource {
    client: Client,
    messages: mpsc::UnboundedReceiver<Result<AsyncMessage, tokio_postgres::Error>>,
}

impl PgNotificationSource {
    /// Open a separate connection and `LISTEN` on the configured channel
    pub async fn connect(config: &DbConfig) -> PersistenceResult<Self> {
        let (client, mut connection) = config
            .pg_config()
            .connect(NoTls)
            .await
            .map_err(PersistenceError::Listener)?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut messages =
                std::pin::pin!(futures::stream::poll_fn(move |cx| connection.poll_message(cx)));
            while let Some(message) = messages.next().await {
                let failed = message.is_err();
                if tx.send(message).is_err() || failed {
                    break;
                }
            }
        });

        client
            .batch_execute(&format!("LISTEN {}", quote_ident(&config.channel)))
            .await
            .map_err(PersistenceError::Listener)?;
        tracing::info!(channel = %config.channel, "Listening for notifications");

        Ok(Self {
            client,
            messages: rx,
        })
    }
}

#[async_trait]
impl NotificationSource for PgNotificationSource {
    async fn next_notification(&mut self) -> PersistenceResult<Notification> {
        loop {
            match self.messages.recv().await {
                Some(Ok(AsyncMessage::Notification(n))) => {
                    return Ok(Notification {
                        channel: n.channel().to_string(),
                        payload: n.payload().to_string(),
                        process_id: n.process_id(),
                    });
                }
                Some(Ok(AsyncMessage::Notice(notice))) => {
                    tracing::info!(severity = notice.severity(), "{}", notice.message());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(PersistenceError::Listener(e)),
                None => return Err(PersistenceError::ListenerClosed),
            }
        }
    }

    async fn ping(&mut self) -> PersistenceResult<()> {
        self.client
            .simple_query("SELECT 1")
            .await
            .map_err(PersistenceError::KeepAlive)?;
        Ok(())
    }
}

/// Deliver notifications to `on_notify` until the source fails.
///
/// Whenever `idle` passes without a notification the source is pinged.
/// Only returns on error.
pub async fn run_listener<S, F>(
    mut source: S,
    idle: Duration,
    mut on_notify: F,
) -> Result<Infallible, PersistenceError>
where
    S: NotificationSource,
    F: FnMut(Notification) + Send,
{
    loop {
        match tokio::time::timeout(idle, source.next_notification()).await {
            Ok(Ok(notification)) => on_notify(notification),
            Ok(Err(e)) => {
                tracing::error!("Notification listener stopped: {}", e);
                return Err(e);
            }
            Err(_) => {
                tracing::debug!(?idle, "No notification, pinging listener connection");
                if let Err(e) = source.ping().await {
                    tracing::error!("Notification listener keep-alive failed: {}", e);
                    return Err(e);
                }
            }
        }
    }
}
