//! Integration tests against a live PostgreSQL server.
//!
//! Skipped unless `KIMBANK_TEST_DB_HOST` is set; the remaining connection
//! fields come from the usual `KIMBANK_DB_*` variables.

use kimbank_core::ProcedureCall;
use kimbank_persistence::{
    DbConfig, NotificationSource, PersistenceError, PgDatabase, PgNotificationSource,
    ProcedureExecutor,
};
use std::time::Duration;
use tokio_postgres::{Client, NoTls};

fn test_config(schema: &str, channel: &str) -> Option<DbConfig> {
    let host = std::env::var("KIMBANK_TEST_DB_HOST").ok()?;
    let mut config = DbConfig::default();
    config.apply_env().ok()?;
    config.host = host;
    config.schema = schema.to_string();
    config.channel = channel.to_string();
    Some(config)
}

async fn admin(config: &DbConfig) -> Client {
    let (client, connection) = config.pg_config().connect(NoTls).await.unwrap();
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("admin connection error: {}", e);
        }
    });
    client
}

async fn create_bank(client: &Client, schema: &str, channel: &str) {
    client
        .batch_execute(&format!(
            r#"
            DROP SCHEMA IF EXISTS {schema} CASCADE;
            CREATE SCHEMA {schema};
            CREATE TABLE {schema}.ledger (amount BIGINT NOT NULL, to_account INTEGER);
            CREATE PROCEDURE {schema}.deposit(p_amount BIGINT)
            LANGUAGE plpgsql AS $$
            BEGIN
                INSERT INTO {schema}.ledger (amount) VALUES (p_amount);
                PERFORM pg_notify('{channel}', 'deposited ' || p_amount);
            END
            $$;
            CREATE PROCEDURE {schema}.transfer(p_amount BIGINT, p_to_account INTEGER)
            LANGUAGE plpgsql AS $$
            BEGIN
                INSERT INTO {schema}.ledger VALUES (p_amount, p_to_account);
            END
            $$;
            "#
        ))
        .await
        .unwrap();
}

async fn drop_bank(client: &Client, schema: &str) {
    client
        .batch_execute(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_procedure_calls_reach_the_schema() {
    let schema = format!("kimbank_it_calls_{}", std::process::id());
    let Some(config) = test_config(&schema, "kimbank_it_calls") else {
        eprintln!("KIMBANK_TEST_DB_HOST not set, skipping");
        return;
    };
    let admin = admin(&config).await;
    create_bank(&admin, &schema, "kimbank_it_calls").await;

    let db = PgDatabase::connect(&config).await.unwrap();
    db.set_namespace(&config.schema).await.unwrap();

    db.invoke(&ProcedureCall::deposit(500)).await.unwrap();
    db.invoke(&ProcedureCall::transfer(75, 42)).await.unwrap();

    let rows = admin
        .query(
            &format!("SELECT amount, to_account FROM {}.ledger ORDER BY amount", schema),
            &[],
        )
        .await
        .unwrap();
    let ledger: Vec<(i64, Option<i32>)> = rows.iter().map(|r| (r.get(0), r.get(1))).collect();
    assert_eq!(ledger, vec![(75, Some(42)), (500, None)]);

    let missing = db.invoke(&ProcedureCall::check_balance()).await.unwrap_err();
    assert!(matches!(missing, PersistenceError::Procedure { name: "checkBalance", .. }));
    assert!(!missing.is_fatal());

    drop_bank(&admin, &schema).await;
}

#[tokio::test]
async fn test_listener_receives_procedure_notifications() {
    let schema = format!("kimbank_it_notify_{}", std::process::id());
    let channel = "kimbank_it_notify";
    let Some(config) = test_config(&schema, channel) else {
        eprintln!("KIMBANK_TEST_DB_HOST not set, skipping");
        return;
    };
    let admin = admin(&config).await;
    create_bank(&admin, &schema, channel).await;

    let mut source = PgNotificationSource::connect(&config).await.unwrap();
    source.ping().await.unwrap();

    let db = PgDatabase::connect(&config).await.unwrap();
    db.set_namespace(&config.schema).await.unwrap();
    db.invoke(&ProcedureCall::deposit(1000)).await.unwrap();

    let notification = tokio::time::timeout(Duration::from_secs(5), source.next_notification())
        .await
        .expect("no notification within 5s")
        .unwrap();
    assert_eq!(notification.channel, channel);
    assert_eq!(notification.payload, "deposited 1000");

    drop_bank(&admin, &schema).await;
}

#[tokio::test]
async fn test_unknown_schema_still_connects() {
    let Some(config) = test_config("kimbank_it_no_such_schema", "kimbank_it_none") else {
        eprintln!("KIMBANK_TEST_DB_HOST not set, skipping");
        return;
    };
    // search_path accepts schemas that do not exist; calls then fail instead
    let db = PgDatabase::connect(&config).await.unwrap();
    db.set_namespace(&config.schema).await.unwrap();
    let err = db.invoke(&ProcedureCall::deposit(1)).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Procedure { name: "deposit", .. }));
}
