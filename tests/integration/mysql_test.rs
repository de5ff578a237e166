//! MySQL integration tests.
//!
//! Run the real connector against a live server. Each test works on its own
//! uniquely named table and drops it afterwards.

use askdb::assistant::SqlAssistant;
use askdb::config::Credentials;
use askdb::db::{Connector, DatabaseClient, MySqlClient, MySqlConnector, Value};
use askdb::error::AskError;
use askdb::llm::MockLlmClient;
use askdb::query::QueryOutcome;
use askdb::session::Session;
use std::sync::atomic::{AtomicUsize, Ordering};

static TABLE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Helper to get test credentials from DATABASE_URL.
fn get_test_credentials() -> Option<Credentials> {
    let url = std::env::var("DATABASE_URL").ok()?;
    Credentials::from_connection_string(&url).ok()
}

fn unique_table() -> String {
    format!(
        "askdb_it_{}_{}",
        std::process::id(),
        TABLE_COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// Creates a users-shaped table holding three rows.
async fn create_users_table(creds: &Credentials, table: &str) {
    let mut client = MySqlClient::connect(creds).await.unwrap();
    client
        .execute_statement(&format!(
            "CREATE TABLE {table} (id INT PRIMARY KEY, name VARCHAR(100))"
        ))
        .await
        .unwrap();
    client
        .execute_statement(&format!(
            "INSERT INTO {table} (id, name) VALUES (1, 'Alice'), (2, 'Bob'), (3, NULL)"
        ))
        .await
        .unwrap();
    Box::new(client).close().await.unwrap();
}

async fn drop_table(creds: &Credentials, table: &str) {
    if let Ok(mut client) = MySqlClient::connect(creds).await {
        let _ = client
            .execute_statement(&format!("DROP TABLE IF EXISTS {table}"))
            .await;
        let _ = Box::new(client).close().await;
    }
}

fn assistant() -> SqlAssistant {
    SqlAssistant::new(Box::new(MySqlConnector), Box::new(MockLlmClient::new()))
}

#[tokio::test]
async fn test_introspection_lists_created_table() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = unique_table();
    create_users_table(&creds, &table).await;

    let schema = assistant()
        .describe_schema(&Session::new(creds.clone()))
        .await
        .unwrap();
    let text = schema.format_for_llm();

    drop_table(&creds, &table).await;

    assert!(text.contains(&format!(
        "\nTable: {table}\n- id (INT)\n- name (VARCHAR(100))\n"
    )));
}

#[tokio::test]
async fn test_count_on_three_row_table() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = unique_table();
    create_users_table(&creds, &table).await;

    let mut session = Session::new(creds.clone());
    session.set_generated(format!("SELECT COUNT(*) FROM {table};"));
    let outcome = assistant().run_query(&mut session).await;

    drop_table(&creds, &table).await;

    let QueryOutcome::Rows(result) = outcome.unwrap() else {
        panic!("expected rows");
    };
    assert_eq!(result.columns.len(), 1);
    assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
}

#[tokio::test]
async fn test_select_preserves_order_and_nulls() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = unique_table();
    create_users_table(&creds, &table).await;

    let mut session = Session::new(creds.clone());
    session.set_generated(format!("SELECT id, name FROM {table} ORDER BY id DESC"));
    let outcome = assistant().run_query(&mut session).await;

    drop_table(&creds, &table).await;

    let QueryOutcome::Rows(result) = outcome.unwrap() else {
        panic!("expected rows");
    };
    assert_eq!(result.column_names(), vec!["id", "name"]);
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Int(3), Value::Null],
            vec![Value::Int(2), Value::from("Bob")],
            vec![Value::Int(1), Value::from("Alice")],
        ]
    );
}

#[tokio::test]
async fn test_script_starting_with_select_shows_first_result_set() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = unique_table();
    create_users_table(&creds, &table).await;

    let mut session = Session::new(creds.clone());
    session.set_generated(format!(
        "SELECT id FROM {table} WHERE id < 3 ORDER BY id; SELECT COUNT(*) FROM {table};"
    ));
    let outcome = assistant().run_query(&mut session).await;

    drop_table(&creds, &table).await;

    let QueryOutcome::Rows(result) = outcome.unwrap() else {
        panic!("expected rows");
    };
    assert_eq!(result.column_names(), vec!["id"]);
    assert_eq!(result.rows, vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
}

#[tokio::test]
async fn test_delete_is_acknowledged_and_committed() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = unique_table();
    create_users_table(&creds, &table).await;

    let assistant = assistant();
    let mut session = Session::new(creds.clone());
    session.set_generated(format!("DELETE FROM {table} WHERE id=1;"));
    let deleted = assistant.run_query(&mut session).await;

    // Deleting a row that no longer exists is acknowledged the same way.
    let again = assistant.run_query(&mut session).await;

    session.set_generated(format!("SELECT COUNT(*) FROM {table}"));
    let remaining = assistant.run_query(&mut session).await;

    drop_table(&creds, &table).await;

    assert!(matches!(deleted.unwrap(), QueryOutcome::Executed { .. }));
    assert!(matches!(again.unwrap(), QueryOutcome::Executed { .. }));
    let QueryOutcome::Rows(result) = remaining.unwrap() else {
        panic!("expected rows");
    };
    assert_eq!(result.rows, vec![vec![Value::Int(2)]]);
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    let table = unique_table();
    create_users_table(&creds, &table).await;

    let mut session = Session::new(creds.clone());
    session.set_generated(format!("SELECT id, name FROM {table} WHERE id > 100"));
    let outcome = assistant().run_query(&mut session).await;

    drop_table(&creds, &table).await;

    let QueryOutcome::Rows(result) = outcome.unwrap() else {
        panic!("expected rows");
    };
    assert!(result.is_empty());
    assert_eq!(result.column_names(), vec!["id", "name"]);
}

#[tokio::test]
async fn test_syntax_error_reports_server_message() {
    let Some(creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let mut session = Session::new(creds);
    session.set_generated("SELEC 1");
    let err = assistant().run_query(&mut session).await.unwrap_err();

    assert!(matches!(err, AskError::Execution(_)));
    assert!(err.message().starts_with("ERROR 1064 (42000)"));
}

#[tokio::test]
async fn test_invalid_password_is_connection_error() {
    let Some(mut creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    creds.password = format!("{}-definitely-wrong", creds.password);

    let result = MySqlConnector.connect(&creds).await;

    let err = result.err().unwrap();
    assert!(matches!(err, AskError::Connection(_)));
    assert!(err.message().contains("Authentication failed"));
}

#[tokio::test]
async fn test_unknown_database_is_connection_error() {
    let Some(mut creds) = get_test_credentials() else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    creds.database = "askdb_no_such_database".to_string();

    let err = MySqlConnector.connect(&creds).await.err().unwrap();
    assert!(err.message().contains("does not exist"));
}
