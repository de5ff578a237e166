//! End-to-end pipeline tests with mock database and gateway.
//!
//! Covers the generate, edit and run actions without network access.

use askdb::assistant::SqlAssistant;
use askdb::config::Credentials;
use askdb::db::{
    Column, ColumnInfo, MockConnector, MockDatabaseClient, QueryResult, Schema, Table, Value,
};
use askdb::error::AskError;
use askdb::llm::MockLlmClient;
use askdb::query::QueryOutcome;
use askdb::render::{render_error, render_outcome, SUCCESS_MESSAGE};
use askdb::session::{Phase, Session};
use pretty_assertions::assert_eq;

const PASSWORD: &str = "s3cret";

fn users_schema() -> Schema {
    Schema {
        tables: vec![Table::new("users")
            .with_column(Column::new("id", "INT"))
            .with_column(Column::new("name", "VARCHAR"))],
    }
}

fn users_db() -> MockDatabaseClient {
    let count = QueryResult::with_data(
        vec![ColumnInfo::new("COUNT(*)", "BIGINT")],
        vec![vec![Value::Int(3)]],
    );
    MockDatabaseClient::new()
        .with_schema(users_schema())
        .with_result("count(*) from users", count)
}

fn session_with_password(password: &str) -> Session {
    Session::new(Credentials::new("localhost", "app", password, "3306", "shop"))
}

struct Harness {
    assistant: SqlAssistant,
    db: MockDatabaseClient,
    llm: MockLlmClient,
    connector: MockConnector,
}

fn harness() -> Harness {
    let db = users_db();
    let llm = MockLlmClient::new();
    let connector = MockConnector::new(db.clone()).with_password(PASSWORD);
    let assistant = SqlAssistant::new(Box::new(connector.clone()), Box::new(llm.clone()));
    Harness {
        assistant,
        db,
        llm,
        connector,
    }
}

#[tokio::test]
async fn test_question_to_sanitized_sql() {
    let h = harness();
    let mut session = session_with_password(PASSWORD);
    session.question = "How many users are there?".to_string();

    let sql = h.assistant.generate_sql(&mut session).await.unwrap();

    assert_eq!(sql, "SELECT COUNT(*) FROM users;");
    let prompts = h.llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("\nTable: users\n- id (INT)\n- name (VARCHAR)\n"));
    assert!(prompts[0].contains("How many users are there?"));
}

#[tokio::test]
async fn test_count_query_returns_single_value() {
    let h = harness();
    let mut session = session_with_password(PASSWORD);
    session.question = "How many users are there?".to_string();
    h.assistant.generate_sql(&mut session).await.unwrap();

    let outcome = h.assistant.run_query(&mut session).await.unwrap();

    let QueryOutcome::Rows(result) = &outcome else {
        panic!("expected rows, got {outcome:?}");
    };
    assert_eq!(result.columns.len(), 1);
    assert_eq!(result.rows, vec![vec![Value::Int(3)]]);
    assert!(render_outcome(&outcome).contains("│ 3 "));
    assert_eq!(session.phase(), Phase::Executed);
}

#[tokio::test]
async fn test_delete_is_acknowledged() {
    let h = harness();
    let mut session = session_with_password(PASSWORD);
    session.set_generated("SELECT * FROM users");
    session.edit("DELETE FROM users WHERE id=1;").unwrap();

    let outcome = h.assistant.run_query(&mut session).await.unwrap();

    assert_eq!(outcome, QueryOutcome::Executed { rows_affected: 0 });
    assert_eq!(render_outcome(&outcome), SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_script_starting_with_select_is_tabular() {
    let h = harness();
    let mut session = session_with_password(PASSWORD);
    session.set_generated("SELECT COUNT(*) FROM users; SELECT 1;");

    let outcome = h.assistant.run_query(&mut session).await.unwrap();

    assert!(matches!(outcome, QueryOutcome::Rows(_)));
    assert!(render_outcome(&outcome).contains("│ 3 "));
}

#[tokio::test]
async fn test_invalid_password_yields_connection_error() {
    let h = harness();
    let mut session = session_with_password("wrong");
    session.question = "How many users are there?".to_string();

    let err = h.assistant.generate_sql(&mut session).await.unwrap_err();

    assert!(matches!(err, AskError::Connection(_)));
    assert!(render_error(&err).starts_with("❌ Connection Error: Authentication failed"));
    assert!(h.llm.prompts().is_empty());
    assert!(session.sql().is_none());
    assert_eq!(session.phase(), Phase::ErrorDisplayed);
}

#[tokio::test]
async fn test_introspection_failure_skips_gateway_and_closes() {
    let db = users_db().failing_introspection("Failed to fetch tables: access denied");
    let llm = MockLlmClient::new();
    let assistant = SqlAssistant::new(
        Box::new(MockConnector::new(db.clone())),
        Box::new(llm.clone()),
    );
    let mut session = session_with_password(PASSWORD);
    session.set_generated("SELECT 1;");
    session.question = "How many users are there?".to_string();

    let err = assistant.generate_sql(&mut session).await.unwrap_err();

    assert!(matches!(err, AskError::Introspection(_)));
    assert_eq!(
        render_error(&err),
        "❌ Introspection Error: Failed to fetch tables: access denied"
    );
    assert!(llm.prompts().is_empty());
    assert_eq!(db.close_count(), 1);
    assert_eq!(session.sql(), Some("SELECT 1;"));
    assert_eq!(session.phase(), Phase::ErrorDisplayed);
}

#[tokio::test]
async fn test_edited_sql_is_what_runs() {
    let h = harness();
    let mut session = session_with_password(PASSWORD);
    session.question = "show users".to_string();
    h.assistant.generate_sql(&mut session).await.unwrap();
    assert_eq!(session.sql(), Some("SELECT * FROM users;"));

    session.edit("SELECT name FROM users WHERE id = 2").unwrap();
    h.assistant.run_query(&mut session).await.unwrap();
    // Running again must not fall back to the generated text.
    h.assistant.run_query(&mut session).await.unwrap();

    assert_eq!(
        h.db.executed(),
        vec![
            "SELECT name FROM users WHERE id = 2",
            "SELECT name FROM users WHERE id = 2"
        ]
    );
}

#[tokio::test]
async fn test_each_action_opens_and_closes_a_connection() {
    let h = harness();
    let mut session = session_with_password(PASSWORD);
    session.question = "How many users are there?".to_string();

    h.assistant.generate_sql(&mut session).await.unwrap();
    h.assistant.run_query(&mut session).await.unwrap();
    session.edit("SELECT * FROM missing").unwrap();
    let _ = h.assistant.run_query(&mut session).await;

    assert_eq!(h.connector.connect_count(), 3);
    assert_eq!(h.db.close_count(), 3);
}

#[tokio::test]
async fn test_execution_error_keeps_buffer() {
    let db = users_db().failing_on("missing", "ERROR 1146 (42S02): Table 'shop.missing' doesn't exist");
    let assistant = SqlAssistant::new(
        Box::new(MockConnector::new(db)),
        Box::new(MockLlmClient::new()),
    );
    let mut session = session_with_password(PASSWORD);
    session.set_generated("SELECT * FROM missing");

    let err = assistant.run_query(&mut session).await.unwrap_err();

    assert_eq!(
        render_error(&err),
        "❌ Execution Error: ERROR 1146 (42S02): Table 'shop.missing' doesn't exist"
    );
    assert_eq!(session.sql(), Some("SELECT * FROM missing"));
}

#[tokio::test]
async fn test_unreachable_server() {
    let assistant = SqlAssistant::new(
        Box::new(MockConnector::unreachable()),
        Box::new(MockLlmClient::new()),
    );
    let mut session = session_with_password("");
    session.question = "anything".to_string();

    let err = assistant.generate_sql(&mut session).await.unwrap_err();
    assert_eq!(
        err.message(),
        "Cannot connect to localhost:3306. Check that the server is running."
    );
}

#[tokio::test]
async fn test_missing_fields_rejected_before_connecting() {
    let h = harness();
    let mut session = Session::new(Credentials::new("localhost", "", PASSWORD, "3306", ""));

    let err = h.assistant.generate_sql(&mut session).await.unwrap_err();

    assert!(err.to_string().contains("username, database"));
    assert_eq!(h.connector.connect_count(), 0);
}
