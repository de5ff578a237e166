//! Mock database client for testing.
//!
//! Provides an in-memory implementation of [`Connector`] and
//! [`DatabaseClient`] so the pipeline can be driven headlessly.

use super::{ColumnInfo, Connector, DatabaseClient, QueryResult, Schema, Value};
use crate::config::Credentials;
use crate::error::{AskError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared record of what a mock client (and its clones) did.
#[derive(Debug, Default)]
struct Journal {
    executed: Vec<String>,
    closes: usize,
}

/// A mock database client that returns predefined results.
///
/// Clones share one journal, so a test can keep a handle while a
/// [`MockConnector`] hands copies out.
#[derive(Debug, Clone, Default)]
pub struct MockDatabaseClient {
    schema: Schema,
    results: Vec<(String, QueryResult)>,
    failures: Vec<(String, String)>,
    introspection_failure: Option<String>,
    journal: Arc<Mutex<Journal>>,
}

impl MockDatabaseClient {
    /// Creates a new mock database client with an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema returned by introspection.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Returns `result` for statements containing `pattern` (case-insensitive).
    pub fn with_result(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.results.push((pattern.into().to_lowercase(), result));
        self
    }

    /// Fails statements containing `pattern` with an execution error.
    pub fn failing_on(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .push((pattern.into().to_lowercase(), message.into()));
        self
    }

    /// Fails schema introspection with an introspection error.
    pub fn failing_introspection(mut self, message: impl Into<String>) -> Self {
        self.introspection_failure = Some(message.into());
        self
    }

    /// Statements executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.journal
            .lock()
            .map(|j| j.executed.clone())
            .unwrap_or_default()
    }

    /// Number of times a connection was closed.
    pub fn close_count(&self) -> usize {
        self.journal.lock().map(|j| j.closes).unwrap_or_default()
    }

    fn record(&self, sql: &str) -> Result<()> {
        if let Ok(mut journal) = self.journal.lock() {
            journal.executed.push(sql.to_string());
        }

        let lower = sql.to_lowercase();
        match self.failures.iter().find(|(p, _)| lower.contains(p)) {
            Some((_, message)) => Err(AskError::execution(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn introspect_schema(&mut self) -> Result<Schema> {
        match &self.introspection_failure {
            Some(message) => Err(AskError::introspection(message.clone())),
            None => Ok(self.schema.clone()),
        }
    }

    async fn fetch_rows(&mut self, sql: &str) -> Result<QueryResult> {
        self.record(sql)?;

        let lower = sql.to_lowercase();
        if let Some((_, result)) = self.results.iter().find(|(p, _)| lower.contains(p)) {
            return Ok(result.clone());
        }

        let columns = vec![ColumnInfo::new("result", "TEXT")];
        let rows = vec![vec![Value::String(format!("Mock result for: {sql}"))]];

        Ok(QueryResult::with_data(columns, rows).with_execution_time(Duration::from_millis(1)))
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        self.record(sql)?;
        Ok(0)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        if let Ok(mut journal) = self.journal.lock() {
            journal.closes += 1;
        }
        Ok(())
    }
}

/// A connector that hands out clones of one [`MockDatabaseClient`].
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    client: MockDatabaseClient,
    expected_password: Option<String>,
    unreachable: bool,
    connects: Arc<Mutex<usize>>,
}

impl MockConnector {
    /// Creates a connector that always succeeds.
    pub fn new(client: MockDatabaseClient) -> Self {
        Self {
            client,
            ..Default::default()
        }
    }

    /// Rejects connections whose password differs from `password`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.expected_password = Some(password.into());
        self
    }

    /// Creates a connector whose server is never reachable.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    /// Number of successful connections opened so far.
    pub fn connect_count(&self) -> usize {
        self.connects.lock().map(|c| *c).unwrap_or_default()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DatabaseClient>> {
        credentials.validate()?;

        if self.unreachable {
            return Err(AskError::connection(format!(
                "Cannot connect to {}:{}. Check that the server is running.",
                credentials.host, credentials.port
            )));
        }

        if let Some(expected) = &self.expected_password {
            if *expected != credentials.password {
                return Err(AskError::connection(format!(
                    "Authentication failed for user '{}'. Check your credentials.",
                    credentials.user
                )));
            }
        }

        if let Ok(mut connects) = self.connects.lock() {
            *connects += 1;
        }

        Ok(Box::new(self.client.clone()))
    }
}
