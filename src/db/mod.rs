//! Database abstraction layer for askdb.
//!
//! A [`Connector`] opens one connection per user action; the resulting
//! [`DatabaseClient`] is closed again when the action finishes.

mod mock;
mod mysql;
mod schema;
mod types;

pub use mock::{MockConnector, MockDatabaseClient};
pub use mysql::{MySqlClient, MySqlConnector};
pub use schema::{normalize_column_type, Column, Schema, Table};
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::Credentials;
use crate::error::Result;
use async_trait::async_trait;

/// Opens database connections from form credentials.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new connection. Fails with a connection error for bad
    /// credentials, an unreachable host or an unknown database.
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DatabaseClient>>;
}

/// Trait defining the interface for a single open database connection.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Reads table and column metadata from the catalog.
    async fn introspect_schema(&mut self) -> Result<Schema>;

    /// Runs a row-returning statement inside a transaction.
    async fn fetch_rows(&mut self, sql: &str) -> Result<QueryResult>;

    /// Runs a write, DDL or script inside a transaction and
    /// returns the affected-row count.
    async fn execute_statement(&mut self, sql: &str) -> Result<u64>;

    /// Closes the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}
