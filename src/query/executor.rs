//! Query execution with statement classification.
//!
//! Provides execution that can be tested independently of the interactive
//! session.

use std::time::Instant;

use tracing::info;

use crate::classify::{classify_sql, Classification};
use crate::db::{DatabaseClient, QueryResult};
use crate::error::{AskError, Result};

/// What running a statement produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A result set to render as a table.
    Rows(QueryResult),
    /// The statement ran. The row count is logged, never shown.
    Executed { rows_affected: u64 },
}

/// Query executor that classifies SQL and runs it on an open connection.
pub struct QueryExecutor<'a> {
    db: &'a mut dyn DatabaseClient,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new query executor.
    pub fn new(db: &'a mut dyn DatabaseClient) -> Self {
        Self { db }
    }

    /// Rejects an empty buffer before any connection is used.
    pub fn check_sql(sql: &str) -> Result<()> {
        if sql.trim().is_empty() {
            return Err(AskError::execution("No SQL to run"));
        }
        Ok(())
    }

    /// Classifies and executes the SQL exactly as given.
    ///
    /// Database errors are returned with the server's message unchanged.
    pub async fn execute(&mut self, sql: &str) -> Result<QueryOutcome> {
        Self::check_sql(sql)?;

        let classification = classify_sql(sql);
        self.execute_classified(sql, &classification).await
    }

    /// Executes SQL that has already been classified.
    pub async fn execute_classified(
        &mut self,
        sql: &str,
        classification: &Classification,
    ) -> Result<QueryOutcome> {
        let start = Instant::now();

        let outcome = if classification.returns_rows() {
            QueryOutcome::Rows(self.db.fetch_rows(sql).await?)
        } else {
            let rows_affected = self.db.execute_statement(sql).await?;
            QueryOutcome::Executed { rows_affected }
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            QueryOutcome::Rows(result) => info!(
                statement = %classification.statement_type,
                rows = result.row_count(),
                elapsed_ms,
                "Query executed"
            ),
            QueryOutcome::Executed { rows_affected } => info!(
                statement = %classification.statement_type,
                rows_affected,
                elapsed_ms,
                "Statement executed"
            ),
        }

        Ok(outcome)
    }
}
