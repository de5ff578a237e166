//! The question-to-result pipeline.
//!
//! `SqlAssistant` ties the stages together for the two user actions:
//! Generate SQL (connect, introspect, compose, call the gateway, sanitize)
//! and Run Query (connect, execute the buffer). Each action opens its own
//! connection and closes it on every exit path.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::db::{Connector, DatabaseClient, Schema};
use crate::error::{AskError, Result};
use crate::llm::{compose_prompt, sanitize_sql, LlmClient};
use crate::query::{QueryExecutor, QueryOutcome};
use crate::session::Session;

/// Runs pipeline actions against a connector and a gateway.
pub struct SqlAssistant {
    connector: Box<dyn Connector>,
    gateway: Box<dyn LlmClient>,
}

impl SqlAssistant {
    /// Creates a new assistant.
    pub fn new(connector: Box<dyn Connector>, gateway: Box<dyn LlmClient>) -> Self {
        Self { connector, gateway }
    }

    /// Connects and reads the schema, then closes the connection.
    pub async fn describe_schema(&self, session: &Session) -> Result<Schema> {
        let mut db = self.connector.connect(&session.credentials).await?;
        let result = db.introspect_schema().await;
        close_quietly(db).await;

        let schema = result?;
        info!(
            tables = schema.tables.len(),
            columns = schema.column_count(),
            "Schema introspected"
        );
        Ok(schema)
    }

    /// Generate SQL action: fills the session buffer from the current question.
    ///
    /// On failure the session shows an error and keeps its previous buffer.
    pub async fn generate_sql(&self, session: &mut Session) -> Result<String> {
        session.begin_action();
        let result = self.try_generate(session).await;
        if result.is_err() {
            session.mark_failed();
        }
        result
    }

    async fn try_generate(&self, session: &mut Session) -> Result<String> {
        let schema = self.describe_schema(session).await?;
        session.schema_ready();

        let prompt = compose_prompt(&session.question, &schema.format_for_llm());
        debug!(prompt_len = prompt.len(), "Prompt composed");

        let start = Instant::now();
        let raw = self.gateway.generate(&prompt).await?;
        debug!(
            llm_duration_ms = start.elapsed().as_millis() as u64,
            response_len = raw.len(),
            "Received LLM response"
        );

        let sql = sanitize_sql(&raw);
        if sql.is_empty() {
            return Err(AskError::gateway("The model returned no usable SQL"));
        }

        session.set_generated(sql.clone());
        info!("SQL generated");
        Ok(sql)
    }

    /// Run Query action: executes the session buffer exactly as it stands.
    pub async fn run_query(&self, session: &mut Session) -> Result<QueryOutcome> {
        session.begin_action();
        let result = self.try_run(session).await;
        match &result {
            Ok(_) => session.mark_executed(),
            Err(_) => session.mark_failed(),
        }
        result
    }

    async fn try_run(&self, session: &Session) -> Result<QueryOutcome> {
        let sql = session.sql().unwrap_or_default();
        QueryExecutor::check_sql(sql)?;

        if session.is_edited() {
            debug!("Running user-edited SQL");
        }

        let mut db = self.connector.connect(&session.credentials).await?;
        let result = QueryExecutor::new(db.as_mut()).execute(sql).await;
        close_quietly(db).await;

        result
    }
}

/// Closes a connection; a failure to close is logged, not reported.
async fn close_quietly(db: Box<dyn DatabaseClient>) {
    if let Err(e) = db.close().await {
        warn!("Failed to close database connection: {e}");
    }
}
