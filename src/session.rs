//! Per-session state for the interactive loop.
//!
//! Holds the credentials, the last question and the editable SQL buffer, and
//! tracks where the current action is in the pipeline.

use std::fmt;

use crate::config::Credentials;
use crate::error::{AskError, Result};

/// Pipeline phase of the current action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    SchemaReady,
    QueryGenerated,
    QueryEdited,
    Executed,
    ResultDisplayed,
    ErrorDisplayed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SchemaReady => "schema ready",
            Self::QueryGenerated => "query generated",
            Self::QueryEdited => "query edited",
            Self::Executed => "executed",
            Self::ResultDisplayed => "result displayed",
            Self::ErrorDisplayed => "error displayed",
        };
        f.write_str(name)
    }
}

/// The editable SQL buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct QueryBuffer {
    /// Text as the gateway produced it, after sanitizing.
    generated: String,
    /// Text that runs; differs from `generated` once the user edits.
    current: String,
}

/// State owned by one interactive session. Nothing here is persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub credentials: Credentials,
    pub question: String,
    buffer: Option<QueryBuffer>,
    phase: Phase,
}

impl Session {
    /// Creates a session with pre-filled credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Starts a new user action.
    pub fn begin_action(&mut self) {
        self.phase = Phase::Idle;
    }

    /// The schema description was built.
    pub fn schema_ready(&mut self) {
        self.phase = Phase::SchemaReady;
    }

    /// Replaces the buffer with freshly generated SQL, discarding any edit.
    pub fn set_generated(&mut self, sql: impl Into<String>) {
        let sql = sql.into();
        self.buffer = Some(QueryBuffer {
            generated: sql.clone(),
            current: sql,
        });
        self.phase = Phase::QueryGenerated;
    }

    /// Stores the user's edited SQL. Fails if nothing was generated yet.
    pub fn edit(&mut self, sql: impl Into<String>) -> Result<()> {
        let buffer = self
            .buffer
            .as_mut()
            .ok_or_else(|| AskError::internal("No generated SQL to edit yet"))?;
        buffer.current = sql.into();
        self.phase = Phase::QueryEdited;
        Ok(())
    }

    /// The SQL that runs next, if any was generated.
    pub fn sql(&self) -> Option<&str> {
        self.buffer.as_ref().map(|b| b.current.as_str())
    }

    /// The SQL as last generated, before any edit.
    pub fn generated_sql(&self) -> Option<&str> {
        self.buffer.as_ref().map(|b| b.generated.as_str())
    }

    /// Returns true if the buffer differs from the generated text.
    pub fn is_edited(&self) -> bool {
        self.buffer
            .as_ref()
            .is_some_and(|b| b.current != b.generated)
    }

    /// The statement finished running.
    pub fn mark_executed(&mut self) {
        self.phase = Phase::Executed;
    }

    /// The result was shown to the user.
    pub fn mark_displayed(&mut self) {
        self.phase = Phase::ResultDisplayed;
    }

    /// An error was shown. The buffer is kept.
    pub fn mark_failed(&mut self) {
        self.phase = Phase::ErrorDisplayed;
    }
}
