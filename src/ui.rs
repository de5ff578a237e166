//! Interactive terminal prompts.
//!
//! The credential form, question prompt, SQL editor and action menu, built
//! on dialoguer.

use askdb::config::Credentials;
use askdb::error::{AskError, Result};
use dialoguer::{Editor, Input, Password, Select};
use std::fmt;

/// What the user wants to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Generate,
    Edit,
    Run,
    ChangeCredentials,
    Quit,
}

impl Action {
    const ALL: [Action; 5] = [
        Action::Generate,
        Action::Edit,
        Action::Run,
        Action::ChangeCredentials,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Generate => "Generate SQL",
            Self::Edit => "Edit SQL",
            Self::Run => "Run Query",
            Self::ChangeCredentials => "Change credentials",
            Self::Quit => "Quit",
        };
        f.write_str(label)
    }
}

fn prompt_error(e: impl fmt::Display) -> AskError {
    AskError::internal(format!("Prompt failed: {e}"))
}

fn text_field(prompt: &str, initial: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)
}

/// Shows the credential form pre-filled with `current`.
///
/// When `ask_password` is false the current password is kept.
pub fn prompt_credentials(current: &Credentials, ask_password: bool) -> Result<Credentials> {
    println!("🔐 Database Credentials");

    let host = text_field("Host", &current.host)?;
    let user = text_field("Username", &current.user)?;
    let password = if ask_password {
        Password::new()
            .with_prompt("Password")
            .allow_empty_password(true)
            .interact()
            .map_err(prompt_error)?
    } else {
        current.password.clone()
    };
    let port = text_field("Port", &current.port)?;
    let database = text_field("Database Name", &current.database)?;

    Ok(Credentials::new(host, user, password, port, database))
}

/// Asks for the natural-language question.
pub fn prompt_question(previous: &str) -> Result<String> {
    Input::<String>::new()
        .with_prompt("Ask your question")
        .with_initial_text(previous)
        .interact_text()
        .map_err(prompt_error)
}

/// Opens the SQL buffer for editing.
///
/// Uses `$EDITOR` when available, falling back to an inline prompt. Closing
/// the editor without saving keeps the current text.
pub fn edit_sql(current: &str) -> Result<String> {
    match Editor::new().extension(".sql").edit(current) {
        Ok(Some(edited)) => Ok(edited.trim_end().to_string()),
        Ok(None) => Ok(current.to_string()),
        Err(e) => {
            tracing::debug!("External editor unavailable, editing inline: {e}");
            Input::<String>::new()
                .with_prompt("SQL")
                .with_initial_text(current)
                .interact_text()
                .map_err(prompt_error)
        }
    }
}

/// Shows the action menu. Edit and Run are offered once SQL exists.
pub fn choose_action(has_sql: bool) -> Result<Action> {
    let actions: Vec<Action> = Action::ALL
        .into_iter()
        .filter(|a| has_sql || !matches!(a, Action::Edit | Action::Run))
        .collect();

    let default = if has_sql {
        actions.iter().position(|a| *a == Action::Run).unwrap_or(0)
    } else {
        0
    };

    let index = Select::new()
        .with_prompt("What next?")
        .items(&actions)
        .default(default)
        .interact()
        .map_err(prompt_error)?;

    actions
        .get(index)
        .copied()
        .ok_or_else(|| AskError::internal("Invalid menu selection"))
}

/// Prints the SQL buffer.
pub fn show_sql(sql: &str, edited: bool) {
    let title = if edited {
        "✏️  SQL Query (edited)"
    } else {
        "✏️  SQL Query"
    };
    println!("\n{title}\n{sql}\n");
}
