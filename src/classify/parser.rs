//! SQL parsing and classification logic.
//!
//! Uses sqlparser-rs with the MySQL dialect to parse SQL and decide which
//! execution path a statement takes.

use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use super::{Classification, ResultPath, StatementType};

/// SQL classifier that parses and classifies SQL queries.
#[derive(Debug)]
pub struct SqlClassifier {
    dialect: MySqlDialect,
}

impl Default for SqlClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlClassifier {
    /// Creates a new SQL classifier.
    pub fn new() -> Self {
        Self {
            dialect: MySqlDialect {},
        }
    }

    /// Classifies a SQL string.
    ///
    /// Row-returning statements take the rows path. A script with several
    /// statements follows its first one. Text the parser rejects is
    /// classified by its leading keyword.
    pub fn classify(&self, sql: &str) -> Classification {
        match Parser::parse_sql(&self.dialect, sql) {
            Ok(statements) => match statements.as_slice() {
                [] => Classification::from_keyword(StatementType::Unknown, ResultPath::Acknowledge),
                [statement] => Classification::parsed(classify_statement(statement)),
                [first, ..] => Classification::parsed(StatementType::Multiple(Box::new(
                    classify_statement(first),
                ))),
            },
            Err(e) => {
                debug!("SQL parse failed, using leading keyword: {e}");
                classify_by_keyword(sql)
            }
        }
    }
}

/// Convenience function to classify SQL without creating a classifier instance.
pub fn classify_sql(sql: &str) -> Classification {
    SqlClassifier::new().classify(sql)
}

/// Classifies a single parsed statement.
fn classify_statement(statement: &Statement) -> StatementType {
    match statement {
        Statement::Query(query) => classify_query(query),
        Statement::Explain { .. } => StatementType::Explain,
        Statement::ExplainTable { .. } => StatementType::Describe,
        Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowVariable { .. }
        | Statement::ShowVariables { .. }
        | Statement::ShowStatus { .. }
        | Statement::ShowCreate { .. }
        | Statement::ShowFunctions { .. }
        | Statement::ShowCollation { .. } => StatementType::Show,

        Statement::Insert(insert) if insert.replace_into => StatementType::Replace,
        Statement::Insert(_) => StatementType::Insert,
        Statement::Update { .. } => StatementType::Update,
        Statement::Delete(_) => StatementType::Delete,

        Statement::CreateTable { .. }
        | Statement::CreateIndex { .. }
        | Statement::CreateView { .. }
        | Statement::CreateDatabase { .. }
        | Statement::CreateSchema { .. } => StatementType::Create,
        Statement::Drop { .. } => StatementType::Drop,
        Statement::AlterTable { .. } | Statement::AlterView { .. } => StatementType::Alter,
        Statement::Truncate { .. } => StatementType::Truncate,

        _ => StatementType::Unknown,
    }
}

/// Classifies a query, which normally returns rows unless its body is a
/// data-modifying statement.
fn classify_query(query: &Query) -> StatementType {
    match query.body.as_ref() {
        SetExpr::Insert(stmt) | SetExpr::Update(stmt) => classify_statement(stmt),
        _ if query.with.is_some() => StatementType::With,
        _ => StatementType::Select,
    }
}

/// Classifies text the parser rejected by its first keyword.
fn classify_by_keyword(sql: &str) -> Classification {
    let keyword = leading_keyword(sql);

    let (statement_type, path) = match keyword.as_str() {
        "select" | "table" | "values" => (StatementType::Select, ResultPath::Rows),
        "with" => (StatementType::With, ResultPath::Rows),
        "show" => (StatementType::Show, ResultPath::Rows),
        "describe" | "desc" => (StatementType::Describe, ResultPath::Rows),
        "explain" => (StatementType::Explain, ResultPath::Rows),
        "insert" => (StatementType::Insert, ResultPath::Acknowledge),
        "replace" => (StatementType::Replace, ResultPath::Acknowledge),
        "update" => (StatementType::Update, ResultPath::Acknowledge),
        "delete" => (StatementType::Delete, ResultPath::Acknowledge),
        "create" => (StatementType::Create, ResultPath::Acknowledge),
        "drop" => (StatementType::Drop, ResultPath::Acknowledge),
        "alter" => (StatementType::Alter, ResultPath::Acknowledge),
        "truncate" => (StatementType::Truncate, ResultPath::Acknowledge),
        _ => (StatementType::Unknown, ResultPath::Acknowledge),
    };

    Classification::from_keyword(statement_type, path)
}

/// Lower-cased first word, ignoring leading whitespace and parentheses.
fn leading_keyword(sql: &str) -> String {
    sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(')
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase()
}
