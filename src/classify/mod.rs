//! Statement classification.
//!
//! Parses SQL and decides whether the executor should fetch rows or report
//! an acknowledgment.

mod parser;

pub use parser::{classify_sql, SqlClassifier};

use std::fmt;

/// How the executor handles a statement's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultPath {
    /// The statement returns a result set to render as a table.
    Rows,
    /// Anything else: writes and DDL get a success message.
    Acknowledge,
}

impl fmt::Display for ResultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows => write!(f, "rows"),
            Self::Acknowledge => write!(f, "acknowledge"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    With,
    Show,
    Describe,
    Explain,
    Insert,
    Replace,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    Truncate,
    /// Multiple statements detected; contains the first statement's type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl StatementType {
    /// Returns true for statements that produce a result set. A script
    /// follows its first statement.
    pub fn returns_rows(&self) -> bool {
        match self {
            Self::Multiple(first) => first.returns_rows(),
            _ => matches!(
                self,
                Self::Select | Self::With | Self::Show | Self::Describe | Self::Explain
            ),
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::With => write!(f, "WITH (CTE)"),
            Self::Show => write!(f, "SHOW"),
            Self::Describe => write!(f, "DESCRIBE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Insert => write!(f, "INSERT"),
            Self::Replace => write!(f, "REPLACE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Create => write!(f, "CREATE"),
            Self::Drop => write!(f, "DROP"),
            Self::Alter => write!(f, "ALTER"),
            Self::Truncate => write!(f, "TRUNCATE"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The type of statement(s) detected.
    pub statement_type: StatementType,
    /// Where the executor routes the statement.
    pub path: ResultPath,
    /// False when the parser rejected the text and the leading keyword
    /// decided instead.
    pub parsed: bool,
}

impl Classification {
    /// Creates a classification for successfully parsed SQL.
    pub fn parsed(statement_type: StatementType) -> Self {
        let path = if statement_type.returns_rows() {
            ResultPath::Rows
        } else {
            ResultPath::Acknowledge
        };
        Self {
            statement_type,
            path,
            parsed: true,
        }
    }

    /// Creates a classification decided by the leading keyword.
    pub fn from_keyword(statement_type: StatementType, path: ResultPath) -> Self {
        Self {
            statement_type,
            path,
            parsed: false,
        }
    }

    /// Returns true if the executor should fetch rows.
    pub fn returns_rows(&self) -> bool {
        self.path == ResultPath::Rows
    }
}
