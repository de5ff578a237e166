//! Database schema types for askdb.
//!
//! Represents the tables and columns found during catalog introspection and
//! renders them as the text block embedded in LLM prompts.

/// Represents the schema of the connected database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Tables in the order the catalog returned them.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates a new empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Formats the schema for inclusion in an LLM prompt.
    ///
    /// One section per table, one line per column:
    ///
    /// ```text
    ///
    /// Table: users
    /// - id (INT)
    /// - name (VARCHAR(100))
    /// ```
    pub fn format_for_llm(&self) -> String {
        self.tables.iter().map(Table::format_for_llm).collect()
    }

    /// Returns the total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

/// Represents a database table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in ordinal order.
    pub columns: Vec<Column>,
}

impl Table {
    /// Creates a new table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    fn format_for_llm(&self) -> String {
        let column_lines: String = self
            .columns
            .iter()
            .map(|column| format!("- {} ({})\n", column.name, column.data_type))
            .collect();

        format!("\nTable: {}\n{}", self.name, column_lines)
    }
}

/// Represents a column in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Declared storage type (e.g., "INT", "VARCHAR(255)").
    pub data_type: String,
}

impl Column {
    /// Creates a new column with the given name and data type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Normalizes a catalog `COLUMN_TYPE` for display.
///
/// The type name is upper-cased; anything inside parentheses (lengths,
/// precision, enum members) is kept as declared.
pub fn normalize_column_type(column_type: &str) -> String {
    let column_type = column_type.trim();
    match column_type.find('(') {
        Some(idx) => {
            let (name, rest) = column_type.split_at(idx);
            match rest.rfind(')') {
                Some(close) => format!(
                    "{}{}{}",
                    name.to_uppercase(),
                    &rest[..=close],
                    rest[close + 1..].to_uppercase()
                ),
                None => format!("{}{}", name.to_uppercase(), rest),
            }
        }
        None => column_type.to_uppercase(),
    }
}
