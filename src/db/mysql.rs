//! MySQL database client implementation.
//!
//! Provides the `MySqlClient` struct that implements the `DatabaseClient` trait
//! for MySQL-compatible servers using sqlx.

use crate::config::Credentials;
use crate::db::{
    normalize_column_type, Column, ColumnInfo, Connector, DatabaseClient, QueryResult, Row,
    Schema, Table, Value,
};
use crate::error::{AskError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySql, MySqlColumn, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo, ValueRef};
use std::time::Instant;
use tracing::{debug, info};

/// Base tables of the connected database.
const LIST_TABLES: &str = r#"
    SELECT CONVERT(TABLE_NAME USING utf8mb4) AS TABLE_NAME
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
"#;

/// Columns of one table, in ordinal order.
const LIST_COLUMNS: &str = r#"
    SELECT
        CONVERT(COLUMN_NAME USING utf8mb4) AS COLUMN_NAME,
        CONVERT(COLUMN_TYPE USING utf8mb4) AS COLUMN_TYPE
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// Opens connections to MySQL-compatible servers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

#[async_trait]
impl Connector for MySqlConnector {
    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn DatabaseClient>> {
        let client = MySqlClient::connect(credentials).await?;
        Ok(Box::new(client))
    }
}

/// A single MySQL connection.
#[derive(Debug)]
pub struct MySqlClient {
    conn: MySqlConnection,
}

impl MySqlClient {
    /// Opens a connection using the form credentials.
    ///
    /// No retry is attempted; the first failure is reported.
    pub async fn connect(credentials: &Credentials) -> Result<Self> {
        credentials.validate()?;
        let options = connect_options(credentials)?;

        debug!("Connecting to {}", credentials.display_string());

        let conn = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| map_connection_error(e, credentials))?;

        debug!("Successfully connected to database");
        Ok(Self { conn })
    }

    /// Fetches base table names from the catalog.
    async fn fetch_table_names(&mut self) -> Result<Vec<String>> {
        let rows = sqlx::query(LIST_TABLES)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AskError::introspection(format!("Failed to fetch tables: {e}")))?;

        Ok(rows
            .iter()
            .filter_map(|row| get_string_by_index(row, 0))
            .collect())
    }

    /// Fetches columns for a specific table.
    async fn fetch_columns(&mut self, table_name: &str) -> Result<Vec<Column>> {
        let rows = sqlx::query(LIST_COLUMNS)
            .bind(table_name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| {
                AskError::introspection(format!("Failed to fetch columns for {table_name}: {e}"))
            })?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let name = get_string_by_index(row, 0)?;
                let column_type = get_string_by_index(row, 1).unwrap_or_default();
                Some(Column::new(name, normalize_column_type(&column_type)))
            })
            .collect())
    }

    /// Looks up result columns without running the statement, for results
    /// that came back with no rows.
    async fn describe_columns(&mut self, sql: &str) -> Vec<ColumnInfo> {
        match (&mut self.conn).describe(sql).await {
            Ok(describe) => describe.columns().iter().map(column_info).collect(),
            Err(e) => {
                debug!("Could not describe result columns: {e}");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn introspect_schema(&mut self) -> Result<Schema> {
        let table_names = self.fetch_table_names().await?;
        let mut tables = Vec::with_capacity(table_names.len());

        for table_name in table_names {
            let columns = self.fetch_columns(&table_name).await?;
            tables.push(Table {
                name: table_name,
                columns,
            });
        }

        Ok(Schema { tables })
    }

    async fn fetch_rows(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| AskError::execution(format_query_error(e)))?;

        let result = (&mut *tx)
            .fetch_all(sqlx::raw_sql(sql))
            .await
            .map_err(|e| AskError::execution(format_query_error(e)))?;

        tx.commit()
            .await
            .map_err(|e| AskError::execution(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns = match result.first() {
            Some(first_row) => first_row.columns().iter().map(column_info).collect(),
            None => self.describe_columns(sql).await,
        };

        // Scripts can yield several result sets; keep the rows shaped like the first.
        let rows: Vec<Row> = result
            .iter()
            .take_while(|row| same_shape(row, &columns))
            .map(convert_row)
            .collect();

        info!(
            rows = rows.len(),
            elapsed_ms = execution_time.as_millis() as u64,
            "Query returned rows"
        );

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| AskError::execution(format_query_error(e)))?;

        let result = (&mut *tx)
            .execute(sqlx::raw_sql(sql))
            .await
            .map_err(|e| AskError::execution(format_query_error(e)))?;

        tx.commit()
            .await
            .map_err(|e| AskError::execution(format_query_error(e)))?;

        Ok(result.rows_affected())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| AskError::connection(format!("Failed to close connection: {e}")))
    }
}

fn same_shape(row: &MySqlRow, columns: &[ColumnInfo]) -> bool {
    row.columns().len() == columns.len()
        && row
            .columns()
            .iter()
            .zip(columns)
            .all(|(col, info)| col.name() == info.name)
}

/// Builds driver options field by field so passwords need no URL escaping.
fn connect_options(credentials: &Credentials) -> Result<MySqlConnectOptions> {
    let mut options = MySqlConnectOptions::new()
        .host(credentials.host.trim())
        .port(credentials.port_number()?)
        .username(credentials.user.trim())
        .database(credentials.database.trim());

    if !credentials.password.is_empty() {
        options = options.password(&credentials.password);
    }

    Ok(options)
}

fn column_info(col: &MySqlColumn) -> ColumnInfo {
    ColumnInfo::new(col.name(), col.type_info().name())
}

/// Reads a catalog string, which MySQL may hand back as VARBINARY depending
/// on server charset settings.
fn get_string_by_index(row: &MySqlRow, index: usize) -> Option<String> {
    row.try_get::<String, _>(index).ok().or_else(|| {
        row.try_get::<Vec<u8>, _>(index)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
    })
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

fn decode<'r, T>(row: &'r MySqlRow, index: usize) -> Option<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get::<Option<T>, _>(index).ok().flatten()
}

/// Converts a single column value from a MySqlRow to our Value type.
///
/// Types without a dedicated variant (DECIMAL, JSON, ENUM, ...) fall back to
/// the driver's text form.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let is_null = row
        .try_get_raw(index)
        .map(|raw| raw.is_null())
        .unwrap_or(true);
    if is_null {
        return Value::Null;
    }

    let decoded = match type_name {
        "BOOLEAN" => decode::<bool>(row, index).map(Value::from),

        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            decode::<i64>(row, index).map(Value::from)
        }

        t if t.ends_with(" UNSIGNED") => decode::<u64>(row, index).map(|v| {
            i64::try_from(v)
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(v.to_string()))
        }),

        "FLOAT" | "DOUBLE" => decode::<f64>(row, index).map(Value::from),

        "DATE" => decode::<NaiveDate>(row, index).map(|v| Value::from(v.to_string())),
        "TIME" => decode::<NaiveTime>(row, index).map(|v| Value::from(v.to_string())),
        "DATETIME" => decode::<NaiveDateTime>(row, index).map(|v| Value::from(v.to_string())),
        "TIMESTAMP" => decode::<DateTime<Utc>>(row, index)
            .map(|v| Value::from(v.format("%Y-%m-%d %H:%M:%S").to_string())),

        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BIT"
        | "GEOMETRY" => decode::<Vec<u8>>(row, index).map(Value::from),

        _ => None,
    };

    decoded.unwrap_or_else(|| decode_text(row, index))
}

fn decode_text(row: &MySqlRow, index: usize) -> Value {
    row.try_get_unchecked::<String, _>(index)
        .map(Value::from)
        .or_else(|_| row.try_get_unchecked::<Vec<u8>, _>(index).map(Value::from))
        .unwrap_or(Value::Null)
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, credentials: &Credentials) -> AskError {
    let host = credentials.host.trim();
    let port = credentials.port.trim();
    let user = credentials.user.trim();
    let database = credentials.database.trim();

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("access denied") {
        AskError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("unknown database") {
        AskError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("connection refused")
        || error_str.contains("failed to lookup address")
        || error_str.contains("name or service not known")
        || error_str.contains("no route to host")
    {
        AskError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        AskError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        AskError::connection(error.to_string())
    }
}

/// Formats a query error the way the mysql command-line client does.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    match db_error.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
        Some(mysql_error) => match mysql_error.code() {
            Some(state) => format!(
                "ERROR {} ({}): {}",
                mysql_error.number(),
                state,
                mysql_error.message()
            ),
            None => format!("ERROR {}: {}", mysql_error.number(), mysql_error.message()),
        },
        None => db_error.message().to_string(),
    }
}
