//! Query execution for askdb.
//!
//! Routes the SQL buffer to the row-fetching or acknowledgment path.

pub mod executor;

pub use executor::{QueryExecutor, QueryOutcome};
