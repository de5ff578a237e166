//! Integration tests for askdb.

pub mod mysql_test;
pub mod pipeline_test;
