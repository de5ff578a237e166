//! askdb - ask a MySQL database questions in plain language.
//!
//! This library exposes the pipeline stages for the binary and for
//! integration tests.

pub mod assistant;
pub mod classify;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod logging;
pub mod query;
pub mod render;
pub mod session;
