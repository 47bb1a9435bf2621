//! Common library for the WitWar application
//!
//! This crate provides shared infrastructure used by the WitWar service:
//! PostgreSQL connection pooling, configuration, and database error types.

pub mod database;
pub mod error;
