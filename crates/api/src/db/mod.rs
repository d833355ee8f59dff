//! Database schema, migrations, and query builders.
//!
//! Builders return `(sql, values)` pairs for SQLite; the server binds the
//! values to rusqlite.

pub mod items;
pub mod members;
pub mod migrations;
pub mod tables;
pub mod users;
pub mod workspaces;

pub use tables::*;

/// A built statement: SQL text plus positional parameter values.
pub type Built = (String, sea_query::Values);
