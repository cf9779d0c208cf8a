//! Storage layer for the strength engine
//!
//! This module provides a clean abstraction over the SQLite database,
//! organized into logical components:
//! - `models`: Data structures
//! - `schema`: Database connection and schema management
//! - `queries`: Basic CRUD operations
//! - `coverage`: Coverage and freshness reporting
//!
//! The storage layer is the only component aware of the underlying engine;
//! everything else consumes the typed repository surface.

pub mod coverage;
pub mod models;
pub mod queries;
pub mod schema;

#[cfg(test)]
mod tests;

// Re-export the main types and database struct for easy access
pub use models::*;
pub use schema::StrengthDatabase;
