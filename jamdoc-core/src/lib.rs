//! Core library for JamDoc.
//!
//! This crate provides the domain models and database operations for JamDoc,
//! independent of any transport layer (HTTP, CLI, etc.). All data lives in a
//! single SQLite file on the user's machine.
//!
//! # Usage
//!
//! ```no_run
//! use jamdoc_core::db::Database;
//! use jamdoc_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let projects = db.list_projects()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod db;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
