//! SQLite persistence for documents and analysis jobs

pub mod database;

pub use database::DocumentDb;
