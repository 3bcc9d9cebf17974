//! # History Store
//!
//! Persists conversation transcripts keyed by an opaque id. Two
//! interchangeable backends implement the same [`ChatHistoryStore`]
//! contract: a single-document file store with a most-recent-10 retention
//! cap, and an uncapped Postgres store.

pub mod error;
pub mod file_store;
pub mod postgres_store;
pub mod store;

// Re-exports
pub use error::{Result, StoreError};
pub use file_store::{FileHistoryStore, MAX_CHATS, STORAGE_VERSION};
pub use postgres_store::PostgresHistoryStore;
pub use store::{ChatHistoryStore, SavedChat};
