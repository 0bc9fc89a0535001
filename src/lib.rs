//! Message Board - list, post and delete short posts
//!
//! A client-side view controller over a hosted relational backend. The
//! backend owns persistence, joins, authentication and authorization; this
//! crate fetches messages with their authors' display names, inserts and
//! deletes rows, and keeps the view state in memory.
//!
//! # Features
//!
//! - Newest-first listing with keyset paging
//! - Posting as the signed-in user, deleting own messages
//! - One display-name resolution path with an `Anonymous` fallback
//! - Cancellable operations for torn-down views
//! - PostgREST (Supabase) HTTP store and an in-memory store

/// Auth context seam
pub mod auth;
/// The view controller
pub mod board;
/// Configuration management
pub mod config;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// In-memory message store
pub mod memory;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Display-name resolution
pub mod names;
/// Text rendering
pub mod render;
/// PostgREST message store
pub mod rest;
/// Message store trait
pub mod store;
/// Input validation
pub mod validation;

// Re-export key components for easier access
pub use auth::{AuthContext, StaticAuth};
pub use board::{BoardOptions, BoardState, MessageBoard, Outcome};
pub use error::{BoardError, Result};
pub use memory::MemoryStore;
pub use models::{CurrentUser, Message, MessageRow, NewMessage, PageRequest};
pub use rest::RestStore;
pub use store::MessageStore;
