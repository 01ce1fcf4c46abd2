//! SQLite backend for the hackspace member database.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. One [`SqliteStore`] serves both the
//! admin tool ([`MemberStore`](spacedb_core::store::MemberStore)) and the
//! status document sources.

mod encode;
mod schema;
mod status;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
