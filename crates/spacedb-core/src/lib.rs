//! Core types and workflows for the hackspace member database.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and HTTP crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod credential;
pub mod device;
pub mod error;
pub mod person;
pub mod policy;
pub mod snapshot;
pub mod store;
pub mod workflow;

pub use error::{Result, ValidationError};
