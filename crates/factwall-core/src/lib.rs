//! Core types and trait definitions for factwall.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! store and server crates depend on it; it depends on nothing of theirs.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod fact;
pub mod stats;
pub mod store;
pub mod validate;
pub mod vote;

pub use error::{Error, Result};
