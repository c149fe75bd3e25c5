//! Core types, scheduling and study-session logic for Rote.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::FlashcardStore`]; the [`study::Study`] orchestrator
//! drives a review session against any such backend.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod card;
pub mod deck;
pub mod error;
pub mod queue;
pub mod schedule;
pub mod session;
pub mod store;
pub mod study;

mod validate;

pub use error::{Error, ErrorKind, Result};
