//! `stocktrack-core`: shared building blocks.
//!
//! This crate contains **pure** primitives (no IO, no async) used by every other crate.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::ItemId;
