//! Common types and utilities for the tcg type constraint engine.
//!
//! This crate provides foundational types used across all tcg crates:
//! - String interning (`Atom`, `ShardedInterner`)

// String interning for declaration, parameter and field names
pub mod interner;
pub use interner::{Atom, ShardedInterner};
