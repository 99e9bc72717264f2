//! Shared utilities.
//!
//! Lexical path helpers and test helpers used across the crate.

pub mod path;

#[cfg(test)]
pub mod testutil;
