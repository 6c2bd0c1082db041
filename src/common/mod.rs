//! Shared error types, result helpers and the verbosity level.

pub mod error;
pub mod result;
pub mod verbosity;
