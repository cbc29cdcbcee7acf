//! Shared domain-agnostic types.

pub mod id;

pub use id::PostingId;
