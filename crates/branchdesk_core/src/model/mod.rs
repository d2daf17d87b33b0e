//! Domain model for branch location records.
//!
//! # Invariants
//! - A persisted branch always has a non-empty `name` and `location`.
//! - A branch category is optional; `0` and blank input mean "no category".

pub mod branch;
