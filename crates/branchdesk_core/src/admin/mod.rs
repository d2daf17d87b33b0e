//! Admin page logic for branch management.
//!
//! # Responsibility
//! - Model the two-pane admin screen (filter list + detail form) as plain
//!   state, independent of any rendering or HTTP transport.
//!
//! # Invariants
//! - The page never talks to storage; it emits requests and consumes the
//!   responses handed back by the caller.

pub mod branches_page;
