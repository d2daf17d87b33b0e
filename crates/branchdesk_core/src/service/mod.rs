//! Branch use-case services.
//!
//! # Responsibility
//! - Turn repository calls into the save/delete/filter use cases the admin
//!   page and CLI need.
//! - Keep HTTP and CLI layers independent of SQL details.

pub mod branch_service;
