//! Repository contracts and SQLite persistence.
//!
//! # Responsibility
//! - Define data access contracts for contacts.
//! - Keep SQL inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Contact::validate()` before SQL mutations.
//! - Missing rows surface as `NotFound` or `None`, never as transport errors.

pub mod contact_repo;
