//! Domain model for the contacts book.
//!
//! # Invariants
//! - A contact must pass `Contact::validate()` before it is persisted.
//! - Row identity (`ContactId`) is assigned by the store, not by callers.

pub mod contact;
