//! Use-case services over the contacts repository.
//!
//! # Responsibility
//! - Validate input and compose repository calls into use-case APIs.
//! - Keep the console host decoupled from storage details.

pub mod contact_manager;
