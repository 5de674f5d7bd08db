//! Contact record and its field rules.
//!
//! # Responsibility
//! - Define the persisted contact shape.
//! - Enforce presence, length and format rules before writes.
//!
//! # Invariants
//! - `contact_ulid` is 10+ characters of `0-9A-Z`; it is not unique.
//! - `id` is `None` until the store assigns one.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row key.
pub type ContactId = i64;

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_ADDRESS_CHARS: usize = 100;
pub const MAX_GENDER_CHARS: usize = 10;

static ULID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Z]{10,}$").expect("valid ulid regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{6,15}$").expect("valid phone regex"));

/// First rule a contact breaks, in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    MissingField(&'static str),
    FieldTooLong { field: &'static str, max: usize },
    InvalidUlid(String),
    InvalidEmail(String),
    InvalidPhone(String),
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::FieldTooLong { field, max } => {
                write!(f, "{field} must be at most {max} characters")
            }
            Self::InvalidUlid(value) => write!(
                f,
                "contact_ulid `{value}` must be at least 10 digits or uppercase letters"
            ),
            Self::InvalidEmail(value) => write!(f, "email `{value}` is not a valid address"),
            Self::InvalidPhone(value) => write!(f, "phone `{value}` is not a valid number"),
        }
    }
}

impl Error for ContactValidationError {}

/// One entry in the contacts book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Row key; `None` for contacts not yet stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    /// Caller-supplied external identifier.
    pub contact_ulid: String,
    pub email: String,
    pub gender: String,
    pub phone: String,
}

impl Contact {
    /// Builds an unsaved contact. Does not validate.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        contact_ulid: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            address: address.into(),
            contact_ulid: contact_ulid.into(),
            email: email.into(),
            gender: gender.into(),
            phone: phone.into(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Checks every field rule and returns the first violation.
    ///
    /// # Errors
    /// - `MissingField` for blank values.
    /// - `FieldTooLong` for names over 50, address over 100, gender over 10 chars.
    /// - `InvalidUlid`, `InvalidEmail`, `InvalidPhone` for format mismatches.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        bounded("first_name", &self.first_name, MAX_NAME_CHARS)?;
        bounded("last_name", &self.last_name, MAX_NAME_CHARS)?;
        bounded("address", &self.address, MAX_ADDRESS_CHARS)?;

        required("contact_ulid", &self.contact_ulid)?;
        if !ULID_RE.is_match(&self.contact_ulid) {
            return Err(ContactValidationError::InvalidUlid(self.contact_ulid.clone()));
        }

        required("email", &self.email)?;
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ContactValidationError::InvalidEmail(self.email.clone()));
        }

        bounded("gender", &self.gender, MAX_GENDER_CHARS)?;

        required("phone", &self.phone)?;
        if !PHONE_RE.is_match(&self.phone) {
            return Err(ContactValidationError::InvalidPhone(self.phone.clone()));
        }

        Ok(())
    }
}

fn required(field: &'static str, value: &str) -> Result<(), ContactValidationError> {
    if value.trim().is_empty() {
        return Err(ContactValidationError::MissingField(field));
    }
    Ok(())
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), ContactValidationError> {
    required(field, value)?;
    if value.chars().count() > max {
        return Err(ContactValidationError::FieldTooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactValidationError};

    fn sample() -> Contact {
        Contact::new(
            "Ivan",
            "Petrov",
            "1ABC23456HH",
            "ivan@example.com",
            "0889933779",
            "12 Main St",
            "Male",
        )
    }

    #[test]
    fn sample_is_valid() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn ulid_rejects_lowercase_and_short_values() {
        let mut contact = sample();
        contact.contact_ulid = "1abc23456hh".to_string();
        assert!(matches!(
            contact.validate(),
            Err(ContactValidationError::InvalidUlid(_))
        ));

        contact.contact_ulid = "ABC123456".to_string();
        assert!(matches!(
            contact.validate(),
            Err(ContactValidationError::InvalidUlid(_))
        ));
    }

    #[test]
    fn name_length_counts_chars_not_bytes() {
        let mut contact = sample();
        contact.first_name = "Ж".repeat(50);
        assert_eq!(contact.validate(), Ok(()));

        contact.first_name.push('Ж');
        assert_eq!(
            contact.validate(),
            Err(ContactValidationError::FieldTooLong {
                field: "first_name",
                max: 50
            })
        );
    }

    #[test]
    fn phone_allows_leading_plus_only() {
        let mut contact = sample();
        contact.phone = "+359889933779".to_string();
        assert_eq!(contact.validate(), Ok(()));

        contact.phone = "088-993-3779".to_string();
        assert!(matches!(
            contact.validate(),
            Err(ContactValidationError::InvalidPhone(_))
        ));
    }
}
