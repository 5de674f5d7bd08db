//! Contact manager: validation and orchestration over a repository.
//!
//! # Responsibility
//! - Reject invalid contacts before any write.
//! - Reject blank lookup keys before touching storage.
//! - Turn empty lookups into typed `NotFound` failures.
//!
//! # Invariants
//! - Manager APIs never bypass repository persistence contracts.
//! - Log lines carry row ids and counts only, never contact fields.

use crate::model::contact::{Contact, ContactId, ContactValidationError};
use crate::repo::contact_repo::{ContactRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Which lookup came back empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    NoContacts,
    FirstName,
    LastName,
    Ulid(String),
}

impl Display for NotFoundReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoContacts => write!(f, "No contact found."),
            Self::FirstName => write!(f, "No contact found with the given first name."),
            Self::LastName => write!(f, "No contact found with the given last name."),
            Self::Ulid(ulid) => write!(f, "No contact found with ULID: {ulid}"),
        }
    }
}

/// Error surface of the contact manager.
#[derive(Debug)]
pub enum ManagerError {
    /// The contact breaks a field rule; the cause is kept as `source()`.
    InvalidContact(ContactValidationError),
    /// A lookup key was empty or whitespace.
    InvalidArgument(&'static str),
    NotFound(NotFoundReason),
    Repo(RepoError),
}

impl ManagerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidContact(_))
    }
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidContact(_) => write!(f, "Invalid contact!"),
            Self::InvalidArgument(message) => write!(f, "{message}"),
            Self::NotFound(reason) => write!(f, "{reason}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidContact(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ManagerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidContact(err),
            other => Self::Repo(other),
        }
    }
}

/// Contact use-cases over any repository implementation.
pub struct ContactManager<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactManager<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and stores a new contact, returning its row id.
    ///
    /// Duplicate ULIDs are accepted.
    pub fn add(&self, contact: &Contact) -> ManagerResult<ContactId> {
        ensure_valid(contact, "contact_add")?;
        let id = self.repo.add_contact(contact)?;
        info!("event=contact_add module=service status=ok contact_id={id}");
        Ok(id)
    }

    /// Validates and overwrites an existing contact.
    ///
    /// Targets `contact.id` when set, otherwise the oldest row sharing
    /// `contact.contact_ulid`.
    pub fn update(&self, contact: &Contact) -> ManagerResult<()> {
        ensure_valid(contact, "contact_update")?;

        let id = match contact.id {
            Some(id) => id,
            None => self
                .repo
                .find_first_id_by_ulid(&contact.contact_ulid)?
                .ok_or_else(|| {
                    ManagerError::NotFound(NotFoundReason::Ulid(contact.contact_ulid.clone()))
                })?,
        };

        match self.repo.update_contact(id, contact) {
            Ok(()) => {
                info!("event=contact_update module=service status=ok contact_id={id}");
                Ok(())
            }
            Err(RepoError::NotFound(_)) => Err(ManagerError::NotFound(NotFoundReason::Ulid(
                contact.contact_ulid.clone(),
            ))),
            Err(err) => Err(err.into()),
        }
    }

    /// Removes every contact with the given ULID.
    pub fn delete(&self, ulid: &str) -> ManagerResult<()> {
        non_blank(ulid, "ULID cannot be empty.")?;
        let removed = self.repo.delete_by_ulid(ulid)?;
        if removed == 0 {
            return Err(ManagerError::NotFound(NotFoundReason::Ulid(ulid.to_string())));
        }
        info!("event=contact_delete module=service status=ok removed={removed}");
        Ok(())
    }

    /// Returns every contact ordered by row id.
    pub fn get_all(&self) -> ManagerResult<Vec<Contact>> {
        non_empty(self.repo.get_all()?, NotFoundReason::NoContacts)
    }

    /// Exact, case-sensitive first name match.
    pub fn search_by_first_name(&self, first_name: &str) -> ManagerResult<Vec<Contact>> {
        non_blank(first_name, "First name cannot be empty.")?;
        non_empty(
            self.repo.search_by_first_name(first_name)?,
            NotFoundReason::FirstName,
        )
    }

    /// Exact, case-sensitive last name match.
    pub fn search_by_last_name(&self, last_name: &str) -> ManagerResult<Vec<Contact>> {
        non_blank(last_name, "Last name cannot be empty.")?;
        non_empty(
            self.repo.search_by_last_name(last_name)?,
            NotFoundReason::LastName,
        )
    }

    /// Returns the oldest contact with the given ULID.
    pub fn get_specific(&self, ulid: &str) -> ManagerResult<Contact> {
        non_blank(ulid, "ULID cannot be empty.")?;
        self.repo
            .get_by_ulid(ulid)?
            .ok_or_else(|| ManagerError::NotFound(NotFoundReason::Ulid(ulid.to_string())))
    }

    pub fn count(&self) -> ManagerResult<u64> {
        Ok(self.repo.count()?)
    }
}

fn ensure_valid(contact: &Contact, event: &str) -> ManagerResult<()> {
    contact.validate().map_err(|err| {
        warn!("event={event} module=service status=rejected reason=validation");
        ManagerError::InvalidContact(err)
    })
}

fn non_blank(value: &str, message: &'static str) -> ManagerResult<()> {
    if value.trim().is_empty() {
        return Err(ManagerError::InvalidArgument(message));
    }
    Ok(())
}

fn non_empty(contacts: Vec<Contact>, reason: NotFoundReason) -> ManagerResult<Vec<Contact>> {
    if contacts.is_empty() {
        return Err(ManagerError::NotFound(reason));
    }
    Ok(contacts)
}

#[cfg(test)]
mod tests {
    use super::{ContactManager, ManagerError, NotFoundReason};
    use crate::model::contact::{Contact, ContactId};
    use crate::repo::contact_repo::{ContactRepository, RepoResult};
    use std::cell::Cell;

    /// Counts storage calls and returns empty results.
    #[derive(Default)]
    struct UntouchedRepo {
        calls: Cell<u32>,
    }

    impl UntouchedRepo {
        fn hit<T>(&self, value: T) -> RepoResult<T> {
            self.calls.set(self.calls.get() + 1);
            Ok(value)
        }
    }

    impl ContactRepository for &UntouchedRepo {
        fn add_contact(&self, _contact: &Contact) -> RepoResult<ContactId> {
            self.hit(1)
        }
        fn update_contact(&self, _id: ContactId, _contact: &Contact) -> RepoResult<()> {
            self.hit(())
        }
        fn delete_by_ulid(&self, _ulid: &str) -> RepoResult<usize> {
            self.hit(0)
        }
        fn get_all(&self) -> RepoResult<Vec<Contact>> {
            self.hit(Vec::new())
        }
        fn get_by_ulid(&self, _ulid: &str) -> RepoResult<Option<Contact>> {
            self.hit(None)
        }
        fn find_first_id_by_ulid(&self, _ulid: &str) -> RepoResult<Option<ContactId>> {
            self.hit(None)
        }
        fn search_by_first_name(&self, _first_name: &str) -> RepoResult<Vec<Contact>> {
            self.hit(Vec::new())
        }
        fn search_by_last_name(&self, _last_name: &str) -> RepoResult<Vec<Contact>> {
            self.hit(Vec::new())
        }
        fn count(&self) -> RepoResult<u64> {
            self.hit(0)
        }
    }

    #[test]
    fn invalid_contact_never_reaches_repository() {
        let repo = UntouchedRepo::default();
        let manager = ContactManager::new(&repo);

        let err = manager.add(&Contact::default()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Invalid contact!");

        let err = manager.update(&Contact::default()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(repo.calls.get(), 0);
    }

    #[test]
    fn blank_keys_are_rejected_before_storage() {
        let repo = UntouchedRepo::default();
        let manager = ContactManager::new(&repo);

        for blank in ["", "   ", "\t\n"] {
            assert!(matches!(
                manager.delete(blank),
                Err(ManagerError::InvalidArgument("ULID cannot be empty."))
            ));
            assert!(matches!(
                manager.get_specific(blank),
                Err(ManagerError::InvalidArgument(_))
            ));
            assert!(matches!(
                manager.search_by_first_name(blank),
                Err(ManagerError::InvalidArgument(_))
            ));
            assert!(matches!(
                manager.search_by_last_name(blank),
                Err(ManagerError::InvalidArgument(_))
            ));
        }
        assert_eq!(repo.calls.get(), 0);
    }

    #[test]
    fn not_found_messages_are_stable() {
        assert_eq!(NotFoundReason::NoContacts.to_string(), "No contact found.");
        assert_eq!(
            NotFoundReason::Ulid("ABC".to_string()).to_string(),
            "No contact found with ULID: ABC"
        );
    }
}
