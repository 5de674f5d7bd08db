//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and exact-match lookups over the `contacts` table.
//! - Reject connections that were not bootstrapped through `db::open_*`.
//!
//! # Invariants
//! - Every list result is ordered by `id ASC`.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::contact::{Contact, ContactId, ContactValidationError};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    address,
    contact_ulid,
    email,
    gender,
    phone
FROM contacts";

const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "first_name",
    "last_name",
    "address",
    "contact_ulid",
    "email",
    "gender",
    "phone",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(ContactValidationError),
    Db(DbError),
    NotFound(ContactId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract for contacts.
pub trait ContactRepository {
    fn add_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    fn update_contact(&self, id: ContactId, contact: &Contact) -> RepoResult<()>;
    fn delete_by_ulid(&self, ulid: &str) -> RepoResult<usize>;
    fn get_all(&self) -> RepoResult<Vec<Contact>>;
    fn get_by_ulid(&self, ulid: &str) -> RepoResult<Option<Contact>>;
    fn find_first_id_by_ulid(&self, ulid: &str) -> RepoResult<Option<ContactId>>;
    fn search_by_first_name(&self, first_name: &str) -> RepoResult<Vec<Contact>>;
    fn search_by_last_name(&self, last_name: &str) -> RepoResult<Vec<Contact>>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Wraps a connection after checking its schema is current.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema is behind `latest_version()`.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` for foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version < expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'contacts'
            );",
            [],
            |row| row.get(0),
        )?;
        if !table_exists {
            return Err(RepoError::MissingRequiredTable("contacts"));
        }

        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('contacts');")?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|required| !columns.iter().any(|column| column == *required))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: "contacts",
                column: *missing,
            });
        }

        Ok(Self { conn })
    }

    fn query_contacts<P: Params>(&self, filter_sql: &str, params: P) -> RepoResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} {filter_sql} ORDER BY id ASC;"))?;
        let mut rows = stmt.query(params)?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn add_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        self.conn.execute(
            "INSERT INTO contacts (
                first_name,
                last_name,
                address,
                contact_ulid,
                email,
                gender,
                phone
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                contact.first_name,
                contact.last_name,
                contact.address,
                contact.contact_ulid,
                contact.email,
                contact.gender,
                contact.phone,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_contact(&self, id: ContactId, contact: &Contact) -> RepoResult<()> {
        contact.validate()?;

        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                first_name = ?1,
                last_name = ?2,
                address = ?3,
                contact_ulid = ?4,
                email = ?5,
                gender = ?6,
                phone = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                contact.first_name,
                contact.last_name,
                contact.address,
                contact.contact_ulid,
                contact.email,
                contact.gender,
                contact.phone,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn delete_by_ulid(&self, ulid: &str) -> RepoResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM contacts WHERE contact_ulid = ?1;", [ulid])?;
        Ok(removed)
    }

    fn get_all(&self) -> RepoResult<Vec<Contact>> {
        self.query_contacts("", [])
    }

    fn get_by_ulid(&self, ulid: &str) -> RepoResult<Option<Contact>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CONTACT_SELECT_SQL} WHERE contact_ulid = ?1 ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([ulid])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn find_first_id_by_ulid(&self, ulid: &str) -> RepoResult<Option<ContactId>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM contacts WHERE contact_ulid = ?1 ORDER BY id ASC LIMIT 1;",
                [ulid],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn search_by_first_name(&self, first_name: &str) -> RepoResult<Vec<Contact>> {
        self.query_contacts("WHERE first_name = ?1", [first_name])
    }

    fn search_by_last_name(&self, last_name: &str) -> RepoResult<Vec<Contact>> {
        self.query_contacts("WHERE last_name = ?1", [last_name])
    }

    fn count(&self) -> RepoResult<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative contact count `{total}`")))
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let contact = Contact {
        id: Some(row.get("id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        address: row.get("address")?,
        contact_ulid: row.get("contact_ulid")?,
        email: row.get("email")?,
        gender: row.get("gender")?,
        phone: row.get("phone")?,
    };
    contact.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "row {} failed validation: {err}",
            contact.id.unwrap_or_default()
        ))
    })?;
    Ok(contact)
}
