//! Persistence module split across logical submodules. Every function takes
//! the connection explicitly; nothing here holds global state.

mod books;
mod connection;
mod seed;
mod students;

use rusqlite::{ffi, Error as SqlError, ErrorCode};

use crate::error::LibraryError;

pub use books::{
    clear_inventory, create_book, delete_book, fetch_book, fetch_books, fetch_genres, issue_book,
    next_book_id, return_book, update_book,
};
pub use connection::{ensure_schema, open_database};
pub use seed::{seed_if_empty, seed_sample_data, SeedSummary, SAMPLE_BOOKS, SAMPLE_STUDENTS};
pub use students::{
    create_student, delete_student, fetch_student, fetch_students, next_card_id, update_student,
    validate_issuer,
};

/// Turn a primary key collision into a readable `DuplicateId`; any other
/// SQLite failure passes through with its raw message.
pub(crate) fn map_unique_constraint(err: SqlError, entity: &'static str, id: &str) -> anyhow::Error {
    match &err {
        SqlError::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                ) =>
        {
            tracing::warn!(entity, id, "rejected duplicate id");
            LibraryError::DuplicateId {
                entity,
                id: id.to_string(),
            }
            .into()
        }
        _ => err.into(),
    }
}
