//! Domain errors raised by the record operations. Persistence helpers wrap
//! these in `anyhow` context, so callers that need to branch on the failure
//! kind use `err.downcast_ref::<LibraryError>()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// A required form field was empty or whitespace only.
    #[error("{entity} {field} is required.")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("Issuer Card ID cannot be empty. Please enter a valid Card ID.")]
    MissingIssuer,

    #[error("Card ID {0} is not registered. Please register as a student first.")]
    UnknownIssuer(String),

    #[error("{entity} ID {id} already exists.")]
    DuplicateId { entity: &'static str, id: String },

    #[error("{entity} {id} not found.")]
    NotFound { entity: &'static str, id: String },

    /// Issuing an issued book or returning an available one.
    #[error("Book {id} is already {status}.")]
    StatusConflict { id: String, status: &'static str },

    #[error("Identifier '{id}' does not match the {prefix}-#### format.")]
    MalformedId { prefix: &'static str, id: String },

    /// The numeric suffix of the current maximum cannot be incremented.
    #[error("No {prefix} identifiers remain after {last}.")]
    IdsExhausted { prefix: &'static str, last: String },

    #[error("Unknown book status '{0}'.")]
    InvalidStatus(String),
}
