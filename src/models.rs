//! Domain models that mirror the two SQLite tables and get passed throughout
//! the TUI. Rows (`Book`, `Student`) are plain data holders; drafts carry raw
//! form input and own the presence validation that runs before every write.

use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;

/// Sentinel stored in `CARD_ID` while a book sits on the shelf.
pub const NO_ISSUER: &str = "N/A";

/// Genre suggestions offered by the book form before any custom genre exists.
pub const COMMON_GENRES: &[&str] = &[
    "Fiction",
    "Science Fiction",
    "Fantasy",
    "Mystery",
    "Thriller",
    "Romance",
    "Horror",
    "Biography",
    "History",
    "Science",
    "Non-Fiction",
    "Adventure",
    "Crime",
    "Drama",
    "Poetry",
    "Self-Help",
];

/// Circulation state of a book, stored verbatim in `BK_STATUS`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum BookStatus {
    #[default]
    Available,
    Issued,
}

impl BookStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::Issued => "Issued",
        }
    }

    /// The opposite state; used by the form's status selector.
    pub fn toggled(self) -> Self {
        match self {
            BookStatus::Available => BookStatus::Issued,
            BookStatus::Issued => BookStatus::Available,
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookStatus::Available),
            "Issued" => Ok(BookStatus::Issued),
            other => Err(LibraryError::InvalidStatus(other.to_string())),
        }
    }
}

/// One row of the `Library` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub name: String,
    /// `BK-####` key. Never changes after the book is created.
    pub id: String,
    pub author: String,
    pub genre: String,
    pub status: BookStatus,
    /// Card id of the borrower, or [`NO_ISSUER`].
    pub issuer: String,
}

impl Book {
    /// Borrower card id, if the book is out.
    pub fn issuer_id(&self) -> Option<&str> {
        if self.issuer == NO_ISSUER || self.issuer.trim().is_empty() {
            None
        } else {
            Some(&self.issuer)
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Raw book form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub name: String,
    pub id: String,
    pub author: String,
    pub genre: String,
    pub status: BookStatus,
    /// Only meaningful when `status` is `Issued`; ignored otherwise.
    pub issuer: String,
}

impl BookDraft {
    /// Check every required field, reporting the first one that is blank.
    /// The issuer is checked separately against the Students table.
    pub fn validate(&self) -> Result<(), LibraryError> {
        require("Book", "ID", &self.id)?;
        require("Book", "name", &self.name)?;
        require("Book", "author", &self.author)?;
        require("Book", "genre", &self.genre)?;
        Ok(())
    }
}

/// One row of the `Students` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    /// `LIB-####` key, immutable once created.
    pub card_id: String,
    pub name: String,
    pub email: String,
    pub course: String,
    pub year: u32,
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.card_id)
    }
}

/// Raw student form input. The card id is allocated separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDraft {
    pub name: String,
    pub email: String,
    pub course: String,
    pub year: u32,
}

impl StudentDraft {
    pub fn validate(&self) -> Result<(), LibraryError> {
        require("Student", "name", &self.name)?;
        require("Student", "email", &self.email)?;
        require("Student", "course", &self.course)?;
        if self.year == 0 {
            return Err(LibraryError::MissingField {
                entity: "Student",
                field: "year",
            });
        }
        Ok(())
    }
}

fn require(entity: &'static str, field: &'static str, value: &str) -> Result<(), LibraryError> {
    if value.trim().is_empty() {
        Err(LibraryError::MissingField { entity, field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> BookDraft {
        BookDraft {
            name: "Dune".into(),
            id: "BK-0001".into(),
            author: "F. Herbert".into(),
            genre: "Science Fiction".into(),
            status: BookStatus::Available,
            issuer: String::new(),
        }
    }

    #[test]
    fn complete_book_draft_passes() {
        assert_eq!(dune().validate(), Ok(()));
    }

    #[test]
    fn blank_book_fields_are_reported_by_name() {
        let mut draft = dune();
        draft.genre = "   ".into();
        assert_eq!(
            draft.validate(),
            Err(LibraryError::MissingField {
                entity: "Book",
                field: "genre",
            })
        );

        draft.name.clear();
        assert_eq!(
            draft.validate(),
            Err(LibraryError::MissingField {
                entity: "Book",
                field: "name",
            })
        );
    }

    #[test]
    fn student_year_must_be_positive() {
        let draft = StudentDraft {
            name: "Ada".into(),
            email: "ada@example.edu".into(),
            course: "CS".into(),
            year: 0,
        };
        assert_eq!(
            draft.validate(),
            Err(LibraryError::MissingField {
                entity: "Student",
                field: "year",
            })
        );
        assert_eq!(StudentDraft { year: 2, ..draft }.validate(), Ok(()));
    }

    #[test]
    fn status_round_trips_through_its_column_text() {
        assert_eq!("Issued".parse::<BookStatus>(), Ok(BookStatus::Issued));
        assert_eq!(BookStatus::Available.to_string(), "Available");
        assert_eq!(
            "Lost".parse::<BookStatus>(),
            Err(LibraryError::InvalidStatus("Lost".into()))
        );
    }

    #[test]
    fn sentinel_issuer_reads_as_none() {
        let mut book = Book {
            name: "Dune".into(),
            id: "BK-0001".into(),
            author: "F. Herbert".into(),
            genre: "Science Fiction".into(),
            status: BookStatus::Available,
            issuer: NO_ISSUER.into(),
        };
        assert_eq!(book.issuer_id(), None);
        book.issuer = "LIB-0003".into();
        assert_eq!(book.issuer_id(), Some("LIB-0003"));
    }
}
