use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::map_unique_constraint;
use crate::db::students::validate_issuer;
use crate::error::LibraryError;
use crate::ids::{next_identifier, IdPrefix};
use crate::models::{Book, BookDraft, BookStatus, NO_ISSUER};

const BOOK: &str = "Book";

/// Retrieve the whole inventory in id order. This is the full re-read the UI
/// performs after every write.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare(
            "SELECT BK_NAME, BK_ID, AUTHOR_NAME, GENRE, BK_STATUS, CARD_ID
             FROM Library
             ORDER BY LENGTH(BK_ID), BK_ID",
        )
        .context("failed to prepare book query")?;

    let books = stmt
        .query_map([], book_from_row)
        .context("failed to load books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    tracing::debug!(count = books.len(), "loaded inventory");
    Ok(books)
}

/// Load a single book by id.
pub fn fetch_book(conn: &Connection, id: &str) -> Result<Book> {
    find_book(conn, id)?.ok_or_else(|| {
        LibraryError::NotFound {
            entity: BOOK,
            id: id.to_string(),
        }
        .into()
    })
}

fn find_book(conn: &Connection, id: &str) -> Result<Option<Book>> {
    conn.query_row(
        "SELECT BK_NAME, BK_ID, AUTHOR_NAME, GENRE, BK_STATUS, CARD_ID
         FROM Library WHERE BK_ID = ?1",
        params![id],
        book_from_row,
    )
    .optional()
    .context("failed to look up book")
}

/// Distinct genres already in use, for the genre auto-complete. Sorted by
/// lowercase first, falling back to the original text.
pub fn fetch_genres(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(
            "SELECT DISTINCT GENRE FROM Library
             WHERE GENRE IS NOT NULL AND GENRE <> ''
             ORDER BY LOWER(GENRE), GENRE",
        )
        .context("failed to prepare genre query")?;

    let mut rows = stmt.query([]).context("failed to execute genre query")?;

    let mut genres = Vec::new();
    while let Some(row) = rows.next().context("failed to fetch genre row")? {
        let genre: String = row.get(0).context("failed to read genre value")?;
        genres.push(genre);
    }

    Ok(genres)
}

/// Id the next added book will receive.
pub fn next_book_id(conn: &Connection) -> Result<String> {
    // Longest first, so BK-10000 outranks BK-9999.
    let last: Option<String> = conn
        .query_row(
            "SELECT BK_ID FROM Library
             ORDER BY LENGTH(BK_ID) DESC, BK_ID DESC
             LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read the latest book id")?;

    Ok(next_identifier(IdPrefix::Book, last.as_deref())?)
}

/// Validate the draft, resolve its issuer, and insert it. The issuer check and
/// the insert share a transaction.
pub fn create_book(conn: &Connection, draft: &BookDraft) -> Result<Book> {
    draft.validate()?;
    IdPrefix::Book.check(draft.id.trim())?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;
    let book = resolve_book(&tx, draft.id.trim(), draft)?;

    tx.execute(
        "INSERT INTO Library (BK_NAME, BK_ID, AUTHOR_NAME, GENRE, BK_STATUS, CARD_ID)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            book.name,
            book.id,
            book.author,
            book.genre,
            book.status.as_str(),
            book.issuer
        ],
    )
    .map_err(|err| map_unique_constraint(err, BOOK, &book.id))
    .context("failed to insert book")?;
    tx.commit().context("failed to commit new book")?;

    tracing::info!(id = %book.id, status = %book.status, issuer = %book.issuer, "book added");
    Ok(book)
}

/// Rewrite the book identified by `id` from the draft. The draft's own id is
/// ignored because book ids never change.
pub fn update_book(conn: &Connection, id: &str, draft: &BookDraft) -> Result<Book> {
    let draft = BookDraft {
        id: id.to_string(),
        ..draft.clone()
    };
    draft.validate()?;

    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;
    let book = resolve_book(&tx, id, &draft)?;

    let updated = tx
        .execute(
            "UPDATE Library
             SET BK_NAME = ?1, AUTHOR_NAME = ?2, GENRE = ?3, BK_STATUS = ?4, CARD_ID = ?5
             WHERE BK_ID = ?6",
            params![
                book.name,
                book.author,
                book.genre,
                book.status.as_str(),
                book.issuer,
                book.id
            ],
        )
        .context("failed to update book")?;

    if updated == 0 {
        return Err(LibraryError::NotFound {
            entity: BOOK,
            id: id.to_string(),
        }
        .into());
    }
    tx.commit().context("failed to commit book update")?;

    tracing::info!(id, status = %book.status, issuer = %book.issuer, "book updated");
    Ok(book)
}

/// Remove a single book.
pub fn delete_book(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM Library WHERE BK_ID = ?1", params![id])
        .context("failed to delete book")?;

    if deleted == 0 {
        Err(LibraryError::NotFound {
            entity: BOOK,
            id: id.to_string(),
        }
        .into())
    } else {
        tracing::info!(id, "book deleted");
        Ok(())
    }
}

/// Delete every book, returning how many rows were removed. Students are left
/// alone.
pub fn clear_inventory(conn: &Connection) -> Result<usize> {
    let deleted = conn
        .execute("DELETE FROM Library", [])
        .context("failed to clear inventory")?;
    tracing::info!(deleted, "inventory cleared");
    Ok(deleted)
}

/// Hand an available book to the student holding `card_id`.
pub fn issue_book(conn: &Connection, id: &str, card_id: &str) -> Result<Book> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    let mut book = fetch_book(&tx, id)?;
    if book.status == BookStatus::Issued {
        return Err(LibraryError::StatusConflict {
            id: id.to_string(),
            status: BookStatus::Issued.as_str(),
        }
        .into());
    }
    let issuer = validate_issuer(&tx, card_id)?;

    set_circulation(&tx, id, BookStatus::Issued, &issuer)?;
    tx.commit().context("failed to commit book issue")?;

    tracing::info!(id, issuer = %issuer, "book issued");
    book.status = BookStatus::Issued;
    book.issuer = issuer;
    Ok(book)
}

/// Mark an issued book as returned. The status check and the write share a
/// transaction.
pub fn return_book(conn: &Connection, id: &str) -> Result<Book> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start transaction")?;

    let mut book = fetch_book(&tx, id)?;
    if book.status == BookStatus::Available {
        return Err(LibraryError::StatusConflict {
            id: id.to_string(),
            status: BookStatus::Available.as_str(),
        }
        .into());
    }

    set_circulation(&tx, id, BookStatus::Available, NO_ISSUER)?;
    tx.commit().context("failed to commit book return")?;

    tracing::info!(id, previous_issuer = %book.issuer, "book returned");
    book.status = BookStatus::Available;
    book.issuer = NO_ISSUER.to_string();
    Ok(book)
}

fn set_circulation(conn: &Connection, id: &str, status: BookStatus, issuer: &str) -> Result<()> {
    conn.execute(
        "UPDATE Library SET BK_STATUS = ?1, CARD_ID = ?2 WHERE BK_ID = ?3",
        params![status.as_str(), issuer, id],
    )
    .context("failed to change book status")?;
    Ok(())
}

/// Turn a validated draft into the row to store: trimmed text, and an issuer
/// that is either a registered card id (Issued) or the sentinel (Available).
fn resolve_book(conn: &Connection, id: &str, draft: &BookDraft) -> Result<Book> {
    let issuer = match draft.status {
        BookStatus::Issued => validate_issuer(conn, &draft.issuer)?,
        BookStatus::Available => NO_ISSUER.to_string(),
    };

    Ok(Book {
        name: draft.name.trim().to_string(),
        id: id.to_string(),
        author: draft.author.trim().to_string(),
        genre: draft.genre.trim().to_string(),
        status: draft.status,
        issuer,
    })
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let status: String = row.get(4)?;
    let status = status.parse::<BookStatus>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(err))
    })?;

    Ok(Book {
        name: row.get(0)?,
        id: row.get(1)?,
        author: row.get(2)?,
        genre: row.get(3)?,
        status,
        issuer: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_student, delete_student, ensure_schema, fetch_students};
    use crate::models::StudentDraft;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        create_student(
            &conn,
            "LIB-0001",
            &StudentDraft {
                name: "Ada".into(),
                email: "ada@example.edu".into(),
                course: "Mathematics".into(),
                year: 1,
            },
        )
        .unwrap();
        conn
    }

    fn draft(id: &str, status: BookStatus, issuer: &str) -> BookDraft {
        BookDraft {
            name: "Dune".into(),
            id: id.into(),
            author: "F. Herbert".into(),
            genre: "Science Fiction".into(),
            status,
            issuer: issuer.into(),
        }
    }

    fn kind(err: &anyhow::Error) -> &LibraryError {
        err.downcast_ref::<LibraryError>()
            .expect("expected a LibraryError in the chain")
    }

    #[test]
    fn issued_book_keeps_its_issuer() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Issued, "LIB-0001")).unwrap();

        let book = fetch_book(&conn, "BK-0001").unwrap();
        assert_eq!(book.status, BookStatus::Issued);
        assert_eq!(book.issuer, "LIB-0001");
    }

    #[test]
    fn available_book_always_stores_the_sentinel() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Available, "LIB-0001")).unwrap();
        assert_eq!(fetch_book(&conn, "BK-0001").unwrap().issuer, NO_ISSUER);
    }

    #[test]
    fn unknown_issuer_blocks_create_and_update() {
        let conn = setup();
        let err = create_book(&conn, &draft("BK-0001", BookStatus::Issued, "LIB-0404"))
            .unwrap_err();
        assert_eq!(kind(&err), &LibraryError::UnknownIssuer("LIB-0404".into()));
        assert!(fetch_books(&conn).unwrap().is_empty());

        create_book(&conn, &draft("BK-0001", BookStatus::Available, "")).unwrap();
        let err = update_book(&conn, "BK-0001", &draft("", BookStatus::Issued, "LIB-0404"))
            .unwrap_err();
        assert_eq!(kind(&err), &LibraryError::UnknownIssuer("LIB-0404".into()));

        let book = fetch_book(&conn, "BK-0001").unwrap();
        assert_eq!(book.status, BookStatus::Available);
        assert_eq!(book.issuer, NO_ISSUER);
    }

    #[test]
    fn issued_without_issuer_is_rejected() {
        let conn = setup();
        let err = create_book(&conn, &draft("BK-0001", BookStatus::Issued, "  ")).unwrap_err();
        assert_eq!(kind(&err), &LibraryError::MissingIssuer);
    }

    #[test]
    fn duplicate_book_id_leaves_the_first_intact() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Available, "")).unwrap();

        let mut second = draft("BK-0001", BookStatus::Available, "");
        second.name = "Children of Dune".into();
        let err = create_book(&conn, &second).unwrap_err();
        assert_eq!(
            kind(&err),
            &LibraryError::DuplicateId {
                entity: "Book",
                id: "BK-0001".into(),
            }
        );

        let books = fetch_books(&conn).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].name, "Dune");
    }

    #[test]
    fn missing_genre_is_a_validation_error() {
        let conn = setup();
        let mut incomplete = draft("BK-0001", BookStatus::Available, "");
        incomplete.genre.clear();
        let err = create_book(&conn, &incomplete).unwrap_err();
        assert_eq!(
            kind(&err),
            &LibraryError::MissingField {
                entity: "Book",
                field: "genre",
            }
        );
    }

    #[test]
    fn update_uses_the_selected_id_and_resets_issuer_when_available() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Issued, "LIB-0001")).unwrap();

        let mut changes = draft("BK-9999", BookStatus::Available, "LIB-0001");
        changes.name = "Dune Messiah".into();
        let book = update_book(&conn, "BK-0001", &changes).unwrap();
        assert_eq!(book.id, "BK-0001");

        let stored = fetch_book(&conn, "BK-0001").unwrap();
        assert_eq!(stored.name, "Dune Messiah");
        assert_eq!(stored.issuer, NO_ISSUER);
        assert!(find_book(&conn, "BK-9999").unwrap().is_none());
    }

    #[test]
    fn update_of_missing_book_reports_not_found() {
        let conn = setup();
        let err = update_book(&conn, "BK-0042", &draft("", BookStatus::Available, ""))
            .unwrap_err();
        assert!(matches!(kind(&err), LibraryError::NotFound { .. }));
    }

    #[test]
    fn issue_and_return_toggle_circulation() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Available, "")).unwrap();

        let err = issue_book(&conn, "BK-0001", "LIB-0002").unwrap_err();
        assert_eq!(kind(&err), &LibraryError::UnknownIssuer("LIB-0002".into()));
        assert_eq!(
            fetch_book(&conn, "BK-0001").unwrap().status,
            BookStatus::Available
        );

        let issued = issue_book(&conn, "BK-0001", "LIB-0001").unwrap();
        assert_eq!(issued.issuer_id(), Some("LIB-0001"));
        let err = issue_book(&conn, "BK-0001", "LIB-0001").unwrap_err();
        assert!(matches!(kind(&err), LibraryError::StatusConflict { .. }));

        let returned = return_book(&conn, "BK-0001").unwrap();
        assert_eq!(returned.status, BookStatus::Available);
        let stored = fetch_book(&conn, "BK-0001").unwrap();
        assert_eq!(stored.issuer, NO_ISSUER);
        let err = return_book(&conn, "BK-0001").unwrap_err();
        assert!(matches!(kind(&err), LibraryError::StatusConflict { .. }));
    }

    #[test]
    fn circulation_changes_leave_no_open_transaction() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Issued, "LIB-0001")).unwrap();

        return_book(&conn, "BK-0001").unwrap();
        assert!(conn.is_autocommit());
        assert_eq!(fetch_book(&conn, "BK-0001").unwrap().issuer, NO_ISSUER);

        let err = return_book(&conn, "BK-0001").unwrap_err();
        assert!(matches!(kind(&err), LibraryError::StatusConflict { .. }));
        assert!(conn.is_autocommit());

        let err = return_book(&conn, "BK-0404").unwrap_err();
        assert!(matches!(kind(&err), LibraryError::NotFound { .. }));
        assert!(conn.is_autocommit());
    }

    #[test]
    fn ids_outside_the_book_format_are_rejected() {
        let conn = setup();
        for bad in ["Gift copy", "BK-1", "LIB-0001"] {
            let err = create_book(&conn, &draft(bad, BookStatus::Available, "")).unwrap_err();
            assert!(
                matches!(kind(&err), LibraryError::MalformedId { prefix: "BK", .. }),
                "{bad} should be rejected"
            );
        }
        assert!(fetch_books(&conn).unwrap().is_empty());
        assert_eq!(next_book_id(&conn).unwrap(), "BK-0001");
    }

    #[test]
    fn exhausted_id_space_is_an_error_not_a_panic() {
        let conn = setup();
        let last = format!("BK-{}", u64::MAX);
        create_book(&conn, &draft(&last, BookStatus::Available, "")).unwrap();

        let err = next_book_id(&conn).unwrap_err();
        assert!(matches!(kind(&err), LibraryError::IdsExhausted { prefix: "BK", .. }));
    }

    #[test]
    fn book_ids_are_never_reused() {
        let conn = setup();
        assert_eq!(next_book_id(&conn).unwrap(), "BK-0001");
        create_book(&conn, &draft("BK-0001", BookStatus::Available, "")).unwrap();
        create_book(&conn, &draft("BK-0002", BookStatus::Available, "")).unwrap();
        delete_book(&conn, "BK-0001").unwrap();
        assert_eq!(next_book_id(&conn).unwrap(), "BK-0003");

        let err = delete_book(&conn, "BK-0001").unwrap_err();
        assert!(matches!(kind(&err), LibraryError::NotFound { .. }));
    }

    #[test]
    fn clearing_inventory_keeps_students() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Issued, "LIB-0001")).unwrap();
        create_book(&conn, &draft("BK-0002", BookStatus::Available, "")).unwrap();

        assert_eq!(clear_inventory(&conn).unwrap(), 2);
        assert!(fetch_books(&conn).unwrap().is_empty());
        assert_eq!(fetch_students(&conn).unwrap().len(), 1);
        assert_eq!(next_book_id(&conn).unwrap(), "BK-0001");
    }

    #[test]
    fn deleting_a_borrower_is_not_guarded() {
        let conn = setup();
        create_book(&conn, &draft("BK-0001", BookStatus::Issued, "LIB-0001")).unwrap();

        delete_student(&conn, "LIB-0001").unwrap();

        assert_eq!(fetch_book(&conn, "BK-0001").unwrap().issuer, "LIB-0001");
    }

    #[test]
    fn genres_are_distinct_and_case_insensitively_sorted() {
        let conn = setup();
        let mut book = draft("BK-0001", BookStatus::Available, "");
        book.genre = "poetry".into();
        create_book(&conn, &book).unwrap();
        book.id = "BK-0002".into();
        book.genre = "Drama".into();
        create_book(&conn, &book).unwrap();
        book.id = "BK-0003".into();
        create_book(&conn, &book).unwrap();

        assert_eq!(fetch_genres(&conn).unwrap(), ["Drama", "poetry"]);
    }
}
