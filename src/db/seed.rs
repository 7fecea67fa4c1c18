use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::ids::IdPrefix;
use crate::models::{BookStatus, NO_ISSUER};

/// Student rows written by a default seed.
pub const SAMPLE_STUDENTS: usize = 30;
/// Book rows written by a default seed.
pub const SAMPLE_BOOKS: usize = 50;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "John", "Katherine",
    "Linus", "Margaret",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Turing", "Liskov", "Shannon", "Knuth", "Dijkstra", "Allen", "Hopper", "Backus",
    "Johnson", "Torvalds", "Hamilton", "Ritchie",
];
const COURSES: &[&str] = &[
    "Computer Science",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Physics",
    "Mathematics",
    "Biology",
    "Chemistry",
    "Business Administration",
];
const AUTHORS: &[&str] = &[
    "J.K. Rowling",
    "George R.R. Martin",
    "J.R.R. Tolkien",
    "Stephen King",
    "Agatha Christie",
    "Dan Brown",
    "Harper Lee",
    "Jane Austen",
    "Mark Twain",
    "Leo Tolstoy",
    "F. Scott Fitzgerald",
];
const GENRES: &[&str] = &[
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
];
const TITLE_WORDS: &[&str] = &[
    "Silent", "River", "Glass", "Winter", "Garden", "Shadow", "Iron", "Harbor", "Paper", "Crown",
    "Ember", "Orchard", "Signal", "Lantern", "Tide", "Compass", "Meadow",
];

/// Row counts written by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub students: usize,
    pub books: usize,
    pub issued: usize,
}

/// Replace both tables with a deterministic demo data set. Students come first
/// so every issued book names a registered card; with no students every book
/// is stored as available.
pub fn seed_sample_data(conn: &Connection, students: usize, books: usize) -> Result<SeedSummary> {
    let tx = conn
        .unchecked_transaction()
        .context("failed to start seeding transaction")?;
    tx.execute("DELETE FROM Library", [])
        .context("failed to clear Library table")?;
    tx.execute("DELETE FROM Students", [])
        .context("failed to clear Students table")?;

    let mut card_ids = Vec::with_capacity(students);
    for i in 0..students {
        let card_id = IdPrefix::Student.format(i as u64 + 1);
        let first = FIRST_NAMES[i % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i * 7 + i / FIRST_NAMES.len()) % LAST_NAMES.len()];
        // The index suffix keeps emails unique once name pairs repeat.
        let email = format!(
            "{}.{}{}@university.edu",
            first.to_lowercase(),
            last.to_lowercase(),
            i + 1
        );
        tx.execute(
            "INSERT INTO Students (Card_ID, Name, Email, Course, Year) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                card_id,
                format!("{first} {last}"),
                email,
                COURSES[(i * 3) % COURSES.len()],
                (i % 4 + 1) as u32
            ],
        )
        .with_context(|| format!("failed to insert sample student {card_id}"))?;
        card_ids.push(card_id);
    }

    let mut issued = 0;
    for i in 0..books {
        let id = IdPrefix::Book.format(i as u64 + 1);
        let mut name = format!(
            "{} {}",
            TITLE_WORDS[(i * 5) % TITLE_WORDS.len()],
            TITLE_WORDS[(i * 11 + 3) % TITLE_WORDS.len()]
        );
        if i % 3 == 0 {
            name = format!("The {name}");
        }

        let (status, issuer) = if i % 2 == 1 && !card_ids.is_empty() {
            issued += 1;
            (BookStatus::Issued, card_ids[(i * 13) % card_ids.len()].as_str())
        } else {
            (BookStatus::Available, NO_ISSUER)
        };

        tx.execute(
            "INSERT INTO Library (BK_NAME, BK_ID, AUTHOR_NAME, GENRE, BK_STATUS, CARD_ID)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                name,
                id,
                AUTHORS[(i * 7) % AUTHORS.len()],
                GENRES[(i * 3 + 1) % GENRES.len()],
                status.as_str(),
                issuer
            ],
        )
        .with_context(|| format!("failed to insert sample book {id}"))?;
    }

    tx.commit().context("failed to commit sample data")?;

    let summary = SeedSummary {
        students,
        books,
        issued,
    };
    tracing::info!(?summary, "sample data written");
    Ok(summary)
}

/// Seed the default sample set only when both tables are empty. Returns
/// `None` when existing data was left alone.
pub fn seed_if_empty(conn: &Connection) -> Result<Option<SeedSummary>> {
    let rows: i64 = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM Library) + (SELECT COUNT(*) FROM Students)",
            [],
            |row| row.get(0),
        )
        .context("failed to count existing rows")?;
    if rows > 0 {
        tracing::debug!(rows, "database not empty; skipping sample data");
        return Ok(None);
    }
    seed_sample_data(conn, SAMPLE_STUDENTS, SAMPLE_BOOKS).map(Some)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::db::{ensure_schema, fetch_books, fetch_students, next_book_id, next_card_id};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn seeded_books_only_name_registered_cards() {
        let conn = setup();
        let summary = seed_sample_data(&conn, SAMPLE_STUDENTS, SAMPLE_BOOKS).unwrap();
        assert_eq!(summary.issued, SAMPLE_BOOKS / 2);

        let students = fetch_students(&conn).unwrap();
        let cards: HashSet<&str> = students.iter().map(|s| s.card_id.as_str()).collect();
        let emails: HashSet<&str> = students.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails.len(), SAMPLE_STUDENTS);

        for book in fetch_books(&conn).unwrap() {
            match book.status {
                BookStatus::Issued => assert!(cards.contains(book.issuer.as_str())),
                BookStatus::Available => assert_eq!(book.issuer, NO_ISSUER),
            }
        }

        assert_eq!(next_card_id(&conn).unwrap(), "LIB-0031");
        assert_eq!(next_book_id(&conn).unwrap(), "BK-0051");
    }

    #[test]
    fn without_students_every_book_is_available() {
        let conn = setup();
        let summary = seed_sample_data(&conn, 0, 4).unwrap();
        assert_eq!(summary.issued, 0);
        assert!(fetch_books(&conn)
            .unwrap()
            .iter()
            .all(|b| b.status == BookStatus::Available));
    }

    #[test]
    fn existing_data_is_never_overwritten() {
        let conn = setup();
        seed_sample_data(&conn, 2, 0).unwrap();
        assert_eq!(seed_if_empty(&conn).unwrap(), None);
        assert_eq!(fetch_students(&conn).unwrap().len(), 2);

        let fresh = setup();
        assert!(seed_if_empty(&fresh).unwrap().is_some());
    }
}
