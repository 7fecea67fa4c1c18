use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::map_unique_constraint;
use crate::error::LibraryError;
use crate::ids::{next_identifier, IdPrefix};
use crate::models::{Student, StudentDraft};

const STUDENT: &str = "Student";

/// Retrieve every registered student in card id order.
pub fn fetch_students(conn: &Connection) -> Result<Vec<Student>> {
    let mut stmt = conn
        .prepare(
            "SELECT Card_ID, Name, Email, Course, Year
             FROM Students
             ORDER BY LENGTH(Card_ID), Card_ID",
        )
        .context("failed to prepare student query")?;

    let students = stmt
        .query_map([], student_from_row)
        .context("failed to load students")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect students")?;

    tracing::debug!(count = students.len(), "loaded students");
    Ok(students)
}

/// Load a single student by card id.
pub fn fetch_student(conn: &Connection, card_id: &str) -> Result<Student> {
    find_student(conn, card_id)?.ok_or_else(|| {
        LibraryError::NotFound {
            entity: STUDENT,
            id: card_id.to_string(),
        }
        .into()
    })
}

fn find_student(conn: &Connection, card_id: &str) -> Result<Option<Student>> {
    conn.query_row(
        "SELECT Card_ID, Name, Email, Course, Year FROM Students WHERE Card_ID = ?1",
        params![card_id],
        student_from_row,
    )
    .optional()
    .context("failed to look up student")
}

/// Card id the next registered student will receive.
pub fn next_card_id(conn: &Connection) -> Result<String> {
    // Longest first, so LIB-10000 outranks LIB-9999.
    let last: Option<String> = conn
        .query_row(
            "SELECT Card_ID FROM Students
             ORDER BY LENGTH(Card_ID) DESC, Card_ID DESC
             LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .context("failed to read the latest card id")?;

    Ok(next_identifier(IdPrefix::Student, last.as_deref())?)
}

/// Register a student under the previewed `card_id`.
pub fn create_student(conn: &Connection, card_id: &str, draft: &StudentDraft) -> Result<Student> {
    let card_id = card_id.trim();
    if card_id.is_empty() {
        return Err(LibraryError::MissingField {
            entity: STUDENT,
            field: "card ID",
        }
        .into());
    }
    IdPrefix::Student.check(card_id)?;
    draft.validate()?;

    let student = Student {
        card_id: card_id.to_string(),
        name: draft.name.trim().to_string(),
        email: draft.email.trim().to_string(),
        course: draft.course.trim().to_string(),
        year: draft.year,
    };

    conn.execute(
        "INSERT INTO Students (Card_ID, Name, Email, Course, Year)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            student.card_id,
            student.name,
            student.email,
            student.course,
            student.year
        ],
    )
    .map_err(|err| map_unique_constraint(err, STUDENT, &student.card_id))
    .context("failed to insert student")?;

    tracing::info!(card_id = %student.card_id, "student registered");
    Ok(student)
}

/// Overwrite the editable fields of the student identified by `card_id`. The
/// card id itself never changes.
pub fn update_student(conn: &Connection, card_id: &str, draft: &StudentDraft) -> Result<Student> {
    draft.validate()?;

    let student = Student {
        card_id: card_id.to_string(),
        name: draft.name.trim().to_string(),
        email: draft.email.trim().to_string(),
        course: draft.course.trim().to_string(),
        year: draft.year,
    };

    let updated = conn
        .execute(
            "UPDATE Students SET Name = ?1, Email = ?2, Course = ?3, Year = ?4
             WHERE Card_ID = ?5",
            params![
                student.name,
                student.email,
                student.course,
                student.year,
                student.card_id
            ],
        )
        .context("failed to update student")?;

    if updated == 0 {
        return Err(LibraryError::NotFound {
            entity: STUDENT,
            id: card_id.to_string(),
        }
        .into());
    }

    tracing::info!(card_id, "student updated");
    Ok(student)
}

/// Remove a student. Books issued to this card keep pointing at it.
pub fn delete_student(conn: &Connection, card_id: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM Students WHERE Card_ID = ?1", params![card_id])
        .context("failed to delete student")?;

    if deleted == 0 {
        Err(LibraryError::NotFound {
            entity: STUDENT,
            id: card_id.to_string(),
        }
        .into())
    } else {
        tracing::info!(card_id, "student deleted");
        Ok(())
    }
}

/// Confirm that `card_id` names a registered student and return the trimmed id
/// ready for storage in `Library.CARD_ID`.
pub fn validate_issuer(conn: &Connection, card_id: &str) -> Result<String> {
    let card_id = card_id.trim();
    if card_id.is_empty() {
        return Err(LibraryError::MissingIssuer.into());
    }

    let exists: bool = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM Students WHERE Card_ID = ?1)",
            params![card_id],
            |row| row.get(0),
        )
        .context("failed to check issuer card id")?;

    if exists {
        Ok(card_id.to_string())
    } else {
        tracing::warn!(card_id, "rejected unknown issuer");
        Err(LibraryError::UnknownIssuer(card_id.to_string()).into())
    }
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        card_id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        course: row.get(3)?,
        year: row.get(4)?,
    })
}
