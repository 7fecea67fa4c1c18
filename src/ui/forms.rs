use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BookDraft, BookStatus, Student, StudentDraft};

/// Internal representation of the book form fields. The id is allocated before
/// the form opens and is never editable.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) author: String,
    pub(crate) genre: String,
    pub(crate) status: BookStatus,
    pub(crate) issuer: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

/// Focusable fields of the book form, in tab order.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) enum BookField {
    #[default]
    Name,
    Author,
    Genre,
    Status,
    Issuer,
}

impl BookForm {
    /// Blank form for a new book with the previewed id.
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Populate the form from an existing book when editing.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            status: book.status,
            issuer: book.issuer_id().unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    /// Move focus forward. The issuer field is skipped while the book is
    /// available.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Name => BookField::Author,
            BookField::Author => BookField::Genre,
            BookField::Genre => BookField::Status,
            BookField::Status if self.status == BookStatus::Issued => BookField::Issuer,
            BookField::Status | BookField::Issuer => BookField::Name,
        };
        self.suggestion = None;
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            BookField::Name if self.status == BookStatus::Issued => BookField::Issuer,
            BookField::Name => BookField::Status,
            BookField::Author => BookField::Name,
            BookField::Genre => BookField::Author,
            BookField::Status => BookField::Genre,
            BookField::Issuer => BookField::Status,
        };
        self.suggestion = None;
    }

    /// Flip between Available and Issued.
    pub(crate) fn cycle_status(&mut self) {
        self.status = self.status.toggled();
    }

    /// Insert a character into the active field. On the status field a space
    /// flips the status instead.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            BookField::Name => self.name.push(ch),
            BookField::Author => self.author.push(ch),
            BookField::Genre => {
                self.autocomplete_disabled = false;
                self.genre.push(ch);
            }
            BookField::Status => {
                if ch == ' ' {
                    self.cycle_status();
                } else {
                    return false;
                }
            }
            BookField::Issuer => self.issuer.push(ch.to_ascii_uppercase()),
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Name => {
                self.name.pop();
            }
            BookField::Author => {
                self.author.pop();
            }
            BookField::Genre => {
                self.genre.pop();
                self.autocomplete_disabled = false;
            }
            BookField::Status => {}
            BookField::Issuer => {
                self.issuer.pop();
            }
        }
    }

    /// Snapshot the inputs for the record operations, which own validation.
    pub(crate) fn to_draft(&self) -> BookDraft {
        BookDraft {
            name: self.name.clone(),
            id: self.id.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            status: self.status,
            issuer: self.issuer.clone(),
        }
    }

    /// Refresh the genre suggestion from the candidate list.
    pub(crate) fn update_suggestion(&mut self, genres: &[String]) {
        if self.active != BookField::Genre
            || self.autocomplete_disabled
            || self.genre.chars().count() < 2
        {
            self.suggestion = None;
            return;
        }

        let current_lower = self.genre.to_lowercase();
        self.suggestion = genres
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower))
            .filter(|candidate| candidate.to_lowercase() != current_lower)
            .cloned();
    }

    /// Apply the suggested genre.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        if self.suggestion_suffix().is_none() {
            return false;
        }
        match self.suggestion.take() {
            Some(candidate) => {
                self.genre = candidate;
                self.autocomplete_disabled = true;
                true
            }
            None => false,
        }
    }

    /// Dismiss the suggestion until the genre is edited again.
    pub(crate) fn cancel_autocomplete(&mut self) -> bool {
        if self.active == BookField::Genre && self.suggestion.is_some() {
            self.autocomplete_disabled = true;
            self.suggestion = None;
            return true;
        }
        false
    }

    /// Remaining characters of the suggestion, shown ghosted after the input.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let suffix: String = candidate.chars().skip(self.genre.chars().count()).collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    pub(crate) fn has_active_suggestion(&self) -> bool {
        self.active == BookField::Genre && self.suggestion.is_some()
    }

    /// Render one labelled line of the form.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let is_active = self.active == field;
        let value = match field {
            BookField::Name => self.name.clone(),
            BookField::Author => self.author.clone(),
            BookField::Genre => self.genre.clone(),
            BookField::Status => format!("< {} >", self.status),
            BookField::Issuer if self.status == BookStatus::Available => {
                return Line::from(vec![
                    Span::raw(format!("{field_name}: ")),
                    Span::styled("N/A", Style::default().fg(Color::DarkGray)),
                ]);
            }
            BookField::Issuer => self.issuer.clone(),
        };

        let placeholder = if field == BookField::Issuer {
            "<student card id>"
        } else {
            "<required>"
        };
        let style = field_style(is_active, value.is_empty());

        let mut spans = vec![Span::raw(format!("{field_name}: "))];
        if value.is_empty() {
            spans.push(Span::styled(placeholder, style));
        } else {
            spans.push(Span::styled(value, style));
        }
        if field == BookField::Genre && is_active {
            if let Some(suffix) = self.suggestion_suffix() {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        }
        Line::from(spans)
    }

    /// Character count of the requested field, for cursor placement.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Name => self.name.chars().count(),
            BookField::Author => self.author.chars().count(),
            BookField::Genre => self.genre.chars().count(),
            BookField::Status => 0,
            BookField::Issuer => self.issuer.chars().count(),
        }
    }
}

/// Form state for registering or editing a student.
#[derive(Default, Clone)]
pub(crate) struct StudentForm {
    /// Previewed (new) or existing card id; shown read-only.
    pub(crate) card_id: String,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) course: String,
    pub(crate) year: String,
    pub(crate) active: StudentField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub(crate) enum StudentField {
    #[default]
    Name,
    Email,
    Course,
    Year,
}

impl StudentForm {
    pub(crate) fn new(card_id: String) -> Self {
        Self {
            card_id,
            ..Self::default()
        }
    }

    pub(crate) fn from_student(student: &Student) -> Self {
        Self {
            card_id: student.card_id.clone(),
            name: student.name.clone(),
            email: student.email.clone(),
            course: student.course.clone(),
            year: student.year.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            StudentField::Name => StudentField::Email,
            StudentField::Email => StudentField::Course,
            StudentField::Course => StudentField::Year,
            StudentField::Year => StudentField::Name,
        };
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = match self.active {
            StudentField::Name => StudentField::Year,
            StudentField::Email => StudentField::Name,
            StudentField::Course => StudentField::Email,
            StudentField::Year => StudentField::Course,
        };
    }

    /// Append a character to the active field; the year only accepts digits.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            StudentField::Name => self.name.push(ch),
            StudentField::Email => self.email.push(ch),
            StudentField::Course => self.course.push(ch),
            StudentField::Year => {
                if !ch.is_ascii_digit() {
                    return false;
                }
                self.year.push(ch);
            }
        }
        true
    }

    pub(crate) fn backspace(&mut self) {
        let field = match self.active {
            StudentField::Name => &mut self.name,
            StudentField::Email => &mut self.email,
            StudentField::Course => &mut self.course,
            StudentField::Year => &mut self.year,
        };
        field.pop();
    }

    /// Convert the inputs into a draft. An empty year becomes zero so the
    /// draft validation reports it as missing.
    pub(crate) fn to_draft(&self) -> Result<StudentDraft> {
        let year_raw = self.year.trim();
        let year = if year_raw.is_empty() {
            0
        } else {
            year_raw
                .parse::<u32>()
                .map_err(|_| anyhow!("Student year must be a whole number."))?
        };

        Ok(StudentDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            course: self.course.clone(),
            year,
        })
    }

    pub(crate) fn build_line(&self, field_name: &str, field: StudentField) -> Line<'static> {
        let value = match field {
            StudentField::Name => &self.name,
            StudentField::Email => &self.email,
            StudentField::Course => &self.course,
            StudentField::Year => &self.year,
        };
        let style = field_style(self.active == field, value.is_empty());
        let display = if value.is_empty() {
            "<required>".to_string()
        } else {
            value.clone()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    pub(crate) fn value_len(&self, field: StudentField) -> usize {
        match field {
            StudentField::Name => self.name.chars().count(),
            StudentField::Email => self.email.chars().count(),
            StudentField::Course => self.course.chars().count(),
            StudentField::Year => self.year.chars().count(),
        }
    }
}

/// Prompt for the borrower's card id when issuing a book from the list.
pub(crate) struct IssuePrompt {
    pub(crate) book: Book,
    pub(crate) card_id: String,
    pub(crate) error: Option<String>,
}

impl IssuePrompt {
    pub(crate) fn new(book: Book) -> Self {
        Self {
            book,
            card_id: String::new(),
            error: None,
        }
    }
}

/// State for confirming removal of a student. `books_out` is informational;
/// the delete goes ahead regardless.
pub(crate) struct ConfirmStudentDelete {
    pub(crate) student: Student,
    pub(crate) books_out: usize,
}

fn field_style(is_active: bool, is_empty: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Yellow)
    } else if is_empty {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    }
}
