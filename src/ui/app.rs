use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{
    clear_inventory, create_book, create_student, delete_book, delete_student, fetch_book,
    fetch_books, fetch_genres, fetch_student, fetch_students, issue_book, next_book_id,
    next_card_id, return_book, update_book, update_student,
};
use crate::models::{Book, BookStatus, Student, COMMON_GENRES};

use super::forms::{
    BookField, BookForm, ConfirmStudentDelete, IssuePrompt, StudentField, StudentForm,
};
use super::helpers::{centered_rect, surface_error};
use super::screens::{Record, TableScreen};

/// Header space for the tab bar.
const TAB_BAR_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 10;

/// The two management tabs.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Tab {
    Books,
    Students,
}

impl Tab {
    fn other(self) -> Self {
        match self {
            Tab::Books => Tab::Students,
            Tab::Students => Tab::Books,
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Books => 0,
            Tab::Students => 1,
        }
    }
}

/// Fine-grained modes layered over the active tab. Every mode that acts on a
/// record carries that record (or its key) so no operation depends on shared
/// selection state.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: String, form: BookForm },
    ViewingBook(Book),
    IssuingBook(IssuePrompt),
    ConfirmReturn(Book),
    ConfirmBookDelete(Book),
    ConfirmClearInventory { count: usize },
    AddingStudent(StudentForm),
    EditingStudent { card_id: String, form: StudentForm },
    ViewingStudent { student: Student, books: Vec<Book> },
    ConfirmStudentDelete(ConfirmStudentDelete),
    Searching(SearchState),
}

/// State for an inline filter on the active tab.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state. Owns the single database connection for the
/// lifetime of the session.
pub struct App {
    conn: Connection,
    books: TableScreen<Book>,
    students: TableScreen<Student>,
    genres: Vec<String>,
    tab: Tab,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(
        conn: Connection,
        books: Vec<Book>,
        students: Vec<Student>,
        stored_genres: Vec<String>,
    ) -> Self {
        Self {
            conn,
            books: TableScreen::new(books),
            students: TableScreen::new(students),
            genres: genre_suggestions(stored_genres),
            tab: Tab::Books,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Read both tables and build the initial state.
    pub fn load(conn: Connection) -> Result<Self> {
        let books = fetch_books(&conn)?;
        let students = fetch_students(&conn)?;
        let genres = fetch_genres(&conn)?;
        Ok(Self::new(conn, books, students, genres))
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_book_form(code, None, form)?,
            Mode::EditingBook { id, form } => self.handle_book_form(code, Some(id), form)?,
            Mode::ViewingBook(book) => self.handle_view_book(code, book),
            Mode::IssuingBook(prompt) => self.handle_issue_prompt(code, prompt)?,
            Mode::ConfirmReturn(book) => self.handle_confirm_return(code, book)?,
            Mode::ConfirmBookDelete(book) => self.handle_confirm_book_delete(code, book)?,
            Mode::ConfirmClearInventory { count } => {
                self.handle_confirm_clear_inventory(code, count)?
            }
            Mode::AddingStudent(form) => self.handle_student_form(code, None, form)?,
            Mode::EditingStudent { card_id, form } => {
                self.handle_student_form(code, Some(card_id), form)?
            }
            Mode::ViewingStudent { student, books } => {
                self.handle_view_student(code, student, books)
            }
            Mode::ConfirmStudentDelete(confirm) => {
                self.handle_confirm_student_delete(code, confirm)?
            }
            Mode::Searching(state) => self.handle_search(code, state),
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc => {
                if self.active_is_filtered() {
                    self.set_active_filter(None);
                    self.set_status("Filter cleared.", StatusKind::Info);
                } else {
                    *exit = true;
                }
            }
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.other();
                self.clear_status();
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.select_first(),
            KeyCode::End => self.select_last(),
            KeyCode::Char('f') => {
                let query = match self.tab {
                    Tab::Books => self.books.filter.clone(),
                    Tab::Students => self.students.filter.clone(),
                };
                return Ok(Mode::Searching(SearchState {
                    query: query.unwrap_or_default(),
                }));
            }
            KeyCode::Char('r') => match self.reload_all() {
                Ok(()) => self.set_status("Reloaded from the database.", StatusKind::Info),
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            _ => {
                return match self.tab {
                    Tab::Books => self.handle_books_key(code),
                    Tab::Students => self.handle_students_key(code),
                };
            }
        }
        Ok(Mode::Normal)
    }

    fn handle_books_key(&mut self, code: KeyCode) -> Result<Mode> {
        let selected = self.books.current().cloned();
        match code {
            KeyCode::Enter => match selected {
                Some(book) => match fetch_book(&self.conn, &book.id) {
                    Ok(fresh) => return Ok(Mode::ViewingBook(fresh)),
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                },
                None => self.set_status("Please select a book!", StatusKind::Error),
            },
            KeyCode::Char('+') => match next_book_id(&self.conn) {
                Ok(id) => {
                    self.clear_status();
                    return Ok(Mode::AddingBook(BookForm::new(id)));
                }
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            KeyCode::Char('e') | KeyCode::Char('E') => match selected {
                Some(book) => {
                    self.clear_status();
                    return Ok(Mode::EditingBook {
                        id: book.id.clone(),
                        form: BookForm::from_book(&book),
                    });
                }
                None => self.set_status("Please select a record to update.", StatusKind::Error),
            },
            KeyCode::Char('-') => match selected {
                Some(book) => {
                    self.clear_status();
                    return Ok(Mode::ConfirmBookDelete(book));
                }
                None => self.set_status("Please select a book to delete.", StatusKind::Error),
            },
            KeyCode::Char('t') | KeyCode::Char('T') => match selected {
                Some(book) if book.status == BookStatus::Issued => {
                    self.clear_status();
                    return Ok(Mode::ConfirmReturn(book));
                }
                Some(book) => {
                    self.clear_status();
                    return Ok(Mode::IssuingBook(IssuePrompt::new(book)));
                }
                None => self.set_status("Please select a book first.", StatusKind::Error),
            },
            KeyCode::Char('X') => {
                let count = self.books.rows.len();
                if count == 0 {
                    self.set_status("The inventory is already empty.", StatusKind::Info);
                } else {
                    self.clear_status();
                    return Ok(Mode::ConfirmClearInventory { count });
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_students_key(&mut self, code: KeyCode) -> Result<Mode> {
        let selected = self.students.current().cloned();
        match code {
            KeyCode::Enter => match selected {
                Some(student) => match fetch_student(&self.conn, &student.card_id) {
                    Ok(fresh) => {
                        let books = self.books_issued_to(&fresh.card_id);
                        return Ok(Mode::ViewingStudent {
                            student: fresh,
                            books,
                        });
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                },
                None => self.set_status(
                    "To view a record, you must select it in the table.",
                    StatusKind::Error,
                ),
            },
            KeyCode::Char('+') => match next_card_id(&self.conn) {
                Ok(card_id) => {
                    self.clear_status();
                    return Ok(Mode::AddingStudent(StudentForm::new(card_id)));
                }
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            KeyCode::Char('e') | KeyCode::Char('E') => match selected {
                Some(student) => {
                    self.clear_status();
                    return Ok(Mode::EditingStudent {
                        card_id: student.card_id.clone(),
                        form: StudentForm::from_student(&student),
                    });
                }
                None => self.set_status(
                    "To update a record, you must select it in the table.",
                    StatusKind::Error,
                ),
            },
            KeyCode::Char('-') => match selected {
                Some(student) => {
                    self.clear_status();
                    let books_out = self.books_issued_to(&student.card_id).len();
                    return Ok(Mode::ConfirmStudentDelete(ConfirmStudentDelete {
                        student,
                        books_out,
                    }));
                }
                None => self.set_status(
                    "To delete a record, you must select it in the table.",
                    StatusKind::Error,
                ),
            },
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_book_form(
        &mut self,
        code: KeyCode,
        editing: Option<String>,
        mut form: BookForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                if !form.cancel_autocomplete() {
                    self.set_status("Book form closed without saving.", StatusKind::Info);
                    keep_open = false;
                }
            }
            KeyCode::Tab => {
                if !form.accept_suggestion() {
                    form.next_field();
                }
            }
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Down => form.next_field(),
            KeyCode::Left | KeyCode::Right if form.active == BookField::Status => {
                form.cycle_status();
                form.error = None;
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_book(editing.as_deref(), &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        form.update_suggestion(&self.genres);
        Ok(match editing {
            Some(id) => Mode::EditingBook { id, form },
            None => Mode::AddingBook(form),
        })
    }

    fn handle_student_form(
        &mut self,
        code: KeyCode,
        editing: Option<String>,
        mut form: StudentForm,
    ) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Student form closed without saving.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_student(editing.as_deref(), &form) {
                Ok(()) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if !keep_open {
            return Ok(Mode::Normal);
        }
        Ok(match editing {
            Some(card_id) => Mode::EditingStudent { card_id, form },
            None => Mode::AddingStudent(form),
        })
    }

    fn handle_view_book(&mut self, code: KeyCode, book: Book) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
            KeyCode::Char('e') | KeyCode::Char('E') => Mode::EditingBook {
                id: book.id.clone(),
                form: BookForm::from_book(&book),
            },
            _ => Mode::ViewingBook(book),
        }
    }

    fn handle_view_student(&mut self, code: KeyCode, student: Student, books: Vec<Book>) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Mode::Normal,
            KeyCode::Char('e') | KeyCode::Char('E') => Mode::EditingStudent {
                card_id: student.card_id.clone(),
                form: StudentForm::from_student(&student),
            },
            _ => Mode::ViewingStudent { student, books },
        }
    }

    fn handle_issue_prompt(&mut self, code: KeyCode, mut prompt: IssuePrompt) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Issue cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Backspace => {
                prompt.card_id.pop();
            }
            KeyCode::Enter => match self.perform_issue(&prompt) {
                Ok(()) => return Ok(Mode::Normal),
                Err(err) => {
                    let message = surface_error(&err);
                    prompt.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) if !ch.is_control() => {
                prompt.card_id.push(ch.to_ascii_uppercase());
                prompt.error = None;
            }
            _ => {}
        }
        Ok(Mode::IssuingBook(prompt))
    }

    fn handle_confirm_return(&mut self, code: KeyCode, book: Book) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status(
                    "Cannot mark as Available until returned.",
                    StatusKind::Info,
                );
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_return(&book) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::Normal)
                    }
                }
            }
            _ => Ok(Mode::ConfirmReturn(book)),
        }
    }

    fn handle_confirm_book_delete(&mut self, code: KeyCode, book: Book) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_book_delete(&book) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmBookDelete(book))
                    }
                }
            }
            _ => Ok(Mode::ConfirmBookDelete(book)),
        }
    }

    fn handle_confirm_clear_inventory(&mut self, code: KeyCode, count: usize) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Inventory left untouched.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_clear_inventory() {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmClearInventory { count })
                    }
                }
            }
            _ => Ok(Mode::ConfirmClearInventory { count }),
        }
    }

    fn handle_confirm_student_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmStudentDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_student_delete(&confirm) {
                    Ok(()) => Ok(Mode::Normal),
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Ok(Mode::ConfirmStudentDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmStudentDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_active_filter(None);
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Backspace => {
                state.query.pop();
                self.apply_query(&state);
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                self.apply_query(&state);
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    fn apply_query(&mut self, state: &SearchState) {
        if state.query.trim().is_empty() {
            self.set_active_filter(None);
        } else {
            self.set_active_filter(Some(state.query.clone()));
        }
    }

    fn save_book(&mut self, editing: Option<&str>, form: &BookForm) -> Result<()> {
        let draft = form.to_draft();
        let book = match editing {
            Some(id) => update_book(&self.conn, id, &draft)?,
            None => create_book(&self.conn, &draft)?,
        };
        let verb = if editing.is_some() { "Updated" } else { "Added" };
        let reload = self.reload_books(Some(&book.id));
        self.finish_write(format!("{verb} {book}."), reload);
        Ok(())
    }

    fn save_student(&mut self, editing: Option<&str>, form: &StudentForm) -> Result<()> {
        let draft = form.to_draft()?;
        let student = match editing {
            Some(card_id) => update_student(&self.conn, card_id, &draft)?,
            None => create_student(&self.conn, &form.card_id, &draft)?,
        };
        let message = if editing.is_some() {
            format!("Updated {student}.")
        } else {
            format!("Student added successfully. Card ID: {}", student.card_id)
        };
        let reload = self.reload_students(Some(&student.card_id));
        self.finish_write(message, reload);
        Ok(())
    }

    fn perform_issue(&mut self, prompt: &IssuePrompt) -> Result<()> {
        let book = issue_book(&self.conn, &prompt.book.id, &prompt.card_id)?;
        let reload = self.reload_books(Some(&book.id));
        self.finish_write(format!("Issued {book} to {}.", book.issuer), reload);
        Ok(())
    }

    fn perform_return(&mut self, book: &Book) -> Result<()> {
        let book = return_book(&self.conn, &book.id)?;
        let reload = self.reload_books(Some(&book.id));
        self.finish_write(
            format!("{book} has been returned and marked as Available."),
            reload,
        );
        Ok(())
    }

    fn perform_book_delete(&mut self, book: &Book) -> Result<()> {
        delete_book(&self.conn, &book.id)?;
        let reload = self.reload_books(None);
        self.finish_write(format!("Deleted {book}."), reload);
        Ok(())
    }

    fn perform_clear_inventory(&mut self) -> Result<()> {
        let deleted = clear_inventory(&self.conn)?;
        let reload = self.reload_books(None);
        self.finish_write(
            format!("All {deleted} books have been deleted from inventory."),
            reload,
        );
        Ok(())
    }

    fn perform_student_delete(&mut self, confirm: &ConfirmStudentDelete) -> Result<()> {
        delete_student(&self.conn, &confirm.student.card_id)?;
        let mut message = format!("Deleted {}.", confirm.student);
        if confirm.books_out > 0 {
            message.push_str(&format!(
                " {} issued book(s) still list {}.",
                confirm.books_out, confirm.student.card_id
            ));
        }
        let reload = self.reload_students(None);
        self.finish_write(message, reload);
        Ok(())
    }

    /// Report a committed write. A failed re-read is shown as an error, but
    /// the write stands, so the caller still closes its form or dialog.
    fn finish_write(&mut self, message: String, reload: Result<()>) {
        match reload {
            Ok(()) => self.set_status(message, StatusKind::Info),
            Err(err) => {
                tracing::warn!(error = %err, "re-read after a committed write failed");
                self.set_status(
                    format!("{message} Refreshing the table failed: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    fn reload_all(&mut self) -> Result<()> {
        self.reload_books(None)?;
        self.reload_students(None)
    }

    /// Full re-read of the Library table (and the genre list it feeds).
    fn reload_books(&mut self, focus: Option<&str>) -> Result<()> {
        let books = fetch_books(&self.conn)?;
        self.books.set_rows(books, focus);
        self.genres = genre_suggestions(fetch_genres(&self.conn)?);
        Ok(())
    }

    fn reload_students(&mut self, focus: Option<&str>) -> Result<()> {
        let students = fetch_students(&self.conn)?;
        self.students.set_rows(students, focus);
        Ok(())
    }

    fn books_issued_to(&self, card_id: &str) -> Vec<Book> {
        self.books
            .rows
            .iter()
            .filter(|book| book.issuer_id() == Some(card_id))
            .cloned()
            .collect()
    }

    fn move_selection(&mut self, offset: isize) {
        match self.tab {
            Tab::Books => self.books.move_selection(offset),
            Tab::Students => self.students.move_selection(offset),
        }
    }

    fn select_first(&mut self) {
        match self.tab {
            Tab::Books => self.books.select_first(),
            Tab::Students => self.students.select_first(),
        }
    }

    fn select_last(&mut self) {
        match self.tab {
            Tab::Books => self.books.select_last(),
            Tab::Students => self.students.select_last(),
        }
    }

    fn active_is_filtered(&self) -> bool {
        match self.tab {
            Tab::Books => self.books.is_filtered(),
            Tab::Students => self.students.is_filtered(),
        }
    }

    fn set_active_filter(&mut self, filter: Option<String>) {
        match self.tab {
            Tab::Books => self.books.set_filter(filter),
            Tab::Students => self.students.set_filter(filter),
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TAB_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Books => self.draw_books(frame, chunks[1]),
            Tab::Students => self.draw_students(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::EditingBook { form, .. } => {
                self.draw_book_form(frame, area, "Update Book", form)
            }
            Mode::ViewingBook(book) => self.draw_book_details(frame, area, book),
            Mode::IssuingBook(prompt) => self.draw_issue_prompt(frame, area, prompt),
            Mode::ConfirmReturn(book) => self.draw_confirm(
                frame,
                area,
                "Return Confirmed?",
                vec![
                    Line::from(format!("{book} is issued to {}.", book.issuer)),
                    Line::from("Has the book been returned?"),
                ],
            ),
            Mode::ConfirmBookDelete(book) => self.draw_confirm(
                frame,
                area,
                "Confirm Removal",
                vec![Line::from(format!("Delete {book} by {}?", book.author))],
            ),
            Mode::ConfirmClearInventory { count } => self.draw_confirm(
                frame,
                area,
                "Are you sure?",
                vec![
                    Line::from("Do you really want to delete the entire inventory?"),
                    Line::from(format!("{count} book(s) will be removed.")),
                ],
            ),
            Mode::AddingStudent(form) => {
                self.draw_student_form(frame, area, "Register Student", form)
            }
            Mode::EditingStudent { form, .. } => {
                self.draw_student_form(frame, area, "Update Student", form)
            }
            Mode::ViewingStudent { student, books } => {
                self.draw_student_details(frame, area, student, books)
            }
            Mode::ConfirmStudentDelete(confirm) => {
                let mut lines = vec![Line::from(format!("Delete {}?", confirm.student))];
                if confirm.books_out > 0 {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "{} book(s) are still issued to this card and will keep it as issuer.",
                            confirm.books_out
                        ),
                        Style::default().fg(Color::Yellow),
                    )));
                }
                self.draw_confirm(frame, area, "Confirm Removal", lines)
            }
            Mode::Searching(state) => self.draw_search_bar(frame, chunks[1], state),
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(vec!["Book Management", "Student Management"])
            .select(self.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Library Management System"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(table_title("Books", &self.books));

        if self.books.filtered.is_empty() {
            let hint = if self.books.rows.is_empty() {
                "No books yet. Press + to add one."
            } else {
                "No books match the filter."
            };
            let paragraph = Paragraph::new(Span::styled(hint, Style::default().fg(Color::Gray)))
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(vec![
            "Book Name",
            "Book ID",
            "Author",
            "Genre",
            "Status",
            "Issuer Card ID",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.books.filtered.iter().map(|book| {
            let status_style = match book.status {
                BookStatus::Available => Style::default().fg(Color::Green),
                BookStatus::Issued => Style::default().fg(Color::Magenta),
            };
            Row::new(vec![
                Cell::from(book.name.clone()),
                Cell::from(book.id.clone()),
                Cell::from(book.author.clone()),
                Cell::from(book.genre.clone()),
                Cell::from(book.status.as_str()).style(status_style),
                Cell::from(book.issuer.clone()),
            ])
        });

        let widths = [
            Constraint::Percentage(28),
            Constraint::Length(10),
            Constraint::Percentage(22),
            Constraint::Percentage(16),
            Constraint::Length(10),
            Constraint::Length(15),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(self.books.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_students(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(table_title("Students", &self.students));

        if self.students.filtered.is_empty() {
            let hint = if self.students.rows.is_empty() {
                "No students registered. Press + to register one."
            } else {
                "No students match the filter."
            };
            let paragraph = Paragraph::new(Span::styled(hint, Style::default().fg(Color::Gray)))
                .block(block)
                .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
            return;
        }

        let header = Row::new(vec!["Card ID", "Name", "Email", "Course", "Year"])
            .style(Style::default().add_modifier(Modifier::BOLD));

        let rows = self.students.filtered.iter().map(|student| {
            Row::new(vec![
                Cell::from(student.card_id.clone()),
                Cell::from(student.name.clone()),
                Cell::from(student.email.clone()),
                Cell::from(student.course.clone()),
                Cell::from(student.year.to_string()),
            ])
        });

        let widths = [
            Constraint::Length(10),
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Percentage(25),
            Constraint::Length(6),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .highlight_symbol("▶ ");

        let mut state = TableState::default();
        state.select(Some(self.students.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match (&self.mode, self.tab) {
            (Mode::Searching(_), _) => &[
                ("[type]", " Filter   "),
                ("[↑↓]", " Select   "),
                ("[Enter]", " Keep Filter   "),
                ("[Esc]", " Clear"),
            ],
            (Mode::Normal, Tab::Books) => &[
                ("[↑↓]", " Select   "),
                ("[Enter]", " View   "),
                ("[+]", " Add   "),
                ("[e]", " Update   "),
                ("[-]", " Delete   "),
                ("[t]", " Issue/Return   "),
                ("[X]", " Clear Inventory   "),
                ("[f]", " Filter   "),
                ("[Tab]", " Students   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, Tab::Students) => &[
                ("[↑↓]", " Select   "),
                ("[Enter]", " View   "),
                ("[+]", " Register   "),
                ("[e]", " Update   "),
                ("[-]", " Delete   "),
                ("[f]", " Filter   "),
                ("[Tab]", " Books   "),
                ("[q]", " Quit"),
            ],
            _ => &[],
        };

        let spans = keys
            .iter()
            .flat_map(|(key, label)| [Span::styled(*key, key_style), Span::raw(*label)])
            .collect::<Vec<_>>();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        const FIELDS: [(&str, BookField); 5] = [
            ("Name", BookField::Name),
            ("Author", BookField::Author),
            ("Genre", BookField::Genre),
            ("Status", BookField::Status),
            ("Issuer", BookField::Issuer),
        ];

        let mut lines = vec![Line::from(vec![
            Span::raw("Book ID: "),
            Span::styled(form.id.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                "  (cannot be changed later)",
                Style::default().fg(Color::DarkGray),
            ),
        ])];
        lines.extend(FIELDS.iter().map(|(name, field)| form.build_line(name, *field)));
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else if form.has_active_suggestion() {
            lines.push(Line::from(Span::styled(
                "Tab to accept the suggestion • Esc to dismiss it",
                Style::default().fg(Color::Gray),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Space toggles status • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if form.active != BookField::Status {
            if let Some(row) = FIELDS.iter().position(|(_, field)| *field == form.active) {
                let (name, field) = FIELDS[row];
                let prefix = format!("{name}: ").len() as u16;
                frame.set_cursor_position((
                    inner.x + prefix + form.value_len(field) as u16,
                    inner.y + 1 + row as u16,
                ));
            }
        }
    }

    fn draw_student_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &StudentForm) {
        let popup_area = centered_rect(60, 45, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        const FIELDS: [(&str, StudentField); 4] = [
            ("Name", StudentField::Name),
            ("Email", StudentField::Email),
            ("Course", StudentField::Course),
            ("Year", StudentField::Year),
        ];

        let mut lines = vec![Line::from(vec![
            Span::raw("Card ID: "),
            Span::styled(
                form.card_id.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])];
        lines.extend(FIELDS.iter().map(|(name, field)| form.build_line(name, *field)));
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        if let Some(row) = FIELDS.iter().position(|(_, field)| *field == form.active) {
            let (name, field) = FIELDS[row];
            let prefix = format!("{name}: ").len() as u16;
            frame.set_cursor_position((
                inner.x + prefix + form.value_len(field) as u16,
                inner.y + 1 + row as u16,
            ));
        }
    }

    fn draw_issue_prompt(&self, frame: &mut Frame, area: Rect, prompt: &IssuePrompt) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Issuer Card ID")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let footer = match &prompt.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
            None => Span::styled(
                "Enter to issue • Esc to cancel",
                Style::default().fg(Color::Gray),
            ),
        };
        let lines = vec![
            Line::from(format!("Issue {}?", prompt.book)),
            Line::from(format!("Card ID: {}", prompt.card_id)),
            Line::from(""),
            Line::from(footer),
        ];

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let cursor_x = inner.x + "Card ID: ".len() as u16 + prompt.card_id.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y + 1));
    }

    fn draw_book_details(&self, frame: &mut Frame, area: Rect, book: &Book) {
        let label = Style::default().fg(Color::Gray);
        let detail = |name: &'static str, value: String| {
            Line::from(vec![Span::styled(format!("{name:<8}"), label), Span::raw(value)])
        };
        let lines = vec![
            detail("Name", book.name.clone()),
            detail("ID", book.id.clone()),
            detail("Author", book.author.clone()),
            detail("Genre", book.genre.clone()),
            detail("Status", book.status.to_string()),
            detail("Issuer", book.issuer.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "e to update • Esc to close",
                Style::default().fg(Color::Gray),
            )),
        ];
        self.draw_popup(frame, area, "Book Details", lines);
    }

    fn draw_student_details(
        &self,
        frame: &mut Frame,
        area: Rect,
        student: &Student,
        books: &[Book],
    ) {
        let label = Style::default().fg(Color::Gray);
        let detail = |name: &'static str, value: String| {
            Line::from(vec![Span::styled(format!("{name:<8}"), label), Span::raw(value)])
        };
        let mut lines = vec![
            detail("Card ID", student.card_id.clone()),
            detail("Name", student.name.clone()),
            detail("Email", student.email.clone()),
            detail("Course", student.course.clone()),
            detail("Year", student.year.to_string()),
            Line::from(""),
        ];
        if books.is_empty() {
            lines.push(Line::from(Span::styled("No books issued.", label)));
        } else {
            lines.push(Line::from(format!("Books issued ({}):", books.len())));
            lines.extend(books.iter().map(|book| Line::from(format!("  • {book}"))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "e to update • Esc to close",
            Style::default().fg(Color::Gray),
        )));
        self.draw_popup(frame, area, "Student Details", lines);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, mut lines: Vec<Line>) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press Y to confirm or N / Esc to cancel.",
            Style::default().fg(Color::Gray),
        )));
        self.draw_popup(frame, area, title, lines);
    }

    fn draw_popup(&self, frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        let paragraph = Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Filter");
        let paragraph = Paragraph::new(Span::raw(format!("Filter: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Filter: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

/// Suggested genres: the common list first, then stored genres not already
/// covered (case-insensitively).
fn genre_suggestions(stored: Vec<String>) -> Vec<String> {
    let mut genres: Vec<String> = COMMON_GENRES.iter().map(|g| g.to_string()).collect();
    for genre in stored {
        if !genres.iter().any(|known| known.eq_ignore_ascii_case(&genre)) {
            genres.push(genre);
        }
    }
    genres
}

fn table_title<T: Record>(name: &str, screen: &TableScreen<T>) -> String {
    match &screen.filter {
        Some(query) => format!(
            " {name} ({} of {}) filter: \"{query}\" ",
            screen.filtered.len(),
            screen.rows.len()
        ),
        None => format!(" {name} ({}) ", screen.rows.len()),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::db::ensure_schema;
    use crate::models::NO_ISSUER;

    fn app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        App::load(conn).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        assert!(!app.handle_key(code).unwrap(), "unexpected exit");
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn register_student(app: &mut App, name: &str) {
        app.tab = Tab::Students;
        press(app, KeyCode::Char('+'));
        type_text(app, name);
        press(app, KeyCode::Tab);
        type_text(app, "someone@example.edu");
        press(app, KeyCode::Tab);
        type_text(app, "History");
        press(app, KeyCode::Tab);
        type_text(app, "2");
        press(app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        app.tab = Tab::Books;
    }

    fn add_book(app: &mut App, name: &str) {
        press(app, KeyCode::Char('+'));
        type_text(app, name);
        press(app, KeyCode::Tab);
        type_text(app, "Some Author");
        press(app, KeyCode::Tab);
        type_text(app, "Drama");
        press(app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal), "form should close on save");
    }

    fn status_text(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    #[test]
    fn adding_a_book_allocates_the_next_id() {
        let mut app = app();
        add_book(&mut app, "Dune");
        add_book(&mut app, "Emma");

        let ids: Vec<&str> = app.books.rows.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, ["BK-0001", "BK-0002"]);
        assert_eq!(app.books.rows[0].issuer, NO_ISSUER);
        assert_eq!(app.books.current().map(|b| b.id.as_str()), Some("BK-0002"));
    }

    #[test]
    fn committed_write_closes_the_form_even_if_the_refresh_fails() {
        let mut app = app();
        // Every inserted row gets a status the reader cannot parse.
        app.conn
            .execute_batch(
                "CREATE TEMP TRIGGER spoil_status AFTER INSERT ON Library
                 BEGIN
                     UPDATE Library SET BK_STATUS = 'Lost' WHERE BK_ID = NEW.BK_ID;
                 END;",
            )
            .unwrap();

        press(&mut app, KeyCode::Char('+'));
        type_text(&mut app, "Dune");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Some Author");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Drama");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal), "form should close after the write");
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.starts_with("Added Dune (BK-0001). Refreshing the table failed:"));

        let stored: i64 = app
            .conn
            .query_row("SELECT COUNT(*) FROM Library", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[test]
    fn incomplete_book_form_stays_open_with_the_error() {
        let mut app = app();
        press(&mut app, KeyCode::Char('+'));
        type_text(&mut app, "Dune");
        press(&mut app, KeyCode::Enter);

        match &app.mode {
            Mode::AddingBook(form) => {
                assert_eq!(form.error.as_deref(), Some("Book author is required."));
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.books.rows.is_empty());
    }

    #[test]
    fn issuing_requires_a_registered_card() {
        let mut app = app();
        register_student(&mut app, "Ada");
        add_book(&mut app, "Dune");

        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "lib-0009");
        press(&mut app, KeyCode::Enter);
        match &app.mode {
            Mode::IssuingBook(prompt) => assert!(prompt
                .error
                .as_deref()
                .unwrap_or_default()
                .contains("LIB-0009 is not registered")),
            _ => panic!("prompt should stay open"),
        }

        for _ in 0..4 {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "0001");
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.books.rows[0].status, BookStatus::Issued);
        assert_eq!(app.books.rows[0].issuer, "LIB-0001");

        press(&mut app, KeyCode::Char('t'));
        assert!(matches!(app.mode, Mode::ConfirmReturn(_)));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.books.rows[0].status, BookStatus::Available);
        assert_eq!(app.books.rows[0].issuer, NO_ISSUER);
    }

    #[test]
    fn student_update_targets_the_selected_card() {
        let mut app = app();
        register_student(&mut app, "Ada");
        register_student(&mut app, "Grace");
        add_book(&mut app, "Dune");

        app.tab = Tab::Students;
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, " Hopper");
        press(&mut app, KeyCode::Enter);

        let names: Vec<&str> = app.students.rows.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Ada", "Grace Hopper"]);
        assert_eq!(status_text(&app), "Updated Grace Hopper (LIB-0002).");
    }

    #[test]
    fn new_student_shows_the_allocated_card_id() {
        let mut app = app();
        register_student(&mut app, "Ada");
        assert_eq!(
            status_text(&app),
            "Student added successfully. Card ID: LIB-0001"
        );

        app.tab = Tab::Students;
        press(&mut app, KeyCode::Char('+'));
        match &app.mode {
            Mode::AddingStudent(form) => assert_eq!(form.card_id, "LIB-0002"),
            _ => panic!("expected the student form"),
        }
    }

    #[test]
    fn deleting_a_borrower_goes_through_with_a_note() {
        let mut app = app();
        register_student(&mut app, "Ada");
        add_book(&mut app, "Dune");
        press(&mut app, KeyCode::Char('t'));
        type_text(&mut app, "LIB-0001");
        press(&mut app, KeyCode::Enter);

        app.tab = Tab::Students;
        press(&mut app, KeyCode::Char('-'));
        match &app.mode {
            Mode::ConfirmStudentDelete(confirm) => assert_eq!(confirm.books_out, 1),
            _ => panic!("expected delete confirmation"),
        }
        press(&mut app, KeyCode::Char('y'));

        assert!(app.students.rows.is_empty());
        assert_eq!(app.books.rows[0].issuer, "LIB-0001");
        assert!(status_text(&app).contains("1 issued book(s) still list LIB-0001"));
    }

    #[test]
    fn clear_inventory_needs_confirmation() {
        let mut app = app();
        add_book(&mut app, "Dune");
        add_book(&mut app, "Emma");

        press(&mut app, KeyCode::Char('X'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.books.rows.len(), 2);

        press(&mut app, KeyCode::Char('X'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.books.rows.is_empty());
    }

    #[test]
    fn filter_narrows_the_active_table() {
        let mut app = app();
        add_book(&mut app, "Dune");
        add_book(&mut app, "Emma");

        press(&mut app, KeyCode::Char('f'));
        type_text(&mut app, "emm");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.books.filtered.len(), 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.books.filtered.len(), 2);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn every_mode_renders() {
        let mut app = app();
        register_student(&mut app, "Ada");
        add_book(&mut app, "Dune");

        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut render = |app: &App| {
            terminal.draw(|frame| app.draw(frame)).unwrap();
        };

        render(&app);
        for code in [KeyCode::Char('+'), KeyCode::Enter, KeyCode::Char('t')] {
            press(&mut app, code);
            render(&app);
            press(&mut app, KeyCode::Esc);
        }
        app.tab = Tab::Students;
        for code in [KeyCode::Char('+'), KeyCode::Enter, KeyCode::Char('-')] {
            press(&mut app, code);
            render(&app);
            press(&mut app, KeyCode::Esc);
        }
    }

    #[test]
    fn custom_genres_extend_the_common_list() {
        let genres = genre_suggestions(vec!["drama".into(), "Cookbooks".into()]);
        assert_eq!(genres.len(), COMMON_GENRES.len() + 1);
        assert_eq!(genres.last().map(String::as_str), Some("Cookbooks"));
    }
}
