use crate::models::{Book, Student};

/// Rows that can appear in a filterable table.
pub(crate) trait Record: Clone {
    /// Primary key, used to keep the selection stable across reloads.
    fn key(&self) -> &str;
    /// Whether the row matches an already-lowercased query.
    fn matches(&self, query: &str) -> bool;
}

impl Record for Book {
    fn key(&self) -> &str {
        &self.id
    }

    fn matches(&self, query: &str) -> bool {
        [&self.name, &self.id, &self.author, &self.genre, &self.issuer]
            .iter()
            .any(|field| field.to_lowercase().contains(query))
    }
}

impl Record for Student {
    fn key(&self) -> &str {
        &self.card_id
    }

    fn matches(&self, query: &str) -> bool {
        [&self.card_id, &self.name, &self.email, &self.course]
            .iter()
            .any(|field| field.to_lowercase().contains(query))
    }
}

/// A full table snapshot plus the filtered view and selection shown on screen.
pub(crate) struct TableScreen<T: Record> {
    pub(crate) rows: Vec<T>,
    pub(crate) filtered: Vec<T>,
    pub(crate) filter: Option<String>,
    pub(crate) selected: usize,
}

impl<T: Record> TableScreen<T> {
    pub(crate) fn new(rows: Vec<T>) -> Self {
        let mut screen = Self {
            rows,
            filtered: Vec::new(),
            filter: None,
            selected: 0,
        };
        screen.apply_filter();
        screen
    }

    pub(crate) fn apply_filter(&mut self) {
        self.filtered = match &self.filter {
            Some(query) if !query.trim().is_empty() => {
                let query = query.trim().to_lowercase();
                self.rows
                    .iter()
                    .filter(|row| row.matches(&query))
                    .cloned()
                    .collect()
            }
            _ => self.rows.clone(),
        };
        self.ensure_in_bounds();
    }

    pub(crate) fn set_filter(&mut self, filter: Option<String>) {
        self.filter = filter;
        self.apply_filter();
    }

    /// Replace the snapshot after a re-read, keeping `focus` selected when it
    /// is still visible.
    pub(crate) fn set_rows(&mut self, rows: Vec<T>, focus: Option<&str>) {
        self.rows = rows;
        self.apply_filter();
        if let Some(key) = focus {
            if let Some(idx) = self.filtered.iter().position(|row| row.key() == key) {
                self.selected = idx;
            }
        }
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.filtered.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.filtered.is_empty() {
            return;
        }
        let last = self.filtered.len() - 1;
        self.selected = self.selected.saturating_add_signed(offset).min(last);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    pub(crate) fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    fn ensure_in_bounds(&mut self) {
        if self.filtered.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookStatus;

    fn book(id: &str, name: &str, genre: &str) -> Book {
        Book {
            name: name.into(),
            id: id.into(),
            author: "Anon".into(),
            genre: genre.into(),
            status: BookStatus::Available,
            issuer: "N/A".into(),
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book("BK-0001", "Dune", "Science Fiction"),
            book("BK-0002", "Emma", "Romance"),
            book("BK-0003", "Hyperion", "Science Fiction"),
        ]
    }

    #[test]
    fn filter_is_case_insensitive_across_columns() {
        let mut screen = TableScreen::new(shelf());
        screen.set_filter(Some("SCIENCE".into()));
        let ids: Vec<&str> = screen.filtered.iter().map(|b| b.key()).collect();
        assert_eq!(ids, ["BK-0001", "BK-0003"]);

        screen.set_filter(Some("bk-0002".into()));
        assert_eq!(screen.current().map(|b| b.name.as_str()), Some("Emma"));
    }

    #[test]
    fn selection_is_clamped() {
        let mut screen = TableScreen::new(shelf());
        screen.move_selection(10);
        assert_eq!(screen.selected, 2);
        screen.move_selection(-10);
        assert_eq!(screen.selected, 0);

        screen.select_last();
        screen.set_rows(shelf().into_iter().take(1).collect(), None);
        assert_eq!(screen.selected, 0);
    }

    #[test]
    fn reload_keeps_focus_on_the_written_row() {
        let mut screen = TableScreen::new(shelf());
        let mut rows = shelf();
        rows.insert(0, book("BK-0000", "Beowulf", "Poetry"));
        screen.set_rows(rows, Some("BK-0003"));
        assert_eq!(screen.current().map(|b| b.id.as_str()), Some("BK-0003"));
    }

    #[test]
    fn empty_table_has_no_selection() {
        let mut screen: TableScreen<Book> = TableScreen::new(Vec::new());
        screen.move_selection(1);
        screen.select_last();
        assert!(screen.current().is_none());
    }
}
