use crate::library::borrowed_records;
use crate::models::{Book, StudentRecord};
use crate::search::search;

use super::forms::BorrowForm;

/// Entries on the home menu, in display order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum MenuItem {
    Books,
    BorrowReturn,
    History,
    About,
}

impl MenuItem {
    pub(crate) const ALL: [MenuItem; 4] = [
        MenuItem::Books,
        MenuItem::BorrowReturn,
        MenuItem::History,
        MenuItem::About,
    ];

    pub(crate) fn title(self) -> &'static str {
        match self {
            MenuItem::Books => "Library",
            MenuItem::BorrowReturn => "Borrow / Return",
            MenuItem::History => "History",
            MenuItem::About => "About",
        }
    }

    pub(crate) fn description(self) -> &'static str {
        match self {
            MenuItem::Books => "Browse, add, and remove books in the catalogue",
            MenuItem::BorrowReturn => "Lend a book to a student or take one back",
            MenuItem::History => "Search and manage borrow records",
            MenuItem::About => "How records are kept",
        }
    }
}

/// Clamp-and-move helper shared by every list screen.
fn step(selected: usize, len: usize, offset: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let max = len as isize - 1;
    (selected as isize + offset).clamp(0, max) as usize
}

fn in_bounds(selected: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        selected.min(len - 1)
    }
}

pub(crate) struct BookScreen {
    pub(crate) books: Vec<Book>,
    pub(crate) selected: usize,
}

impl BookScreen {
    pub(crate) fn new(books: Vec<Book>) -> Self {
        Self { books, selected: 0 }
    }

    pub(crate) fn set_books(&mut self, books: Vec<Book>, focus_id: Option<&str>) {
        self.books = books;
        if let Some(id) = focus_id {
            if let Some(index) = self.books.iter().position(|book| book.id == id) {
                self.selected = index;
                return;
            }
        }
        self.selected = in_bounds(self.selected, self.books.len());
    }

    pub(crate) fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step(self.selected, self.books.len(), offset);
    }
}

/// Borrow form plus the catalogue snapshot its book picker cycles through.
pub(crate) struct BorrowScreen {
    pub(crate) books: Vec<Book>,
    pub(crate) form: BorrowForm,
}

impl BorrowScreen {
    pub(crate) fn new(books: Vec<Book>) -> Self {
        let mut screen = Self {
            books,
            form: BorrowForm::default(),
        };
        screen.reset();
        screen
    }

    /// Clear the form for the next student.
    pub(crate) fn reset(&mut self) {
        self.form = BorrowForm::default();
        if self.books.is_empty() {
            self.form.error = Some("No books available. Add books in the Library first.".into());
        }
    }

    pub(crate) fn cycle_book(&mut self, offset: isize) {
        self.form.cycle_book(self.books.len(), offset);
    }
}

/// Books currently out, offered for return.
pub(crate) struct ReturnScreen {
    pub(crate) candidates: Vec<StudentRecord>,
    pub(crate) selected: usize,
}

impl ReturnScreen {
    pub(crate) fn new(records: &[StudentRecord]) -> Self {
        let mut screen = Self {
            candidates: Vec::new(),
            selected: 0,
        };
        screen.set_records(records);
        screen
    }

    pub(crate) fn set_records(&mut self, records: &[StudentRecord]) {
        self.candidates = borrowed_records(records).into_iter().cloned().collect();
        self.selected = in_bounds(self.selected, self.candidates.len());
    }

    pub(crate) fn current_record(&self) -> Option<&StudentRecord> {
        self.candidates.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step(self.selected, self.candidates.len(), offset);
    }
}

/// Full history, optionally narrowed by a name search.
pub(crate) struct HistoryScreen {
    pub(crate) records: Vec<StudentRecord>,
    pub(crate) visible: Vec<StudentRecord>,
    pub(crate) query: Option<String>,
    pub(crate) selected: usize,
}

impl HistoryScreen {
    pub(crate) fn new(records: Vec<StudentRecord>) -> Self {
        let mut screen = Self {
            records,
            visible: Vec::new(),
            query: None,
            selected: 0,
        };
        screen.apply_query();
        screen
    }

    /// A blank query leaves search mode and shows every record again; any
    /// other query shows only name matches.
    fn apply_query(&mut self) {
        self.visible = match &self.query {
            Some(query) => search(query, &self.records),
            None => self.records.clone(),
        };
        self.selected = in_bounds(self.selected, self.visible.len());
    }

    pub(crate) fn set_query(&mut self, query: Option<String>) {
        self.query = query.filter(|q| !q.trim().is_empty());
        self.selected = 0;
        self.apply_query();
    }

    pub(crate) fn is_searching(&self) -> bool {
        self.query.is_some()
    }

    pub(crate) fn set_records(&mut self, records: Vec<StudentRecord>) {
        self.records = records;
        self.apply_query();
    }

    pub(crate) fn current_record(&self) -> Option<&StudentRecord> {
        self.visible.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        self.selected = step(self.selected, self.visible.len(), offset);
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.visible.len().saturating_sub(1);
    }
}
