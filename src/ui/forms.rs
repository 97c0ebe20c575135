use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Book, BorrowRequest, StudentRecord};

/// Input state for the "add book" popup.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
}

impl BookForm {
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Title,
        };
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.field_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.field_mut(self.active).pop();
    }

    fn field_mut(&mut self, field: BookField) -> &mut String {
        match field {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
        }
    }

    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let value = match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
        };
        field_line(field_name, value, self.active == field, true)
    }

    pub(crate) fn value_len(&self, field: BookField) -> usize {
        match field {
            BookField::Title => self.title.chars().count(),
            BookField::Author => self.author.chars().count(),
        }
    }
}

/// Input state for the borrow form. The book is chosen from the current
/// catalogue with Left/Right rather than typed.
#[derive(Default, Clone)]
pub(crate) struct BorrowForm {
    pub(crate) first_name: String,
    pub(crate) middle_name: String,
    pub(crate) last_name: String,
    pub(crate) grade_section: String,
    pub(crate) book_index: Option<usize>,
    pub(crate) active: BorrowField,
    pub(crate) error: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum BorrowField {
    #[default]
    FirstName,
    MiddleName,
    LastName,
    GradeSection,
    Book,
}

impl BorrowField {
    pub(crate) const ALL: [BorrowField; 5] = [
        BorrowField::FirstName,
        BorrowField::MiddleName,
        BorrowField::LastName,
        BorrowField::GradeSection,
        BorrowField::Book,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            BorrowField::FirstName => "First name",
            BorrowField::MiddleName => "Middle name",
            BorrowField::LastName => "Last name",
            BorrowField::GradeSection => "Grade & section",
            BorrowField::Book => "Book",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

impl BorrowForm {
    pub(crate) fn next_field(&mut self) {
        let next = (self.active.position() + 1) % BorrowField::ALL.len();
        self.active = BorrowField::ALL[next];
    }

    pub(crate) fn previous_field(&mut self) {
        let len = BorrowField::ALL.len();
        let previous = (self.active.position() + len - 1) % len;
        self.active = BorrowField::ALL[previous];
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.text_field_mut() {
            Some(value) => {
                value.push(ch);
                true
            }
            None => false,
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.text_field_mut() {
            value.pop();
        }
    }

    fn text_field_mut(&mut self) -> Option<&mut String> {
        match self.active {
            BorrowField::FirstName => Some(&mut self.first_name),
            BorrowField::MiddleName => Some(&mut self.middle_name),
            BorrowField::LastName => Some(&mut self.last_name),
            BorrowField::GradeSection => Some(&mut self.grade_section),
            BorrowField::Book => None,
        }
    }

    /// Step through the catalogue, wrapping at both ends. With nothing picked
    /// yet, Right lands on the first book and Left on the last.
    pub(crate) fn cycle_book(&mut self, book_count: usize, offset: isize) {
        if book_count == 0 {
            self.book_index = None;
            return;
        }
        let len = book_count as isize;
        let current = self
            .book_index
            .map(|i| i as isize)
            .unwrap_or(if offset < 0 { len } else { -1 });
        let next = (current + offset).rem_euclid(len);
        self.book_index = Some(next as usize);
    }

    /// Collect the typed values. Required-field checks happen when the record
    /// is built, so blank input flows through unchanged.
    pub(crate) fn to_request(&self, books: &[Book]) -> BorrowRequest {
        let book_id = self
            .book_index
            .and_then(|index| books.get(index))
            .map(|book| book.id.clone())
            .unwrap_or_default();
        BorrowRequest {
            first_name: self.first_name.clone(),
            middle_name: self.middle_name.clone(),
            last_name: self.last_name.clone(),
            grade_section: self.grade_section.clone(),
            book_id,
        }
    }

    pub(crate) fn build_line(&self, field: BorrowField, books: &[Book]) -> Line<'static> {
        let is_active = self.active == field;
        match field {
            BorrowField::FirstName => field_line(field.label(), &self.first_name, is_active, true),
            BorrowField::MiddleName => {
                field_line(field.label(), &self.middle_name, is_active, false)
            }
            BorrowField::LastName => field_line(field.label(), &self.last_name, is_active, true),
            BorrowField::GradeSection => {
                field_line(field.label(), &self.grade_section, is_active, true)
            }
            BorrowField::Book => {
                let selected = self
                    .book_index
                    .and_then(|index| books.get(index))
                    .map(|book| format!("< {book} >"))
                    .unwrap_or_default();
                field_line(field.label(), &selected, is_active, true)
            }
        }
    }

    pub(crate) fn value_len(&self, field: BorrowField) -> usize {
        match field {
            BorrowField::FirstName => self.first_name.chars().count(),
            BorrowField::MiddleName => self.middle_name.chars().count(),
            BorrowField::LastName => self.last_name.chars().count(),
            BorrowField::GradeSection => self.grade_section.chars().count(),
            BorrowField::Book => 0,
        }
    }
}

/// Render `Name: value`, greying out empty values and highlighting the
/// focused field.
fn field_line(field_name: &str, value: &str, is_active: bool, required: bool) -> Line<'static> {
    let display = if !value.is_empty() {
        value.to_string()
    } else if required {
        "<required>".to_string()
    } else {
        "<optional>".to_string()
    };

    let style = if is_active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(format!("{field_name}: ")),
        Span::styled(display, style),
    ])
}

/// Confirmation state before removing a book from the catalogue.
pub(crate) struct ConfirmBookDelete {
    pub(crate) book: Book,
}

/// Confirmation state before permanently deleting a history record.
pub(crate) struct ConfirmRecordDelete {
    pub(crate) record: StudentRecord,
}
