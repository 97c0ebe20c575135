use std::mem;

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use log::error;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::library::{add_book, borrow_book, delete_book, delete_record, return_book};
use crate::retention::{check_retention, RetentionReport, RETENTION_DAYS};
use crate::store::{SqliteStore, Store};
use crate::time::{format_clock, Clock};

use super::forms::{BookField, BookForm, BorrowField, ConfirmBookDelete, ConfirmRecordDelete};
use super::helpers::{centered_rect, record_lines, surface_error};
use super::screens::{BookScreen, BorrowScreen, HistoryScreen, MenuItem, ReturnScreen};

const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Top-level pages.
enum Screen {
    Home,
    Books(BookScreen),
    Borrow(BorrowScreen),
    Return(ReturnScreen),
    History(HistoryScreen),
    About,
}

/// Popups and inline editors layered over the current screen.
enum Mode {
    Normal,
    AddingBook(BookForm),
    ConfirmBookDelete(ConfirmBookDelete),
    ConfirmRecordDelete(ConfirmRecordDelete),
    Searching(String),
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

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

/// Central application state shared across the TUI.
pub struct App {
    store: SqliteStore,
    clock: Box<dyn Clock>,
    menu_selected: usize,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(store: SqliteStore, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            menu_selected: 0,
            screen: Screen::Home,
            mode: Mode::Normal,
            status: None,
        }
    }

    /// Run the weekly cleanup if it is due and refresh whatever is on screen.
    /// Failures are reported in the footer and never stop the app.
    pub fn run_retention_check(&mut self) {
        match check_retention(&self.store, self.clock.as_ref()) {
            Ok(RetentionReport::Ran { removed_count }) if removed_count > 0 => {
                self.set_status(
                    format!("Auto-deletion complete: {removed_count} old records removed."),
                    StatusKind::Info,
                );
                if let Err(err) = self.reload_screen() {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
            }
            Ok(_) => {}
            Err(err) => {
                error!(
                    "event=retention_run module=ui status=error error={}",
                    err
                );
                self.set_status(
                    format!("Error during weekly auto-deletion: {err}"),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Dispatch one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let outcome = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::ConfirmBookDelete(confirm) => self.handle_confirm_book_delete(code, confirm),
            Mode::ConfirmRecordDelete(confirm) => {
                self.handle_confirm_record_delete(code, confirm)
            }
            Mode::Searching(query) => self.handle_search(code, query),
        };

        self.mode = match outcome {
            Ok(mode) => mode,
            Err(err) => {
                self.set_status(surface_error(&err), StatusKind::Error);
                Mode::Normal
            }
        };
        Ok(exit)
    }

    /// Ctrl+T flips between the borrow form and the return list. A failed
    /// load stays on the current screen and is reported in the footer.
    pub(crate) fn handle_ctrl_t(&mut self) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        let toggled = match self.screen {
            Screen::Borrow(_) => self.open_return(),
            Screen::Return(_) => self.open_borrow(),
            _ => Ok(()),
        };
        if let Err(err) = toggled {
            self.set_status(surface_error(&err), StatusKind::Error);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match self.screen {
            Screen::Home => match code {
                KeyCode::Char('q') | KeyCode::Esc => *exit = true,
                KeyCode::Up => self.menu_selected = self.menu_selected.saturating_sub(1),
                KeyCode::Down => {
                    self.menu_selected = (self.menu_selected + 1).min(MenuItem::ALL.len() - 1)
                }
                KeyCode::Char(ch @ '1'..='4') => {
                    self.menu_selected = ch as usize - '1' as usize;
                    self.open_menu_item()?;
                }
                KeyCode::Enter => self.open_menu_item()?,
                _ => {}
            },
            Screen::Books(ref mut books) => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => self.go_home(),
                KeyCode::Up => books.move_selection(-1),
                KeyCode::Down => books.move_selection(1),
                KeyCode::Char('+') | KeyCode::Char('a') => {
                    self.clear_status();
                    return Ok(Mode::AddingBook(BookForm::default()));
                }
                KeyCode::Char('-') | KeyCode::Delete => {
                    if let Some(book) = books.current_book().cloned() {
                        self.clear_status();
                        return Ok(Mode::ConfirmBookDelete(ConfirmBookDelete { book }));
                    }
                    self.set_status("No book selected to remove.", StatusKind::Error);
                }
                _ => {}
            },
            Screen::Borrow(ref mut borrow) => match code {
                KeyCode::Esc => self.go_home(),
                KeyCode::Tab | KeyCode::Down => borrow.form.next_field(),
                KeyCode::BackTab | KeyCode::Up => borrow.form.previous_field(),
                KeyCode::Left if borrow.form.active == BorrowField::Book => borrow.cycle_book(-1),
                KeyCode::Right if borrow.form.active == BorrowField::Book => borrow.cycle_book(1),
                KeyCode::Backspace => borrow.form.backspace(),
                KeyCode::Enter => self.submit_borrow()?,
                KeyCode::Char(ch) => {
                    borrow.form.push_char(ch);
                }
                _ => {}
            },
            Screen::Return(ref mut returns) => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => self.go_home(),
                KeyCode::Up => returns.move_selection(-1),
                KeyCode::Down => returns.move_selection(1),
                KeyCode::Enter => self.submit_return()?,
                _ => {}
            },
            Screen::History(ref mut history) => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc => {
                    if history.is_searching() {
                        history.set_query(None);
                        self.clear_status();
                    } else {
                        self.go_home();
                    }
                }
                KeyCode::Up => history.move_selection(-1),
                KeyCode::Down => history.move_selection(1),
                KeyCode::PageUp => history.move_selection(-5),
                KeyCode::PageDown => history.move_selection(5),
                KeyCode::Home => history.select_first(),
                KeyCode::End => history.select_last(),
                KeyCode::Char('f') | KeyCode::Char('/') => {
                    let query = history.query.clone().unwrap_or_default();
                    return Ok(Mode::Searching(query));
                }
                KeyCode::Char('c') => {
                    history.set_query(None);
                    self.clear_status();
                }
                KeyCode::Char('-') | KeyCode::Delete => {
                    if let Some(record) = history.current_record().cloned() {
                        self.clear_status();
                        return Ok(Mode::ConfirmRecordDelete(ConfirmRecordDelete { record }));
                    }
                    self.set_status("No record selected to delete.", StatusKind::Error);
                }
                _ => {}
            },
            Screen::About => match code {
                KeyCode::Char('q') => *exit = true,
                KeyCode::Esc | KeyCode::Enter => self.go_home(),
                _ => {}
            },
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match add_book(&self.store, &form.title, &form.author) {
                Ok(book) => {
                    self.reload_books(Some(&book.id))?;
                    self.set_status(
                        format!("\"{}\" has been added to the library!", book.title),
                        StatusKind::Info,
                    );
                    return Ok(Mode::Normal);
                }
                Err(err) => form.error = Some(err.to_string()),
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::AddingBook(form))
    }

    fn handle_confirm_book_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmBookDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                delete_book(&self.store, &confirm.book.id).context("failed to remove book")?;
                self.reload_books(None)?;
                self.set_status("Book has been removed from the library.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmBookDelete(confirm)),
        }
    }

    fn handle_confirm_record_delete(
        &mut self,
        code: KeyCode,
        confirm: ConfirmRecordDelete,
    ) -> Result<Mode> {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if delete_record(&self.store, &confirm.record.id)
                    .context("failed to delete record")?
                {
                    self.set_status("Record deleted successfully.", StatusKind::Info);
                } else {
                    self.set_status("Failed to delete record.", StatusKind::Error);
                }
                self.reload_screen()?;
                Ok(Mode::Normal)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Ok(Mode::Normal),
            _ => Ok(Mode::ConfirmRecordDelete(confirm)),
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Result<Mode> {
        match code {
            KeyCode::Esc => Ok(Mode::Normal),
            KeyCode::Enter => {
                if let Screen::History(ref mut history) = self.screen {
                    history.set_query(Some(query));
                    if history.is_searching() && history.visible.is_empty() {
                        self.set_status("No matching records found.", StatusKind::Info);
                    } else {
                        self.clear_status();
                    }
                }
                Ok(Mode::Normal)
            }
            KeyCode::Backspace => {
                query.pop();
                Ok(Mode::Searching(query))
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                query.push(ch);
                Ok(Mode::Searching(query))
            }
            _ => Ok(Mode::Searching(query)),
        }
    }

    fn submit_borrow(&mut self) -> Result<()> {
        let Screen::Borrow(ref mut borrow) = self.screen else {
            return Ok(());
        };
        let request = borrow.form.to_request(&borrow.books);
        match borrow_book(&self.store, self.clock.as_ref(), &request) {
            Ok(record) => {
                borrow.reset();
                self.set_status(
                    format!("{} has been borrowed successfully!", record.book_title),
                    StatusKind::Info,
                );
            }
            Err(err) => borrow.form.error = Some(err.to_string()),
        }
        Ok(())
    }

    fn submit_return(&mut self) -> Result<()> {
        let Screen::Return(ref returns) = self.screen else {
            return Ok(());
        };
        let Some(record) = returns.current_record() else {
            self.set_status("Please select a book to return.", StatusKind::Error);
            return Ok(());
        };
        let returned = return_book(&self.store, self.clock.as_ref(), &record.id)
            .context("failed to return book")?;
        self.reload_screen()?;
        self.set_status(
            format!("{} has been returned successfully!", returned.book_title),
            StatusKind::Info,
        );
        Ok(())
    }

    fn open_menu_item(&mut self) -> Result<()> {
        self.clear_status();
        match MenuItem::ALL[self.menu_selected] {
            MenuItem::Books => {
                self.screen = Screen::Books(BookScreen::new(self.store.load_books()?));
            }
            MenuItem::BorrowReturn => self.open_borrow()?,
            MenuItem::History => {
                self.screen = Screen::History(HistoryScreen::new(self.store.load_records()?));
            }
            MenuItem::About => self.screen = Screen::About,
        }
        Ok(())
    }

    fn open_borrow(&mut self) -> Result<()> {
        let books = self.store.load_books().context("failed to load books")?;
        self.screen = Screen::Borrow(BorrowScreen::new(books));
        Ok(())
    }

    fn open_return(&mut self) -> Result<()> {
        let records = self
            .store
            .load_records()
            .context("failed to load borrow records")?;
        self.screen = Screen::Return(ReturnScreen::new(&records));
        Ok(())
    }

    fn go_home(&mut self) {
        self.clear_status();
        self.screen = Screen::Home;
    }

    fn reload_books(&mut self, focus_id: Option<&str>) -> Result<()> {
        if let Screen::Books(ref mut screen) = self.screen {
            screen.set_books(self.store.load_books()?, focus_id);
        }
        Ok(())
    }

    /// Re-read the collections behind the current screen after a write.
    fn reload_screen(&mut self) -> Result<()> {
        match self.screen {
            Screen::Books(_) => self.reload_books(None)?,
            Screen::Return(ref mut returns) => returns.set_records(&self.store.load_records()?),
            Screen::History(ref mut history) => history.set_records(self.store.load_records()?),
            Screen::Home | Screen::Borrow(_) | Screen::About => {}
        }
        Ok(())
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

    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match &self.screen {
            Screen::Home => self.draw_home(frame, chunks[1]),
            Screen::Books(books) => self.draw_books(frame, chunks[1], books),
            Screen::Borrow(borrow) => self.draw_borrow(frame, chunks[1], borrow),
            Screen::Return(returns) => self.draw_return(frame, chunks[1], returns),
            Screen::History(history) => self.draw_history(frame, chunks[1], history),
            Screen::About => self.draw_about(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, chunks[1], form),
            Mode::ConfirmBookDelete(confirm) => self.draw_confirm(
                frame,
                chunks[1],
                "Remove Book",
                format!("Remove \"{}\" from the library?", confirm.book.title),
            ),
            Mode::ConfirmRecordDelete(confirm) => self.draw_confirm(
                frame,
                chunks[1],
                "Delete Record",
                format!(
                    "Delete the record for {} ({})? This cannot be undone.",
                    confirm.record.display_name(),
                    confirm.record.book_title
                ),
            ),
            Mode::Searching(query) => self.draw_search_bar(frame, chunks[1], query),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let now = self.clock.now();
        let title = match &self.screen {
            Screen::Home => "School Library",
            Screen::Books(_) => "Library",
            Screen::Borrow(_) => "Borrow a Book",
            Screen::Return(_) => "Return a Book",
            Screen::History(_) => "History",
            Screen::About => "About",
        };
        let line = Line::from(vec![
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            Span::raw("Philippines Time: "),
            Span::styled(format_clock(&now), Style::default().fg(Color::Yellow)),
        ]);
        let header = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, area);
    }

    fn draw_home(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = MenuItem::ALL
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{}. {}", idx + 1, item.title()),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        format!("   {}", item.description()),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Menu"))
            .highlight_style(Style::default().fg(Color::Yellow));
        let mut state = ListState::default();
        state.select(Some(self.menu_selected));
        frame.render_stateful_widget(list, centered_rect(60, 80, area), &mut state);
    }

    fn draw_books(&self, frame: &mut Frame, area: Rect, screen: &BookScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Books ({})", screen.books.len()));
        if screen.books.is_empty() {
            let message = Paragraph::new("No books yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }
        let items: Vec<ListItem> = screen
            .books
            .iter()
            .map(|book| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        book.title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("  by {}", book.author)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow));
        let mut state = ListState::default();
        state.select(Some(screen.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_borrow(&self, frame: &mut Frame, area: Rect, borrow: &BorrowScreen) {
        let form = &borrow.form;
        let block = Block::default().borders(Borders::ALL).title("Student Information");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines: Vec<Line> = BorrowField::ALL
            .iter()
            .map(|field| form.build_line(*field, &borrow.books))
            .collect();
        lines.push(Line::from(""));
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        if form.active != BorrowField::Book {
            let row = BorrowField::ALL
                .iter()
                .position(|field| *field == form.active)
                .unwrap_or(0) as u16;
            let prefix = format!("{}: ", form.active.label()).len() as u16;
            frame.set_cursor_position((
                inner.x + prefix + form.value_len(form.active) as u16,
                inner.y + row,
            ));
        }
    }

    fn draw_return(&self, frame: &mut Frame, area: Rect, screen: &ReturnScreen) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Borrowed Books ({})", screen.candidates.len()));
        if screen.candidates.is_empty() {
            let message = Paragraph::new("No books are currently borrowed.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }
        let items: Vec<ListItem> = screen
            .candidates
            .iter()
            .enumerate()
            .map(|(idx, record)| ListItem::new(record_lines(record, idx == screen.selected)))
            .collect();
        let mut state = ListState::default();
        state.select(Some(screen.selected));
        frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect, screen: &HistoryScreen) {
        let title = match &screen.query {
            Some(query) => format!(
                "Found {} records matching \"{}\"",
                screen.visible.len(),
                query
            ),
            None => format!("Showing {} records", screen.visible.len()),
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        if screen.visible.is_empty() {
            let text = if screen.is_searching() {
                "No matching records found."
            } else {
                "No borrow records yet."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }
        let items: Vec<ListItem> = screen
            .visible
            .iter()
            .enumerate()
            .map(|(idx, record)| ListItem::new(record_lines(record, idx == screen.selected)))
            .collect();
        let mut state = ListState::default();
        state.select(Some(screen.selected));
        frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
    }

    fn draw_about(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "School Library Manager",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Catalogue books, lend them to students, and keep a searchable history."),
            Line::from("All times are shown in Philippine time (UTC+8)."),
            Line::from(format!(
                "Every Saturday, returned records older than {RETENTION_DAYS} days are removed automatically."
            )),
            Line::from("Books still on loan are never removed."),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
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
        let keys: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::AddingBook(_)) => &[("[Enter]", "Save"), ("[Tab]", "Switch"), ("[Esc]", "Cancel")],
            (_, Mode::ConfirmBookDelete(_)) | (_, Mode::ConfirmRecordDelete(_)) => {
                &[("[y]", "Confirm"), ("[n]", "Cancel")]
            }
            (_, Mode::Searching(_)) => &[("[Enter]", "Search"), ("[Esc]", "Cancel")],
            (Screen::Home, _) => &[("[↑↓]", "Navigate"), ("[Enter]", "Open"), ("[q]", "Quit")],
            (Screen::Books(_), _) => &[
                ("[↑↓]", "Navigate"),
                ("[+]", "Add"),
                ("[-]", "Remove"),
                ("[Esc]", "Back"),
            ],
            (Screen::Borrow(_), _) => &[
                ("[Tab]", "Next field"),
                ("[←→]", "Choose book"),
                ("[Enter]", "Borrow"),
                ("[Ctrl+T]", "Return"),
                ("[Esc]", "Back"),
            ],
            (Screen::Return(_), _) => &[
                ("[↑↓]", "Navigate"),
                ("[Enter]", "Return"),
                ("[Ctrl+T]", "Borrow"),
                ("[Esc]", "Back"),
            ],
            (Screen::History(_), _) => &[
                ("[↑↓]", "Navigate"),
                ("[f]", "Search"),
                ("[c]", "Clear"),
                ("[-]", "Delete"),
                ("[Esc]", "Back"),
            ],
            (Screen::About, _) => &[("[Esc]", "Back"), ("[q]", "Quit")],
        };

        let mut spans = Vec::with_capacity(keys.len() * 2);
        for (key, action) in keys {
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {action}   ")));
        }
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("Title", BookField::Title),
            form.build_line("Author", BookField::Author),
            Line::from(""),
        ];
        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);

        let (prefix, row) = match form.active {
            BookField::Title => ("Title: ".len() as u16, 0),
            BookField::Author => ("Author: ".len() as u16, 1),
        };
        frame.set_cursor_position((
            inner.x + prefix + form.value_len(form.active) as u16,
            inner.y + row,
        ));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, title: &str, message: String) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);
        let lines = vec![
            Line::from(message),
            Line::from(""),
            Line::from(Span::styled(
                "Press y to confirm or n to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().title(title.to_string()).borders(Borders::ALL));
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, query: &str) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title("Search by student name");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {query}")))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordStatus;
    use crate::time::{school_offset, FixedClock};
    use chrono::TimeZone;

    fn app_at(day: u32) -> App {
        let now = school_offset()
            .with_ymd_and_hms(2025, 3, day, 9, 0, 0)
            .unwrap();
        App::new(SqliteStore::open_in_memory().unwrap(), Box::new(FixedClock(now)))
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    #[test]
    fn add_borrow_and_return_through_keys() {
        let mut app = app_at(12);

        // Library -> add book
        app.handle_key(KeyCode::Char('1')).unwrap();
        app.handle_key(KeyCode::Char('+')).unwrap();
        type_text(&mut app, "Noli Me Tangere");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Jose Rizal");
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.store.load_books().unwrap().len(), 1);

        // Borrow
        app.handle_key(KeyCode::Esc).unwrap();
        app.handle_key(KeyCode::Char('2')).unwrap();
        type_text(&mut app, "Maria");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "Cruz");
        app.handle_key(KeyCode::Tab).unwrap();
        type_text(&mut app, "10-A");
        app.handle_key(KeyCode::Tab).unwrap();
        app.handle_key(KeyCode::Right).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        let records = app.store.load_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date_borrowed, "03/12/2025, 09:00 AM");

        // Return
        app.handle_ctrl_t();
        app.handle_key(KeyCode::Enter).unwrap();
        let records = app.store.load_records().unwrap();
        assert_eq!(
            records[0].status,
            RecordStatus::Returned {
                date_returned: Some("03/12/2025, 09:00 AM".into())
            }
        );
    }

    #[test]
    fn borrow_without_required_fields_keeps_form_open() {
        let mut app = app_at(12);
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert!(app.store.load_records().unwrap().is_empty());
        match &app.screen {
            Screen::Borrow(borrow) => assert!(borrow.form.error.is_some()),
            _ => panic!("expected borrow screen"),
        }
    }

    #[test]
    fn ctrl_t_over_unreadable_history_reports_in_footer() {
        let mut app = app_at(12);
        app.handle_key(KeyCode::Char('2')).unwrap();
        app.store
            .connection()
            .execute(
                "INSERT INTO kv (key, value) VALUES ('borrowRecords', 'oops')",
                [],
            )
            .unwrap();

        app.handle_ctrl_t();
        assert!(matches!(app.screen, Screen::Borrow(_)));
        match &app.status {
            Some(StatusMessage {
                text,
                kind: StatusKind::Error,
            }) => assert!(text.contains("stored `borrowRecords` data is unreadable")),
            _ => panic!("expected an error in the footer"),
        }
    }

    #[test]
    fn quit_from_home() {
        let mut app = app_at(12);
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }

    #[test]
    fn retention_check_on_weekday_is_silent() {
        let mut app = app_at(12);
        app.run_retention_check();
        assert!(app.status.is_none());
        assert_eq!(app.store.load_last_deletion_marker().unwrap(), None);
    }

    #[test]
    fn retention_check_on_saturday_records_marker() {
        let mut app = app_at(15);
        app.run_retention_check();
        assert_eq!(
            app.store.load_last_deletion_marker().unwrap().as_deref(),
            Some("2025-03-15")
        );
    }
}
