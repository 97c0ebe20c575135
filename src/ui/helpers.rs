use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::StudentRecord;

/// Two-line list entry for a borrow record: student and book on the first
/// line, dates and status on the second.
pub(crate) fn record_lines(record: &StudentRecord, selected: bool) -> Vec<Line<'static>> {
    let name_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let status_style = if record.is_returned() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::LightRed)
    };

    let returned = record.date_returned().unwrap_or("-");
    vec![
        Line::from(vec![
            Span::styled(record.display_name(), name_style),
            Span::raw(format!(" ({})  ", record.grade_section)),
            Span::raw(format!("{} by {}", record.book_title, record.book_author)),
        ]),
        Line::from(vec![
            Span::styled(
                format!("  Borrowed {}  Returned {}  ", record.date_borrowed, returned),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(format!("[{}]", record.status.label()), status_style),
        ]),
    ]
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error: the
/// outermost cause that already includes the root cause's text. Context
/// layers are skipped, while typed errors that name what failed are kept.
pub(crate) fn surface_error(err: &Error) -> String {
    let root = err.root_cause().to_string();
    err.chain()
        .map(|cause| cause.to_string())
        .find(|message| message.contains(&root))
        .unwrap_or(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::LibraryError;
    use crate::store::StoreError;
    use anyhow::{anyhow, Context};

    #[test]
    fn surface_error_prefers_root_cause() {
        let err = Err::<(), _>(anyhow!("First name is required."))
            .context("failed to borrow book")
            .unwrap_err();
        assert_eq!(surface_error(&err), "First name is required.");
    }

    #[test]
    fn surface_error_keeps_which_collection_was_unreadable() {
        let source = serde_json::from_str::<Vec<String>>("oops").unwrap_err();
        let store_err = StoreError::Malformed {
            key: "borrowRecords",
            source,
        };
        let err = Err::<(), _>(LibraryError::from(store_err))
            .context("failed to return book")
            .unwrap_err();
        let message = surface_error(&err);
        assert!(message.starts_with("stored `borrowRecords` data is unreadable: "));
        assert!(!message.contains("failed to return book"));
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert!(popup.x >= area.x && popup.right() <= area.right());
    }
}
