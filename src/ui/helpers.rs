use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::error::LibraryError;

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

/// Extract the most relevant error message from a chained error: the first
/// domain error or SQLite error in the chain. SQLite's own source is only the
/// bare result code, so the walk stops before it. Anything else shows the
/// innermost cause.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .find(|cause| cause.is::<LibraryError>() || cause.is::<rusqlite::Error>())
        .or_else(|| err.chain().last())
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}
