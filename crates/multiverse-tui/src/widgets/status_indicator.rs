//! Character status indicator — ●/○/? with color mapping.

use ratatui::style::Style;
use ratatui::text::Span;

use multiverse_core::CharacterStatus;

use crate::theme;

/// Returns a styled `Span` with the appropriate status dot and color.
pub fn status_span(status: CharacterStatus) -> Span<'static> {
    let (symbol, color) = match status {
        CharacterStatus::Alive => ("●", theme::SUCCESS_GREEN),
        CharacterStatus::Dead => ("○", theme::ERROR_RED),
        CharacterStatus::Unknown => ("?", theme::DIM_WHITE),
    };
    Span::styled(symbol, Style::default().fg(color))
}

/// Status dot plus label, e.g. "● Alive".
pub fn status_label_span(status: CharacterStatus) -> Span<'static> {
    let (text, color) = match status {
        CharacterStatus::Alive => ("● Alive", theme::SUCCESS_GREEN),
        CharacterStatus::Dead => ("○ Dead", theme::ERROR_RED),
        CharacterStatus::Unknown => ("? unknown", theme::DIM_WHITE),
    };
    Span::styled(text, Style::default().fg(color))
}
