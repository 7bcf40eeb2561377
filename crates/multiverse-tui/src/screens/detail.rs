//! Character detail screen — single-entity view opened from the list.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::UnboundedSender;

use multiverse_core::Character;

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::status_indicator;

enum DetailState {
    Idle,
    Loading(u64),
    Loaded(Box<Character>),
    Failed(String),
}

pub struct DetailScreen {
    focused: bool,
    state: DetailState,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl DetailScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            state: DetailState::Idle,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {label:<12}"), theme::key_hint()),
            value,
        ])
    }

    fn character_lines(character: &Character) -> Vec<Line<'_>> {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", character.name),
                theme::title_style(),
            )),
            Line::from(""),
            Self::field("Status", status_indicator::status_label_span(character.status)),
            Self::field(
                "Species",
                Span::styled(character.species.as_str(), theme::table_row()),
            ),
            Self::field(
                "Type",
                Span::styled(
                    if character.kind.is_empty() {
                        "—"
                    } else {
                        character.kind.as_str()
                    },
                    theme::table_row(),
                ),
            ),
            Self::field(
                "Gender",
                Span::styled(character.gender.as_str(), theme::table_row()),
            ),
            Self::field(
                "Origin",
                Span::styled(character.origin.as_str(), theme::table_row()),
            ),
            Self::field(
                "Location",
                Span::styled(character.location.as_str(), theme::table_row()),
            ),
            Self::field(
                "Episodes",
                Span::styled(character.episode_count.to_string(), theme::table_row()),
            ),
            Line::from(""),
            Self::field(
                "Image",
                Span::styled(character.image.as_str(), Style::default().fg(theme::MEESEEKS_BLUE)),
            ),
        ]
    }
}

impl Component for DetailScreen {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Backspace => {
                Ok(Some(Action::CloseDetail))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::OpenDetail(id) => {
                self.state = DetailState::Loading(*id);
            }
            Action::DetailLoaded(character) => {
                // Ignore a late response for a different character.
                if matches!(self.state, DetailState::Loading(id) if id == character.id) {
                    self.state = DetailState::Loaded(character.clone());
                }
            }
            Action::DetailFailed(id, message) => {
                // Same staleness guard as the success path.
                if matches!(self.state, DetailState::Loading(current) if current == *id) {
                    self.state = DetailState::Failed(message.clone());
                }
            }
            Action::CloseDetail => {
                self.state = DetailState::Idle;
            }
            Action::Tick => {
                if matches!(self.state, DetailState::Loading(_)) {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Character ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // content
            Constraint::Length(1), // hints
        ])
        .split(inner);

        match &self.state {
            DetailState::Idle => {}
            DetailState::Loading(id) => {
                let throbber = throbber_widgets_tui::Throbber::default()
                    .label(format!("  Loading character {id}…"))
                    .style(Style::default().fg(theme::MEESEEKS_BLUE))
                    .throbber_style(Style::default().fg(theme::PORTAL_GREEN));
                frame.render_stateful_widget(
                    throbber,
                    layout[0],
                    &mut self.throbber_state.clone(),
                );
            }
            DetailState::Loaded(character) => {
                frame.render_widget(
                    Paragraph::new(Self::character_lines(character)),
                    layout[0],
                );
            }
            DetailState::Failed(message) => {
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        format!("  {message}"),
                        theme::error_style(),
                    ))),
                    layout[0],
                );
            }
        }

        let hints = Line::from(vec![
            Span::styled("  Esc ", theme::key_hint_key()),
            Span::styled("back", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use multiverse_core::CharacterStatus;

    fn character(id: u64, name: &str) -> Box<Character> {
        Box::new(Character {
            id,
            name: name.into(),
            status: CharacterStatus::Alive,
            species: "Human".into(),
            kind: String::new(),
            gender: "Male".into(),
            origin: "Earth".into(),
            location: "Earth".into(),
            image: String::new(),
            episode_count: 1,
        })
    }

    #[test]
    fn late_failure_for_a_different_character_is_ignored() {
        let mut screen = DetailScreen::new();
        screen.update(&Action::OpenDetail(2)).unwrap();

        // A slow error from a previously opened detail view lands late.
        screen
            .update(&Action::DetailFailed(1, "boom".into()))
            .unwrap();
        assert!(matches!(screen.state, DetailState::Loading(2)));

        screen
            .update(&Action::DetailFailed(2, "boom".into()))
            .unwrap();
        assert!(matches!(screen.state, DetailState::Failed(_)));
    }

    #[test]
    fn late_load_for_a_different_character_is_ignored() {
        let mut screen = DetailScreen::new();
        screen.update(&Action::OpenDetail(2)).unwrap();

        screen
            .update(&Action::DetailLoaded(character(1, "Rick Sanchez")))
            .unwrap();
        assert!(matches!(screen.state, DetailState::Loading(2)));

        screen
            .update(&Action::DetailLoaded(character(2, "Morty Smith")))
            .unwrap();
        assert!(matches!(screen.state, DetailState::Loaded(ref c) if c.id == 2));
    }
}
