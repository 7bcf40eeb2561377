//! Character list screen — paginated catalog with infinite scroll and
//! search-by-id results.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Row, Table, TableState};
use tokio::sync::mpsc::UnboundedSender;

use multiverse_core::{ListSnapshot, QueryMode};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::status_indicator;

pub struct ListScreen {
    focused: bool,
    snapshot: ListSnapshot,
    table_state: TableState,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

fn empty_snapshot() -> ListSnapshot {
    ListSnapshot {
        items: Arc::new(Vec::new()),
        mode: QueryMode::Paginated,
        current_page: 1,
        has_more: true,
        is_loading: false,
        last_error: None,
    }
}

impl ListScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            snapshot: empty_snapshot(),
            table_state: TableState::default(),
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    fn selected(&self) -> Option<usize> {
        self.table_state.selected()
    }

    fn select(&mut self, index: usize) {
        if !self.snapshot.items.is_empty() {
            self.table_state
                .select(Some(index.min(self.snapshot.items.len() - 1)));
        }
    }

    /// Move the selection down. Hitting the tail of the loaded list asks
    /// for the next page.
    fn select_next(&mut self) -> Option<Action> {
        let len = self.snapshot.items.len();
        if len == 0 {
            return None;
        }
        let current = self.selected().unwrap_or(0);
        let next = (current + 1).min(len - 1);
        self.select(next);

        if next == len - 1 && self.snapshot.has_more && !self.snapshot.is_loading {
            return Some(Action::EndReached);
        }
        None
    }

    fn select_prev(&mut self) {
        let current = self.selected().unwrap_or(0);
        self.select(current.saturating_sub(1));
    }

    /// Footer line under the table: error, loading state, or end marker.
    fn footer_line(&self) -> Line<'_> {
        if let Some(ref error) = self.snapshot.last_error {
            return Line::from(vec![
                Span::styled(format!("  {error}"), theme::error_style()),
                Span::styled("  ·  ", theme::key_hint()),
                Span::styled("r ", theme::key_hint_key()),
                Span::styled("retry", theme::key_hint()),
            ]);
        }
        if self.snapshot.is_loading_more() {
            return Line::from(Span::styled(
                "  loading more…",
                ratatui::style::Style::default().fg(theme::ELECTRIC_YELLOW),
            ));
        }
        if !self.snapshot.has_more && matches!(self.snapshot.mode, QueryMode::Paginated) {
            return Line::from(Span::styled("  end of list", theme::key_hint()));
        }
        Line::from("")
    }
}

impl Component for ListScreen {
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Ok(self.select_next()),
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                Ok(None)
            }
            KeyCode::Char('g') => {
                self.select(0);
                Ok(None)
            }
            KeyCode::Char('G') => {
                let len = self.snapshot.items.len();
                if len > 0 {
                    self.select(len - 1);
                }
                Ok(None)
            }
            KeyCode::Enter => {
                let id = self
                    .selected()
                    .and_then(|i| self.snapshot.items.get(i))
                    .map(|c| c.id);
                Ok(id.map(Action::OpenDetail))
            }
            KeyCode::Char('r') if self.snapshot.last_error.is_some() => Ok(Some(Action::Retry)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ListUpdated(snapshot) => {
                self.snapshot = snapshot.clone();
                // Clamp or seed the selection against the new item list.
                match (self.selected(), self.snapshot.items.len()) {
                    (_, 0) => self.table_state.select(None),
                    (None, _) => self.select(0),
                    (Some(i), len) => self.select(i.min(len - 1)),
                }
            }
            Action::Tick => {
                if self.snapshot.is_loading {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let count = self.snapshot.items.len();
        let title = match &self.snapshot.mode {
            QueryMode::Paginated => {
                format!(" Characters ({count}) · page {} ", self.snapshot.current_page)
            }
            QueryMode::Search(query) => format!(" Characters · search \"{query}\" "),
        };

        let block = Block::default()
            .title(title)
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
            Constraint::Min(1),    // table
            Constraint::Length(1), // footer
        ])
        .split(inner);

        if self.snapshot.is_initial_loading() {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label("  Loading characters…")
                .style(ratatui::style::Style::default().fg(theme::MEESEEKS_BLUE))
                .throbber_style(ratatui::style::Style::default().fg(theme::PORTAL_GREEN));
            frame.render_stateful_widget(throbber, layout[0], &mut self.throbber_state.clone());
        } else if self.snapshot.is_empty_result() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    "  No characters found.",
                    theme::key_hint(),
                ))),
                layout[0],
            );
        } else {
            let header = Row::new(vec!["  ID", "", "Name", "Species", "Gender"])
                .style(theme::table_header());

            let rows: Vec<Row> = self
                .snapshot
                .items
                .iter()
                .map(|c| {
                    Row::new(vec![
                        Line::from(format!("  {}", c.id)),
                        Line::from(status_indicator::status_span(c.status)),
                        Line::from(c.name.clone()),
                        Line::from(c.species.clone()),
                        Line::from(c.gender.clone()),
                    ])
                    .style(theme::table_row())
                })
                .collect();

            let table = Table::new(
                rows,
                [
                    Constraint::Length(6),
                    Constraint::Length(2),
                    Constraint::Min(20),
                    Constraint::Length(14),
                    Constraint::Length(12),
                ],
            )
            .header(header)
            .row_highlight_style(theme::table_selected());

            frame.render_stateful_widget(table, layout[0], &mut self.table_state.clone());
        }

        frame.render_widget(Paragraph::new(self.footer_line()), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
