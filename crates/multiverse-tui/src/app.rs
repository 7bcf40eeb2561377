//! Application core — event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use multiverse_core::CatalogController;

use crate::action::Action;
use crate::component::Component;
use crate::data_bridge::run_data_bridge;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Top-level application state and event loop.
pub struct App {
    controller: CatalogController,
    /// Current active screen.
    active_screen: ScreenId,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Search overlay visibility.
    search_active: bool,
    /// Current search text (id lookup).
    search_query: String,
    /// Item count from the latest snapshot, for the status bar.
    item_count: usize,
    /// Cancels the data bridge on shutdown.
    bridge_cancel: CancellationToken,
    /// Action sender — background tasks dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(controller: CatalogController) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();

        Self {
            controller,
            active_screen: ScreenId::List,
            screens,
            running: true,
            help_visible: false,
            search_active: false,
            search_query: String::new(),
            item_count: 0,
            bridge_cancel: CancellationToken::new(),
            action_tx,
            action_rx,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        // Background bridge: initial load + snapshot forwarding
        tokio::spawn(run_data_bridge(
            self.controller.clone(),
            self.action_tx.clone(),
            self.bridge_cancel.clone(),
        ));

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.bridge_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search_active {
            // Search captures everything. Each edit re-fetches.
            return match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Ok(Some(Action::Quit))
                }
                KeyCode::Esc | KeyCode::Enter => Ok(Some(Action::CloseSearch)),
                KeyCode::Backspace => {
                    self.search_query.pop();
                    Ok(Some(Action::Search(self.search_query.clone())))
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.search_query.push(c);
                    Ok(Some(Action::Search(self.search_query.clone())))
                }
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        // Global keybindings
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),

            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),

            (KeyModifiers::NONE, KeyCode::Char('/')) if self.active_screen == ScreenId::List => {
                return Ok(Some(Action::OpenSearch));
            }

            // Esc on the list clears an active search query
            (KeyModifiers::NONE, KeyCode::Esc)
                if self.active_screen == ScreenId::List && !self.search_query.is_empty() =>
            {
                self.search_query.clear();
                return Ok(Some(Action::Search(String::new())));
            }

            _ => {}
        }

        // Delegate to active screen component
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    /// Switch the active screen, moving focus.
    fn switch_screen(&mut self, target: ScreenId) {
        if target != self.active_screen {
            debug!("switching screen: {} → {}", self.active_screen, target);
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                screen.set_focused(false);
            }
            self.active_screen = target;
            if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                screen.set_focused(true);
            }
        }
    }

    /// Process a single action — update app state and propagate to components.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::OpenSearch => {
                self.search_active = true;
            }

            Action::CloseSearch => {
                self.search_active = false;
            }

            // ── Controller-bound events ──────────────────────────
            Action::Search(text) => {
                self.controller.search_text_changed(text.clone());
            }
            Action::EndReached => {
                self.controller.end_reached();
            }
            Action::Retry => {
                self.controller.retry();
            }

            // ── Snapshots go to the list screen, always ──────────
            Action::ListUpdated(snapshot) => {
                self.item_count = snapshot.items.len();
                if let Some(screen) = self.screens.get_mut(&ScreenId::List) {
                    screen.update(action)?;
                }
            }

            // ── Detail view ──────────────────────────────────────
            Action::OpenDetail(id) => {
                self.switch_screen(ScreenId::Detail);
                if let Some(screen) = self.screens.get_mut(&ScreenId::Detail) {
                    screen.update(action)?;
                }
                self.spawn_detail_fetch(*id);
            }

            Action::CloseDetail => {
                if let Some(screen) = self.screens.get_mut(&ScreenId::Detail) {
                    screen.update(action)?;
                }
                self.switch_screen(ScreenId::List);
            }

            Action::DetailLoaded(_) | Action::DetailFailed(..) => {
                if let Some(screen) = self.screens.get_mut(&ScreenId::Detail) {
                    screen.update(action)?;
                }
            }

            // Render is handled in the main loop; resize by ratatui
            Action::Render | Action::Resize(..) => {}

            // Propagate everything else to the active screen
            other => {
                if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                    if let Some(follow_up) = screen.update(other)? {
                        self.action_tx.send(follow_up)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Fetch a character for the detail view on a background task.
    fn spawn_detail_fetch(&self, id: u64) {
        let controller = self.controller.clone();
        let action_tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match controller.character(id).await {
                Ok(character) => Action::DetailLoaded(Box::new(character)),
                Err(e) => Action::DetailFailed(id, e.to_string()),
            };
            let _ = action_tx.send(action);
        });
    }

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let search_height = u16::from(self.search_active || !self.search_query.is_empty());
        let layout = Layout::vertical([
            Constraint::Length(search_height), // search bar
            Constraint::Min(1),                // screen content
            Constraint::Length(1),             // status bar
        ])
        .split(area);

        if search_height > 0 {
            self.render_search_bar(frame, layout[0]);
        }

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[1]);
        }

        self.render_status_bar(frame, layout[2]);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    /// One-line search bar above the content.
    fn render_search_bar(&self, frame: &mut Frame, area: Rect) {
        let cursor = if self.search_active { "▌" } else { "" };
        let line = Line::from(vec![
            Span::styled(" Search id: ", theme::key_hint()),
            Span::styled(
                format!("{}{cursor}", self.search_query),
                Style::default().fg(theme::PORTAL_GREEN),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the bottom status bar with counts and key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let count = Span::styled(
            format!("● {} characters", self.item_count),
            Style::default().fg(theme::PORTAL_GREEN),
        );

        let hints = Span::styled(" │ / search  ? help  q quit", theme::key_hint());

        let line = Line::from(vec![Span::raw(" "), count, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_width = 48u16.min(area.width.saturating_sub(4));
        let help_height = 14u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;

        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        // Clear the background
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let help_text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  j/k ↑/↓   ", theme::key_hint_key()),
                Span::styled("Move up/down", theme::key_hint()),
            ]),
            Line::from(vec![
                Span::styled("  g/G       ", theme::key_hint_key()),
                Span::styled("Top / bottom", theme::key_hint()),
            ]),
            Line::from(vec![
                Span::styled("  Enter     ", theme::key_hint_key()),
                Span::styled("Open character detail", theme::key_hint()),
            ]),
            Line::from(vec![
                Span::styled("  Esc       ", theme::key_hint_key()),
                Span::styled("Back / clear search", theme::key_hint()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("  /         ", theme::key_hint_key()),
                Span::styled("Search by id", theme::key_hint()),
            ]),
            Line::from(vec![
                Span::styled("  r         ", theme::key_hint_key()),
                Span::styled("Retry after an error", theme::key_hint()),
            ]),
            Line::from(vec![
                Span::styled("  q         ", theme::key_hint_key()),
                Span::styled("Quit", theme::key_hint()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "                 Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}
