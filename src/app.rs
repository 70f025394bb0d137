//! Main application state and event loop.
//!
//! This module implements The Elm Architecture (TEA) pattern: every terminal
//! event goes through [`App::update`], and [`App::view`] draws the current
//! state. The table engine owns the data; the app owns the chrome around it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::{debug, info, trace, warn};

use crate::events::Event;
use crate::listing::{ActionOutcome, Listing};
use crate::ui::{NotificationManager, TableTheme, TableView, TableViewAction};

/// The current screen state of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// The table has focus.
    #[default]
    Table,
    /// The key binding overlay is displayed.
    Help,
    /// Application is in the process of exiting.
    Exiting,
}

/// The main application struct that holds all state.
pub struct App {
    state: AppState,
    should_quit: bool,
    listing: Listing,
    view: TableView,
    notifications: NotificationManager,
    theme: TableTheme,
}

impl App {
    /// Create the application around a built listing.
    ///
    /// Nothing is fetched until [`App::start`] is called.
    pub fn new(listing: Listing, theme: TableTheme) -> Self {
        debug!(table = listing.name(), theme = theme.name, "Creating application");
        Self {
            state: AppState::Table,
            should_quit: false,
            listing,
            view: TableView::new(),
            notifications: NotificationManager::new(),
            theme,
        }
    }

    /// Load the first page.
    pub fn start(&mut self) {
        info!(table = self.listing.name(), "Starting table");
        self.listing.table_mut().mount();
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// The listing, for callers that patch rows directly.
    pub fn listing_mut(&mut self) -> &mut Listing {
        &mut self.listing
    }

    pub fn table_view(&self) -> &TableView {
        &self.view
    }

    pub fn theme(&self) -> &TableTheme {
        &self.theme
    }

    pub fn notifications(&self) -> &NotificationManager {
        &self.notifications
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    fn quit(&mut self) {
        info!("Quit requested");
        self.should_quit = true;
        self.state = AppState::Exiting;
    }

    /// Update the application state based on an event.
    pub fn update(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                trace!(key = ?key.code, modifiers = ?key.modifiers, "Key event");
                self.handle_key_event(key);
            }
            Event::Click { column, row } => {
                trace!(column, row, "Click event");
                if self.state == AppState::Help {
                    self.state = AppState::Table;
                    return;
                }
                let action = self
                    .view
                    .handle_click(column, row, self.listing.table_mut());
                self.handle_view_action(action);
            }
            Event::Scroll { down } => {
                if self.state == AppState::Table {
                    let code = if down { KeyCode::Down } else { KeyCode::Up };
                    let action = self
                        .view
                        .handle_input(KeyEvent::new(code, KeyModifiers::NONE), self.listing.table_mut());
                    self.handle_view_action(action);
                }
            }
            Event::Resize(width, height) => {
                trace!(width, height, "Terminal resize event");
            }
            Event::Tick => self.handle_tick(),
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
            self.quit();
            return;
        }

        match self.state {
            AppState::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')) {
                    self.state = AppState::Table;
                }
            }
            AppState::Table => {
                let idle = !self.view.is_searching() && self.listing.table().active_menu().is_none();
                if idle && key.code == KeyCode::Char('?') {
                    self.state = AppState::Help;
                    return;
                }
                let action = self.view.handle_input(key, self.listing.table_mut());
                self.handle_view_action(action);
            }
            AppState::Exiting => {}
        }
    }

    fn handle_view_action(&mut self, action: Option<TableViewAction>) {
        match action {
            Some(TableViewAction::RunAction { index, row_id }) => {
                if !self.listing.run_action(index, &row_id) {
                    warn!(index, row_id = %row_id, "Action not available for row");
                    self.notifications.info("That action is no longer available for this row");
                }
            }
            Some(TableViewAction::Quit) => self.quit(),
            None => {}
        }
    }

    fn handle_tick(&mut self) {
        for outcome in self.listing.poll() {
            self.report(outcome);
        }
        self.view.tick(self.listing.table());
        self.notifications.tick();
    }

    fn report(&mut self, outcome: ActionOutcome) {
        match outcome.error {
            None => self.notifications.success(format!("{}: done", outcome.label)),
            Some(error) => self
                .notifications
                .error(format!("{} failed: {}", outcome.label, error)),
        }
    }

    /// Render the application UI.
    pub fn view(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header, content, footer] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(frame, header);
        self.view
            .render(frame, content, self.listing.table(), &self.theme);
        self.render_footer(frame, footer);

        self.notifications.render(frame, area, &self.theme);

        if self.state == AppState::Help {
            render_help(frame, area, &self.theme);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::styled(" deskgrid ", self.theme.page_button(true)),
            Span::raw(" "),
            Span::styled(self.listing.name().to_string(), self.theme.muted()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let hints = if self.view.is_searching() {
            "type to search · Enter/Esc done · Ctrl+U clear"
        } else if self.listing.table().active_menu().is_some() {
            "j/k move · Enter run · Esc close"
        } else {
            "j/k move · Enter actions · / search · Tab filter · n/p page · r refresh · ? help · q quit"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hints, self.theme.muted())),
            area,
        );
    }
}

const HELP_LINES: &[(&str, &str)] = &[
    ("j / ↓", "Next row"),
    ("k / ↑", "Previous row"),
    ("g / G", "First / last row"),
    ("Enter", "Open the row's action menu"),
    ("/", "Search"),
    ("Esc", "Close menu, clear search"),
    ("Tab", "Next filter"),
    ("Shift+Tab", "Previous filter"),
    ("n / →", "Next page"),
    ("p / ←", "Previous page"),
    ("1-9", "Jump to page"),
    ("r", "Refresh"),
    ("q", "Quit"),
];

fn render_help(frame: &mut Frame, area: Rect, theme: &TableTheme) {
    let width = 44.min(area.width);
    let height = (HELP_LINES.len() as u16 + 4).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let mut lines = vec![Line::raw("")];
    lines.extend(HELP_LINES.iter().map(|(key, description)| {
        Line::from(vec![
            Span::styled(format!("  {:<11}", key), theme.title()),
            Span::styled(description.to_string(), theme.text()),
        ])
    }));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .title(Span::styled(" Help ", theme.title()))
        .title_bottom(Line::styled(" Esc to close ", theme.muted()).alignment(Alignment::Right))
        .style(Style::default().bg(theme.menu_bg));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};

    use super::*;
    use crate::api::HttpClient;
    use crate::config::Config;

    fn app() -> App {
        let config = Config::sample();
        let client = HttpClient::new(&config.server.base_url, None).unwrap();
        let listing = Listing::build(
            config.table("vendors").unwrap(),
            &config.settings,
            client,
            &TableTheme::dark(),
        )
        .unwrap();
        App::new(listing, TableTheme::dark())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_quit_on_q_key() {
        let mut app = app();
        app.update(key(KeyCode::Char('q')));
        assert!(app.should_quit());
        assert_eq!(app.state(), AppState::Exiting);
    }

    #[test]
    fn test_quit_on_ctrl_c() {
        let mut app = app();
        app.update(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert!(app.should_quit());
    }

    #[test]
    fn test_help_toggles() {
        let mut app = app();
        app.update(key(KeyCode::Char('?')));
        assert_eq!(app.state(), AppState::Help);

        // q closes help instead of quitting
        app.update(key(KeyCode::Char('q')));
        assert_eq!(app.state(), AppState::Table);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_click_dismisses_help() {
        let mut app = app();
        app.update(key(KeyCode::Char('?')));
        app.update(Event::Click { column: 1, row: 1 });
        assert_eq!(app.state(), AppState::Table);
    }

    #[test]
    fn test_report_outcomes() {
        let mut app = app();
        app.report(ActionOutcome {
            label: "Approve".to_string(),
            row_id: "v1".to_string(),
            error: None,
        });
        app.report(ActionOutcome {
            label: "Delete".to_string(),
            row_id: "v1".to_string(),
            error: Some("Vendor has bookings".to_string()),
        });

        let messages: Vec<&str> = app
            .notifications()
            .iter()
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(messages, vec!["Approve: done", "Delete failed: Vendor has bookings"]);
    }

    #[test]
    fn test_view_renders_table_and_help() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| app.view(f)).unwrap();
        let text = format!("{:?}", terminal.backend().buffer());
        assert!(text.contains("Vendor Management"));
        assert!(text.contains("No vendors found"));

        app.update(key(KeyCode::Char('?')));
        terminal.draw(|f| app.view(f)).unwrap();
        let text = format!("{:?}", terminal.backend().buffer());
        assert!(text.contains("Jump to page"));
    }
}
