//! Loading indicator component.
//!
//! The spinner follows the table's loading flag: it runs while a fetch is in
//! flight and is drawn over the dimmed rows.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::ui::theme::TableTheme;

/// Spinner animation frames.
const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// An animated spinner shown while rows are loading.
#[derive(Debug, Clone, Default)]
pub struct LoadingIndicator {
    /// Current spinner frame index.
    spinner_state: usize,
    /// Whether the indicator is running.
    active: bool,
}

impl LoadingIndicator {
    /// Follow an external loading flag, restarting the animation on a rising edge.
    pub fn sync(&mut self, loading: bool) {
        if loading && !self.active {
            self.spinner_state = 0;
        }
        self.active = loading;
    }

    /// Check if the indicator is running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the spinner animation.
    ///
    /// This should be called on each tick event.
    pub fn tick(&mut self) {
        if self.active {
            self.spinner_state = (self.spinner_state + 1) % SPINNER_FRAMES.len();
        }
    }

    /// Get the current spinner frame.
    pub fn spinner_frame(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_state % SPINNER_FRAMES.len()]
    }

    /// The spinner followed by `message`, or nothing when idle.
    pub fn text(&self, message: &str) -> String {
        if self.active {
            format!("{} {}", self.spinner_frame(), message)
        } else {
            String::new()
        }
    }

    /// Render the indicator as a one-line overlay centered vertically in `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect, message: &str, theme: &TableTheme) {
        if !self.active || area.height == 0 {
            return;
        }

        let line_area = Rect {
            y: area.y + area.height / 2,
            height: 1,
            ..area
        };
        let line = Line::from(Span::styled(self.text(message), theme.title()));

        frame.render_widget(Clear, line_area);
        frame.render_widget(
            Paragraph::new(line).alignment(Alignment::Center),
            line_area,
        );
    }
}
