//! Search input for the table toolbar.
//!
//! The input only edits text. Every edit is forwarded to the table engine,
//! which debounces it before fetching, so typing never blocks on the network.

use ratatui::{
    layout::{Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::theme::TableTheme;

/// Search input state.
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    /// The current query.
    query: String,
    /// Cursor position in characters.
    cursor: usize,
    /// Whether the input has keyboard focus.
    focused: bool,
}

impl SearchInput {
    /// Create an empty, unfocused input.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.cursor = self.query.chars().count();
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Check if the input has focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Get the current query.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Check if the query is empty.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Insert a character at the cursor.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index();
        self.query.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index();
        self.query.remove(at);
        true
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.query.chars().count() {
            return false;
        }
        let at = self.byte_index();
        self.query.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.query.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.query.chars().count();
    }

    /// Clear the query. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.query.is_empty();
        self.query.clear();
        self.cursor = 0;
        changed
    }

    fn byte_index(&self) -> usize {
        self.query
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.query.len())
    }
}

/// Highlight matching text in a string with the search query.
///
/// Returns a Line with spans that have highlighted style for matches.
/// Text whose lowercase form changes length is returned unhighlighted.
pub fn highlight_text(text: &str, query: &str, base: Style, theme: &TableTheme) -> Line<'static> {
    let query = query.trim();
    let text_lower = text.to_lowercase();
    if query.is_empty() || text_lower.len() != text.len() {
        return Line::from(Span::styled(text.to_string(), base));
    }

    let query_lower = query.to_lowercase();
    let highlight = base
        .fg(theme.contrast())
        .bg(theme.warning)
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    let mut last_end = 0;

    for (start, matched) in text_lower.match_indices(&query_lower) {
        // Add non-matching text before this match
        if start > last_end {
            spans.push(Span::styled(text[last_end..start].to_string(), base));
        }

        // Use original case from text
        let end = start + matched.len();
        spans.push(Span::styled(text[start..end].to_string(), highlight));
        last_end = end;
    }

    if last_end < text.len() {
        spans.push(Span::styled(text[last_end..].to_string(), base));
    }

    if spans.is_empty() {
        Line::from(Span::styled(text.to_string(), base))
    } else {
        Line::from(spans)
    }
}

/// Render the search bar at the given area.
pub fn render_search_bar(
    frame: &mut Frame,
    area: Rect,
    input: &SearchInput,
    placeholder: &str,
    theme: &TableTheme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(input.focused))
        .title(Span::styled(" / Search ", theme.muted()));

    let content = if input.query.is_empty() && !input.focused {
        Line::from(Span::styled(placeholder.to_string(), theme.muted()))
    } else {
        Line::from(Span::styled(input.query.clone(), theme.text()))
    };

    frame.render_widget(Paragraph::new(content).block(block), area);

    // Show cursor when focused
    if input.focused && area.width > 2 && area.height > 2 {
        let offset = (input.cursor as u16).min(area.width.saturating_sub(3));
        frame.set_cursor_position(Position::new(area.x + 1 + offset, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn typed(text: &str) -> SearchInput {
        let mut input = SearchInput::new();
        input.focus();
        for c in text.chars() {
            input.insert_char(c);
        }
        input
    }

    #[test]
    fn test_insert_and_backspace() {
        let mut input = typed("desk");
        assert_eq!(input.query(), "desk");
        assert_eq!(input.cursor(), 4);

        assert!(input.backspace());
        assert_eq!(input.query(), "des");

        input.move_home();
        assert!(!input.backspace());
        assert!(input.delete());
        assert_eq!(input.query(), "es");
    }

    #[test]
    fn test_insert_in_middle_with_multibyte() {
        let mut input = typed("café");
        input.move_left();
        input.insert_char('x');
        assert_eq!(input.query(), "cafxé");
        input.move_end();
        assert!(input.backspace());
        assert_eq!(input.query(), "cafx");
    }

    #[test]
    fn test_clear_reports_change() {
        let mut input = typed("a");
        assert!(input.clear());
        assert!(!input.clear());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_focus_moves_cursor_to_end() {
        let mut input = typed("abc");
        input.blur();
        input.move_home();
        input.focus();
        assert!(input.is_focused());
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_highlight_text_empty_query() {
        let theme = TableTheme::dark();
        let line = highlight_text("Hello world", "", Style::default(), &theme);
        assert_eq!(line.spans.len(), 1);
        assert_eq!(line.spans[0].content, "Hello world");
    }

    #[test]
    fn test_highlight_text_case_insensitive() {
        let theme = TableTheme::dark();
        let line = highlight_text("Harbor DESKS", "desk", Style::default(), &theme);
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].content, "Harbor ");
        assert_eq!(line.spans[1].content, "DESK");
        assert_eq!(line.spans[1].style.bg, Some(theme.warning));
        assert_eq!(line.spans[2].content, "S");
    }

    #[test]
    fn test_highlight_text_multiple_matches() {
        let theme = TableTheme::light();
        let line = highlight_text("test one test", "test", Style::default(), &theme);
        assert_eq!(line.spans.len(), 3);
        assert_eq!(line.spans[0].content, "test");
        assert_eq!(line.spans[1].content, " one ");
        assert_eq!(line.spans[2].content, "test");
    }

    #[test]
    fn test_render_placeholder() {
        let backend = TestBackend::new(30, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = TableTheme::dark();
        let input = SearchInput::new();

        terminal
            .draw(|f| render_search_bar(f, f.area(), &input, "Search...", &theme))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let row: String = (0..30).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert!(row.contains("Search..."));
    }
}
