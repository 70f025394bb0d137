//! Interactive view over a [`DataTable`].
//!
//! The view holds only presentation state: the selected row, the highlighted
//! menu entry, the search input and the screen regions recorded during the
//! last render. Every data change goes through the engine.
//!
//! Row actions are not dispatched here. Choosing a menu entry returns
//! [`TableViewAction::RunAction`] so the owner can apply an optimistic patch
//! before handing the action to the engine.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tracing::trace;

use super::loading::LoadingIndicator;
use super::search_bar::{highlight_text, render_search_bar, SearchInput};
use crate::table::{ColumnDescriptor, DataTable, TableRow, VisibleAction};
use crate::ui::theme::TableTheme;

/// Below this width, columns flagged `hide_on_narrow` are skipped.
pub const NARROW_WIDTH: u16 = 80;

/// Width of the trailing actions column.
const ACTIONS_COLUMN_WIDTH: u16 = 9;

/// Glyph of the row menu toggle.
const MENU_TOGGLE: &str = "⋯";

/// Minimum width of the row menu overlay.
const MENU_MIN_WIDTH: u16 = 16;

/// Requests the owner must handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableViewAction {
    /// Run the action at `index` of the table's action list on `row_id`.
    RunAction { index: usize, row_id: String },
    /// Leave the application.
    Quit,
}

/// The open row menu and its toggle, as last rendered.
#[derive(Debug, Clone, Default)]
struct MenuRegion {
    row_id: String,
    toggle: Rect,
    area: Rect,
    /// Clickable entries and their action indices.
    items: Vec<(Rect, usize)>,
}

/// Clickable screen regions recorded during the last render.
#[derive(Debug, Clone, Default)]
struct HitRegions {
    search: Option<Rect>,
    tabs: Vec<(Rect, usize)>,
    rows: Vec<(Rect, usize)>,
    toggles: Vec<(Rect, String)>,
    menu: Option<MenuRegion>,
    prev: Option<Rect>,
    next: Option<Rect>,
    pages: Vec<(Rect, u32)>,
}

fn hit<T: Clone>(regions: &[(Rect, T)], pos: Position) -> Option<T> {
    regions
        .iter()
        .find(|(rect, _)| rect.contains(pos))
        .map(|(_, value)| value.clone())
}

/// Presentation state of one table.
#[derive(Debug)]
pub struct TableView {
    selected: usize,
    menu_highlight: usize,
    search: SearchInput,
    loader: LoadingIndicator,
    regions: HitRegions,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

impl TableView {
    pub fn new() -> Self {
        Self {
            selected: 0,
            menu_highlight: 0,
            search: SearchInput::new(),
            loader: LoadingIndicator::default(),
            regions: HitRegions::default(),
        }
    }

    /// Index of the selected row on the current page.
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn search(&self) -> &SearchInput {
        &self.search
    }

    /// Whether keystrokes go to the search input.
    pub fn is_searching(&self) -> bool {
        self.search.is_focused()
    }

    /// Advance animations. Call on every tick.
    pub fn tick<R: TableRow>(&mut self, table: &DataTable<R>) {
        self.loader.sync(table.is_loading());
        self.loader.tick();
    }

    fn clamp_selection(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    fn selected_row_id<R: TableRow>(&self, table: &DataTable<R>) -> Option<String> {
        table
            .rows()
            .get(self.selected)
            .map(|row| row.row_id().to_string())
    }

    fn open_menu<R: TableRow>(&mut self, table: &mut DataTable<R>, row_id: &str) {
        table.toggle_menu(row_id);
        self.menu_highlight = 0;
    }

    fn change_page(&mut self, changed: bool) {
        if changed {
            self.selected = 0;
        }
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Handle keyboard input.
    pub fn handle_input<R: TableRow>(
        &mut self,
        key: KeyEvent,
        table: &mut DataTable<R>,
    ) -> Option<TableViewAction> {
        if self.search.is_focused() {
            return self.handle_search_input(key, table);
        }

        if let Some(row_id) = table.active_menu().map(str::to_string) {
            return self.handle_menu_input(key, table, row_id);
        }

        self.clamp_selection(table.rows().len());

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), _) => {
                return Some(TableViewAction::Quit);
            }
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => {
                if self.selected + 1 < table.rows().len() {
                    self.selected += 1;
                }
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => {
                self.selected = self.selected.saturating_sub(1);
            }
            (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
                self.selected = 0;
            }
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => {
                self.selected = table.rows().len().saturating_sub(1);
            }
            (KeyCode::Enter, _) | (KeyCode::Char(' '), _) => {
                if let Some(row_id) = self.selected_row_id(table) {
                    self.open_menu(table, &row_id);
                }
            }
            (KeyCode::Char('/'), _) if table.options().enable_search => {
                self.search.focus();
            }
            (KeyCode::Char('n'), KeyModifiers::NONE)
            | (KeyCode::Right, _)
            | (KeyCode::PageDown, _) => {
                let changed = table.next_page();
                self.change_page(changed);
            }
            (KeyCode::Char('p'), KeyModifiers::NONE)
            | (KeyCode::Left, _)
            | (KeyCode::PageUp, _) => {
                let changed = table.prev_page();
                self.change_page(changed);
            }
            (KeyCode::Char(c), KeyModifiers::NONE) if ('1'..='9').contains(&c) => {
                let page = c.to_digit(10).unwrap_or(1);
                let changed = table.go_to_page(page);
                self.change_page(changed);
            }
            (KeyCode::Tab, _) => self.cycle_filter(table, true),
            (KeyCode::BackTab, _) => self.cycle_filter(table, false),
            (KeyCode::Char('r'), KeyModifiers::NONE) => table.refresh_data(),
            (KeyCode::Esc, _) => {
                if self.search.clear() {
                    table.set_search_query("");
                    self.selected = 0;
                }
            }
            _ => {}
        }
        None
    }

    fn handle_search_input<R: TableRow>(
        &mut self,
        key: KeyEvent,
        table: &mut DataTable<R>,
    ) -> Option<TableViewAction> {
        let changed = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Some(TableViewAction::Quit),
            (KeyCode::Esc, _) | (KeyCode::Enter, _) | (KeyCode::Tab, _) => {
                self.search.blur();
                false
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.search.clear(),
            (KeyCode::Backspace, _) => self.search.backspace(),
            (KeyCode::Delete, _) => self.search.delete(),
            (KeyCode::Left, _) => {
                self.search.move_left();
                false
            }
            (KeyCode::Right, _) => {
                self.search.move_right();
                false
            }
            (KeyCode::Home, _) => {
                self.search.move_home();
                false
            }
            (KeyCode::End, _) => {
                self.search.move_end();
                false
            }
            (KeyCode::Char(c), modifiers)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                self.search.insert_char(c);
                true
            }
            _ => false,
        };

        if changed {
            trace!(query = %self.search.query(), "Search input changed");
            table.set_search_query(self.search.query());
            self.selected = 0;
        }
        None
    }

    fn handle_menu_input<R: TableRow>(
        &mut self,
        key: KeyEvent,
        table: &mut DataTable<R>,
        row_id: String,
    ) -> Option<TableViewAction> {
        let entries = match table.row(&row_id) {
            Some(row) => table.visible_actions(row),
            None => {
                table.close_menu();
                return None;
            }
        };

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.menu_highlight + 1 < entries.len() {
                    self.menu_highlight += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_highlight = self.menu_highlight.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => match entries.get(self.menu_highlight) {
                Some(entry) => {
                    return Some(TableViewAction::RunAction {
                        index: entry.index,
                        row_id,
                    })
                }
                None => table.close_menu(),
            },
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Left => {
                table.close_menu();
            }
            _ => {}
        }
        None
    }

    fn cycle_filter<R: TableRow>(&mut self, table: &mut DataTable<R>, forward: bool) {
        let count = table.filters().len();
        if count == 0 {
            return;
        }
        let current = table
            .filters()
            .iter()
            .position(|f| f.value.to_string() == table.active_filter())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % count
        } else {
            (current + count - 1) % count
        };
        if table.select_filter(next) {
            self.selected = 0;
        }
    }

    // ========================================================================
    // Mouse
    // ========================================================================

    /// Handle a left click at the given terminal cell.
    ///
    /// A click outside the open menu's container (its toggle and the overlay)
    /// closes the menu and is then handled as usual.
    pub fn handle_click<R: TableRow>(
        &mut self,
        column: u16,
        row: u16,
        table: &mut DataTable<R>,
    ) -> Option<TableViewAction> {
        let pos = Position::new(column, row);

        if let Some(menu) = self.regions.menu.take() {
            if table.active_menu() == Some(menu.row_id.as_str()) {
                if let Some(index) = hit(&menu.items, pos) {
                    return Some(TableViewAction::RunAction {
                        index,
                        row_id: menu.row_id,
                    });
                }
                if menu.toggle.contains(pos) {
                    table.close_menu();
                    return None;
                }
                if menu.area.contains(pos) {
                    self.regions.menu = Some(menu);
                    return None;
                }
                trace!(row_id = %menu.row_id, "Click outside row menu");
                table.close_menu();
            }
        }

        if let Some(search) = self.regions.search {
            if search.contains(pos) {
                self.search.focus();
                return None;
            }
        }
        self.search.blur();

        if let Some(index) = hit(&self.regions.tabs, pos) {
            if table.select_filter(index) {
                self.selected = 0;
            }
        } else if self.regions.prev.is_some_and(|r| r.contains(pos)) {
            let changed = table.prev_page();
            self.change_page(changed);
        } else if self.regions.next.is_some_and(|r| r.contains(pos)) {
            let changed = table.next_page();
            self.change_page(changed);
        } else if let Some(page) = hit(&self.regions.pages, pos) {
            let changed = table.go_to_page(page);
            self.change_page(changed);
        } else if let Some(row_id) = hit(&self.regions.toggles, pos) {
            if let Some(index) = table.rows().iter().position(|r| r.row_id() == row_id) {
                self.selected = index;
            }
            self.open_menu(table, &row_id);
        } else if let Some(index) = hit(&self.regions.rows, pos) {
            self.selected = index;
        }
        None
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the table into `area`, recording clickable regions.
    pub fn render<R: TableRow>(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        table: &DataTable<R>,
        theme: &TableTheme,
    ) {
        self.regions = HitRegions::default();
        self.loader.sync(table.is_loading());
        self.clamp_selection(table.rows().len());

        let options = table.options();
        let has_tabs = !table.filters().is_empty();
        let show_pages = table.shows_pagination();

        let mut constraints = vec![Constraint::Length(1)];
        if has_tabs {
            constraints.push(Constraint::Length(1));
        }
        if options.enable_search {
            constraints.push(Constraint::Length(3));
        }
        if table.error().is_some() {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(3));
        if show_pages {
            constraints.push(Constraint::Length(1));
        }

        let chunks = Layout::vertical(constraints).split(area);
        let mut slots = chunks.iter().copied();
        let mut next_slot = || slots.next().unwrap_or_default();

        self.render_heading(frame, next_slot(), table, theme);
        if has_tabs {
            self.render_tabs(frame, next_slot(), table, theme);
        }
        if options.enable_search {
            let slot = next_slot();
            render_search_bar(frame, slot, &self.search, &options.search_placeholder, theme);
            self.regions.search = Some(slot);
        }
        if let Some(error) = table.error() {
            let banner = Line::from(vec![
                Span::styled("⚠ ", theme.error_banner()),
                Span::styled(error.to_string(), theme.error_banner()),
            ]);
            frame.render_widget(Paragraph::new(banner), next_slot());
        }
        let body = next_slot();
        self.render_body(frame, body, table, theme);
        if show_pages {
            self.render_pagination(frame, next_slot(), table, theme);
        }

        if let Some(row_id) = table.active_menu() {
            self.render_menu(frame, area, table, row_id, theme);
        }
    }

    fn render_heading<R: TableRow>(
        &self,
        frame: &mut Frame,
        area: Rect,
        table: &DataTable<R>,
        theme: &TableTheme,
    ) {
        if let Some(title) = &table.options().title {
            frame.render_widget(
                Paragraph::new(Span::styled(title.clone(), theme.title())),
                area,
            );
        }
        frame.render_widget(
            Paragraph::new(Span::styled(table.total_items_label(), theme.muted()))
                .alignment(Alignment::Right),
            area,
        );
    }

    fn render_tabs<R: TableRow>(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        table: &DataTable<R>,
        theme: &TableTheme,
    ) {
        let mut spans = Vec::new();
        let mut x = area.x;

        for (index, filter) in table.filters().iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled("│", theme.muted()));
                x = x.saturating_add(1);
            }
            let label = format!(" {} ", filter.label);
            let width = label.chars().count() as u16;
            let active = filter.value.to_string() == table.active_filter();
            spans.push(Span::styled(label, theme.tab(active)));

            let rect = Rect::new(x, area.y, width, 1).intersection(area);
            if !rect.is_empty() {
                self.regions.tabs.push((rect, index));
            }
            x = x.saturating_add(width);
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_body<R: TableRow>(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        table: &DataTable<R>,
        theme: &TableTheme,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(!self.search.is_focused()));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let narrow = area.width < NARROW_WIDTH;
        let columns: Vec<&ColumnDescriptor<R>> = table
            .columns()
            .iter()
            .filter(|c| !(narrow && c.hide_on_narrow))
            .collect();
        let has_actions = table.has_actions();

        let mut widths: Vec<Constraint> =
            columns.iter().map(|c| Constraint::Fill(c.width)).collect();
        if has_actions {
            widths.push(Constraint::Length(ACTIONS_COLUMN_WIDTH));
        }

        let header_area = Rect { height: 1, ..inner };
        let cells = Layout::horizontal(widths).spacing(1).split(header_area);

        // Header
        frame.render_widget(Block::default().style(theme.header()), header_area);
        for (column, cell) in columns.iter().zip(cells.iter()) {
            frame.render_widget(
                Paragraph::new(Span::styled(column.label.clone(), theme.header())),
                *cell,
            );
        }
        if has_actions {
            if let Some(cell) = cells.get(columns.len()) {
                frame.render_widget(
                    Paragraph::new(Span::styled("Actions", theme.header()))
                        .alignment(Alignment::Center),
                    *cell,
                );
            }
        }

        let rows_area = Rect {
            y: inner.y + 1,
            height: inner.height - 1,
            ..inner
        };

        let loading = table.is_loading();
        let query = table.search_query();
        let open_menu = table.active_menu();

        for (index, row) in table
            .rows()
            .iter()
            .enumerate()
            .take(rows_area.height as usize)
        {
            let y = rows_area.y + index as u16;
            let row_rect = Rect { y, height: 1, ..rows_area };
            self.regions.rows.push((row_rect, index));

            if index == self.selected && !loading {
                frame.render_widget(Block::default().style(theme.selected()), row_rect);
            }

            let row_style = if loading {
                theme.muted().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };

            for (column, cell) in columns.iter().zip(cells.iter()) {
                let line = highlight_cell(column.render(row), query, theme);
                frame.render_widget(
                    Paragraph::new(line).style(row_style),
                    Rect { y, ..*cell },
                );
            }

            if has_actions {
                if let Some(cell) = cells.get(columns.len()) {
                    let toggle = Rect { y, ..*cell };
                    let open = open_menu == Some(row.row_id());
                    let style = if open {
                        theme.title().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default().fg(theme.accent)
                    };
                    frame.render_widget(
                        Paragraph::new(Span::styled(format!(" {} ", MENU_TOGGLE), style))
                            .alignment(Alignment::Center),
                        toggle,
                    );
                    self.regions
                        .toggles
                        .push((toggle, row.row_id().to_string()));
                }
            }
        }

        if loading {
            self.loader
                .render(frame, rows_area, &table.options().loading_message, theme);
        } else if table.rows().is_empty() && table.error().is_none() && rows_area.height > 0 {
            let middle = Rect {
                y: rows_area.y + rows_area.height / 2,
                height: 1,
                ..rows_area
            };
            frame.render_widget(
                Paragraph::new(Span::styled(
                    table.options().empty_message.clone(),
                    theme.muted(),
                ))
                .alignment(Alignment::Center),
                middle,
            );
        }
    }

    fn render_pagination<R: TableRow>(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        table: &DataTable<R>,
        theme: &TableTheme,
    ) {
        let pagination = table.pagination();
        let mut spans = Vec::new();
        let mut x = area.x;

        let mut push = |spans: &mut Vec<Span<'static>>, text: String, style: Style| -> Rect {
            let width = text.chars().count() as u16;
            let rect = Rect::new(x, area.y, width, 1).intersection(area);
            spans.push(Span::styled(text, style));
            x = x.saturating_add(width);
            rect
        };

        let can_prev = pagination.can_go_prev();
        let prev = push(&mut spans, "‹ Prev".to_string(), theme.page_control(can_prev));
        if can_prev {
            self.regions.prev = Some(prev);
        }
        push(&mut spans, " ".to_string(), Style::default());

        for page in pagination.window() {
            let active = page == pagination.current_page;
            let label = if active {
                format!("[{}]", page)
            } else {
                format!(" {} ", page)
            };
            let rect = push(&mut spans, label, theme.page_button(active));
            self.regions.pages.push((rect, page));
        }

        push(&mut spans, " ".to_string(), Style::default());
        let can_next = pagination.can_go_next();
        let next = push(&mut spans, "Next ›".to_string(), theme.page_control(can_next));
        if can_next {
            self.regions.next = Some(next);
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(
                    "Page {} of {}",
                    pagination.current_page, pagination.total_pages
                ),
                theme.muted(),
            ))
            .alignment(Alignment::Right),
            area,
        );
    }

    fn render_menu<R: TableRow>(
        &mut self,
        frame: &mut Frame,
        bounds: Rect,
        table: &DataTable<R>,
        row_id: &str,
        theme: &TableTheme,
    ) {
        let Some(toggle) = self
            .regions
            .toggles
            .iter()
            .find(|(_, id)| id == row_id)
            .map(|(rect, _)| *rect)
        else {
            return;
        };
        let Some(row) = table.row(row_id) else {
            return;
        };

        let entries = table.visible_actions(row);
        self.menu_highlight = self.menu_highlight.min(entries.len().saturating_sub(1));

        let (lines, item_offsets) = menu_lines(&entries, self.menu_highlight, theme);
        let content_width = entries
            .iter()
            .map(|e| e.icon.chars().count() + e.label.chars().count() + 2)
            .max()
            .unwrap_or(10) as u16;
        let width = (content_width + 4).max(MENU_MIN_WIDTH).min(bounds.width);
        let height = (lines.len() as u16 + 2).min(bounds.height);

        let right = toggle.x + toggle.width;
        let x = right.saturating_sub(width).max(bounds.x);
        let below = toggle.y + 1;
        let y = if below + height <= bounds.y + bounds.height {
            below
        } else {
            toggle.y.saturating_sub(height).max(bounds.y)
        };
        let area = Rect::new(x, y, width, height).intersection(bounds);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(true))
            .style(Style::default().bg(theme.menu_bg));
        let inner = block.inner(area);

        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);

        let items = item_offsets
            .into_iter()
            .filter(|(offset, _)| *offset < inner.height)
            .map(|(offset, index)| {
                (
                    Rect {
                        y: inner.y + offset,
                        height: 1,
                        ..inner
                    },
                    index,
                )
            })
            .collect();

        self.regions.menu = Some(MenuRegion {
            row_id: row_id.to_string(),
            toggle,
            area,
            items,
        });
    }
}

/// Build the menu lines and the line offset of each clickable entry.
fn menu_lines(
    entries: &[VisibleAction],
    highlight: usize,
    theme: &TableTheme,
) -> (Vec<Line<'static>>, Vec<(u16, usize)>) {
    if entries.is_empty() {
        return (
            vec![Line::from(Span::styled("No actions", theme.muted()))],
            Vec::new(),
        );
    }

    let mut lines = Vec::new();
    let mut offsets = Vec::new();
    for (position, entry) in entries.iter().enumerate() {
        if entry.separator_before {
            lines.push(Line::from(Span::styled("─".repeat(12), theme.muted())));
        }
        let mut style = theme.variant(entry.variant);
        if position == highlight {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        let text = if entry.icon.is_empty() {
            format!(" {} ", entry.label)
        } else {
            format!(" {} {} ", entry.icon, entry.label)
        };
        offsets.push((lines.len() as u16, entry.index));
        lines.push(Line::from(Span::styled(text, style)));
    }
    (lines, offsets)
}

/// Highlight the search query inside a single-span cell.
fn highlight_cell(line: Line<'static>, query: &str, theme: &TableTheme) -> Line<'static> {
    if query.trim().is_empty() || line.spans.len() != 1 {
        return line;
    }
    let span = &line.spans[0];
    highlight_text(&span.content, query, span.style, theme)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crossterm::event::KeyEventKind;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    use super::*;
    use crate::table::{
        ActionDescriptor, ActionVariant, DataSource, FetchRequest, FetchResponse,
        FilterDescriptor, FnSource, TableOptions,
    };

    #[derive(Debug, Clone)]
    struct Desk {
        id: String,
        name: String,
        status: String,
    }

    impl TableRow for Desk {
        fn row_id(&self) -> &str {
            &self.id
        }
    }

    type RequestLog = Arc<Mutex<Vec<FetchRequest>>>;

    fn source(log: RequestLog) -> Arc<dyn DataSource<Desk>> {
        Arc::new(FnSource::new(move |request: FetchRequest| {
            log.lock().unwrap().push(request.clone());
            async move {
                let start = (request.page - 1) * request.limit;
                let rows = (0..request.limit)
                    .map(|i| Desk {
                        id: format!("d{}", start + i + 1),
                        name: format!("Desk {}", start + i + 1),
                        status: if i % 2 == 0 { "pending" } else { "approved" }.to_string(),
                    })
                    .collect();
                anyhow::Ok(FetchResponse::ok(rows)
                    .with_current_page(request.page)
                    .with_total_pages(3))
            }
        }))
    }

    fn build(log: RequestLog) -> DataTable<Desk> {
        let columns = vec![
            ColumnDescriptor::new("name", "Name", |d: &Desk| Line::from(d.name.clone())).width(2),
            ColumnDescriptor::new("status", "Status", |d: &Desk| Line::from(d.status.clone()))
                .hidden_on_narrow(),
        ];
        DataTable::new(
            source(log),
            columns,
            TableOptions::default().title("Desks"),
        )
        .unwrap()
        .with_filters(vec![
            FilterDescriptor::new("all", "All", "all"),
            FilterDescriptor::new("pending", "Pending", "pending"),
        ])
        .with_actions(vec![
            ActionDescriptor::new("View", |_d: Desk| async { Ok(()) }),
            ActionDescriptor::new("Approve", |_d: Desk| async { Ok(()) })
                .condition(|d: &Desk| d.status == "pending")
                .variant(ActionVariant::Success),
            ActionDescriptor::new("Delete", |_d: Desk| async { Ok(()) })
                .separator()
                .variant(ActionVariant::Danger),
        ])
    }

    async fn loaded() -> (DataTable<Desk>, RequestLog) {
        let log = RequestLog::default();
        let mut table = build(Arc::clone(&log));
        table.mount();
        table.process_next().await;
        (table, log)
    }

    fn draw(view: &mut TableView, table: &DataTable<Desk>, width: u16) -> Buffer {
        let backend = TestBackend::new(width, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = TableTheme::dark();
        terminal
            .draw(|f| view.render(f, f.area(), table, &theme))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn screen(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: crossterm::event::KeyEventState::NONE,
        }
    }

    #[tokio::test]
    async fn test_render_shows_rows_and_chrome() {
        let (table, _log) = loaded().await;
        let mut view = TableView::new();
        let text = screen(&draw(&mut view, &table, 100));

        assert!(text.contains("Desks"));
        assert!(text.contains("4 total items"));
        assert!(text.contains("Pending"));
        assert!(text.contains("Name"));
        assert!(text.contains("Status"));
        assert!(text.contains("Actions"));
        assert!(text.contains("Desk 1"));
        assert!(text.contains("Desk 4"));
        assert!(text.contains("[1]"));
        assert!(text.contains("Page 1 of 3"));
    }

    #[tokio::test]
    async fn test_narrow_layout_hides_columns() {
        let (table, _log) = loaded().await;
        let mut view = TableView::new();
        let text = screen(&draw(&mut view, &table, 60));

        assert!(text.contains("Name"));
        assert!(!text.contains("Status"));
    }

    #[tokio::test]
    async fn test_keyboard_menu_flow() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();

        view.handle_input(key(KeyCode::Char('j')), &mut table);
        view.handle_input(key(KeyCode::Char('j')), &mut table);
        assert_eq!(view.selected(), 2);

        view.handle_input(key(KeyCode::Enter), &mut table);
        assert_eq!(table.active_menu(), Some("d3"));

        // d3 is pending: View, Approve, Delete
        view.handle_input(key(KeyCode::Char('j')), &mut table);
        let action = view.handle_input(key(KeyCode::Enter), &mut table);
        assert_eq!(
            action,
            Some(TableViewAction::RunAction {
                index: 1,
                row_id: "d3".to_string()
            })
        );

        view.handle_input(key(KeyCode::Esc), &mut table);
        assert_eq!(table.active_menu(), None);
    }

    #[tokio::test]
    async fn test_menu_skips_inapplicable_actions() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();

        // d2 is approved: View, Delete
        view.handle_input(key(KeyCode::Down), &mut table);
        view.handle_input(key(KeyCode::Enter), &mut table);
        view.handle_input(key(KeyCode::Down), &mut table);
        let action = view.handle_input(key(KeyCode::Enter), &mut table);
        assert_eq!(
            action,
            Some(TableViewAction::RunAction {
                index: 2,
                row_id: "d2".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_outside_click_closes_menu() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();
        table.toggle_menu("d1");
        draw(&mut view, &table, 100);

        let menu = view.regions.menu.clone().unwrap();
        assert_eq!(menu.row_id, "d1");

        // Inside the container but not on an entry (the border)
        view.handle_click(menu.area.x, menu.area.y, &mut table);
        assert_eq!(table.active_menu(), Some("d1"));

        // Far outside
        view.handle_click(0, 0, &mut table);
        assert_eq!(table.active_menu(), None);
    }

    #[tokio::test]
    async fn test_click_menu_entry_runs_action() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();
        table.toggle_menu("d1");
        draw(&mut view, &table, 100);

        let (rect, index) = view.regions.menu.clone().unwrap().items[0];
        let action = view.handle_click(rect.x + 1, rect.y, &mut table);
        assert_eq!(
            action,
            Some(TableViewAction::RunAction {
                index,
                row_id: "d1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_click_toggle_opens_and_closes() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();
        draw(&mut view, &table, 100);

        let (toggle, row_id) = view.regions.toggles[1].clone();
        view.handle_click(toggle.x + 1, toggle.y, &mut table);
        assert_eq!(table.active_menu(), Some(row_id.as_str()));
        assert_eq!(view.selected(), 1);

        draw(&mut view, &table, 100);
        view.handle_click(toggle.x + 1, toggle.y, &mut table);
        assert_eq!(table.active_menu(), None);
    }

    #[tokio::test]
    async fn test_click_next_page() {
        let (mut table, log) = loaded().await;
        let mut view = TableView::new();
        draw(&mut view, &table, 100);

        assert!(view.regions.prev.is_none());
        let next = view.regions.next.unwrap();
        view.handle_click(next.x, next.y, &mut table);
        table.process_next().await;

        assert_eq!(log.lock().unwrap().last().unwrap().page, 2);
        assert_eq!(table.pagination().current_page, 2);
    }

    #[tokio::test]
    async fn test_click_filter_tab() {
        let (mut table, log) = loaded().await;
        let mut view = TableView::new();
        draw(&mut view, &table, 100);

        let (tab, _) = view.regions.tabs[1];
        view.handle_click(tab.x, tab.y, &mut table);
        table.process_next().await;

        assert_eq!(table.active_filter(), "pending");
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_tab_cycles_filters() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();

        view.handle_input(key(KeyCode::Tab), &mut table);
        assert_eq!(table.active_filter(), "pending");
        view.handle_input(key(KeyCode::Tab), &mut table);
        assert_eq!(table.active_filter(), "all");
        view.handle_input(key(KeyCode::BackTab), &mut table);
        assert_eq!(table.active_filter(), "pending");
    }

    #[tokio::test]
    async fn test_search_typing_updates_query() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();

        view.handle_input(key(KeyCode::Char('/')), &mut table);
        assert!(view.is_searching());

        for c in "loft".chars() {
            view.handle_input(key(KeyCode::Char(c)), &mut table);
        }
        assert_eq!(table.search_query(), "loft");

        // 'q' is text while searching
        assert_eq!(view.handle_input(key(KeyCode::Char('q')), &mut table), None);
        assert_eq!(table.search_query(), "loftq");

        view.handle_input(key(KeyCode::Esc), &mut table);
        assert!(!view.is_searching());
        view.handle_input(key(KeyCode::Esc), &mut table);
        assert_eq!(table.search_query(), "");
    }

    #[tokio::test]
    async fn test_digit_jumps_to_page() {
        let (mut table, log) = loaded().await;
        let mut view = TableView::new();

        view.handle_input(key(KeyCode::Char('3')), &mut table);
        view.handle_input(key(KeyCode::Char('9')), &mut table);
        table.process_next().await;

        let requests = log.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].page, 3);
    }

    #[tokio::test]
    async fn test_quit() {
        let (mut table, _log) = loaded().await;
        let mut view = TableView::new();
        assert_eq!(
            view.handle_input(key(KeyCode::Char('q')), &mut table),
            Some(TableViewAction::Quit)
        );
    }

    #[tokio::test]
    async fn test_empty_and_error_states() {
        let empty: Arc<dyn DataSource<Desk>> =
            Arc::new(FnSource::new(|_r: FetchRequest| async move {
                anyhow::Ok(FetchResponse::ok(Vec::new()))
            }));
        let mut table = DataTable::new(
            empty,
            vec![ColumnDescriptor::new("name", "Name", |d: &Desk| {
                Line::from(d.name.clone())
            })],
            TableOptions::default().empty_message("No desks yet"),
        )
        .unwrap();
        table.mount();
        table.process_next().await;

        let mut view = TableView::new();
        let text = screen(&draw(&mut view, &table, 80));
        assert!(text.contains("No desks yet"));
        assert!(!text.contains("Actions"));
        assert!(!text.contains("Page"));

        let failing: Arc<dyn DataSource<Desk>> =
            Arc::new(FnSource::new(|_r: FetchRequest| async move {
                anyhow::Ok(FetchResponse::failure(Some("Session expired".to_string())))
            }));
        let mut table = DataTable::new(
            failing,
            vec![ColumnDescriptor::new("name", "Name", |d: &Desk| {
                Line::from(d.name.clone())
            })],
            TableOptions::default(),
        )
        .unwrap();
        table.mount();
        table.process_next().await;

        let text = screen(&draw(&mut view, &table, 80));
        assert!(text.contains("Session expired"));
        assert!(!text.contains("No data found"));
    }
}
