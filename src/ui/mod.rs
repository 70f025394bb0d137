//! User interface: the table view, its supporting widgets and the theme.

mod components;
pub mod theme;

pub use components::{
    highlight_text, render_search_bar, LoadingIndicator, Notification, NotificationManager,
    NotificationType, SearchInput, TableView, TableViewAction, NARROW_WIDTH,
};
pub use theme::TableTheme;
