//! Reusable UI components.

mod data_table;
mod loading;
mod notification;
mod search_bar;

pub use data_table::{TableView, TableViewAction, NARROW_WIDTH};
pub use loading::LoadingIndicator;
pub use notification::{Notification, NotificationManager, NotificationType};
pub use search_bar::{highlight_text, render_search_bar, SearchInput};
