//! Event handling for the application.
//!
//! Terminal input is polled on the UI thread and turned into [`Event`]s; table
//! fetches and row actions report back through the table's own channel.

mod handler;

use crossterm::event::KeyEvent;

pub use handler::EventHandler;

/// An application event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// A left click at a terminal cell.
    Click { column: u16, row: u16 },
    /// Mouse wheel; `down` is true when scrolling towards later rows.
    Scroll { down: bool },
    /// The terminal was resized.
    Resize(u16, u16),
    /// No input arrived within the tick rate.
    Tick,
}
