//! Toast notifications for row action feedback.
//!
//! The table engine stays silent about action outcomes; the application pushes
//! a toast here when an action succeeds or fails.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::ui::theme::TableTheme;

/// Default time a toast stays on screen.
const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Error toasts stay longer.
const ERROR_TOAST_DURATION: Duration = Duration::from_secs(5);

/// The type of notification, which determines its appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationType {
    Info,
    Success,
    Error,
}

impl NotificationType {
    /// Get the icon for this notification type.
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationType::Info => "ℹ",
            NotificationType::Success => "✓",
            NotificationType::Error => "✗",
        }
    }

    /// Get the style for this notification type.
    pub fn style(&self, theme: &TableTheme) -> Style {
        let fg = match self {
            NotificationType::Info => theme.accent,
            NotificationType::Success => theme.success,
            NotificationType::Error => theme.error,
        };
        Style::default().fg(fg)
    }
}

/// A single notification message.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub notification_type: NotificationType,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn new(message: impl Into<String>, notification_type: NotificationType) -> Self {
        let duration = match notification_type {
            NotificationType::Error => ERROR_TOAST_DURATION,
            _ => TOAST_DURATION,
        };
        Self {
            message: message.into(),
            notification_type,
            created_at: Instant::now(),
            duration,
        }
    }

    /// Create a notification with a custom duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the notification has expired.
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

/// Manages the visible toasts, newest last.
#[derive(Debug)]
pub struct NotificationManager {
    notifications: VecDeque<Notification>,
    max_visible: usize,
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationManager {
    pub fn new() -> Self {
        Self::with_max_visible(3)
    }

    pub fn with_max_visible(max_visible: usize) -> Self {
        Self {
            notifications: VecDeque::new(),
            max_visible,
        }
    }

    /// Add a notification, dropping the oldest beyond the limit.
    pub fn push(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
        while self.notifications.len() > self.max_visible {
            self.notifications.pop_front();
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Info));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Success));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Notification::new(message, NotificationType::Error));
    }

    /// Remove expired notifications.
    ///
    /// This should be called on each tick.
    pub fn tick(&mut self) {
        self.notifications.retain(|n| !n.is_expired());
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    /// Render the toasts stacked in the bottom-right corner of `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &TableTheme) {
        if self.notifications.is_empty() {
            return;
        }

        let width = 44.min(area.width.saturating_sub(2));
        // Borders plus the icon prefix
        let inner_width = width.saturating_sub(4).max(1) as usize;

        let mut bottom = area.y + area.height.saturating_sub(1);
        for notification in self.notifications.iter().rev() {
            let text_len = notification.message.chars().count() + 2;
            let height = (text_len.div_ceil(inner_width) as u16) + 2;
            if bottom < area.y + height {
                break;
            }
            bottom -= height;

            let toast = Rect::new(
                area.x + area.width.saturating_sub(width + 1),
                bottom,
                width,
                height,
            );
            render_notification(notification, frame, toast, theme);
        }
    }
}

fn render_notification(notification: &Notification, frame: &mut Frame, area: Rect, theme: &TableTheme) {
    frame.render_widget(Clear, area);

    let style = notification.notification_type.style(theme);
    let text = Line::from(vec![
        Span::styled(
            format!("{} ", notification.notification_type.icon()),
            style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(notification.message.clone(), style),
    ]);

    let block = Block::default().borders(Borders::ALL).border_style(style);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_by_type() {
        let n = Notification::new("Vendor approved", NotificationType::Success);
        assert_eq!(n.duration, Duration::from_secs(3));
        let n = Notification::new("Request failed", NotificationType::Error);
        assert_eq!(n.duration, Duration::from_secs(5));
    }

    #[test]
    fn test_notification_is_expired() {
        let n = Notification::new("Test", NotificationType::Info)
            .with_duration(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(n.is_expired());
        assert!(!Notification::new("Test", NotificationType::Info).is_expired());
    }

    #[test]
    fn test_manager_max_visible() {
        let mut manager = NotificationManager::with_max_visible(2);
        manager.info("1");
        manager.success("2");
        manager.error("3");

        let messages: Vec<&str> = manager.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["2", "3"]);
    }

    #[test]
    fn test_manager_tick_removes_expired() {
        let mut manager = NotificationManager::new();
        manager.push(
            Notification::new("Expires", NotificationType::Info)
                .with_duration(Duration::from_millis(1)),
        );
        manager.info("Stays");
        std::thread::sleep(Duration::from_millis(5));
        manager.tick();
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_style_follows_theme() {
        let light = TableTheme::light();
        assert_eq!(NotificationType::Error.style(&light).fg, Some(light.error));
        assert_eq!(NotificationType::Success.icon(), "✓");
    }
}
