//! Bottom-right toast for mutation outcomes.

use std::time::{Duration, Instant};

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::action::{Notification, NotificationLevel};
use crate::theme::Theme;

/// How long a toast stays up.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// A notification plus the moment it was shown.
#[derive(Debug, Clone)]
pub struct Toast {
    pub notification: Notification,
    shown_at: Instant,
}

impl Toast {
    pub fn new(notification: Notification) -> Self {
        Self {
            notification,
            shown_at: Instant::now(),
        }
    }

    pub fn expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.shown_at) >= TOAST_TTL
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let notif = &self.notification;
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
        let height = 3u16.min(area.height);

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (color, icon) = match notif.level {
            NotificationLevel::Success => (theme.palette.success, "✓"),
            NotificationLevel::Error => (theme.palette.error, "✗"),
            NotificationLevel::Info => (theme.palette.info, "·"),
        };

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color))
            .style(theme.base());

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(color)),
            Span::styled(notif.message.as_str(), Style::default().fg(theme.palette.text)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_three_seconds() {
        let toast = Toast::new(Notification::success("Blocked tv"));
        let shown = toast.shown_at;
        assert!(!toast.expired_at(shown + Duration::from_millis(2_900)));
        assert!(toast.expired_at(shown + Duration::from_secs(3)));
    }
}
