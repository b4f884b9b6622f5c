//! Session timer widget: how long the current shell session has run.

use std::time::Duration;

use ratatui::layout::Rect;

use super::clock::{render_face, settings_face};
use super::{Component, ComponentContext};
use crate::ui::UiFrame;

/// `HH:MM:SS`. Hours keep counting past 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

pub struct SessionTimerWidget {
    elapsed: Duration,
    flipped: bool,
}

impl SessionTimerWidget {
    pub fn new(elapsed: Duration, flipped: bool) -> Self {
        Self { elapsed, flipped }
    }

    pub fn lines(&self, ctx: &ComponentContext) -> Vec<String> {
        if self.flipped {
            return settings_face(ctx);
        }
        vec![format_elapsed(self.elapsed), "session".to_string()]
    }
}

impl Component for SessionTimerWidget {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        render_face(frame, area, ctx, &self.lines(ctx), !self.flipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_run_past_a_day() {
        assert_eq!(format_elapsed(Duration::from_millis(999)), "00:00:00");
        assert_eq!(format_elapsed(Duration::from_secs(3 * 60 + 7)), "00:03:07");
        assert_eq!(
            format_elapsed(Duration::from_secs(36 * 3600 + 15 * 60 + 42)),
            "36:15:42"
        );
    }

    #[test]
    fn flipped_timer_shows_settings() {
        let timer = SessionTimerWidget::new(Duration::from_secs(5), true);
        let ctx = ComponentContext::new(false).with_opacity(0.5);
        assert_eq!(timer.lines(&ctx)[0], "Opacity 50%");
    }
}
