//! Stopwatch shared by every chronometer widget, and the widget that shows
//! it.

use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::debug;

use super::clock::{render_face, settings_face};
use super::timer::format_elapsed;
use super::{Component, ComponentContext};
use crate::ui::UiFrame;

/// Display cap, 99:59:59.
pub const CHRONOMETER_MAX: Duration = Duration::from_secs(99 * 3600 + 59 * 60 + 59);

/// One stopwatch for the whole shell, so every chronometer widget shows the
/// same reading.
#[derive(Debug, Clone, Default)]
pub struct Chronometer {
    banked: Duration,
    running_since: Option<Instant>,
}

impl Chronometer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let live = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default();
        (self.banked + live).min(CHRONOMETER_MAX)
    }

    /// Start, or pause keeping the reading.
    pub fn toggle(&mut self, now: Instant) {
        if self.is_running() {
            self.banked = self.elapsed(now);
            self.running_since = None;
            debug!(elapsed = ?self.banked, "chronometer paused");
        } else {
            self.running_since = Some(now);
            debug!("chronometer started");
        }
    }

    /// Back to zero, stopped.
    pub fn reset(&mut self) {
        self.banked = Duration::ZERO;
        self.running_since = None;
        debug!("chronometer reset");
    }
}

pub struct ChronometerWidget {
    elapsed: Duration,
    running: bool,
    flipped: bool,
}

impl ChronometerWidget {
    pub fn new(chronometer: &Chronometer, now: Instant, flipped: bool) -> Self {
        Self {
            elapsed: chronometer.elapsed(now),
            running: chronometer.is_running(),
            flipped,
        }
    }

    pub fn lines(&self, ctx: &ComponentContext) -> Vec<String> {
        if self.flipped {
            return settings_face(ctx);
        }
        let state = if self.running { "running" } else { "paused" };
        vec![format_elapsed(self.elapsed), state.to_string()]
    }
}

impl Component for ChronometerWidget {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        render_face(frame, area, ctx, &self.lines(ctx), !self.flipped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn pause_keeps_the_reading_and_resume_adds_to_it() {
        let t0 = Instant::now();
        let mut chrono = Chronometer::new();
        assert_eq!(chrono.elapsed(t0 + secs(10)), Duration::ZERO);

        chrono.toggle(t0);
        assert!(chrono.is_running());
        chrono.toggle(t0 + secs(5));
        assert_eq!(chrono.elapsed(t0 + secs(60)), secs(5));

        chrono.toggle(t0 + secs(100));
        assert_eq!(chrono.elapsed(t0 + secs(103)), secs(8));

        chrono.reset();
        assert!(!chrono.is_running());
        assert_eq!(chrono.elapsed(t0 + secs(200)), Duration::ZERO);
    }

    #[test]
    fn reading_stops_at_the_display_cap() {
        let t0 = Instant::now();
        let mut chrono = Chronometer::new();
        chrono.toggle(t0);
        let later = t0 + secs(120 * 3600);
        assert_eq!(chrono.elapsed(later), CHRONOMETER_MAX);
        let widget = ChronometerWidget::new(&chrono, later, false);
        assert_eq!(
            widget.lines(&ComponentContext::default()),
            vec!["99:59:59", "running"]
        );
    }
}
