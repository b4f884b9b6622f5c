//! Clock widget. The front face shows local time, the flipped face shows
//! the widget's display settings.

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use super::{Component, ComponentContext};
use crate::ui::UiFrame;

pub struct ClockWidget {
    now: DateTime<Local>,
    flipped: bool,
}

impl ClockWidget {
    pub fn new(now: DateTime<Local>, flipped: bool) -> Self {
        Self { now, flipped }
    }

    pub fn lines(&self, ctx: &ComponentContext) -> Vec<String> {
        if self.flipped {
            return settings_face(ctx);
        }
        vec![
            self.now.format("%H:%M:%S").to_string(),
            self.now.format("%a %d %b %Y").to_string(),
        ]
    }
}

impl Component for ClockWidget {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        render_face(frame, area, ctx, &self.lines(ctx), !self.flipped);
    }
}

/// Back face shared by every widget: its display settings.
pub(crate) fn settings_face(ctx: &ComponentContext) -> Vec<String> {
    vec![
        format!("Opacity {:.0}%", ctx.opacity() * 100.0),
        format!(
            "Background {}",
            if ctx.transparent() { "clear" } else { "solid" }
        ),
        "F5 flips back".to_string(),
    ]
}

/// Centre `lines` horizontally, bold on the front face.
pub(crate) fn render_face(
    frame: &mut UiFrame<'_>,
    area: Rect,
    ctx: &ComponentContext,
    lines: &[String],
    front: bool,
) {
    let mut style = Style::default();
    if front {
        style = style.add_modifier(Modifier::BOLD);
    }
    if ctx.dimmed() {
        style = style.add_modifier(Modifier::DIM);
    }
    for (row, line) in lines.iter().enumerate() {
        let pad = (area.width as usize).saturating_sub(line.chars().count()) / 2;
        let centred = format!("{}{line}", " ".repeat(pad));
        frame.set_line(area, row as u16, &centred, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 12, 5, 7).unwrap()
    }

    #[test]
    fn front_face_shows_time_and_date() {
        let clock = ClockWidget::new(noon(), false);
        let lines = clock.lines(&ComponentContext::default());
        assert_eq!(lines, vec!["12:05:07", "Sat 09 Mar 2024"]);
    }

    #[test]
    fn back_face_shows_settings() {
        let clock = ClockWidget::new(noon(), true);
        let ctx = ComponentContext::new(true)
            .with_opacity(0.8)
            .with_transparent(true);
        let lines = clock.lines(&ctx);
        assert_eq!(lines[0], "Opacity 80%");
        assert_eq!(lines[1], "Background clear");
    }
}
