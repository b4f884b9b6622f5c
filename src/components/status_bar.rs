use ratatui::layout::Rect;
use ratatui::style::Style;

use super::{Component, ComponentContext};
use crate::ui::{UiFrame, safe_set_string, truncate_to_width};

pub struct StatusBar {
    left: String,
    right: String,
    style: Style,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
            style: Style::default(),
        }
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let y = area.y;
        let x = area.x;
        let width = area.width as usize;
        let buffer = frame.buffer_mut();
        let bounds = area.intersection(buffer.area);
        if bounds.width == 0 || bounds.height == 0 {
            return;
        }

        let blank = " ".repeat(width);
        safe_set_string(buffer, bounds, x, y, &blank, self.style);

        let left = truncate_to_width(&self.left, width);
        safe_set_string(buffer, bounds, x, y, &left, self.style);

        if !self.right.is_empty() {
            let right = truncate_to_width(&self.right, width);
            let right_width = right.chars().count();
            // Right side loses to the left when they would overlap.
            if right_width + left.chars().count() < width {
                let start_x = x.saturating_add((width - right_width) as u16);
                safe_set_string(buffer, bounds, start_x, y, &right, self.style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer.cell((x, y)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn left_and_right_are_aligned() {
        let area = Rect::new(0, 0, 20, 1);
        let mut buffer = Buffer::empty(area);
        let mut bar = StatusBar::new();
        bar.set_left("windowed");
        bar.set_right("F1 help");
        bar.render(
            &mut UiFrame::from_parts(area, &mut buffer),
            area,
            &ComponentContext::default(),
        );
        assert_eq!(row_text(&buffer, 0), "windowed     F1 help");
    }

    #[test]
    fn right_side_is_dropped_when_crowded() {
        let area = Rect::new(0, 0, 10, 1);
        let mut buffer = Buffer::empty(area);
        let mut bar = StatusBar::default();
        bar.set_left("0123456789abc");
        bar.set_right("help");
        bar.render(
            &mut UiFrame::from_parts(area, &mut buffer),
            area,
            &ComponentContext::default(),
        );
        assert_eq!(row_text(&buffer, 0), "0123456789");
    }
}
