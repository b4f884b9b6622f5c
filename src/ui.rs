//! Drawing primitives for the terminal host.
//!
//! `UiFrame` clips every draw call to the visible area, so panels dragged
//! partly off screen render their visible part instead of writing out of
//! bounds. `CellScale` maps logical panel coordinates onto terminal cells.

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::constants::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::layout::{FloatRect, Viewport};

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible area.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }

    /// Write one line of text, truncated to `area`.
    pub fn set_line(&mut self, area: Rect, row: u16, text: &str, style: Style) {
        let Some(bounds) = self.clip_rect(area) else {
            return;
        };
        safe_set_string(
            self.buffer,
            bounds,
            area.x,
            area.y.saturating_add(row),
            text,
            style,
        );
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    if available == 0 {
        return;
    }
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}

/// Logical pixels per terminal cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellScale {
    pub col_px: f64,
    pub row_px: f64,
}

impl Default for CellScale {
    fn default() -> Self {
        Self {
            col_px: CELL_WIDTH_PX,
            row_px: CELL_HEIGHT_PX,
        }
    }
}

impl CellScale {
    /// The cells covered by `rect` inside `area`, clipped. `None` when the
    /// panel is entirely off screen.
    pub fn to_cells(&self, rect: FloatRect, area: Rect) -> Option<Rect> {
        let x0 = (rect.x / self.col_px).floor() as i64 + i64::from(area.x);
        let y0 = (rect.y / self.row_px).floor() as i64 + i64::from(area.y);
        let cols = (rect.width / self.col_px).round().max(1.0) as i64;
        let rows = (rect.height / self.row_px).round().max(1.0) as i64;

        let left = x0.max(i64::from(area.x));
        let top = y0.max(i64::from(area.y));
        let right = (x0 + cols).min(i64::from(area.right()));
        let bottom = (y0 + rows).min(i64::from(area.bottom()));
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: u16::try_from(left).ok()?,
            y: u16::try_from(top).ok()?,
            width: u16::try_from(right - left).ok()?,
            height: u16::try_from(bottom - top).ok()?,
        })
    }

    /// Logical position of the centre of a cell, relative to `area`.
    pub fn to_logical(&self, col: u16, row: u16, area: Rect) -> (f64, f64) {
        let col = f64::from(col.saturating_sub(area.x));
        let row = f64::from(row.saturating_sub(area.y));
        ((col + 0.5) * self.col_px, (row + 0.5) * self.row_px)
    }

    pub fn viewport(&self, area: Rect) -> Viewport {
        Viewport {
            width: f64::from(area.width) * self.col_px,
            height: f64::from(area.height) * self.row_px,
        }
    }
}
