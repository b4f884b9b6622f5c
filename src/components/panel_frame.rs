//! Border, title and background of a floating panel.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use super::{Component, ComponentContext};
use crate::ui::UiFrame;

pub struct PanelFrame {
    title: String,
}

impl PanelFrame {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Area left for content once the border is drawn.
    pub fn inner(area: Rect) -> Rect {
        Rect {
            x: area.x.saturating_add(1),
            y: area.y.saturating_add(1),
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        }
    }

    pub fn border_style(ctx: &ComponentContext) -> Style {
        let mut style = if ctx.focused() {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        if ctx.dimmed() {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

impl Component for PanelFrame {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        if !ctx.transparent() {
            frame.render_widget(Clear, area);
        }
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Self::border_style(ctx));
        frame.render_widget(block, area);
    }
}
