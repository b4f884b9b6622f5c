use indoc::indoc;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use super::{Component, ComponentContext};
use crate::keybindings::KeyBindings;
use crate::ui::UiFrame;

const INTRO: &str = indoc! {"
    Floating panels over your terminal. Drag a title bar to move a panel,
    drag an edge or corner to resize it. Typing goes to the active window.
    Layout and content are saved automatically.
"};

/// Centred dialog listing the intro text and every key binding.
pub struct HelpOverlay {
    lines: Vec<String>,
}

impl HelpOverlay {
    pub fn new(bindings: &KeyBindings) -> Self {
        let mut lines: Vec<String> = INTRO.lines().map(str::to_string).collect();
        lines.push(String::new());
        let entries = bindings.help_entries();
        let key_width = entries
            .iter()
            .map(|(_, keys)| keys.join(", ").chars().count())
            .max()
            .unwrap_or(0);
        for (action, keys) in entries {
            lines.push(format!("{:<key_width$}  {action}", keys.join(", ")));
        }
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn rect_for(&self, area: Rect) -> Rect {
        let want_w = self
            .lines
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .saturating_add(4);
        let width = (want_w as u16).min(area.width);
        let height = (self.lines.len() as u16).saturating_add(2).min(area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}

impl Component for HelpOverlay {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, _ctx: &ComponentContext) {
        if area.width < 4 || area.height < 3 {
            return;
        }
        let rect = self.rect_for(area);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .title(" Help (F1 to close) ")
            .borders(Borders::ALL)
            .border_style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(block, rect);
        let inner = Rect {
            x: rect.x.saturating_add(2),
            y: rect.y.saturating_add(1),
            width: rect.width.saturating_sub(4),
            height: rect.height.saturating_sub(2),
        };
        for (row, line) in self.lines.iter().take(inner.height as usize).enumerate() {
            frame.set_line(inner, row as u16, line, Style::default());
        }
    }
}
