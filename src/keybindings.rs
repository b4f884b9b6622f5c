use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::actions::ShellAction;
use crate::panel::{WidgetType, WindowContentType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Ordered table of bindings. Lookups return the first match, and help
/// lists actions in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    entries: Vec<(ShellAction, Vec<KeyCombo>)>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        use ShellAction::*;
        let alt = KeyModifiers::ALT;
        let shift = KeyModifiers::SHIFT;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::ctrl('q'));
        kb.add(ToggleHelp, KeyCombo::plain(KeyCode::F(1)));
        kb.add(OpenWindow(WindowContentType::Notes), KeyCombo::ctrl('n'));
        kb.add(OpenWindow(WindowContentType::Draw), KeyCombo::ctrl('d'));
        kb.add(OpenWindow(WindowContentType::Browser), KeyCombo::ctrl('b'));
        kb.add(OpenWindow(WindowContentType::FileViewer), KeyCombo::ctrl('o'));
        kb.add(OpenWindow(WindowContentType::Test), KeyCombo::ctrl('t'));
        kb.add(OpenWidget(WidgetType::Clock), KeyCombo::ctrl('k'));
        kb.add(OpenWidget(WidgetType::Timer), KeyCombo::ctrl('e'));
        kb.add(OpenWidget(WidgetType::Chronometer), KeyCombo::ctrl('r'));
        kb.add(CloseActive, KeyCombo::ctrl('w'));
        kb.add(CycleFocus, KeyCombo::plain(KeyCode::Tab));
        // Geometry
        kb.add(MoveLeft, KeyCombo::new(KeyCode::Left, alt));
        kb.add(MoveRight, KeyCombo::new(KeyCode::Right, alt));
        kb.add(MoveUp, KeyCombo::new(KeyCode::Up, alt));
        kb.add(MoveDown, KeyCombo::new(KeyCode::Down, alt));
        kb.add(ShrinkWidth, KeyCombo::new(KeyCode::Left, shift));
        kb.add(GrowWidth, KeyCombo::new(KeyCode::Right, shift));
        kb.add(ShrinkHeight, KeyCombo::new(KeyCode::Up, shift));
        kb.add(GrowHeight, KeyCombo::new(KeyCode::Down, shift));
        // Display
        kb.add(OpacityDown, KeyCombo::plain(KeyCode::F(2)));
        kb.add(OpacityUp, KeyCombo::plain(KeyCode::F(3)));
        kb.add(ToggleBackground, KeyCombo::plain(KeyCode::F(4)));
        kb.add(FlipWidget, KeyCombo::plain(KeyCode::F(5)));
        kb.add(ZoomIn, KeyCombo::plain(KeyCode::PageUp));
        kb.add(ZoomOut, KeyCombo::plain(KeyCode::PageDown));
        // Overlay
        kb.add(ToggleOverlayMode, KeyCombo::plain(KeyCode::F(6)));
        kb.add(ToggleOverlayVisible, KeyCombo::plain(KeyCode::F(7)));
        kb.add(ToggleMouseCapture, KeyCombo::plain(KeyCode::F(8)));
        // Chronometer
        kb.add(ChronometerStartPause, KeyCombo::ctrl('p'));
        kb.add(ChronometerReset, KeyCombo::ctrl('y'));
        kb
    }

    pub fn add(&mut self, action: ShellAction, combo: KeyCombo) {
        match self.entries.iter_mut().find(|(a, _)| *a == action) {
            Some((_, combos)) => combos.push(combo),
            None => self.entries.push((action, vec![combo])),
        }
    }

    pub fn matches(&self, action: ShellAction, key: &KeyEvent) -> bool {
        self.entries
            .iter()
            .any(|(a, combos)| *a == action && combos.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<ShellAction> {
        self.entries
            .iter()
            .find(|(_, combos)| combos.iter().any(|c| c.matches(key)))
            .map(|(action, _)| *action)
    }

    pub fn help_entries(&self) -> Vec<(ShellAction, Vec<String>)> {
        self.entries
            .iter()
            .map(|(action, combos)| (*action, combos.iter().map(KeyCombo::display).collect()))
            .collect()
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: ShellAction) -> Vec<String> {
        self.entries
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, combos)| combos.iter().map(KeyCombo::display).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_quit() {
        let kb = KeyBindings::defaults();
        let ev = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(kb.matches(ShellAction::Quit, &ev));
        assert_eq!(kb.action_for_key(&ev), Some(ShellAction::Quit));
    }

    #[test]
    fn plain_characters_are_left_for_content() {
        let kb = KeyBindings::defaults();
        for c in ['a', 'n', 'q', ' '] {
            let ev = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            assert_eq!(kb.action_for_key(&ev), None, "{c:?} should not be bound");
        }
    }

    #[test]
    fn help_lists_in_insertion_order() {
        let kb = KeyBindings::defaults();
        let entries = kb.help_entries();
        assert_eq!(entries[0].0, ShellAction::Quit);
        assert_eq!(entries[0].1, vec!["Ctrl+Q".to_string()]);
        assert_eq!(kb.combos_for(ShellAction::GrowWidth), vec!["Shift+Right"]);
    }

    #[test]
    fn no_combo_is_bound_twice() {
        let kb = KeyBindings::defaults();
        let mut seen = std::collections::HashSet::new();
        for (action, combos) in kb.help_entries() {
            for combo in combos {
                assert!(seen.insert(combo.clone()), "{combo} reused by {action}");
            }
        }
        let ev = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert_eq!(kb.action_for_key(&ev), Some(ShellAction::ChronometerReset));
    }
}
