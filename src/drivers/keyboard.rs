use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

/// Smooths over platform differences in key reporting before events reach
/// the key bindings.
///
/// Releases are dropped everywhere. Repeats are kept except for the keys
/// listed in `no_repeat`, which would otherwise toggle state many times per
/// press. Shift+Tab becomes BackTab.
#[derive(Debug, Clone)]
pub struct KeyboardNormalizer {
    no_repeat: Vec<KeyCode>,
}

impl Default for KeyboardNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardNormalizer {
    pub fn new() -> Self {
        Self {
            no_repeat: vec![KeyCode::Esc, KeyCode::Tab, KeyCode::BackTab],
        }
    }

    pub fn normalize(&self, evt: Event) -> Option<Event> {
        let Event::Key(mut key) = evt else {
            return Some(evt);
        };
        if key.code == KeyCode::Tab && key.modifiers.contains(KeyModifiers::SHIFT) {
            key.code = KeyCode::BackTab;
            key.modifiers.remove(KeyModifiers::SHIFT);
        }
        match key.kind {
            KeyEventKind::Release => None,
            KeyEventKind::Repeat if self.no_repeat.contains(&key.code) => None,
            _ => Some(Event::Key(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode, mods: KeyModifiers, kind: KeyEventKind) -> Event {
        let mut key = KeyEvent::new(code, mods);
        key.kind = kind;
        Event::Key(key)
    }

    #[test]
    fn tab_with_shift_becomes_backtab() {
        let norm = KeyboardNormalizer::new();
        let out = norm.normalize(key(KeyCode::Tab, KeyModifiers::SHIFT, KeyEventKind::Press));
        let Some(Event::Key(k)) = out else {
            panic!("expected key event");
        };
        assert_eq!(k.code, KeyCode::BackTab);
        assert!(!k.modifiers.contains(KeyModifiers::SHIFT));
    }

    #[test]
    fn releases_and_toggle_repeats_are_dropped() {
        let norm = KeyboardNormalizer::new();
        let release = key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Release);
        assert!(norm.normalize(release).is_none());
        let repeat_tab = key(KeyCode::Tab, KeyModifiers::NONE, KeyEventKind::Repeat);
        assert!(norm.normalize(repeat_tab).is_none());
        let repeat_char = key(KeyCode::Char('a'), KeyModifiers::NONE, KeyEventKind::Repeat);
        assert!(norm.normalize(repeat_char).is_some());
    }

    #[test]
    fn non_key_events_pass_through() {
        let norm = KeyboardNormalizer::new();
        assert!(norm.normalize(Event::Resize(10, 20)).is_some());
    }
}
