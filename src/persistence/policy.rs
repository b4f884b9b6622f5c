use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::WindowContentFile;
use crate::debounce::Debouncer;
use crate::panel::PanelId;

/// Saves that have come due.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DueSaves {
    /// The layout should be serialized from live state and written.
    pub layout: bool,
    pub contents: Vec<WindowContentFile>,
}

impl DueSaves {
    pub fn is_empty(&self) -> bool {
        !self.layout && self.contents.is_empty()
    }
}

/// Decides when layout and content writes happen.
///
/// Structural changes are written at once and supersede a pending layout
/// write. Continuous changes go through one layout debouncer and one
/// debouncer per window id.
#[derive(Debug)]
pub struct SavePolicy {
    delay: Duration,
    layout: Debouncer<()>,
    contents: HashMap<PanelId, Debouncer<WindowContentFile>>,
}

impl SavePolicy {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            layout: Debouncer::new(delay),
            contents: HashMap::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// A structural change happened. The caller writes the layout now; any
    /// pending debounced layout write is dropped.
    pub fn layout_structural(&mut self) {
        self.layout.cancel();
    }

    pub fn layout_continuous(&mut self, now: Instant) {
        self.layout.call((), now);
    }

    pub fn content_changed(&mut self, file: WindowContentFile, now: Instant) {
        let delay = self.delay;
        self.contents
            .entry(file.window_id.clone())
            .or_insert_with(|| Debouncer::new(delay))
            .call(file, now);
    }

    /// Forget any pending content write for a closed panel. Returns whether
    /// one was cancelled.
    pub fn panel_closed(&mut self, id: &PanelId) -> bool {
        self.contents
            .remove(id)
            .is_some_and(|mut debouncer| debouncer.cancel())
    }

    pub fn content_pending(&self, id: &PanelId) -> bool {
        self.contents.get(id).is_some_and(Debouncer::is_pending)
    }

    pub fn layout_pending(&self) -> bool {
        self.layout.is_pending()
    }

    pub fn poll(&mut self, now: Instant) -> DueSaves {
        let layout = self.layout.take_due(now).is_some();
        let mut contents: Vec<_> = self
            .contents
            .values_mut()
            .filter_map(|debouncer| debouncer.take_due(now))
            .collect();
        self.contents.retain(|_, debouncer| debouncer.is_pending());
        contents.sort_by(|a, b| a.window_id.cmp(&b.window_id));
        DueSaves { layout, contents }
    }

    /// Everything pending, regardless of deadlines.
    pub fn flush_all(&mut self) -> DueSaves {
        let layout = self.layout.flush().is_some();
        let mut contents: Vec<_> = self
            .contents
            .drain()
            .filter_map(|(_, mut debouncer)| debouncer.flush())
            .collect();
        contents.sort_by(|a, b| a.window_id.cmp(&b.window_id));
        DueSaves { layout, contents }
    }

    /// The earliest pending deadline across all channels.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.contents
            .values()
            .filter_map(Debouncer::deadline)
            .chain(self.layout.deadline())
            .min()
    }
}

impl Default for SavePolicy {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::WindowContentType;
    use serde_json::json;

    fn file(id: &str, n: u32) -> WindowContentFile {
        WindowContentFile {
            window_id: id.into(),
            content_type: WindowContentType::Browser,
            content: json!({ "url": "https://example.com", "zoom": n }),
            last_modified: String::new(),
        }
    }

    #[test]
    fn moves_collapse_into_one_layout_save() {
        let start = Instant::now();
        let mut policy = SavePolicy::new(Duration::from_millis(500));
        for i in 0..5 {
            policy.layout_continuous(start + Duration::from_millis(50 * i));
        }
        let fifth = start + Duration::from_millis(200);
        assert!(policy.poll(fifth + Duration::from_millis(499)).is_empty());
        assert!(policy.poll(fifth + Duration::from_millis(500)).layout);
        assert!(policy.poll(fifth + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn structural_change_cancels_pending_layout() {
        let now = Instant::now();
        let mut policy = SavePolicy::default();
        policy.layout_continuous(now);
        policy.layout_structural();
        assert!(!policy.layout_pending());
        assert!(policy.poll(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn content_channels_are_independent() {
        let now = Instant::now();
        let mut policy = SavePolicy::new(Duration::from_millis(100));
        policy.content_changed(file("a", 10), now);
        policy.content_changed(file("b", 20), now + Duration::from_millis(60));
        policy.content_changed(file("a", 11), now + Duration::from_millis(30));

        assert_eq!(
            policy.next_deadline(),
            Some(now + Duration::from_millis(130))
        );
        let due = policy.poll(now + Duration::from_millis(140));
        assert_eq!(due.contents, vec![file("a", 11)]);
        let due = policy.poll(now + Duration::from_millis(160));
        assert_eq!(due.contents, vec![file("b", 20)]);
        assert_eq!(policy.next_deadline(), None);
    }

    #[test]
    fn closing_cancels_pending_content() {
        let now = Instant::now();
        let mut policy = SavePolicy::default();
        policy.content_changed(file("a", 1), now);
        assert!(policy.content_pending(&"a".into()));
        assert!(policy.panel_closed(&"a".into()));
        assert!(!policy.panel_closed(&"a".into()));
        assert!(policy.poll(now + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn flush_all_ignores_deadlines() {
        let now = Instant::now();
        let mut policy = SavePolicy::default();
        policy.layout_continuous(now);
        policy.content_changed(file("b", 2), now);
        policy.content_changed(file("a", 1), now);
        let due = policy.flush_all();
        assert!(due.layout);
        assert_eq!(due.contents, vec![file("a", 1), file("b", 2)]);
        assert!(policy.flush_all().is_empty());
    }
}
