//! The shell owns both buses, both registries, the overlay flags and the
//! save policy, and turns every registry change into the right kind of
//! persistence request.

use std::cell::{Ref, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::events::{
    Subscription, WidgetBus, WidgetEvent, WidgetEventKind, WindowBus, WindowEvent,
    WindowEventKind,
};
use crate::hydration::HydrationResult;
use crate::layout::Viewport;
use crate::panel::{
    Action, Change, PanelId, PanelKind, Registry, WidgetKind, WidgetOpenRequest, WidgetType,
    WindowContentType, WindowKind, WindowOpenRequest,
};
use crate::persistence::{
    DueSaves, OverlayMode, PersistOutcome, PersistRequest, PersistSink, SavePolicy,
    WindowContent, WindowContentFile, content_file, serialize_state,
};
use crate::state::OverlayState;

/// A registry change tagged with the registry it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelChange {
    Window(Change),
    Widget(Change),
}

type ChangeLog = Rc<RefCell<Vec<PanelChange>>>;

pub struct Shell<S: PersistSink> {
    window_bus: Rc<WindowBus>,
    widget_bus: Rc<WidgetBus>,
    windows: Rc<RefCell<Registry<WindowKind>>>,
    widgets: Rc<RefCell<Registry<WidgetKind>>>,
    changes: ChangeLog,
    subscriptions: Vec<Subscription>,
    overlay: OverlayState,
    policy: SavePolicy,
    contents: HashMap<PanelId, WindowContent>,
    /// Stored payloads that did not decode. They stay on disk untouched and
    /// the window gets no live content.
    raw_contents: HashMap<PanelId, WindowContentFile>,
    sink: S,
}

impl<S: PersistSink> Shell<S> {
    pub fn new(sink: S, debounce: Duration) -> Self {
        let window_bus = Rc::new(WindowBus::new("window"));
        let widget_bus = Rc::new(WidgetBus::new("widget"));
        let windows = Rc::new(RefCell::new(Registry::new()));
        let widgets = Rc::new(RefCell::new(Registry::new()));
        let changes: ChangeLog = Rc::default();

        let subscriptions = bridge_windows(&window_bus, &windows, &changes)
            .into_iter()
            .chain(bridge_widgets(&widget_bus, &widgets, &changes))
            .collect();

        Self {
            window_bus,
            widget_bus,
            windows,
            widgets,
            changes,
            subscriptions,
            overlay: OverlayState::new(),
            policy: SavePolicy::new(debounce),
            contents: HashMap::new(),
            raw_contents: HashMap::new(),
            sink,
        }
    }

    /// Seed a new shell with hydrated panels. Nothing is written: the
    /// restored state is what is already on disk. Windows with no stored
    /// payload get initial content in memory; a stored payload that cannot
    /// be decoded is kept as it is and never replaced.
    pub fn from_hydration(sink: S, debounce: Duration, hydrated: &HydrationResult) -> Self {
        let mut shell = Self::new(sink, debounce);
        shell.overlay = OverlayState::from_global(hydrated.global);
        hydrated.seed(
            &mut shell.windows.borrow_mut(),
            &mut shell.widgets.borrow_mut(),
        );

        let restored: Vec<_> = shell
            .windows
            .borrow()
            .iter()
            .map(|w| (w.id.clone(), w.content_type, w.component_props.clone()))
            .collect();
        for (id, content_type, props) in restored {
            let Some(file) = hydrated.content_for(&id) else {
                if let Some(content) = WindowContent::initial(content_type, &props) {
                    shell.contents.insert(id, content);
                }
                continue;
            };
            match WindowContent::decode(file).filter(|c| c.content_type() == content_type) {
                Some(content) => {
                    shell.contents.insert(id, content);
                }
                None => {
                    warn!(%id, "stored content could not be decoded, keeping it unchanged");
                    shell.raw_contents.insert(id, file.clone());
                }
            }
        }
        shell
    }

    pub fn window_bus(&self) -> Rc<WindowBus> {
        Rc::clone(&self.window_bus)
    }

    pub fn widget_bus(&self) -> Rc<WidgetBus> {
        Rc::clone(&self.widget_bus)
    }

    pub fn windows(&self) -> Ref<'_, Registry<WindowKind>> {
        self.windows.borrow()
    }

    pub fn widgets(&self) -> Ref<'_, Registry<WidgetKind>> {
        self.widgets.borrow()
    }

    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayState {
        &mut self.overlay
    }

    pub fn policy(&self) -> &SavePolicy {
        &self.policy
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn content(&self, id: &PanelId) -> Option<&WindowContent> {
        self.contents.get(id)
    }

    /// The stored file of a window whose payload could not be decoded.
    pub fn stored_raw(&self, id: &PanelId) -> Option<&WindowContentFile> {
        self.raw_contents.get(id)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.windows.borrow_mut().set_viewport(viewport);
        self.widgets.borrow_mut().set_viewport(viewport);
    }

    /// Emit an `open` on the window bus. The id is assigned here when the
    /// request has none so the caller learns it.
    pub fn open_window(&mut self, request: WindowOpenRequest, now: Instant) -> PanelId {
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| PanelId::generate(WindowKind::ID_PREFIX));
        self.window_bus
            .emit(&WindowEvent::Open(request.with_id(id.clone())));
        self.process(now);
        id
    }

    pub fn close_window(&mut self, id: &PanelId, now: Instant) {
        self.window_bus.emit(&WindowEvent::Close { id: id.clone() });
        self.process(now);
    }

    pub fn focus_window(&mut self, id: &PanelId, now: Instant) {
        self.window_bus.emit(&WindowEvent::Focus { id: id.clone() });
        self.process(now);
    }

    pub fn open_widget(&mut self, request: WidgetOpenRequest, now: Instant) -> PanelId {
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| PanelId::generate(WidgetKind::ID_PREFIX));
        self.widget_bus
            .emit(&WidgetEvent::Open(request.with_id(id.clone())));
        self.process(now);
        id
    }

    pub fn close_widget(&mut self, id: &PanelId, now: Instant) {
        self.widget_bus.emit(&WidgetEvent::Close { id: id.clone() });
        self.process(now);
    }

    /// Apply an action to the window registry directly, bypassing the bus.
    /// Used for drag commits and display settings.
    pub fn dispatch_window(&mut self, action: Action<WindowContentType>, now: Instant) {
        let change = self.windows.borrow_mut().dispatch(action);
        self.changes.borrow_mut().push(PanelChange::Window(change));
        self.process(now);
    }

    pub fn dispatch_widget(&mut self, action: Action<WidgetType>, now: Instant) {
        let change = self.widgets.borrow_mut().dispatch(action);
        self.changes.borrow_mut().push(PanelChange::Widget(change));
        self.process(now);
    }

    pub fn cycle_window_focus(&mut self, now: Instant) {
        let change = self.windows.borrow_mut().cycle_focus();
        self.changes.borrow_mut().push(PanelChange::Window(change));
        self.process(now);
    }

    pub fn set_overlay_mode(&mut self, mode: OverlayMode, now: Instant) {
        self.overlay.set_mode(mode);
        self.process(now);
    }

    pub fn toggle_overlay_mode(&mut self, now: Instant) {
        self.overlay.toggle_mode();
        self.process(now);
    }

    pub fn toggle_overlay_visible(&mut self, now: Instant) {
        self.overlay.toggle_overlay_visible();
        self.process(now);
    }

    /// Replace a window's content and schedule a debounced write. Returns
    /// `false` when the window is gone or the payload does not match its
    /// content type.
    pub fn update_window_content(
        &mut self,
        id: &PanelId,
        content: WindowContent,
        now: Instant,
    ) -> bool {
        let content_type = match self.windows.borrow().get(id) {
            Some(window) => window.content_type,
            None => return false,
        };
        if content.content_type() != content_type {
            warn!(%id, expected = content_type.as_str(), "content type mismatch, update ignored");
            return false;
        }
        match content_file(id, &content) {
            Ok(file) => self.policy.content_changed(file, now),
            Err(err) => error!(%id, "content not scheduled: {err}"),
        }
        self.contents.insert(id.clone(), content);
        true
    }

    /// Drain registry changes produced since the last call and schedule
    /// their persistence.
    fn process(&mut self, now: Instant) {
        let changes = std::mem::take(&mut *self.changes.borrow_mut());
        let mut structural = self.overlay.take_global_change().is_some();
        let mut continuous = false;

        for change in changes {
            match change {
                PanelChange::Window(Change::Opened(id)) => {
                    self.seed_content(&id);
                    structural = true;
                }
                PanelChange::Window(Change::Closed(id)) => {
                    if self.policy.panel_closed(&id) {
                        debug!(%id, "cancelled pending content save");
                    }
                    self.contents.remove(&id);
                    self.raw_contents.remove(&id);
                    self.submit(PersistRequest::DeleteContent(id));
                    structural = true;
                }
                PanelChange::Widget(Change::Opened(_) | Change::Closed(_))
                | PanelChange::Window(Change::OpacityChanged(_) | Change::BackgroundChanged(_))
                | PanelChange::Widget(Change::OpacityChanged(_) | Change::BackgroundChanged(_)) => {
                    structural = true;
                }
                PanelChange::Window(Change::Moved(_) | Change::Resized(_) | Change::Focused(_))
                | PanelChange::Widget(Change::Moved(_) | Change::Resized(_) | Change::Focused(_)) => {
                    continuous = true;
                }
                PanelChange::Window(Change::Flipped(_) | Change::Unchanged)
                | PanelChange::Widget(Change::Flipped(_) | Change::Unchanged) => {}
            }
        }

        if structural {
            self.policy.layout_structural();
            self.save_layout();
        } else if continuous {
            self.policy.layout_continuous(now);
        }
    }

    /// Give a freshly opened window its initial content and write it right
    /// away, so content seeded from open props survives a restart even if it
    /// is never edited.
    fn seed_content(&mut self, id: &PanelId) {
        if self.contents.contains_key(id) || self.raw_contents.contains_key(id) {
            return;
        }
        let initial = self
            .windows
            .borrow()
            .get(id)
            .and_then(|w| WindowContent::initial(w.content_type, &w.component_props));
        let Some(content) = initial else {
            return;
        };
        if self.policy.panel_closed(id) {
            debug!(%id, "dropped stale content save for reused id");
        }
        match content_file(id, &content) {
            Ok(file) => self.submit(PersistRequest::SaveContent(file)),
            Err(err) => error!(%id, "initial content not saved: {err}"),
        }
        self.contents.insert(id.clone(), content);
    }

    fn save_layout(&mut self) {
        let state = serialize_state(
            self.overlay.global(),
            &self.windows.borrow(),
            &self.widgets.borrow(),
        );
        self.submit(PersistRequest::SaveState(state));
    }

    fn submit(&mut self, request: PersistRequest) {
        if let Err(err) = self.sink.submit(request) {
            error!("persistence request dropped: {err}");
        }
    }

    fn write_due(&mut self, due: DueSaves) -> usize {
        let mut written = due.contents.len();
        if due.layout {
            self.save_layout();
            written += 1;
        }
        for file in due.contents {
            self.submit(PersistRequest::SaveContent(file));
        }
        written
    }

    /// Pick up changes made through a shared bus handle, run saves whose
    /// debounce has elapsed and log finished work. Returns how many debounced
    /// requests were submitted.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.process(now);
        let due = self.policy.poll(now);
        let written = self.write_due(due);
        for outcome in self.sink.drain() {
            outcome.log();
        }
        written
    }

    /// The earliest moment [`Shell::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.policy.next_deadline()
    }

    /// Flush every pending save, detach the bus bridges and wait for the
    /// sink to finish.
    pub fn shutdown(mut self) -> Vec<PersistOutcome> {
        let due = self.policy.flush_all();
        self.write_due(due);
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        let outcomes = self.sink.finish();
        for outcome in &outcomes {
            outcome.log();
        }
        outcomes
    }
}

fn bridge_windows(
    bus: &WindowBus,
    registry: &Rc<RefCell<Registry<WindowKind>>>,
    changes: &ChangeLog,
) -> Vec<Subscription> {
    [
        WindowEventKind::Open,
        WindowEventKind::Close,
        WindowEventKind::Focus,
    ]
    .into_iter()
    .map(|kind| {
        let registry = Rc::clone(registry);
        let changes = Rc::clone(changes);
        bus.on(kind, move |event: &WindowEvent| {
            let action = match event {
                WindowEvent::Open(request) => Action::Open {
                    id: request
                        .id
                        .clone()
                        .unwrap_or_else(|| PanelId::generate(WindowKind::ID_PREFIX)),
                    request: request.clone(),
                },
                WindowEvent::Close { id } => Action::Close(id.clone()),
                WindowEvent::Focus { id } => Action::Focus(id.clone()),
            };
            let change = registry.borrow_mut().dispatch(action);
            changes.borrow_mut().push(PanelChange::Window(change));
        })
    })
    .collect()
}

fn bridge_widgets(
    bus: &WidgetBus,
    registry: &Rc<RefCell<Registry<WidgetKind>>>,
    changes: &ChangeLog,
) -> Vec<Subscription> {
    [WidgetEventKind::Open, WidgetEventKind::Close]
        .into_iter()
        .map(|kind| {
            let registry = Rc::clone(registry);
            let changes = Rc::clone(changes);
            bus.on(kind, move |event: &WidgetEvent| {
                let action = match event {
                    WidgetEvent::Open(request) => Action::Open {
                        id: request
                            .id
                            .clone()
                            .unwrap_or_else(|| PanelId::generate(WidgetKind::ID_PREFIX)),
                        request: request.clone(),
                    },
                    WidgetEvent::Close { id } => Action::Close(id.clone()),
                };
                let change = registry.borrow_mut().dispatch(action);
                changes.borrow_mut().push(PanelChange::Widget(change));
            })
        })
        .collect()
}
