//! Type-tagged publish/subscribe used to decouple producers (menus, key
//! commands) from the registries that own panel state.
//!
//! Two independent buses exist, one per panel kind. Both are plain owned
//! values; the shell constructs them once and hands out `Rc` clones to
//! whoever needs to emit or subscribe.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::panel::{PanelId, WidgetOpenRequest, WindowOpenRequest};

/// An event that can travel over an [`EventBus`].
pub trait BusEvent: 'static {
    type Kind: Copy + Eq + Hash + fmt::Debug + 'static;

    fn kind(&self) -> Self::Kind;
}

type Handler<E> = Rc<RefCell<Box<dyn FnMut(&E)>>>;

struct Listener<E> {
    id: u64,
    once: bool,
    handler: Handler<E>,
}

struct Listeners<E: BusEvent> {
    next_id: u64,
    by_kind: HashMap<E::Kind, Vec<Listener<E>>>,
}

impl<E: BusEvent> Listeners<E> {
    fn remove(&mut self, kind: E::Kind, id: u64) -> bool {
        let Some(list) = self.by_kind.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_kind.remove(&kind);
        }
        removed
    }
}

/// Synchronous fan-out to every handler registered for an event's kind.
///
/// Handlers run on the calling thread in registration order. The handler
/// list is snapshotted when `emit` starts, so subscribing or unsubscribing
/// from inside a handler only affects later emits. Panics in a handler are
/// not caught.
pub struct EventBus<E: BusEvent> {
    name: &'static str,
    listeners: Rc<RefCell<Listeners<E>>>,
}

impl<E: BusEvent> EventBus<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                by_kind: HashMap::new(),
            })),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn on<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        self.register(kind, false, Box::new(handler))
    }

    /// Like [`EventBus::on`], but the handler is removed before its first
    /// invocation runs.
    pub fn once<F>(&self, kind: E::Kind, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        self.register(kind, true, Box::new(handler))
    }

    fn register(&self, kind: E::Kind, once: bool, handler: Box<dyn FnMut(&E)>) -> Subscription {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.by_kind.entry(kind).or_default().push(Listener {
            id,
            once,
            handler: Rc::new(RefCell::new(handler)),
        });

        let weak: Weak<RefCell<Listeners<E>>> = Rc::downgrade(&self.listeners);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                weak.upgrade()
                    .is_some_and(|listeners| listeners.borrow_mut().remove(kind, id))
            })),
        }
    }

    /// Remove every handler for `kind`, or every handler on the bus when
    /// `kind` is `None`.
    pub fn off(&self, kind: Option<E::Kind>) {
        let mut listeners = self.listeners.borrow_mut();
        match kind {
            Some(kind) => {
                listeners.by_kind.remove(&kind);
            }
            None => listeners.by_kind.clear(),
        }
    }

    /// Deliver `event` to its subscribers. Returns how many handlers ran.
    pub fn emit(&self, event: &E) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Handler<E>> = {
            let mut listeners = self.listeners.borrow_mut();
            let Some(list) = listeners.by_kind.get_mut(&kind) else {
                return 0;
            };
            let handlers = list.iter().map(|l| Rc::clone(&l.handler)).collect();
            list.retain(|l| !l.once);
            if list.is_empty() {
                listeners.by_kind.remove(&kind);
            }
            handlers
        };

        let mut invoked = 0;
        for handler in snapshot {
            match handler.try_borrow_mut() {
                Ok(mut handler) => {
                    (*handler)(event);
                    invoked += 1;
                }
                Err(_) => {
                    warn!(bus = self.name, ?kind, "skipping re-entrant handler");
                }
            }
        }
        invoked
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners
            .borrow()
            .by_kind
            .get(&kind)
            .map_or(0, |list| list.len())
    }
}

/// Handle returned by [`EventBus::on`]. Dropping it leaves the handler
/// registered; call [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() -> bool>>,
}

impl Subscription {
    /// Remove the handler. Returns `false` if it was already gone.
    pub fn unsubscribe(mut self) -> bool {
        self.unsubscribe.take().is_some_and(|f| f())
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowEventKind {
    Open,
    Close,
    Focus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Open(WindowOpenRequest),
    Close { id: PanelId },
    Focus { id: PanelId },
}

impl BusEvent for WindowEvent {
    type Kind = WindowEventKind;

    fn kind(&self) -> WindowEventKind {
        match self {
            WindowEvent::Open(_) => WindowEventKind::Open,
            WindowEvent::Close { .. } => WindowEventKind::Close,
            WindowEvent::Focus { .. } => WindowEventKind::Focus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetEventKind {
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Open(WidgetOpenRequest),
    Close { id: PanelId },
}

impl BusEvent for WidgetEvent {
    type Kind = WidgetEventKind;

    fn kind(&self) -> WidgetEventKind {
        match self {
            WidgetEvent::Open(_) => WidgetEventKind::Open,
            WidgetEvent::Close { .. } => WidgetEventKind::Close,
        }
    }
}

pub type WindowBus = EventBus<WindowEvent>;
pub type WidgetBus = EventBus<WidgetEvent>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{OpenRequest, WidgetType};

    fn close(id: &str) -> WindowEvent {
        WindowEvent::Close { id: id.into() }
    }

    #[test]
    fn emit_runs_handlers_in_registration_order() {
        let bus = WindowBus::new("window");
        let seen = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let seen = Rc::clone(&seen);
            let _ = bus.on(WindowEventKind::Close, move |_| seen.borrow_mut().push(tag));
        }
        assert_eq!(bus.emit(&close("a")), 3);
        assert_eq!(*seen.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn emit_only_reaches_matching_kind() {
        let bus = WindowBus::new("window");
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let _ = bus.on(WindowEventKind::Focus, move |_| *counter.borrow_mut() += 1);
        assert_eq!(bus.emit(&close("a")), 0);
        assert_eq!(bus.emit(&WindowEvent::Focus { id: "a".into() }), 1);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn unsubscribe_removes_only_that_handler() {
        let bus = WindowBus::new("window");
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h1 = Rc::clone(&hits);
        let sub = bus.on(WindowEventKind::Close, move |_| h1.borrow_mut().push(1));
        let h2 = Rc::clone(&hits);
        let _keep = bus.on(WindowEventKind::Close, move |_| h2.borrow_mut().push(2));

        assert!(sub.unsubscribe());
        bus.emit(&close("a"));
        assert_eq!(*hits.borrow(), vec![2]);
    }

    #[test]
    fn once_fires_a_single_time() {
        let bus = WidgetBus::new("widget");
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let sub = bus.once(WidgetEventKind::Open, move |_| *counter.borrow_mut() += 1);
        let open = WidgetEvent::Open(OpenRequest::new(WidgetType::Clock));
        bus.emit(&open);
        bus.emit(&open);
        assert_eq!(*hits.borrow(), 1);
        assert_eq!(bus.listener_count(WidgetEventKind::Open), 0);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn off_clears_one_kind_or_everything() {
        let bus = WindowBus::new("window");
        let _ = bus.on(WindowEventKind::Close, |_| {});
        let _ = bus.on(WindowEventKind::Focus, |_| {});
        bus.off(Some(WindowEventKind::Close));
        assert_eq!(bus.listener_count(WindowEventKind::Close), 0);
        assert_eq!(bus.listener_count(WindowEventKind::Focus), 1);
        bus.off(None);
        assert_eq!(bus.listener_count(WindowEventKind::Focus), 0);
    }

    #[test]
    fn handler_may_subscribe_during_emit() {
        let bus = Rc::new(WindowBus::new("window"));
        let inner_bus = Rc::clone(&bus);
        let _ = bus.on(WindowEventKind::Close, move |_| {
            let _ = inner_bus.on(WindowEventKind::Close, |_| {});
        });
        assert_eq!(bus.emit(&close("a")), 1);
        assert_eq!(bus.listener_count(WindowEventKind::Close), 2);
    }

    #[test]
    fn reentrant_emit_skips_the_running_handler() {
        let bus = Rc::new(WindowBus::new("window"));
        let inner_bus = Rc::clone(&bus);
        let depth = Rc::new(RefCell::new(0));
        let d = Rc::clone(&depth);
        let _ = bus.on(WindowEventKind::Close, move |_| {
            *d.borrow_mut() += 1;
            assert_eq!(inner_bus.emit(&close("nested")), 0);
        });
        assert_eq!(bus.emit(&close("a")), 1);
        assert_eq!(*depth.borrow(), 1);
    }
}
