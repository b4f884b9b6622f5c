use std::marker::PhantomData;

use tracing::{debug, warn};

use super::{OpenRequest, Panel, PanelId, PanelKind, clamp_opacity};
use crate::layout::{FloatRect, Viewport};

/// Every way a registry can be mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum Action<C> {
    Open {
        id: PanelId,
        request: OpenRequest<C>,
    },
    Close(PanelId),
    Focus(PanelId),
    Move {
        id: PanelId,
        x: f64,
        y: f64,
    },
    Resize {
        id: PanelId,
        width: f64,
        height: f64,
    },
    SetOpacity {
        id: PanelId,
        opacity: f32,
    },
    SetFlipped {
        id: PanelId,
        flipped: bool,
    },
    SetBackgroundTransparent {
        id: PanelId,
        transparent: bool,
    },
}

/// What a dispatched action actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Opened(PanelId),
    Closed(PanelId),
    Focused(PanelId),
    Moved(PanelId),
    Resized(PanelId),
    OpacityChanged(PanelId),
    Flipped(PanelId),
    BackgroundChanged(PanelId),
    Unchanged,
}

impl Change {
    pub fn panel(&self) -> Option<&PanelId> {
        match self {
            Change::Opened(id)
            | Change::Closed(id)
            | Change::Focused(id)
            | Change::Moved(id)
            | Change::Resized(id)
            | Change::OpacityChanged(id)
            | Change::Flipped(id)
            | Change::BackgroundChanged(id) => Some(id),
            Change::Unchanged => None,
        }
    }
}

/// The authoritative collection of panels of one kind.
///
/// All mutation goes through [`Registry::dispatch`], which takes `&mut self`,
/// so one action always completes before the next one starts.
#[derive(Debug, Clone)]
pub struct Registry<K: PanelKind> {
    panels: Vec<Panel<K::Content>>,
    viewport: Viewport,
    _kind: PhantomData<K>,
}

impl<K: PanelKind> Default for Registry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PanelKind> Registry<K> {
    pub fn new() -> Self {
        Self {
            panels: Vec::new(),
            viewport: Viewport::default(),
            _kind: PhantomData,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Viewport used to centre panels opened without coordinates.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Open a panel, generating an id when the request carries none.
    pub fn open(&mut self, request: OpenRequest<K::Content>) -> (PanelId, Change) {
        let id = request
            .id
            .clone()
            .unwrap_or_else(|| PanelId::generate(K::ID_PREFIX));
        let change = self.dispatch(Action::Open {
            id: id.clone(),
            request,
        });
        (id, change)
    }

    pub fn dispatch(&mut self, action: Action<K::Content>) -> Change {
        let change = match action {
            Action::Open { id, request } => self.apply_open(id, request),
            Action::Close(id) => self.apply_close(id),
            Action::Focus(id) => self.apply_focus(id),
            Action::Move { id, x, y } => self.apply_move(id, x, y),
            Action::Resize { id, width, height } => self.apply_resize(id, width, height),
            Action::SetOpacity { id, opacity } => self.apply_opacity(id, opacity),
            Action::SetFlipped { id, flipped } => self.update(
                id,
                |panel| (panel.flipped != flipped).then(|| panel.flipped = flipped),
                Change::Flipped,
            ),
            Action::SetBackgroundTransparent { id, transparent } => self.update(
                id,
                |panel| {
                    (panel.background_transparent != transparent)
                        .then(|| panel.background_transparent = transparent)
                },
                Change::BackgroundChanged,
            ),
        };
        if change != Change::Unchanged {
            debug!(kind = K::LABEL, ?change, "registry transition");
        }
        change
    }

    fn apply_open(&mut self, id: PanelId, request: OpenRequest<K::Content>) -> Change {
        if self.contains(&id) {
            warn!(kind = K::LABEL, %id, "open ignored: id already present");
            return Change::Unchanged;
        }
        let (default_w, default_h) = K::default_size(request.content_type);
        let (width, height) = K::MIN_SIZE.clamp(
            request.width.unwrap_or(default_w),
            request.height.unwrap_or(default_h),
        );
        let (cx, cy) = self.viewport.centered_origin(width, height);
        let x = request.x.filter(|v| v.is_finite()).unwrap_or(cx);
        let y = request.y.filter(|v| v.is_finite()).unwrap_or(cy);
        let opacity = request
            .opacity
            .and_then(clamp_opacity)
            .unwrap_or_else(|| K::default_opacity(request.content_type));

        self.panels.push(Panel {
            id: id.clone(),
            content_type: request.content_type,
            title: request.title,
            component_props: request.component_props,
            rect: FloatRect::new(x, y, width, height),
            z_index: self.max_z() + 1,
            opacity,
            background_transparent: request.background_transparent,
            flipped: false,
        });
        Change::Opened(id)
    }

    fn apply_close(&mut self, id: PanelId) -> Change {
        let Some(index) = self.index_of(&id) else {
            return Change::Unchanged;
        };
        self.panels.remove(index);
        Change::Closed(id)
    }

    fn apply_focus(&mut self, id: PanelId) -> Change {
        let max = self.max_z();
        let Some(panel) = self.panels.iter_mut().find(|p| p.id == id) else {
            return Change::Unchanged;
        };
        if panel.z_index == max {
            return Change::Unchanged;
        }
        panel.z_index = max + 1;
        Change::Focused(id)
    }

    fn apply_move(&mut self, id: PanelId, x: f64, y: f64) -> Change {
        if !x.is_finite() || !y.is_finite() {
            return Change::Unchanged;
        }
        self.update(
            id,
            |panel| {
                let moved = panel.rect.x != x || panel.rect.y != y;
                panel.rect.x = x;
                panel.rect.y = y;
                moved.then_some(())
            },
            Change::Moved,
        )
    }

    fn apply_resize(&mut self, id: PanelId, width: f64, height: f64) -> Change {
        let (width, height) = K::MIN_SIZE.clamp(width, height);
        self.update(
            id,
            |panel| {
                let resized = panel.rect.width != width || panel.rect.height != height;
                panel.rect.width = width;
                panel.rect.height = height;
                resized.then_some(())
            },
            Change::Resized,
        )
    }

    fn apply_opacity(&mut self, id: PanelId, opacity: f32) -> Change {
        let Some(opacity) = clamp_opacity(opacity) else {
            return Change::Unchanged;
        };
        self.update(
            id,
            |panel| (panel.opacity != opacity).then(|| panel.opacity = opacity),
            Change::OpacityChanged,
        )
    }

    fn update<F>(&mut self, id: PanelId, mutate: F, changed: fn(PanelId) -> Change) -> Change
    where
        F: FnOnce(&mut Panel<K::Content>) -> Option<()>,
    {
        match self.panels.iter_mut().find(|p| p.id == id) {
            Some(panel) => match mutate(panel) {
                Some(()) => changed(id),
                None => Change::Unchanged,
            },
            None => Change::Unchanged,
        }
    }

    /// Raise the bottom-most panel. Repeated calls visit every panel once
    /// before returning to the original top.
    pub fn cycle_focus(&mut self) -> Change {
        let order = self.draw_order();
        if order.len() < 2 {
            return Change::Unchanged;
        }
        let target = order[0].id.clone();
        self.dispatch(Action::Focus(target))
    }

    fn index_of(&self, id: &PanelId) -> Option<usize> {
        self.panels.iter().position(|p| &p.id == id)
    }

    pub fn contains(&self, id: &PanelId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &PanelId) -> Option<&Panel<K::Content>> {
        self.panels.iter().find(|p| &p.id == id)
    }

    /// Panels in the order they were opened.
    pub fn iter(&self) -> impl Iterator<Item = &Panel<K::Content>> {
        self.panels.iter()
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn max_z(&self) -> u32 {
        self.panels.iter().map(|p| p.z_index).max().unwrap_or(0)
    }

    /// The panel holding the highest z-index.
    pub fn top(&self) -> Option<&Panel<K::Content>> {
        self.panels.iter().max_by_key(|p| p.z_index)
    }

    /// Panels sorted bottom to top.
    pub fn draw_order(&self) -> Vec<&Panel<K::Content>> {
        let mut order: Vec<_> = self.panels.iter().collect();
        order.sort_by_key(|p| p.z_index);
        order
    }
}
