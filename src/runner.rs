//! The terminal host: routes input to the shell, coalesces drags into one
//! commit per frame and draws the panels.

use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;
use tracing::debug;

use crate::actions::ShellAction;
use crate::components::{
    Chronometer, ChronometerWidget, ClockWidget, Component, ComponentContext, ContentView,
    HelpOverlay, PanelFrame, SessionTimerWidget, StatusBar, editor,
};
use crate::constants::RESIZE_EDGE_THRESHOLD;
use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::keybindings::KeyBindings;
use crate::layout::floating::{FrameCoalescer, HitZone, MoveDrag, ResizeDrag, ResizeEdge, hit_zone};
use crate::layout::{FloatRect, MinSize};
use crate::panel::{
    Action, Panel, PanelId, PanelKind, WidgetKind, WidgetOpenRequest, WidgetType,
    WindowKind, WindowOpenRequest,
};
use crate::persistence::{OverlayMode, PersistSink};
use crate::shell::Shell;
use crate::ui::{CellScale, UiFrame};

/// Longest the loop sleeps without input; keeps the time widgets ticking.
const IDLE_INTERVAL: Duration = Duration::from_millis(250);
const OPACITY_STEP: f32 = 0.1;
const ZOOM_STEP: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Window(PanelId),
    Widget(PanelId),
}

#[derive(Debug, Clone, Copy)]
enum DragKind {
    Move(MoveDrag),
    Resize(ResizeDrag),
}

#[derive(Debug, Clone)]
struct Drag {
    target: Target,
    kind: DragKind,
}

/// Geometry produced by the latest pointer event of a drag.
#[derive(Debug, Clone, PartialEq)]
struct Commit {
    target: Target,
    rect: FloatRect,
}

/// Kind-independent edits, turned into an [`Action`] for whichever registry
/// owns the target.
#[derive(Debug, Clone, Copy)]
enum Edit {
    Move { x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    Opacity(f32),
    Background(bool),
    Flip(bool),
}

impl Edit {
    fn into_action<C>(self, id: PanelId) -> Action<C> {
        match self {
            Edit::Move { x, y } => Action::Move { id, x, y },
            Edit::Resize { width, height } => Action::Resize { id, width, height },
            Edit::Opacity(opacity) => Action::SetOpacity { id, opacity },
            Edit::Background(transparent) => Action::SetBackgroundTransparent { id, transparent },
            Edit::Flip(flipped) => Action::SetFlipped { id, flipped },
        }
    }
}

/// Display state of one panel, copied out of its registry.
#[derive(Debug, Clone, Copy)]
struct PanelView {
    rect: FloatRect,
    opacity: f32,
    transparent: bool,
    flipped: bool,
}

impl<C> From<&Panel<C>> for PanelView {
    fn from(panel: &Panel<C>) -> Self {
        Self {
            rect: panel.rect,
            opacity: panel.opacity,
            transparent: panel.background_transparent,
            flipped: panel.flipped,
        }
    }
}

pub struct App<S: PersistSink> {
    shell: Shell<S>,
    bindings: KeyBindings,
    help: HelpOverlay,
    scale: CellScale,
    area: Rect,
    active: Option<Target>,
    drag: Option<Drag>,
    pending: FrameCoalescer<Commit>,
    frame_budget: Duration,
    last_frame: Option<Instant>,
    session_started: Instant,
    chronometer: Chronometer,
    quit: bool,
}

impl<S: PersistSink> App<S> {
    pub fn new(shell: Shell<S>, bindings: KeyBindings, frame_budget: Duration) -> Self {
        let help = HelpOverlay::new(&bindings);
        Self {
            shell,
            bindings,
            help,
            scale: CellScale::default(),
            area: Rect::default(),
            active: None,
            drag: None,
            pending: FrameCoalescer::new(),
            frame_budget,
            last_frame: None,
            session_started: Instant::now(),
            chronometer: Chronometer::new(),
            quit: false,
        }
    }

    pub fn shell(&self) -> &Shell<S> {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell<S> {
        &mut self.shell
    }

    pub fn into_shell(self) -> Shell<S> {
        self.shell
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Drag updates superseded before they reached the registry.
    pub fn coalesced_drag_updates(&self) -> usize {
        self.pending.coalesced()
    }

    /// Track the terminal size. Panels live above the status bar row.
    pub fn set_area(&mut self, area: Rect) {
        if area == self.area {
            return;
        }
        self.area = area;
        let viewport = self.scale.viewport(self.panel_area());
        debug!(width = viewport.width, height = viewport.height, "viewport changed");
        self.shell.set_viewport(viewport);
    }

    fn panel_area(&self) -> Rect {
        Rect {
            height: self.area.height.saturating_sub(1),
            ..self.area
        }
    }

    fn status_area(&self) -> Rect {
        Rect {
            y: self.area.bottom().saturating_sub(1),
            height: self.area.height.min(1),
            ..self.area
        }
    }

    /// The panel keyboard actions apply to: the last one interacted with,
    /// or the top window, or the top widget.
    pub fn active(&self) -> Option<Target> {
        let alive = match &self.active {
            Some(Target::Window(id)) => self.shell.windows().contains(id),
            Some(Target::Widget(id)) => self.shell.widgets().contains(id),
            None => false,
        };
        if alive {
            return self.active.clone();
        }
        if let Some(top) = self.shell.windows().top() {
            return Some(Target::Window(top.id.clone()));
        }
        self.shell
            .widgets()
            .top()
            .map(|top| Target::Widget(top.id.clone()))
    }

    fn view(&self, target: &Target) -> Option<PanelView> {
        match target {
            Target::Window(id) => self.shell.windows().get(id).map(PanelView::from),
            Target::Widget(id) => self.shell.widgets().get(id).map(PanelView::from),
        }
    }

    fn min_size(target: &Target) -> MinSize {
        match target {
            Target::Window(_) => WindowKind::MIN_SIZE,
            Target::Widget(_) => WidgetKind::MIN_SIZE,
        }
    }

    fn edit(&mut self, target: &Target, edit: Edit, now: Instant) {
        match target {
            Target::Window(id) => self.shell.dispatch_window(edit.into_action(id.clone()), now),
            Target::Widget(id) => self.shell.dispatch_widget(edit.into_action(id.clone()), now),
        }
    }

    fn focus(&mut self, target: &Target, now: Instant) {
        match target {
            Target::Window(id) => self.shell.focus_window(id, now),
            Target::Widget(id) => self.shell.dispatch_widget(Action::Focus(id.clone()), now),
        }
        self.active = Some(target.clone());
    }

    pub fn handle_event(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) if self.shell.overlay().overlay_visible() => {
                self.handle_mouse(mouse, now)
            }
            Event::Resize(width, height) => self.set_area(Rect::new(0, 0, *width, *height)),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        if key.code == KeyCode::Esc && self.shell.overlay().help_visible() {
            self.shell.overlay_mut().toggle_help();
            return;
        }
        if let Some(action) = self.bindings.action_for_key(key) {
            self.perform(action, now);
            return;
        }
        if !self.shell.overlay().overlay_visible() {
            return;
        }
        let Some(Target::Window(id)) = self.active() else {
            return;
        };
        let Some(mut content) = self.shell.content(&id).cloned() else {
            return;
        };
        if editor::apply_key(&mut content, key) {
            self.shell.update_window_content(&id, content, now);
        }
    }

    pub fn perform(&mut self, action: ShellAction, now: Instant) {
        debug!(%action, "shell action");
        match action {
            ShellAction::Quit => self.quit = true,
            ShellAction::ToggleHelp => self.shell.overlay_mut().toggle_help(),
            ShellAction::OpenWindow(content_type) => {
                let id = self
                    .shell
                    .open_window(WindowOpenRequest::new(content_type), now);
                self.active = Some(Target::Window(id));
            }
            ShellAction::OpenWidget(widget_type) => {
                let id = self
                    .shell
                    .open_widget(WidgetOpenRequest::new(widget_type), now);
                self.active = Some(Target::Widget(id));
            }
            ShellAction::CloseActive => {
                match self.active() {
                    Some(Target::Window(id)) => self.shell.close_window(&id, now),
                    Some(Target::Widget(id)) => self.shell.close_widget(&id, now),
                    None => {}
                }
                self.active = None;
            }
            ShellAction::CycleFocus => {
                self.shell.cycle_window_focus(now);
                self.active = self
                    .shell
                    .windows()
                    .top()
                    .map(|top| Target::Window(top.id.clone()));
            }
            ShellAction::MoveLeft => self.nudge(-self.scale.col_px, 0.0, now),
            ShellAction::MoveRight => self.nudge(self.scale.col_px, 0.0, now),
            ShellAction::MoveUp => self.nudge(0.0, -self.scale.row_px, now),
            ShellAction::MoveDown => self.nudge(0.0, self.scale.row_px, now),
            ShellAction::GrowWidth => self.grow(self.scale.col_px, 0.0, now),
            ShellAction::ShrinkWidth => self.grow(-self.scale.col_px, 0.0, now),
            ShellAction::GrowHeight => self.grow(0.0, self.scale.row_px, now),
            ShellAction::ShrinkHeight => self.grow(0.0, -self.scale.row_px, now),
            ShellAction::OpacityUp => self.step_opacity(OPACITY_STEP, now),
            ShellAction::OpacityDown => self.step_opacity(-OPACITY_STEP, now),
            ShellAction::ToggleBackground => {
                if let Some((target, view)) = self.active_view() {
                    self.edit(&target, Edit::Background(!view.transparent), now);
                }
            }
            ShellAction::FlipWidget => {
                if let Some((target @ Target::Widget(_), view)) = self.active_view() {
                    self.edit(&target, Edit::Flip(!view.flipped), now);
                }
            }
            ShellAction::ZoomIn => self.zoom(ZOOM_STEP, now),
            ShellAction::ZoomOut => self.zoom(-ZOOM_STEP, now),
            ShellAction::ToggleOverlayMode => self.shell.toggle_overlay_mode(now),
            ShellAction::ToggleOverlayVisible => self.shell.toggle_overlay_visible(now),
            ShellAction::ToggleMouseCapture => self.shell.overlay_mut().toggle_mouse_capture(),
            ShellAction::ChronometerStartPause => self.chronometer.toggle(now),
            ShellAction::ChronometerReset => self.chronometer.reset(),
        }
    }

    fn active_view(&self) -> Option<(Target, PanelView)> {
        let target = self.active()?;
        let view = self.view(&target)?;
        Some((target, view))
    }

    fn nudge(&mut self, dx: f64, dy: f64, now: Instant) {
        if let Some((target, view)) = self.active_view() {
            let edit = Edit::Move {
                x: view.rect.x + dx,
                y: view.rect.y + dy,
            };
            self.edit(&target, edit, now);
        }
    }

    fn grow(&mut self, dw: f64, dh: f64, now: Instant) {
        if let Some((target, view)) = self.active_view() {
            let edit = Edit::Resize {
                width: view.rect.width + dw,
                height: view.rect.height + dh,
            };
            self.edit(&target, edit, now);
        }
    }

    fn step_opacity(&mut self, delta: f32, now: Instant) {
        if let Some((target, view)) = self.active_view() {
            // Round to the step so repeated presses land on tenths.
            let next = ((view.opacity + delta) * 10.0).round() / 10.0;
            self.edit(&target, Edit::Opacity(next), now);
        }
    }

    fn zoom(&mut self, delta: i32, now: Instant) {
        let Some(Target::Window(id)) = self.active() else {
            return;
        };
        let Some(mut content) = self.shell.content(&id).cloned() else {
            return;
        };
        if editor::zoom_by(&mut content, delta) {
            self.shell.update_window_content(&id, content, now);
        }
    }

    /// Edge band used for terminal hit testing. The pointer is reported at
    /// cell centres, so the band has to reach the centre of a border cell.
    fn edge_band(&self) -> f64 {
        let half_cell = self.scale.col_px.max(self.scale.row_px) / 2.0 + 0.5;
        RESIZE_EDGE_THRESHOLD.max(half_cell)
    }

    /// Topmost panel under the pointer. Widgets sit above windows.
    fn hit(&self, x: f64, y: f64) -> Option<(Target, FloatRect, HitZone)> {
        let band = self.edge_band();
        let widgets = self.shell.widgets();
        for widget in widgets.draw_order().into_iter().rev() {
            if let Some(zone) = hit_zone(widget.rect, x, y, band) {
                return Some((Target::Widget(widget.id.clone()), widget.rect, zone));
            }
        }
        let windows = self.shell.windows();
        for window in windows.draw_order().into_iter().rev() {
            if let Some(zone) = hit_zone(window.rect, x, y, band) {
                return Some((Target::Window(window.id.clone()), window.rect, zone));
            }
        }
        None
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) {
        let (x, y) = self
            .scale
            .to_logical(mouse.column, mouse.row, self.panel_area());
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let Some((target, rect, zone)) = self.hit(x, y) else {
                    return;
                };
                self.focus(&target, now);
                let kind = match zone {
                    // The top border doubles as the title bar.
                    HitZone::Edge(ResizeEdge::Top) => DragKind::Move(MoveDrag::new(rect, x, y)),
                    HitZone::Edge(edge) => DragKind::Resize(ResizeDrag::new(edge, rect, x, y)),
                    HitZone::Interior => return,
                };
                self.drag = Some(Drag { target, kind });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(drag) = &self.drag else {
                    return;
                };
                let Some(view) = self.view(&drag.target) else {
                    self.drag = None;
                    return;
                };
                let rect = match drag.kind {
                    DragKind::Move(m) => {
                        let (nx, ny) = m.apply(x, y);
                        FloatRect::new(nx, ny, view.rect.width, view.rect.height)
                    }
                    DragKind::Resize(r) => r.apply(x, y, Self::min_size(&drag.target)),
                };
                let commit = Commit {
                    target: drag.target.clone(),
                    rect,
                };
                self.pending.push(commit);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.take().is_some() {
                    self.commit(now);
                }
            }
            _ => {}
        }
    }

    /// Apply the latest drag geometry, if any, as at most one move and one
    /// resize.
    fn commit(&mut self, now: Instant) {
        let Some(Commit { target, rect }) = self.pending.take() else {
            return;
        };
        let Some(view) = self.view(&target) else {
            return;
        };
        if view.rect.width != rect.width || view.rect.height != rect.height {
            let edit = Edit::Resize {
                width: rect.width,
                height: rect.height,
            };
            self.edit(&target, edit, now);
        }
        if view.rect.x != rect.x || view.rect.y != rect.y {
            self.edit(&target, Edit::Move { x: rect.x, y: rect.y }, now);
        }
    }

    /// Called on every loop wake-up. Commits pending drag geometry once per
    /// frame and runs due saves. Returns whether a frame should be drawn.
    pub fn on_wake(&mut self, now: Instant) -> bool {
        let due = self
            .last_frame
            .is_none_or(|last| now.saturating_duration_since(last) >= self.frame_budget);
        if due {
            self.commit(now);
            self.last_frame = Some(now);
        }
        self.shell.tick(now);
        due
    }

    pub fn next_wake(&self) -> Option<Instant> {
        let frame = self
            .pending
            .is_pending()
            .then(|| self.last_frame.map(|last| last + self.frame_budget))
            .flatten();
        match (frame, self.shell.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn context(&self, target: Target, view: PanelView) -> ComponentContext {
        let focused = self.active().as_ref() == Some(&target);
        ComponentContext::new(focused)
            .with_opacity(view.opacity)
            .with_transparent(view.transparent)
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) {
        self.set_area(frame.area());
        let panel_area = self.panel_area();
        let status_area = self.status_area();
        let mut ui = UiFrame::new(frame);

        let overlay = self.shell.overlay();
        if overlay.overlay_visible() {
            if overlay.mode() == OverlayMode::Fullscreen {
                let backdrop = Block::default().style(Style::default().bg(Color::Black));
                ui.render_widget(backdrop, panel_area);
            }
            self.render_windows(&mut ui, panel_area);
            self.render_widgets(&mut ui, panel_area);
        }

        let mut status = self.status_bar();
        status.render(&mut ui, status_area, &ComponentContext::default());

        if self.shell.overlay().help_visible() {
            self.help
                .render(&mut ui, panel_area, &ComponentContext::default());
        }
    }

    fn render_windows(&self, ui: &mut UiFrame<'_>, area: Rect) {
        let windows = self.shell.windows();
        for window in windows.draw_order() {
            let Some(cells) = self.scale.to_cells(window.rect, area) else {
                continue;
            };
            let ctx = self.context(Target::Window(window.id.clone()), PanelView::from(window));
            let title = window
                .title
                .as_deref()
                .unwrap_or(window.content_type.title());
            PanelFrame::new(title).render(ui, cells, &ctx);
            ContentView::new(window.content_type, self.shell.content(&window.id))
                .unreadable(self.shell.stored_raw(&window.id).is_some())
                .render(ui, PanelFrame::inner(cells), &ctx);
        }
    }

    fn render_widgets(&self, ui: &mut UiFrame<'_>, area: Rect) {
        let wall = Local::now();
        let now = Instant::now();
        let widgets = self.shell.widgets();
        for widget in widgets.draw_order() {
            let Some(cells) = self.scale.to_cells(widget.rect, area) else {
                continue;
            };
            let view = PanelView::from(widget);
            let ctx = self.context(Target::Widget(widget.id.clone()), view);
            PanelFrame::new(widget.content_type.title()).render(ui, cells, &ctx);
            let inner = PanelFrame::inner(cells);
            match widget.content_type {
                WidgetType::Clock => ClockWidget::new(wall, view.flipped).render(ui, inner, &ctx),
                WidgetType::Timer => SessionTimerWidget::new(
                    now.saturating_duration_since(self.session_started),
                    view.flipped,
                )
                .render(ui, inner, &ctx),
                WidgetType::Chronometer => {
                    ChronometerWidget::new(&self.chronometer, now, view.flipped)
                        .render(ui, inner, &ctx)
                }
            }
        }
    }

    pub fn chronometer(&self) -> &Chronometer {
        &self.chronometer
    }

    fn status_bar(&self) -> StatusBar {
        let overlay = self.shell.overlay();
        let mut bar = StatusBar::new();
        bar.set_style(Style::default().add_modifier(Modifier::REVERSED));
        let left = if overlay.overlay_visible() {
            let mode = match overlay.mode() {
                OverlayMode::Windowed => "windowed",
                OverlayMode::Fullscreen => "fullscreen",
            };
            format!(
                " {} | {mode} | {} window(s) {} widget(s)",
                env!("CARGO_PKG_NAME"),
                self.shell.windows().len(),
                self.shell.widgets().len(),
            )
        } else {
            format!(
                " overlay hidden, {} to show",
                self.bindings
                    .combos_for(ShellAction::ToggleOverlayVisible)
                    .join("/")
            )
        };
        bar.set_left(left);
        let pending = self.shell.policy().next_deadline().is_some();
        bar.set_right(if pending { "saving... " } else { "F1 help " });
        bar
    }
}

/// Drive `app` until it quits. Mouse capture follows the overlay state.
pub fn run<S, D, O>(app: &mut App<S>, input: D, output: &mut O) -> io::Result<()>
where
    S: PersistSink,
    D: InputDriver,
    O: OutputDriver,
{
    output.enter()?;
    let mut event_loop = EventLoop::new(input, IDLE_INTERVAL);
    event_loop
        .driver()
        .set_mouse_capture(app.shell().overlay().mouse_capture_enabled())?;

    let result = event_loop.run(|driver, event| {
        let now = Instant::now();
        match event {
            Some(event) => app.handle_event(&event, now),
            None => {
                if app.on_wake(now) {
                    output.draw(|frame| app.render(frame))?;
                }
            }
        }
        if let Some(enabled) = app.shell_mut().overlay_mut().take_mouse_capture_change() {
            driver.set_mouse_capture(enabled)?;
        }
        if app.should_quit() {
            return Ok(ControlFlow::Quit);
        }
        Ok(ControlFlow::Continue(app.next_wake()))
    });
    output.exit()?;
    result
}
