use crate::persistence::{GlobalSettings, OverlayMode};

/// Overlay-wide flags. Mode and visibility are persisted; the rest only
/// lives for the session.
#[derive(Debug, Default, Clone, Copy)]
pub struct OverlayState {
    mode: OverlayMode,
    visible: bool,
    global_dirty: bool,
    mouse_capture_enabled: bool,
    mouse_capture_dirty: bool,
    help_visible: bool,
}

impl OverlayState {
    pub fn new() -> Self {
        Self {
            mode: OverlayMode::Windowed,
            visible: true,
            global_dirty: false,
            mouse_capture_enabled: true,
            mouse_capture_dirty: false,
            help_visible: false,
        }
    }

    /// Start from restored settings without marking them as changed.
    pub fn from_global(global: GlobalSettings) -> Self {
        Self {
            mode: global.overlay_mode,
            visible: global.overlay_visible,
            ..Self::new()
        }
    }

    pub fn global(&self) -> GlobalSettings {
        GlobalSettings {
            overlay_mode: self.mode,
            overlay_visible: self.visible,
        }
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: OverlayMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.global_dirty = true;
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn overlay_visible(&self) -> bool {
        self.visible
    }

    pub fn set_overlay_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.global_dirty = true;
    }

    pub fn toggle_overlay_visible(&mut self) {
        self.set_overlay_visible(!self.visible);
    }

    /// The persisted settings, once per change.
    pub fn take_global_change(&mut self) -> Option<GlobalSettings> {
        if self.global_dirty {
            self.global_dirty = false;
            Some(self.global())
        } else {
            None
        }
    }

    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_capture_enabled
    }

    pub fn set_mouse_capture_enabled(&mut self, enabled: bool) {
        if self.mouse_capture_enabled == enabled {
            return;
        }
        self.mouse_capture_enabled = enabled;
        self.mouse_capture_dirty = true;
    }

    pub fn toggle_mouse_capture(&mut self) {
        let enabled = !self.mouse_capture_enabled;
        self.set_mouse_capture_enabled(enabled);
    }

    pub fn take_mouse_capture_change(&mut self) -> Option<bool> {
        if self.mouse_capture_dirty {
            self.mouse_capture_dirty = false;
            Some(self.mouse_capture_enabled)
        } else {
            None
        }
    }

    pub fn help_visible(&self) -> bool {
        self.help_visible
    }

    pub fn toggle_help(&mut self) {
        self.help_visible = !self.help_visible;
    }
}
