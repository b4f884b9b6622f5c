//! Shared component rendering context
//!
//! `ComponentContext` carries the per-panel display state components need
//! while drawing, so the `Component` trait stays free of ad-hoc boolean
//! parameters.

/// - `focused`: the panel is the active one and receives typed input.
/// - `opacity`: panel opacity in `[0, 1]`; low values render dimmed.
/// - `transparent`: the panel background is not cleared before drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentContext {
    focused: bool,
    opacity: f32,
    transparent: bool,
}

/// Below this opacity a panel is drawn with the dim modifier.
const DIM_BELOW: f32 = 0.5;

impl ComponentContext {
    pub const fn new(focused: bool) -> Self {
        Self {
            focused,
            opacity: 1.0,
            transparent: false,
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn dimmed(&self) -> bool {
        self.opacity < DIM_BELOW
    }

    pub const fn transparent(&self) -> bool {
        self.transparent
    }

    pub const fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub const fn with_transparent(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }
}

impl Default for ComponentContext {
    fn default() -> Self {
        Self::new(false)
    }
}
