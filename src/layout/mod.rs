pub mod floating;

use serde::{Deserialize, Serialize};

/// A panel rectangle in logical pixels.
///
/// The origin is signed and unbounded: panels may be moved partially or
/// entirely off-screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FloatRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FloatRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Half-open containment test: the right and bottom edges are outside.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// Smallest size a panel of a given kind may be resized to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinSize {
    pub width: f64,
    pub height: f64,
}

impl MinSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp each axis independently to its minimum. Non-finite input
    /// collapses to the minimum.
    pub fn clamp(&self, width: f64, height: f64) -> (f64, f64) {
        (clamp_axis(width, self.width), clamp_axis(height, self.height))
    }
}

fn clamp_axis(value: f64, min: f64) -> f64 {
    if value.is_finite() { value.max(min) } else { min }
}

/// Size of the surface the panels live on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::constants::FALLBACK_VIEWPORT_WIDTH,
            height: crate::constants::FALLBACK_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    /// Origin that centres a `width` x `height` panel, never negative.
    pub fn centered_origin(&self, width: f64, height: f64) -> (f64, f64) {
        (
            ((self.width - width) / 2.0).max(0.0),
            ((self.height - height) / 2.0).max(0.0),
        )
    }
}
