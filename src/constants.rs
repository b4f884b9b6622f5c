//! Shared crate-wide constants.

use std::time::Duration;

/// Schema version written into every persisted layout record.
///
/// A loaded layout whose version differs from this value is discarded
/// wholesale during hydration. There is no field-level migration.
pub const CURRENT_STATE_VERSION: u32 = 1;

/// Default delay applied to continuous changes (drag-move, live resize,
/// content edits) before they are written to disk.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Width of the band, in logical pixels, measured inward from each edge of a
/// panel in which a pointer press starts a resize instead of a move.
pub const RESIZE_EDGE_THRESHOLD: f64 = 8.0;

/// Viewport assumed when a panel is opened without explicit coordinates and
/// no host viewport has been reported yet.
pub const FALLBACK_VIEWPORT_WIDTH: f64 = 800.0;
pub const FALLBACK_VIEWPORT_HEIGHT: f64 = 600.0;

pub const WINDOW_MIN_WIDTH: f64 = 200.0;
pub const WINDOW_MIN_HEIGHT: f64 = 150.0;
pub const WINDOW_DEFAULT_WIDTH: f64 = 400.0;
pub const WINDOW_DEFAULT_HEIGHT: f64 = 300.0;
pub const WINDOW_DEFAULT_OPACITY: f32 = 0.6;

pub const WIDGET_MIN_WIDTH: f64 = 80.0;
pub const WIDGET_MIN_HEIGHT: f64 = 60.0;
pub const WIDGET_DEFAULT_WIDTH: f64 = 200.0;
pub const WIDGET_DEFAULT_HEIGHT: f64 = 80.0;
pub const WIDGET_DEFAULT_OPACITY: f32 = 0.6;

/// Clock widgets start slightly more opaque than other widgets so the
/// digits stay legible over busy backgrounds.
pub const CLOCK_WIDGET_OPACITY: f32 = 0.8;
/// Session timer and chronometer widgets use the clock's legibility setting.
pub const TIME_WIDGET_OPACITY: f32 = CLOCK_WIDGET_OPACITY;

/// Zoom bounds (percent) shared by the browser and file viewer payloads.
pub const ZOOM_MIN: u32 = 10;
pub const ZOOM_MAX: u32 = 200;

pub const BROWSER_DEFAULT_URL: &str = "https://example.com";
pub const BROWSER_DEFAULT_ZOOM: u32 = 50;
pub const FILE_VIEWER_DEFAULT_ZOOM: u32 = 100;

/// Logical pixels covered by one terminal column / row in the terminal host.
pub const CELL_WIDTH_PX: f64 = 10.0;
pub const CELL_HEIGHT_PX: f64 = 20.0;
