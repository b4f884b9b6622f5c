//! Panel identity, kinds and the instances held by a [`Registry`].

mod registry;

pub use registry::{Action, Change, Registry};

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::*;
use crate::layout::{FloatRect, MinSize};

/// Opaque props handed to the hosted content renderer.
pub type ComponentProps = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelId(String);

impl PanelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate an id that is unique for the lifetime of the process:
    /// a millisecond timestamp plus a random suffix.
    pub fn generate(prefix: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{prefix}-{}-{}",
            Utc::now().timestamp_millis(),
            &suffix[..8]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PanelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// What a window hosts. `Test` windows are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowContentType {
    Notes,
    Draw,
    Browser,
    FileViewer,
    Test,
}

impl WindowContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            WindowContentType::Notes => "notes",
            WindowContentType::Draw => "draw",
            WindowContentType::Browser => "browser",
            WindowContentType::FileViewer => "fileviewer",
            WindowContentType::Test => "test",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "notes" => Some(WindowContentType::Notes),
            "draw" => Some(WindowContentType::Draw),
            "browser" => Some(WindowContentType::Browser),
            "fileviewer" => Some(WindowContentType::FileViewer),
            "test" => Some(WindowContentType::Test),
            _ => None,
        }
    }

    pub fn is_persisted(self) -> bool {
        self != WindowContentType::Test
    }

    pub fn title(self) -> &'static str {
        match self {
            WindowContentType::Notes => "Notes",
            WindowContentType::Draw => "Draw",
            WindowContentType::Browser => "Browser",
            WindowContentType::FileViewer => "File Viewer",
            WindowContentType::Test => "Test",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetType {
    Clock,
    Timer,
    Chronometer,
}

impl WidgetType {
    pub fn as_str(self) -> &'static str {
        match self {
            WidgetType::Clock => "clock",
            WidgetType::Timer => "timer",
            WidgetType::Chronometer => "chronometer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clock" => Some(WidgetType::Clock),
            "timer" => Some(WidgetType::Timer),
            "chronometer" => Some(WidgetType::Chronometer),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WidgetType::Clock => "Clock",
            WidgetType::Timer => "Session",
            WidgetType::Chronometer => "Chronometer",
        }
    }
}

/// Static description of a panel kind: its content enum, id prefix and
/// geometry limits.
pub trait PanelKind: 'static {
    type Content: Copy + Eq + fmt::Debug;

    const LABEL: &'static str;
    const ID_PREFIX: &'static str;
    const MIN_SIZE: MinSize;

    fn default_size(content: Self::Content) -> (f64, f64);
    fn default_opacity(content: Self::Content) -> f32;
}

#[derive(Debug, Clone, Copy)]
pub enum WindowKind {}

#[derive(Debug, Clone, Copy)]
pub enum WidgetKind {}

impl PanelKind for WindowKind {
    type Content = WindowContentType;

    const LABEL: &'static str = "window";
    const ID_PREFIX: &'static str = "win";
    const MIN_SIZE: MinSize = MinSize::new(WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT);

    fn default_size(_content: WindowContentType) -> (f64, f64) {
        (WINDOW_DEFAULT_WIDTH, WINDOW_DEFAULT_HEIGHT)
    }

    fn default_opacity(_content: WindowContentType) -> f32 {
        WINDOW_DEFAULT_OPACITY
    }
}

impl PanelKind for WidgetKind {
    type Content = WidgetType;

    const LABEL: &'static str = "widget";
    const ID_PREFIX: &'static str = "wgt";
    const MIN_SIZE: MinSize = MinSize::new(WIDGET_MIN_WIDTH, WIDGET_MIN_HEIGHT);

    fn default_size(content: WidgetType) -> (f64, f64) {
        match content {
            WidgetType::Clock | WidgetType::Timer | WidgetType::Chronometer => {
                (WIDGET_DEFAULT_WIDTH, WIDGET_DEFAULT_HEIGHT)
            }
        }
    }

    fn default_opacity(content: WidgetType) -> f32 {
        match content {
            WidgetType::Clock => CLOCK_WIDGET_OPACITY,
            WidgetType::Timer | WidgetType::Chronometer => TIME_WIDGET_OPACITY,
        }
    }
}

/// Descriptor carried by an `open` event. Unset fields fall back to the
/// kind's defaults when the registry creates the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRequest<C> {
    pub id: Option<PanelId>,
    pub content_type: C,
    pub title: Option<String>,
    pub component_props: ComponentProps,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub opacity: Option<f32>,
    pub background_transparent: bool,
}

impl<C> OpenRequest<C> {
    pub fn new(content_type: C) -> Self {
        Self {
            id: None,
            content_type,
            title: None,
            component_props: ComponentProps::new(),
            x: None,
            y: None,
            width: None,
            height: None,
            opacity: None,
            background_transparent: false,
        }
    }

    pub fn with_id(mut self, id: PanelId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_background_transparent(mut self, transparent: bool) -> Self {
        self.background_transparent = transparent;
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.component_props.insert(key.into(), value);
        self
    }
}

pub type WindowOpenRequest = OpenRequest<WindowContentType>;
pub type WidgetOpenRequest = OpenRequest<WidgetType>;

/// A live panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<C> {
    pub id: PanelId,
    pub content_type: C,
    pub title: Option<String>,
    pub component_props: ComponentProps,
    pub rect: FloatRect,
    pub z_index: u32,
    pub opacity: f32,
    pub background_transparent: bool,
    /// Widget settings face is showing. Runtime only, never persisted.
    pub flipped: bool,
}

pub type WindowInstance = Panel<WindowContentType>;
pub type WidgetInstance = Panel<WidgetType>;

/// Clamp an opacity into `[0, 1]`; `None` for NaN.
pub fn clamp_opacity(opacity: f32) -> Option<f32> {
    if opacity.is_nan() {
        None
    } else {
        Some(opacity.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_prefixed_and_distinct() {
        let a = PanelId::generate("win");
        let b = PanelId::generate("win");
        assert!(a.as_str().starts_with("win-"));
        assert_ne!(a, b);
    }

    #[test]
    fn content_type_names_round_trip() {
        for ct in [
            WindowContentType::Notes,
            WindowContentType::Draw,
            WindowContentType::Browser,
            WindowContentType::FileViewer,
            WindowContentType::Test,
        ] {
            assert_eq!(WindowContentType::parse(ct.as_str()), Some(ct));
            let json = serde_json::to_string(&ct).unwrap();
            assert_eq!(json, format!("\"{}\"", ct.as_str()));
        }
        assert_eq!(WindowContentType::parse("clock"), None);
        assert!(!WindowContentType::Test.is_persisted());
    }

    #[test]
    fn opacity_clamps_and_rejects_nan() {
        assert_eq!(clamp_opacity(1.7), Some(1.0));
        assert_eq!(clamp_opacity(-0.2), Some(0.0));
        assert_eq!(clamp_opacity(0.4), Some(0.4));
        assert_eq!(clamp_opacity(f32::NAN), None);
    }
}
