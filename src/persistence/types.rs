//! On-disk records: the layout file and one content file per window.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::constants::*;
use crate::panel::{PanelId, WindowContentType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayMode {
    #[default]
    Windowed,
    Fullscreen,
}

impl OverlayMode {
    pub fn toggled(self) -> Self {
        match self {
            OverlayMode::Windowed => OverlayMode::Fullscreen,
            OverlayMode::Fullscreen => OverlayMode::Windowed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub overlay_mode: OverlayMode,
    pub overlay_visible: bool,
}

/// The layout record (`state.json`).
///
/// Everything except `version` defaults when absent, so a record holding
/// nothing but its version still parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub global: GlobalSettings,
    #[serde(default)]
    pub windows: Vec<WindowStructure>,
    #[serde(default)]
    pub widgets: Vec<WidgetStructure>,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: CURRENT_STATE_VERSION,
            last_modified: String::new(),
            global: GlobalSettings::default(),
            windows: Vec::new(),
            widgets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowFlags {
    pub minimized: bool,
    pub maximized: bool,
}

/// Geometry and identity of a window, without any live content.
///
/// `kind` is kept as the raw string so that records naming a retired type
/// can be skipped during hydration instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowStructure {
    pub id: PanelId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: Option<String>,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub z_index: u32,
    #[serde(default)]
    pub flags: WindowFlags,
    #[serde(default = "default_window_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub background_transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetStructure {
    pub id: PanelId,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub size: Size,
    #[serde(default)]
    pub z_index: u32,
    #[serde(default = "default_widget_opacity")]
    pub opacity: f32,
}

fn default_window_opacity() -> f32 {
    WINDOW_DEFAULT_OPACITY
}

fn default_widget_opacity() -> f32 {
    WIDGET_DEFAULT_OPACITY
}

/// One content file (`windows/window-<id>.json`).
///
/// `content` is stored and returned exactly as the hosted renderer produced
/// it. Use [`WindowContent::decode`] to obtain a typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowContentFile {
    pub window_id: PanelId,
    #[serde(rename = "type")]
    pub content_type: WindowContentType,
    pub content: Value,
    #[serde(default)]
    pub last_modified: String,
}

/// A single node of a rich-text document tree. Keys this shell does not
/// interpret are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteNode {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<NoteNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attrs: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NoteNode {
    fn new(node_type: &str) -> Self {
        Self {
            node_type: node_type.to_string(),
            content: None,
            text: None,
            marks: None,
            attrs: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesContent {
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub content: Vec<NoteNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotesContent {
    /// Build a document with one paragraph per line.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let content = lines
            .into_iter()
            .map(|line| NoteNode {
                content: (!line.is_empty()).then(|| {
                    vec![NoteNode {
                        text: Some(line.to_string()),
                        ..NoteNode::new("text")
                    }]
                }),
                ..NoteNode::new("paragraph")
            })
            .collect();
        Self {
            doc_type: "doc".to_string(),
            content,
            extra: Map::new(),
        }
    }

    /// Flatten the document back to one line per top-level block.
    pub fn to_lines(&self) -> Vec<String> {
        fn collect(node: &NoteNode, out: &mut String) {
            if let Some(text) = &node.text {
                out.push_str(text);
            }
            for child in node.content.iter().flatten() {
                collect(child, out);
            }
        }
        self.content
            .iter()
            .map(|block| {
                let mut line = String::new();
                collect(block, &mut line);
                line
            })
            .collect()
    }
}

/// Canvas view settings. Every key is optional; the ones not named here
/// land in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawAppState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_background_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawContent {
    #[serde(default)]
    pub elements: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_state: Option<DrawAppState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DrawContent {
    pub fn empty() -> Self {
        Self {
            elements: Vec::new(),
            app_state: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserContent {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_browser_zoom", deserialize_with = "zoom_from_number")]
    pub zoom: u32,
}

fn default_browser_zoom() -> u32 {
    BROWSER_DEFAULT_ZOOM
}

impl Default for BrowserContent {
    fn default() -> Self {
        Self {
            url: BROWSER_DEFAULT_URL.to_string(),
            zoom: BROWSER_DEFAULT_ZOOM,
        }
    }
}

impl BrowserContent {
    /// Fill in an empty URL and clamp the zoom.
    pub fn normalized(mut self) -> Self {
        if self.url.trim().is_empty() {
            self.url = BROWSER_DEFAULT_URL.to_string();
        }
        self.zoom = clamp_zoom(self.zoom);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Markdown,
    #[default]
    Unknown,
}

impl FileType {
    pub fn detect(path: &str) -> Self {
        let ext = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("pdf") => FileType::Pdf,
            Some("md" | "markdown") => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileViewerContent {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_type: FileType,
    #[serde(default = "default_file_viewer_zoom", deserialize_with = "zoom_from_number")]
    pub zoom: u32,
}

fn default_file_viewer_zoom() -> u32 {
    FILE_VIEWER_DEFAULT_ZOOM
}

impl Default for FileViewerContent {
    fn default() -> Self {
        Self {
            file_path: String::new(),
            file_type: FileType::Unknown,
            zoom: FILE_VIEWER_DEFAULT_ZOOM,
        }
    }
}

impl FileViewerContent {
    pub fn open(path: impl Into<String>) -> Self {
        let file_path = path.into();
        Self {
            file_type: FileType::detect(&file_path),
            file_path,
            zoom: FILE_VIEWER_DEFAULT_ZOOM,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.zoom = clamp_zoom(self.zoom);
        self
    }
}

pub fn clamp_zoom(zoom: u32) -> u32 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

/// Zoom is stored as a plain JSON number. Fractions round and anything out
/// of range clamps, so an odd zoom never costs the rest of the payload.
fn zoom_from_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    Ok(raw.round().clamp(f64::from(ZOOM_MIN), f64::from(ZOOM_MAX)) as u32)
}

/// Typed view of a content payload.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowContent {
    Notes(NotesContent),
    Draw(DrawContent),
    Browser(BrowserContent),
    FileViewer(FileViewerContent),
}

impl WindowContent {
    pub fn content_type(&self) -> WindowContentType {
        match self {
            WindowContent::Notes(_) => WindowContentType::Notes,
            WindowContent::Draw(_) => WindowContentType::Draw,
            WindowContent::Browser(_) => WindowContentType::Browser,
            WindowContent::FileViewer(_) => WindowContentType::FileViewer,
        }
    }

    /// Fresh payload for a newly opened window. `props` may seed the
    /// browser `url` or the file viewer `filePath`.
    pub fn initial(
        content_type: WindowContentType,
        props: &serde_json::Map<String, Value>,
    ) -> Option<Self> {
        let prop = |key: &str| props.get(key).and_then(Value::as_str);
        match content_type {
            WindowContentType::Notes => Some(WindowContent::Notes(NotesContent::from_lines([]))),
            WindowContentType::Draw => Some(WindowContent::Draw(DrawContent::empty())),
            WindowContentType::Browser => Some(WindowContent::Browser(
                BrowserContent {
                    url: prop("url").unwrap_or_default().to_string(),
                    zoom: BROWSER_DEFAULT_ZOOM,
                }
                .normalized(),
            )),
            WindowContentType::FileViewer => Some(WindowContent::FileViewer(
                prop("filePath")
                    .map(FileViewerContent::open)
                    .unwrap_or_default(),
            )),
            WindowContentType::Test => None,
        }
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            WindowContent::Notes(c) => serde_json::to_value(c),
            WindowContent::Draw(c) => serde_json::to_value(c),
            WindowContent::Browser(c) => serde_json::to_value(c),
            WindowContent::FileViewer(c) => serde_json::to_value(c),
        }
    }

    /// Decode the payload of `file` according to its content type. Browser
    /// and file viewer payloads come back normalized.
    pub fn decode(file: &WindowContentFile) -> Option<Self> {
        let value = file.content.clone();
        let decoded = match file.content_type {
            WindowContentType::Notes => serde_json::from_value(value).map(WindowContent::Notes),
            WindowContentType::Draw => serde_json::from_value(value).map(WindowContent::Draw),
            WindowContentType::Browser => serde_json::from_value::<BrowserContent>(value)
                .map(|c| WindowContent::Browser(c.normalized())),
            WindowContentType::FileViewer => serde_json::from_value::<FileViewerContent>(value)
                .map(|c| WindowContent::FileViewer(c.normalized())),
            WindowContentType::Test => return None,
        };
        decoded.ok()
    }
}
