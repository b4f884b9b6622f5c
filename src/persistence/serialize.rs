//! Live registry state to persisted records.

use chrono::{SecondsFormat, Utc};

use super::{
    GlobalSettings, PersistedState, Position, Size, WidgetStructure, WindowContent,
    WindowContentFile, WindowFlags, WindowStructure,
};
use crate::constants::CURRENT_STATE_VERSION;
use crate::error::{PersistError, PersistResult};
use crate::layout::FloatRect;
use crate::panel::{PanelId, Registry, WidgetInstance, WidgetKind, WindowInstance, WindowKind};

pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn rounded(rect: &FloatRect) -> (Position, Size) {
    (
        Position {
            x: rect.x.round(),
            y: rect.y.round(),
        },
        Size {
            width: rect.width.round(),
            height: rect.height.round(),
        },
    )
}

/// `None` for content types that are never persisted.
pub fn window_structure(window: &WindowInstance) -> Option<WindowStructure> {
    if !window.content_type.is_persisted() {
        return None;
    }
    let (position, size) = rounded(&window.rect);
    Some(WindowStructure {
        id: window.id.clone(),
        kind: window.content_type.as_str().to_string(),
        title: window.title.clone(),
        position,
        size,
        z_index: window.z_index,
        flags: WindowFlags::default(),
        opacity: window.opacity,
        background_transparent: window.background_transparent,
    })
}

pub fn widget_structure(widget: &WidgetInstance) -> WidgetStructure {
    let (position, size) = rounded(&widget.rect);
    WidgetStructure {
        id: widget.id.clone(),
        kind: widget.content_type.as_str().to_string(),
        position,
        size,
        z_index: widget.z_index,
        opacity: widget.opacity,
    }
}

pub fn serialize_state(
    global: GlobalSettings,
    windows: &Registry<WindowKind>,
    widgets: &Registry<WidgetKind>,
) -> PersistedState {
    PersistedState {
        version: CURRENT_STATE_VERSION,
        last_modified: timestamp(),
        global,
        windows: windows.iter().filter_map(window_structure).collect(),
        widgets: widgets.iter().map(widget_structure).collect(),
    }
}

pub fn content_file(id: &PanelId, content: &WindowContent) -> PersistResult<WindowContentFile> {
    let value = content.to_value().map_err(|source| PersistError::Encode {
        what: "window content",
        source,
    })?;
    Ok(WindowContentFile {
        window_id: id.clone(),
        content_type: content.content_type(),
        content: value,
        last_modified: timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{OpenRequest, WidgetType, WindowContentType};
    use crate::persistence::{BrowserContent, OverlayMode};

    #[test]
    fn test_windows_are_not_serialized() {
        let mut windows = Registry::<WindowKind>::new();
        windows.open(OpenRequest::new(WindowContentType::Test));
        let (notes, _) = windows.open(
            OpenRequest::new(WindowContentType::Notes)
                .at(10.4, 20.6)
                .sized(300.5, 200.2),
        );
        let mut widgets = Registry::<WidgetKind>::new();
        widgets.open(OpenRequest::new(WidgetType::Clock));

        let global = GlobalSettings {
            overlay_mode: OverlayMode::Fullscreen,
            overlay_visible: true,
        };
        let state = serialize_state(global, &windows, &widgets);
        assert_eq!(state.version, CURRENT_STATE_VERSION);
        assert_eq!(state.global, global);
        assert_eq!(state.windows.len(), 1);
        let window = &state.windows[0];
        assert_eq!(window.id, notes);
        assert_eq!(window.kind, "notes");
        assert_eq!(window.position, Position { x: 10.0, y: 21.0 });
        assert_eq!(
            window.size,
            Size {
                width: 301.0,
                height: 200.0
            }
        );
        assert_eq!(window.z_index, 2);
        assert_eq!(state.widgets[0].kind, "clock");
        assert!(!state.last_modified.is_empty());
    }

    #[test]
    fn content_file_tags_type_and_id() {
        let file = content_file(
            &"b1".into(),
            &WindowContent::Browser(BrowserContent::default()),
        )
        .unwrap();
        assert_eq!(file.window_id.as_str(), "b1");
        assert_eq!(file.content_type, WindowContentType::Browser);
        assert_eq!(file.content["zoom"], 50);
    }
}
