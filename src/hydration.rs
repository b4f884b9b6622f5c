//! One-shot startup load that turns persisted records back into open
//! requests.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::constants::CURRENT_STATE_VERSION;
use crate::panel::{
    OpenRequest, PanelId, Registry, WidgetKind, WidgetOpenRequest, WidgetType, WindowContentType,
    WindowKind, WindowOpenRequest,
};
use crate::persistence::{
    GlobalSettings, PersistenceService, WidgetStructure, WindowContentFile, WindowStructure,
};

/// What startup should restore.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationResult {
    pub global: GlobalSettings,
    /// Windows to reopen, bottom-most first.
    pub windows: Vec<WindowOpenRequest>,
    /// Widgets to reopen, bottom-most first.
    pub widgets: Vec<WidgetOpenRequest>,
    pub window_contents: HashMap<PanelId, WindowContentFile>,
    pub error: Option<String>,
    /// The stored layout had a different schema version and was discarded.
    pub was_reset: bool,
}

impl HydrationResult {
    /// Stored content for a restored window, if any.
    pub fn content_for(&self, id: &PanelId) -> Option<&WindowContentFile> {
        self.window_contents.get(id)
    }

    /// Reopen every restored panel. Opening in stored stack order keeps the
    /// relative z-order while renumbering from 1.
    pub fn seed(&self, windows: &mut Registry<WindowKind>, widgets: &mut Registry<WidgetKind>) {
        for request in &self.windows {
            windows.open(request.clone());
        }
        for request in &self.widgets {
            widgets.open(request.clone());
        }
    }
}

pub fn hydrate(service: &impl PersistenceService) -> HydrationResult {
    let loaded = service.load_state();
    if !loaded.success {
        let error = loaded
            .error
            .unwrap_or_else(|| "failed to load persisted state".to_string());
        warn!("hydration failed, starting empty: {error}");
        return HydrationResult {
            error: Some(error),
            ..HydrationResult::default()
        };
    }

    let Some(state) = loaded.state else {
        info!("no persisted layout, starting empty");
        return HydrationResult::default();
    };

    if state.version != CURRENT_STATE_VERSION {
        info!(
            found = state.version,
            expected = CURRENT_STATE_VERSION,
            "persisted layout has a different version, resetting"
        );
        return HydrationResult {
            was_reset: true,
            ..HydrationResult::default()
        };
    }

    let window_contents: HashMap<_, _> = loaded
        .window_contents
        .into_iter()
        .map(|file| (file.window_id.clone(), file))
        .collect();

    let mut windows: Vec<_> = state.windows.iter().filter_map(window_request).collect();
    windows.sort_by_key(|(z, _)| *z);
    let mut widgets: Vec<_> = state.widgets.iter().filter_map(widget_request).collect();
    widgets.sort_by_key(|(z, _)| *z);

    let result = HydrationResult {
        global: state.global,
        windows: windows.into_iter().map(|(_, request)| request).collect(),
        widgets: widgets.into_iter().map(|(_, request)| request).collect(),
        window_contents,
        error: None,
        was_reset: false,
    };
    info!(
        windows = result.windows.len(),
        widgets = result.widgets.len(),
        contents = result.window_contents.len(),
        "hydrated persisted layout"
    );
    result
}

fn window_request(structure: &WindowStructure) -> Option<(u32, WindowOpenRequest)> {
    let Some(content_type) =
        WindowContentType::parse(&structure.kind).filter(|ct| ct.is_persisted())
    else {
        warn!(id = %structure.id, kind = %structure.kind, "skipping window of unknown type");
        return None;
    };
    let mut request = OpenRequest::new(content_type)
        .with_id(structure.id.clone())
        .at(structure.position.x, structure.position.y)
        .sized(structure.size.width, structure.size.height)
        .with_opacity(structure.opacity)
        .with_background_transparent(structure.background_transparent);
    request.title = structure.title.clone();
    Some((structure.z_index, request))
}

fn widget_request(structure: &WidgetStructure) -> Option<(u32, WidgetOpenRequest)> {
    let Some(widget_type) = WidgetType::parse(&structure.kind) else {
        warn!(id = %structure.id, kind = %structure.kind, "skipping widget of unknown type");
        return None;
    };
    let request = OpenRequest::new(widget_type)
        .with_id(structure.id.clone())
        .at(structure.position.x, structure.position.y)
        .sized(structure.size.width, structure.size.height)
        .with_opacity(structure.opacity);
    Some((structure.z_index, request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{
        DeleteResult, LoadStateResult, OverlayMode, PersistedState, Position, SaveResult, Size,
        WindowFlags,
    };
    use serde_json::json;

    struct Fixed(LoadStateResult);

    impl PersistenceService for Fixed {
        fn load_state(&self) -> LoadStateResult {
            self.0.clone()
        }

        fn save_state(&self, _state: &PersistedState) -> SaveResult {
            SaveResult::ok()
        }

        fn save_window_content(&self, _id: &PanelId, _content: &WindowContentFile) -> SaveResult {
            SaveResult::ok()
        }

        fn delete_window_content(&self, _id: &PanelId) -> DeleteResult {
            DeleteResult::default()
        }
    }

    fn window(id: &str, kind: &str, z: u32) -> WindowStructure {
        WindowStructure {
            id: id.into(),
            kind: kind.into(),
            title: None,
            position: Position { x: 5.0, y: 6.0 },
            size: Size {
                width: 320.0,
                height: 240.0,
            },
            z_index: z,
            flags: WindowFlags::default(),
            opacity: 0.9,
            background_transparent: false,
        }
    }

    fn loaded(state: PersistedState, contents: Vec<WindowContentFile>) -> Fixed {
        Fixed(LoadStateResult {
            success: true,
            state: Some(state),
            window_contents: contents,
            error: None,
        })
    }

    #[test]
    fn version_mismatch_resets_everything() {
        let state: PersistedState = serde_json::from_value(json!({ "version": 0 })).unwrap();
        let content = WindowContentFile {
            window_id: "a".into(),
            content_type: WindowContentType::Notes,
            content: json!({ "type": "doc", "content": [] }),
            last_modified: String::new(),
        };
        let result = hydrate(&loaded(state, vec![content]));
        assert!(result.was_reset);
        assert!(result.windows.is_empty());
        assert!(result.window_contents.is_empty());
        assert!(result.error.is_none());
    }

    #[test]
    fn load_failure_is_reported() {
        let result = hydrate(&Fixed(LoadStateResult {
            success: false,
            error: Some("disk on fire".into()),
            ..LoadStateResult::default()
        }));
        assert_eq!(result.error.as_deref(), Some("disk on fire"));
        assert!(!result.was_reset);
        assert_eq!(result, HydrationResult {
            error: Some("disk on fire".into()),
            ..HydrationResult::default()
        });
    }

    #[test]
    fn windows_restore_in_stack_order_and_skip_unknown_types() {
        let state = PersistedState {
            global: GlobalSettings {
                overlay_mode: OverlayMode::Fullscreen,
                overlay_visible: true,
            },
            windows: vec![
                window("top", "browser", 9),
                window("legacy", "clock", 4),
                window("bottom", "notes", 2),
                window("scratch", "test", 1),
            ],
            ..PersistedState::default()
        };
        let result = hydrate(&loaded(state, Vec::new()));
        let ids: Vec<_> = result
            .windows
            .iter()
            .map(|r| r.id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec![PanelId::from("bottom"), PanelId::from("top")]);
        assert_eq!(result.global.overlay_mode, OverlayMode::Fullscreen);

        let mut windows = Registry::<WindowKind>::new();
        let mut widgets = Registry::<WidgetKind>::new();
        result.seed(&mut windows, &mut widgets);
        assert_eq!(windows.top().unwrap().id.as_str(), "top");
        let bottom = windows.get(&"bottom".into()).unwrap();
        assert_eq!(bottom.z_index, 1);
        assert_eq!(bottom.rect.width, 320.0);
        assert_eq!(bottom.opacity, 0.9);
    }

    #[test]
    fn every_widget_type_is_restored() {
        let widget = |id: &str, kind: &str, z: u32| WidgetStructure {
            id: id.into(),
            kind: kind.into(),
            position: Position { x: 1.0, y: 2.0 },
            size: Size {
                width: 200.0,
                height: 80.0,
            },
            z_index: z,
            opacity: 0.7,
        };
        let state = PersistedState {
            widgets: vec![
                widget("c", "chronometer", 3),
                widget("t", "timer", 2),
                widget("k", "clock", 1),
                widget("x", "weather", 4),
            ],
            ..PersistedState::default()
        };
        let result = hydrate(&loaded(state, Vec::new()));
        let types: Vec<_> = result.widgets.iter().map(|r| r.content_type).collect();
        assert_eq!(types, vec![
            WidgetType::Clock,
            WidgetType::Timer,
            WidgetType::Chronometer
        ]);
    }

    #[test]
    fn old_schema_record_from_disk_is_reset() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = crate::persistence::FileStore::new(dir.path());
        std::fs::write(
            store.state_path(),
            r#"{"version":0,"windows":[{"id":"w1"}]}"#,
        )
        .unwrap();
        let result = hydrate(&store);
        assert!(result.was_reset);
        assert!(result.error.is_none());
    }

    #[test]
    fn missing_content_is_tolerated() {
        let state = PersistedState {
            windows: vec![window("a", "notes", 1), window("b", "draw", 2)],
            ..PersistedState::default()
        };
        let content = WindowContentFile {
            window_id: "b".into(),
            content_type: WindowContentType::Draw,
            content: json!({ "elements": [] }),
            last_modified: String::new(),
        };
        let result = hydrate(&loaded(state, vec![content]));
        assert_eq!(result.windows.len(), 2);
        assert!(result.content_for(&"a".into()).is_none());
        assert!(result.content_for(&"b".into()).is_some());
    }
}
