use std::fs;
use std::time::{Duration, Instant};

use overlay_shell::constants::CURRENT_STATE_VERSION;
use overlay_shell::hydration::hydrate;
use overlay_shell::panel::{Action, WidgetOpenRequest, WidgetType, WindowContentType, WindowOpenRequest};
use overlay_shell::persistence::{
    FileStore, InlineSink, NotesContent, OverlayMode, PersistOutcome, PersistSink,
    PersistedState, PersistenceService, PersistenceWorker, WindowContent,
};
use overlay_shell::shell::Shell;
use tempfile::TempDir;

const DEBOUNCE: Duration = Duration::from_millis(500);

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn inline_shell(dir: &TempDir) -> Shell<InlineSink<FileStore>> {
    Shell::new(InlineSink::new(FileStore::new(dir.path())), DEBOUNCE)
}

fn stored_state(dir: &TempDir) -> PersistedState {
    FileStore::new(dir.path())
        .load_state()
        .state
        .expect("layout file written")
}

#[test]
fn layout_and_content_survive_a_restart() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();

    let mut shell = inline_shell(&dir);
    let notes = shell.open_window(
        WindowOpenRequest::new(WindowContentType::Notes)
            .titled("Todo")
            .at(40.4, 60.6)
            .sized(420.0, 310.0),
        t0,
    );
    let browser = shell.open_window(
        WindowOpenRequest::new(WindowContentType::Browser).at(500.0, 80.0),
        t0,
    );
    shell.open_window(WindowOpenRequest::new(WindowContentType::Test), t0);
    let clock = shell.open_widget(WidgetOpenRequest::new(WidgetType::Clock).at(10.0, 10.0), t0);
    shell.update_window_content(
        &notes,
        WindowContent::Notes(NotesContent::from_lines(["milk", "eggs"])),
        t0,
    );
    shell.focus_window(&notes, t0);
    shell.set_overlay_mode(OverlayMode::Fullscreen, t0);
    let outcomes = shell.shutdown();
    assert!(outcomes.iter().all(PersistOutcome::success));

    let state = stored_state(&dir);
    assert_eq!(state.version, CURRENT_STATE_VERSION);
    assert_eq!(state.windows.len(), 2, "test windows are never persisted");
    let stored = state.windows.iter().find(|w| w.id == notes).unwrap();
    assert_eq!(stored.kind, "notes");
    assert_eq!((stored.position.x, stored.position.y), (40.0, 61.0));
    assert_eq!((stored.size.width, stored.size.height), (420.0, 310.0));

    let hydrated = hydrate(&FileStore::new(dir.path()));
    assert!(!hydrated.was_reset);
    assert_eq!(hydrated.global.overlay_mode, OverlayMode::Fullscreen);
    let restored = Shell::from_hydration(
        InlineSink::new(FileStore::new(dir.path())),
        DEBOUNCE,
        &hydrated,
    );
    let windows = restored.windows();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows.top().unwrap().id, notes, "stacking order is kept");
    let win = windows.get(&notes).unwrap();
    assert_eq!(win.title.as_deref(), Some("Todo"));
    assert_eq!((win.rect.x, win.rect.y, win.rect.width, win.rect.height), (40.0, 61.0, 420.0, 310.0));
    assert!(windows.contains(&browser));
    assert!(restored.widgets().contains(&clock));
    drop(windows);

    let Some(WindowContent::Notes(content)) = restored.content(&notes) else {
        panic!("notes content restored");
    };
    assert_eq!(content.to_lines(), vec!["milk", "eggs"]);
    assert!(matches!(restored.content(&browser), Some(WindowContent::Browser(_))));
}

#[test]
fn a_burst_of_moves_is_saved_once_with_the_last_position() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let mut shell = inline_shell(&dir);
    let id = shell.open_window(WindowOpenRequest::new(WindowContentType::Notes), t0);
    let opened_at = stored_state(&dir).windows[0].position;

    for i in 0..5u64 {
        shell.dispatch_window(
            Action::Move {
                id: id.clone(),
                x: 10.0 * (i + 1) as f64,
                y: 20.0,
            },
            t0 + ms(50 * i),
        );
    }
    assert_eq!(shell.tick(t0 + ms(699)), 0);
    assert_eq!(stored_state(&dir).windows[0].position, opened_at);
    assert_eq!(shell.tick(t0 + ms(700)), 1);
    assert_eq!(shell.tick(t0 + ms(5000)), 0);

    let state = stored_state(&dir);
    assert_eq!((state.windows[0].position.x, state.windows[0].position.y), (50.0, 20.0));
}

#[test]
fn closing_cancels_pending_content_and_deletes_once() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let mut shell = inline_shell(&dir);
    let id = shell.open_window(WindowOpenRequest::new(WindowContentType::Notes), t0);

    shell.update_window_content(
        &id,
        WindowContent::Notes(NotesContent::from_lines(["first"])),
        t0,
    );
    shell.tick(t0 + ms(500));
    let content_path = FileStore::new(dir.path()).content_path(&id).unwrap();
    assert!(content_path.exists());

    shell.update_window_content(
        &id,
        WindowContent::Notes(NotesContent::from_lines(["second"])),
        t0 + ms(600),
    );
    shell.sink_mut().drain();
    shell.close_window(&id, t0 + ms(700));

    let outcomes = shell.sink_mut().drain();
    let deletions: Vec<_> = outcomes
        .iter()
        .filter(|o| matches!(o, PersistOutcome::Deleted { .. }))
        .collect();
    assert_eq!(deletions.len(), 1);
    assert!(matches!(
        deletions[0],
        PersistOutcome::Deleted { result, .. } if result.existed
    ));

    assert_eq!(shell.tick(t0 + ms(5000)), 0);
    assert!(!content_path.exists());
    assert!(shell.shutdown().iter().all(|o| !matches!(o, PersistOutcome::Content { .. })));
    assert!(!content_path.exists());
}

#[test]
fn a_layout_from_another_version_is_reset() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    fs::write(
        store.state_path(),
        r#"{"version": 0, "windows": [{"id": "w1"}]}"#,
    )
    .unwrap();

    let hydrated = hydrate(&store);
    assert!(hydrated.was_reset);
    assert!(hydrated.error.is_none());
    assert!(hydrated.windows.is_empty() && hydrated.widgets.is_empty());
    assert_eq!(hydrated.global.overlay_mode, OverlayMode::Windowed);
    assert!(!hydrated.global.overlay_visible);
}

#[test]
fn content_seeded_from_open_props_survives_a_restart() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let mut shell = inline_shell(&dir);
    let id = shell.open_window(
        WindowOpenRequest::new(WindowContentType::Browser)
            .with_prop("url", serde_json::json!("https://docs.rs")),
        t0,
    );
    assert!(FileStore::new(dir.path()).content_path(&id).unwrap().exists());
    assert!(shell.shutdown().iter().all(PersistOutcome::success));

    let hydrated = hydrate(&FileStore::new(dir.path()));
    assert_eq!(hydrated.window_contents.len(), 1);
    let restored = Shell::from_hydration(
        InlineSink::new(FileStore::new(dir.path())),
        DEBOUNCE,
        &hydrated,
    );
    let Some(WindowContent::Browser(browser)) = restored.content(&id) else {
        panic!("browser content restored");
    };
    assert_eq!(browser.url, "https://docs.rs");
}

#[test]
fn a_drawing_with_sparse_app_state_is_restored_and_left_alone() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    let layout = serde_json::json!({
        "version": CURRENT_STATE_VERSION,
        "windows": [{
            "id": "d1",
            "type": "draw",
            "position": { "x": 10, "y": 10 },
            "size": { "width": 400, "height": 300 },
            "zIndex": 1
        }]
    });
    fs::write(store.state_path(), layout.to_string()).unwrap();
    let content_path = store.content_path(&"d1".into()).unwrap();
    fs::create_dir_all(store.windows_dir()).unwrap();
    let stored = r#"{"windowId":"d1","type":"draw","content":{"elements":[{"id":"e1","type":"rectangle","x":0,"y":0}],"appState":{"scrollX":5}},"lastModified":"2026-01-01T00:00:00Z"}"#;
    fs::write(&content_path, stored).unwrap();

    let hydrated = hydrate(&store);
    let shell = Shell::from_hydration(InlineSink::new(store), DEBOUNCE, &hydrated);
    let Some(WindowContent::Draw(draw)) = shell.content(&"d1".into()) else {
        panic!("draw content restored");
    };
    assert_eq!(draw.elements.len(), 1);
    assert_eq!(draw.app_state.as_ref().unwrap().extra["scrollX"], 5);

    assert!(shell.shutdown().is_empty());
    assert_eq!(fs::read_to_string(&content_path).unwrap(), stored);
}

#[test]
fn worker_writes_land_before_shutdown_returns() {
    let dir = TempDir::new().unwrap();
    let t0 = Instant::now();
    let worker = PersistenceWorker::spawn(FileStore::new(dir.path())).unwrap();
    let mut shell = Shell::new(worker, DEBOUNCE);
    let id = shell.open_window(WindowOpenRequest::new(WindowContentType::Draw), t0);
    shell.dispatch_window(
        Action::Resize {
            id: id.clone(),
            width: 640.0,
            height: 480.0,
        },
        t0,
    );

    let outcomes = shell.shutdown();
    assert!(!outcomes.is_empty());
    assert!(outcomes.iter().all(PersistOutcome::success));
    let state = stored_state(&dir);
    assert_eq!(state.windows[0].size.width, 640.0);
}
