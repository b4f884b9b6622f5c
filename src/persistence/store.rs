use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{
    DeleteResult, LoadStateResult, PersistedState, PersistenceService, SaveResult,
    WindowContentFile,
};
use crate::constants::CURRENT_STATE_VERSION;
use crate::error::{PersistError, PersistResult};
use crate::panel::PanelId;

const STATE_FILE: &str = "state.json";
const WINDOWS_DIR: &str = "windows";
const CONTENT_PREFIX: &str = "window-";
const CONTENT_SUFFIX: &str = ".json";

/// Just enough of `state.json` to decide whether the rest is readable.
#[derive(Deserialize)]
struct VersionTag {
    version: u32,
}

/// JSON files under one data directory:
///
/// ```text
/// <root>/state.json
/// <root>/windows/window-<id>.json
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn windows_dir(&self) -> PathBuf {
        self.root.join(WINDOWS_DIR)
    }

    pub fn content_path(&self, id: &PanelId) -> PersistResult<PathBuf> {
        validate_id(id)?;
        Ok(self
            .windows_dir()
            .join(format!("{CONTENT_PREFIX}{id}{CONTENT_SUFFIX}")))
    }

    /// Read the layout record. The version is checked before the rest of
    /// the record is decoded: a record from another schema comes back as a
    /// bare state carrying only its version, whatever else it contains.
    pub fn read_state(&self) -> PersistResult<Option<PersistedState>> {
        let path = self.state_path();
        let Some(raw) = read_json::<Value>(&path)? else {
            return Ok(None);
        };
        let tag = VersionTag::deserialize(&raw).map_err(|source| {
            PersistError::Json {
                path: path.clone(),
                source,
            }
        })?;
        if tag.version != CURRENT_STATE_VERSION {
            debug!(
                found = tag.version,
                "layout has another schema version, not decoding it"
            );
            return Ok(Some(PersistedState {
                version: tag.version,
                ..PersistedState::default()
            }));
        }
        serde_json::from_value(raw)
            .map(Some)
            .map_err(|source| PersistError::Json { path, source })
    }

    /// Every parseable content file. Files that cannot be read or parsed
    /// are skipped.
    pub fn read_contents(&self) -> PersistResult<Vec<WindowContentFile>> {
        let dir = self.windows_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(PersistError::io("failed to list", dir, err)),
        };

        let mut contents = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!(dir = %dir.display(), "skipping unreadable entry: {err}");
                    continue;
                }
            };
            if !is_content_file(&path) {
                continue;
            }
            match read_json::<WindowContentFile>(&path) {
                Ok(Some(file)) => contents.push(file),
                Ok(None) => {}
                Err(err) => warn!("skipping content file: {err}"),
            }
        }
        contents.sort_by(|a, b| a.window_id.cmp(&b.window_id));
        Ok(contents)
    }

    pub fn write_state(&self, state: &PersistedState) -> PersistResult<()> {
        write_json_atomic(&self.state_path(), state, "layout")
    }

    pub fn write_content(&self, id: &PanelId, content: &WindowContentFile) -> PersistResult<()> {
        let path = self.content_path(id)?;
        write_json_atomic(&path, content, "window content")
    }

    /// Remove a content file, reporting whether it existed.
    pub fn delete_content(&self, id: &PanelId) -> PersistResult<bool> {
        let path = self.content_path(id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(PersistError::io("failed to delete", path, err)),
        }
    }
}

impl PersistenceService for FileStore {
    fn load_state(&self) -> LoadStateResult {
        let state = match self.read_state() {
            Ok(state) => state,
            Err(err) => {
                warn!("layout load failed: {err}");
                return LoadStateResult::failed(&err);
            }
        };
        let window_contents = match self.read_contents() {
            Ok(contents) => contents,
            Err(err) => {
                warn!("content load failed: {err}");
                return LoadStateResult::failed(&err);
            }
        };
        debug!(
            has_state = state.is_some(),
            contents = window_contents.len(),
            "loaded persisted state"
        );
        LoadStateResult {
            success: true,
            state,
            window_contents,
            error: None,
        }
    }

    fn save_state(&self, state: &PersistedState) -> SaveResult {
        self.write_state(state).into()
    }

    fn save_window_content(&self, id: &PanelId, content: &WindowContentFile) -> SaveResult {
        self.write_content(id, content).into()
    }

    fn delete_window_content(&self, id: &PanelId) -> DeleteResult {
        self.delete_content(id).into()
    }
}

fn validate_id(id: &PanelId) -> PersistResult<()> {
    let raw = id.as_str();
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PersistError::InvalidId(raw.to_string()))
    }
}

fn is_content_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(CONTENT_PREFIX) && name.ends_with(CONTENT_SUFFIX))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> PersistResult<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(PersistError::io("failed to read", path, err)),
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| PersistError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Write through a sibling temp file and rename it into place so readers
/// never observe a partial file.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T, what: &'static str) -> PersistResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| PersistError::io("failed to create directory", parent, err))?;
    }

    let mut body = serde_json::to_string_pretty(value)
        .map_err(|source| PersistError::Encode { what, source })?;
    body.push('\n');

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, body).map_err(|err| PersistError::io("failed to write", &tmp_path, err))?;
    fs::rename(&tmp_path, path).map_err(|err| PersistError::io("failed to replace", path, err))
}
