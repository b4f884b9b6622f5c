//! Durable storage for the layout and per-window content.
//!
//! Every operation on a [`PersistenceService`] returns a result record and
//! never propagates an error: failures become `success: false` plus a
//! message.

mod policy;
mod serialize;
mod store;
mod types;
mod worker;

pub use policy::{DueSaves, SavePolicy};
pub use serialize::{content_file, serialize_state, widget_structure, window_structure};
pub use store::FileStore;
pub use types::*;
pub use worker::{InlineSink, PersistOutcome, PersistRequest, PersistSink, PersistenceWorker};

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::panel::PanelId;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStateResult {
    pub success: bool,
    pub state: Option<PersistedState>,
    pub window_contents: Vec<WindowContentFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoadStateResult {
    pub fn failed(error: &PersistError) -> Self {
        Self {
            success: false,
            state: None,
            window_contents: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }
}

impl From<Result<(), PersistError>> for SaveResult {
    fn from(result: Result<(), PersistError>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(err) => Self {
                success: false,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub success: bool,
    pub existed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<bool, PersistError>> for DeleteResult {
    fn from(result: Result<bool, PersistError>) -> Self {
        match result {
            Ok(existed) => Self {
                success: true,
                existed,
                error: None,
            },
            Err(err) => Self {
                success: false,
                existed: false,
                error: Some(err.to_string()),
            },
        }
    }
}

/// The command surface the shell persists through.
pub trait PersistenceService {
    /// Read the layout and every content file. A missing layout is a
    /// successful load with `state: None`.
    fn load_state(&self) -> LoadStateResult;

    fn save_state(&self, state: &PersistedState) -> SaveResult;

    fn save_window_content(&self, id: &PanelId, content: &WindowContentFile) -> SaveResult;

    fn delete_window_content(&self, id: &PanelId) -> DeleteResult;
}
