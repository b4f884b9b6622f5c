use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use super::{DeleteResult, PersistedState, PersistenceService, SaveResult, WindowContentFile};
use crate::error::{PersistError, PersistResult};
use crate::panel::PanelId;

/// One unit of work for the persistence thread.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistRequest {
    SaveState(PersistedState),
    SaveContent(WindowContentFile),
    DeleteContent(PanelId),
}

impl PersistRequest {
    pub fn execute(&self, service: &impl PersistenceService) -> PersistOutcome {
        match self {
            PersistRequest::SaveState(state) => PersistOutcome::State(service.save_state(state)),
            PersistRequest::SaveContent(file) => PersistOutcome::Content {
                id: file.window_id.clone(),
                result: service.save_window_content(&file.window_id, file),
            },
            PersistRequest::DeleteContent(id) => PersistOutcome::Deleted {
                id: id.clone(),
                result: service.delete_window_content(id),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    State(SaveResult),
    Content { id: PanelId, result: SaveResult },
    Deleted { id: PanelId, result: DeleteResult },
}

impl PersistOutcome {
    pub fn success(&self) -> bool {
        match self {
            PersistOutcome::State(result) | PersistOutcome::Content { result, .. } => {
                result.success
            }
            PersistOutcome::Deleted { result, .. } => result.success,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            PersistOutcome::State(result) | PersistOutcome::Content { result, .. } => {
                result.error.as_deref()
            }
            PersistOutcome::Deleted { result, .. } => result.error.as_deref(),
        }
    }

    /// Failures are logged and otherwise ignored.
    pub fn log(&self) {
        match (self, self.error()) {
            (PersistOutcome::State(_), Some(err)) => error!("layout save failed: {err}"),
            (PersistOutcome::Content { id, .. }, Some(err)) => {
                error!(%id, "content save failed: {err}")
            }
            (PersistOutcome::Deleted { id, .. }, Some(err)) => {
                warn!(%id, "content delete failed: {err}")
            }
            (PersistOutcome::State(_), None) => debug!("layout saved"),
            (PersistOutcome::Content { id, .. }, None) => debug!(%id, "content saved"),
            (PersistOutcome::Deleted { id, result }, None) => {
                debug!(%id, existed = result.existed, "content deleted")
            }
        }
    }
}

/// Where the shell sends persistence work.
pub trait PersistSink {
    fn submit(&mut self, request: PersistRequest) -> PersistResult<()>;

    /// Completed work since the last call.
    fn drain(&mut self) -> Vec<PersistOutcome> {
        Vec::new()
    }

    /// Block until every submitted request has run.
    fn finish(&mut self) -> Vec<PersistOutcome> {
        self.drain()
    }
}

/// Executes requests on a dedicated thread in submission order.
pub struct PersistenceWorker {
    requests: Option<Sender<PersistRequest>>,
    outcomes: Receiver<PersistOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl PersistenceWorker {
    pub fn spawn<S>(service: S) -> io::Result<Self>
    where
        S: PersistenceService + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<PersistRequest>();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let handle = thread::Builder::new()
            .name("persistence".into())
            .spawn(move || {
                for request in request_rx {
                    let outcome = request.execute(&service);
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                debug!("persistence worker exiting");
            })?;
        Ok(Self {
            requests: Some(request_tx),
            outcomes: outcome_rx,
            handle: Some(handle),
        })
    }

    /// Close the queue and wait for queued writes to land.
    pub fn shutdown(&mut self) -> Vec<PersistOutcome> {
        self.requests.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            error!("persistence worker panicked");
        }
        self.drain()
    }
}

impl PersistSink for PersistenceWorker {
    fn submit(&mut self, request: PersistRequest) -> PersistResult<()> {
        let sender = self.requests.as_ref().ok_or(PersistError::WorkerGone)?;
        sender.send(request).map_err(|_| PersistError::WorkerGone)
    }

    fn drain(&mut self) -> Vec<PersistOutcome> {
        self.outcomes.try_iter().collect()
    }

    fn finish(&mut self) -> Vec<PersistOutcome> {
        self.shutdown()
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            for outcome in self.shutdown() {
                outcome.log();
            }
        }
    }
}

/// Runs each request on the calling thread as soon as it is submitted.
pub struct InlineSink<S> {
    service: S,
    completed: Vec<PersistOutcome>,
}

impl<S: PersistenceService> InlineSink<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            completed: Vec::new(),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: PersistenceService> PersistSink for InlineSink<S> {
    fn submit(&mut self, request: PersistRequest) -> PersistResult<()> {
        self.completed.push(request.execute(&self.service));
        Ok(())
    }

    fn drain(&mut self) -> Vec<PersistOutcome> {
        std::mem::take(&mut self.completed)
    }
}
