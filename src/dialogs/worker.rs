//! Background import task
//!
//! One dedicated thread per import. The UI thread never blocks on it: it
//! drains the event channel on every tick and raises a shared flag to ask
//! the processor to stop.
//!
//! Worker panics are reported through the log; the terminal belongs to the
//! TUI while an import runs.

use crate::backend::{ImportBackend, ImportContext, ImportRequest, WorkerEvent};
use crate::error::ImportError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Name of every import worker thread
pub const WORKER_THREAD_NAME: &str = "import-worker";

static PANIC_HOOK: Once = Once::new();

/// Install the process panic hook once
///
/// 工作线程的 panic 写入日志，其他线程仍交给原有的 hook。
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if is_worker_thread(thread::current().name()) {
                let location = info
                    .location()
                    .map(|l| format!("{}:{}", l.file(), l.line()));
                error!(
                    message = %panic_message(info.payload()),
                    location = location.as_deref().unwrap_or("unknown"),
                    "Panic on import worker"
                );
            } else {
                previous(info);
            }
        }));
    });
}

fn is_worker_thread(name: Option<&str>) -> bool {
    name == Some(WORKER_THREAD_NAME)
}

/// A running (or finished) import
pub struct ImportTask {
    request: Arc<ImportRequest>,
    cancel: Arc<AtomicBool>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
    finished: bool,
}

impl ImportTask {
    /// Start processing `request` on a new thread
    pub fn spawn(
        backend: Arc<dyn ImportBackend>,
        request: ImportRequest,
    ) -> std::io::Result<Self> {
        install_panic_hook();
        let request = Arc::new(request);
        let cancel = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();

        let worker_request = Arc::clone(&request);
        let context = ImportContext::new(Arc::clone(&cancel), tx.clone());
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                info!(
                    source = %worker_request.source_path.display(),
                    file_groups = worker_request.file_groups.len(),
                    languages = worker_request.language_codes.len(),
                    "Import started"
                );
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    backend.process(&worker_request, &context)
                }))
                .unwrap_or_else(|payload| {
                    let message = panic_message(payload.as_ref());
                    warn!(%message, "Import worker stopped by a panic");
                    Err(ImportError::Panicked(message))
                });
                let _ = tx.send(WorkerEvent::Finished(result));
            })?;

        Ok(Self {
            request,
            cancel,
            events: rx,
            handle: Some(handle),
            finished: false,
        })
    }

    /// The snapshot the worker is processing
    pub fn request(&self) -> &ImportRequest {
        &self.request
    }

    /// Ask the processor to stop at its next check
    pub fn cancel(&self) {
        debug!("Cancellation requested");
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Whether the worker has reported termination
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain pending events without blocking
    ///
    /// A worker that disappears without reporting is turned into a failure.
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        loop {
            match self.events.try_recv() {
                Ok(event) => {
                    if matches!(event, WorkerEvent::Finished(_)) {
                        self.finished = true;
                        events.push(event);
                        break;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("Import worker exited without reporting");
                    self.finished = true;
                    events.push(WorkerEvent::Finished(Err(ImportError::Failed(
                        "Import worker exited unexpectedly".to_string(),
                    ))));
                    break;
                }
            }
        }

        if self.finished {
            self.join();
        }
        events
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Import worker thread could not be joined");
            }
        }
    }
}

impl Drop for ImportTask {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
