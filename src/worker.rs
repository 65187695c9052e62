//! Worker thread management
//!
//! Exports run off the UI thread. A dedicated thread owns a tokio runtime and
//! spawns one task per request, so several exports can be in flight at once.
//! Results come back over a crossbeam channel the event loop polls.

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, warn};

use crate::export::{ExportJob, ExportOutcome, ExportPipeline};

/// Messages sent from main thread to the worker
#[derive(Debug)]
pub enum WorkerMessage {
    /// Run an export
    Export { id: u64, job: ExportJob },
    /// Shutdown signal
    Shutdown,
}

/// Responses sent from the worker to main thread
#[derive(Debug)]
pub enum WorkerResponse {
    ExportComplete {
        id: u64,
        outcome: ExportOutcome,
        elapsed_ms: u64,
    },
    ExportFailed { id: u64, error: String },
}

impl WorkerResponse {
    pub fn id(&self) -> u64 {
        match self {
            WorkerResponse::ExportComplete { id, .. } | WorkerResponse::ExportFailed { id, .. } => *id,
        }
    }
}

/// Handle to the worker thread and its channels
pub struct WorkerHandle {
    pub request_tx: Sender<WorkerMessage>,
    pub response_rx: Receiver<WorkerResponse>,
    thread: JoinHandle<()>,
}

impl WorkerHandle {
    /// Stop accepting work, let in-flight exports finish, and join.
    pub fn shutdown(self) {
        let _ = self.request_tx.send(WorkerMessage::Shutdown);
        if self.thread.join().is_err() {
            warn!("export worker panicked");
        }
    }
}

/// Spawn the export worker
pub fn spawn_export_worker(pipeline: ExportPipeline) -> std::io::Result<WorkerHandle> {
    let (request_tx, request_rx) = unbounded::<WorkerMessage>();
    let (response_tx, response_rx) = unbounded::<WorkerResponse>();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(num_cpus().clamp(1, 4))
        .thread_name("export-runtime")
        .enable_time()
        .build()?;

    let thread = thread::Builder::new()
        .name("export-worker".to_string())
        .spawn(move || worker_loop(runtime, pipeline, request_rx, response_tx))?;

    Ok(WorkerHandle {
        request_tx,
        response_rx,
        thread,
    })
}

/// Main worker loop - processes messages until shutdown
fn worker_loop(
    runtime: tokio::runtime::Runtime,
    pipeline: ExportPipeline,
    rx: Receiver<WorkerMessage>,
    tx: Sender<WorkerResponse>,
) {
    let mut in_flight: Vec<tokio::task::JoinHandle<()>> = Vec::new();

    while let Ok(msg) = rx.recv() {
        match msg {
            WorkerMessage::Shutdown => break,

            WorkerMessage::Export { id, job } => {
                in_flight.retain(|task| !task.is_finished());
                debug!(id, file = %job.filename(), pending = in_flight.len(), "export queued");

                let pipeline = pipeline.clone();
                let tx = tx.clone();
                in_flight.push(runtime.spawn(async move {
                    let start = Instant::now();
                    let response = match pipeline.run(job).await {
                        Ok(outcome) => WorkerResponse::ExportComplete {
                            id,
                            outcome,
                            elapsed_ms: start.elapsed().as_millis() as u64,
                        },
                        Err(e) => WorkerResponse::ExportFailed {
                            id,
                            error: e.to_string(),
                        },
                    };
                    let _ = tx.send(response);
                }));
            }
        }
    }

    runtime.block_on(async {
        for task in in_flight {
            let _ = task.await;
        }
    });
}

/// Get number of CPUs (fallback to 1)
fn num_cpus() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportFormat, ExportMode, ExportSettings};
    use crate::platform::MemorySink;
    use crate::preview::{self, PreviewSize};
    use crate::seed;
    use std::sync::Arc;
    use std::time::Duration;

    fn worker(sink: Arc<MemorySink>) -> WorkerHandle {
        let pipeline = ExportPipeline::with_backends(ExportSettings::default(), None, sink);
        spawn_export_worker(pipeline).unwrap()
    }

    fn svg_job(mode: ExportMode) -> ExportJob {
        ExportJob::Single {
            node: Some(preview::render(&seed::facecard_after(), PreviewSize::Phone)),
            mode,
            format: ExportFormat::Svg,
        }
    }

    #[test]
    fn test_spawn_and_shutdown() {
        let workers = worker(Arc::new(MemorySink::default()));
        workers.shutdown();
    }

    #[test]
    fn test_export_request() {
        let sink = Arc::new(MemorySink::default());
        let workers = worker(sink.clone());
        let job = svg_job(ExportMode::After);
        workers.request_tx.send(WorkerMessage::Export { id: 7, job }).unwrap();

        let response = workers
            .response_rx
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        match response {
            WorkerResponse::ExportComplete { id, outcome, .. } => {
                assert_eq!(id, 7);
                assert_eq!(outcome.filename, "facecard-after.svg");
            }
            other => panic!("Unexpected response {other:?}"),
        }
        workers.shutdown();
        assert_eq!(sink.deliveries().len(), 1);
    }

    #[test]
    fn test_failed_export_is_reported() {
        let sink = Arc::new(MemorySink::default());
        let workers = worker(sink.clone());
        let job = ExportJob::Single {
            node: None,
            mode: ExportMode::Before,
            format: ExportFormat::Png,
        };
        workers.request_tx.send(WorkerMessage::Export { id: 1, job }).unwrap();
        let response = workers
            .response_rx
            .recv_timeout(Duration::from_secs(5))
            .unwrap();
        assert!(matches!(response, WorkerResponse::ExportFailed { id: 1, .. }));
        workers.shutdown();
        assert!(sink.deliveries().is_empty());
    }

    #[test]
    fn test_shutdown_drains_in_flight() {
        let sink = Arc::new(MemorySink::default());
        let workers = worker(sink.clone());
        for id in 0..3 {
            let job = svg_job(ExportMode::Single);
            workers.request_tx.send(WorkerMessage::Export { id, job }).unwrap();
        }
        workers.shutdown();
        assert_eq!(sink.deliveries().len(), 3);
    }
}
