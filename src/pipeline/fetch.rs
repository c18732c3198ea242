use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;
use log::{debug, error, trace};

use crate::library::Track;

use super::cancel::CancelToken;
use super::config::PipelineConfig;
use super::source::{SourceError, TrackSource};

/// Create the bounded queue between the fetch and listing pipelines.
pub fn track_queue(capacity: usize) -> (Sender<Track>, Receiver<Track>) {
    channel::bounded(capacity)
}

/// How the paging worker ended. The track queue is closed in every case.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Every page was delivered.
    Complete { tracks: usize },
    /// A page after the first failed; the tracks before it were delivered.
    Truncated { tracks: usize, error: SourceError },
    /// Cancellation stopped paging early.
    Cancelled { tracks: usize },
    /// The first page could not be fetched; nothing can be displayed.
    Fatal(SourceError),
    /// The worker thread panicked.
    WorkerPanicked,
}

impl FetchOutcome {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_) | Self::WorkerPanicked)
    }
}

/// Paging worker plus its supervisor.
pub struct FetchPipeline {
    supervisor: JoinHandle<FetchOutcome>,
}

impl FetchPipeline {
    /// Start paging `source` into `queue`.
    ///
    /// `drain` must be a receiver of the same queue; the supervisor empties it
    /// on cancellation so a worker blocked on a full queue can exit. `queue`
    /// should be the only sender, since the queue closes when the worker drops it.
    pub fn spawn<S>(
        source: S,
        queue: Sender<Track>,
        drain: Receiver<Track>,
        config: &PipelineConfig,
        cancel: CancelToken,
    ) -> io::Result<Self>
    where
        S: TrackSource + Send + 'static,
    {
        let (done_tx, done_rx) = channel::bounded::<()>(1);

        let worker_cancel = cancel.clone();
        let worker = thread::Builder::new()
            .name("fetch-worker".into())
            .spawn(move || {
                let outcome = fetch_worker(&source, queue, &worker_cancel);
                let _ = done_tx.send(());
                outcome
            })?;

        let poll = config.fetching_timeout;
        let supervisor = thread::Builder::new()
            .name("fetch-supervisor".into())
            .spawn(move || supervise(worker, done_rx, drain, poll, cancel))?;

        Ok(Self { supervisor })
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.supervisor.is_finished()
    }

    /// Block until the supervisor, and with it the worker, has terminated.
    pub fn wait(self) -> FetchOutcome {
        self.supervisor.join().unwrap_or_else(|_| {
            error!("fetch supervisor panicked");
            FetchOutcome::WorkerPanicked
        })
    }
}

// Takes the sender by value: returning closes the queue.
fn fetch_worker<S: TrackSource>(
    source: &S,
    queue: Sender<Track>,
    cancel: &CancelToken,
) -> FetchOutcome {
    trace!("fetching first page...");
    let mut page = match source.first_page() {
        Ok(page) => page,
        Err(SourceError::NoMorePages) => {
            debug!("catalog is empty");
            return FetchOutcome::Complete { tracks: 0 };
        }
        Err(err) => {
            error!("failed to fetch first page: {err}");
            return FetchOutcome::Fatal(err);
        }
    };
    trace!("fetched first page");

    let mut delivered = 0;
    loop {
        for track in std::mem::take(&mut page.tracks) {
            if cancel.is_cancelled() {
                return FetchOutcome::Cancelled { tracks: delivered };
            }
            // Blocks while the queue is full. The supervisor drains it on cancellation.
            if queue.send(track).is_err() {
                debug!("track queue has no readers left");
                return FetchOutcome::Cancelled { tracks: delivered };
            }
            delivered += 1;
        }

        if cancel.is_cancelled() {
            return FetchOutcome::Cancelled { tracks: delivered };
        }

        trace!("fetching a new page...");
        match source.next_page(&page) {
            Ok(next) => page = next,
            Err(SourceError::NoMorePages) => {
                debug!("no more pages, {delivered} tracks fetched");
                return FetchOutcome::Complete { tracks: delivered };
            }
            Err(err) => {
                error!("failed to fetch a page: {err}");
                return FetchOutcome::Truncated {
                    tracks: delivered,
                    error: err,
                };
            }
        }
    }
}

fn supervise(
    worker: JoinHandle<FetchOutcome>,
    done: Receiver<()>,
    drain: Receiver<Track>,
    poll: Duration,
    cancel: CancelToken,
) -> FetchOutcome {
    loop {
        select! {
            recv(done) -> _ => {
                trace!("fetch worker terminated, terminating fetch supervisor");
                break;
            }
            default(poll) => {
                if cancel.is_cancelled() {
                    trace!("cancellation requested, cleaning up fetch worker...");
                    // Ends once the worker notices cancellation and drops its sender.
                    let discarded = drain.iter().count();
                    trace!("cleanup complete, discarded {discarded} tracks");
                    break;
                }
                trace!("fetch worker still running...");
            }
        }
    }
    drop(drain);

    let outcome = worker.join().unwrap_or_else(|_| {
        error!("fetch worker panicked");
        FetchOutcome::WorkerPanicked
    });

    if outcome.is_fatal() {
        // Nothing more will ever arrive; bring the rest of the process down.
        cancel.cancel();
    }
    outcome
}
