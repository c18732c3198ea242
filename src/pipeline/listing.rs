use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use crossbeam::select;
use log::{error, trace};

use crate::library::Track;
use crate::listing::{ListingSink, Row};

use super::cancel::CancelToken;
use super::config::PipelineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    /// The track queue closed and every track was appended.
    Exhausted,
    /// Cancellation stopped the loader.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingReport {
    pub outcome: ListingOutcome,
    /// Rows appended by the eager and lazy phases together.
    pub appended: usize,
}

/// Lazy listing loader plus its supervisor.
pub struct ListingPipeline {
    eager_loaded: usize,
    supervisor: JoinHandle<ListingReport>,
}

impl ListingPipeline {
    /// Append up to `load_eager` tracks in the calling thread, then keep the
    /// listing `load_lookahead` rows ahead of its cursor in the background.
    ///
    /// The eager phase returns early when the queue closes or cancellation fires.
    pub fn start<L>(
        listing: L,
        queue: Receiver<Track>,
        config: &PipelineConfig,
        cancel: CancelToken,
    ) -> io::Result<Self>
    where
        L: ListingSink + 'static,
    {
        let eager_loaded = load_eager(&listing, &queue, config, &cancel);

        let (quit_tx, quit_rx) = channel::bounded::<()>(1);
        let (done_tx, done_rx) = channel::bounded::<()>(1);

        let loader_config = *config;
        let loader = thread::Builder::new()
            .name("listing-loader".into())
            .spawn(move || {
                let loaded = lazy_loader(&listing, &queue, &quit_rx, &loader_config);
                let _ = done_tx.send(());
                loaded
            })?;

        let poll = config.load_timeout;
        let supervisor = thread::Builder::new()
            .name("listing-supervisor".into())
            .spawn(move || {
                let (outcome, lazy_loaded) = supervise(loader, done_rx, quit_tx, poll, cancel);
                ListingReport {
                    outcome,
                    appended: eager_loaded + lazy_loaded,
                }
            })?;

        Ok(Self {
            eager_loaded,
            supervisor,
        })
    }

    /// Rows appended before `start` returned.
    pub fn eager_loaded(&self) -> usize {
        self.eager_loaded
    }

    pub fn is_finished(&self) -> bool {
        self.supervisor.is_finished()
    }

    /// Block until the supervisor, and with it the loader, has terminated.
    pub fn wait(self) -> ListingReport {
        let eager_loaded = self.eager_loaded;
        self.supervisor.join().unwrap_or_else(|_| {
            error!("listing supervisor panicked");
            ListingReport {
                outcome: ListingOutcome::Cancelled,
                appended: eager_loaded,
            }
        })
    }
}

fn load_eager<L: ListingSink>(
    listing: &L,
    queue: &Receiver<Track>,
    config: &PipelineConfig,
    cancel: &CancelToken,
) -> usize {
    trace!("loading {} tracks...", config.load_eager);
    let mut loaded = 0;
    while loaded < config.load_eager && !cancel.is_cancelled() {
        match queue.recv_timeout(config.load_timeout) {
            Ok(track) => {
                listing.append_row(Row::from_track(&track));
                loaded += 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                trace!("track queue closed during eager load");
                break;
            }
        }
    }
    trace!("loaded {loaded} tracks");
    loaded
}

fn lazy_loader<L: ListingSink>(
    listing: &L,
    queue: &Receiver<Track>,
    quit: &Receiver<()>,
    config: &PipelineConfig,
) -> usize {
    let mut loaded = 0;
    loop {
        match quit.try_recv() {
            Err(TryRecvError::Empty) => {}
            _ => {
                trace!("listing loader asked to quit");
                break;
            }
        }

        let ahead = listing
            .row_count()
            .saturating_sub(listing.cursor_position());
        if ahead < config.load_lookahead {
            match queue.recv_timeout(config.load_timeout) {
                Ok(track) => {
                    trace!("loading {}...", track.name);
                    listing.append_row(Row::from_track(&track));
                    loaded += 1;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    trace!("no more tracks to load");
                    break;
                }
            }
            continue;
        }

        // Far enough ahead of the cursor: wait before rechecking.
        select! {
            recv(quit) -> _ => {
                trace!("listing loader asked to quit");
                break;
            }
            default(config.load_timeout) => {}
        }
    }
    loaded
}

fn supervise(
    loader: JoinHandle<usize>,
    done: Receiver<()>,
    quit: Sender<()>,
    poll: Duration,
    cancel: CancelToken,
) -> (ListingOutcome, usize) {
    let outcome = loop {
        select! {
            recv(done) -> _ => {
                trace!("listing loader stopped running");
                break ListingOutcome::Exhausted;
            }
            default(poll) => {
                if cancel.is_cancelled() {
                    trace!("cancellation requested, stopping listing loader...");
                    let _ = quit.send(());
                    // Only finish once the loader actually stopped.
                    let _ = done.recv();
                    break ListingOutcome::Cancelled;
                }
            }
        }
    };

    let lazy_loaded = loader.join().unwrap_or_else(|_| {
        error!("listing loader panicked");
        0
    });
    (outcome, lazy_loaded)
}
