//! Concurrent catalog pipeline.
//!
//! Remote pages flow through a bounded track queue into the listing:
//!
//! ```text
//! TrackSource -> FetchPipeline -> track queue -> ListingPipeline -> Listing
//! ```
//!
//! Each stage runs a worker thread and a supervisor thread. Supervisors poll
//! at a fixed interval for either their worker finishing or the shared
//! `CancelToken` firing, and only return once their worker has stopped.

mod cancel;
mod config;
mod fetch;
mod listing;
mod source;

pub use cancel::CancelToken;
pub use config::PipelineConfig;
pub use fetch::{FetchOutcome, FetchPipeline, track_queue};
pub use listing::ListingPipeline;
pub use source::{Page, SourceError, TrackSource};
