use thiserror::Error;

use crate::library::Track;
use crate::spotify::RemoteError;

/// One batch of tracks plus the continuation handle of the next batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub tracks: Vec<Track>,
    pub next: Option<String>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no more pages")]
    NoMorePages,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Paginated read access to the remote catalog.
pub trait TrackSource {
    fn first_page(&self) -> Result<Page, SourceError>;
    /// Fetch the page following `page`, or `SourceError::NoMorePages` at the end.
    fn next_page(&self, page: &Page) -> Result<Page, SourceError>;
}
