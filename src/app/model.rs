//! Application model types: `App` and `Page`.
//!
//! The `App` struct holds the listing the UI draws, the visible page and the
//! flags shown in the status line. Playback state lives on the remote device
//! and is never mirrored here.

use std::sync::Arc;

use crate::config::StartPage;
use crate::events::Command;
use crate::listing::{Listing, ListingError};
use crate::logging::LogBuffer;

/// The page currently drawn below the header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Listing,
    Logs,
}

impl From<StartPage> for Page {
    fn from(page: StartPage) -> Self {
        match page {
            StartPage::Listing => Self::Listing,
            StartPage::Logs => Self::Logs,
        }
    }
}

/// The main application model.
pub struct App {
    pub listing: Listing,
    pub logs: Option<Arc<LogBuffer>>,
    pub page: Page,
    /// Tracks are still arriving from the catalog.
    pub loading: bool,
    /// Rows skipped by PageUp / PageDown.
    pub page_step: usize,
    /// Last user-facing message, shown in the status line.
    pub status: Option<String>,
}

impl App {
    /// Create a new `App` drawing `listing`.
    pub fn new(listing: Listing) -> Self {
        Self {
            listing,
            logs: None,
            page: Page::Listing,
            loading: true,
            page_step: 20,
            status: None,
        }
    }

    /// Attach the buffer shown on the logs page.
    pub fn set_logs(&mut self, logs: Arc<LogBuffer>) {
        self.logs = Some(logs);
    }

    pub fn show_page(&mut self, page: Page) {
        self.page = page;
    }

    /// Record that the catalog finished (or stopped) loading.
    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Select the next row.
    pub fn next(&mut self) {
        self.listing.move_cursor(1);
    }

    /// Select the previous row.
    pub fn prev(&mut self) {
        self.listing.move_cursor(-1);
    }

    pub fn page_down(&mut self) {
        self.listing.move_cursor(self.step());
    }

    pub fn page_up(&mut self) {
        self.listing.move_cursor(-self.step());
    }

    pub fn go_top(&mut self) {
        self.listing.set_cursor(0);
    }

    pub fn go_bottom(&mut self) {
        self.listing.cursor_to_end();
    }

    fn step(&self) -> isize {
        isize::try_from(self.page_step.max(1)).unwrap_or(isize::MAX)
    }

    /// Command that starts playback of the selected row.
    pub fn play_selected(&self) -> Result<Command, ListingError> {
        self.listing.selected_uri().map(Command::PlayUri)
    }

    /// Command that queues the selected row.
    pub fn queue_selected(&self) -> Result<Command, ListingError> {
        self.listing.selected_uri().map(Command::QueueUri)
    }
}
