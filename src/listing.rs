//! Append-only track listing shared between the listing loader and the UI.
//!
//! The loader is the only writer and only ever appends; the UI reads windows
//! of rows and owns the cursor. Every access takes the lock for one operation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::library::{Track, TrackUri, track_columns};

/// One rendered track plus the identifier used to act on it later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub columns: [String; 4],
    pub uri: Option<TrackUri>,
}

impl Row {
    pub fn from_track(track: &Track) -> Self {
        Self {
            columns: track_columns(track),
            uri: Some(track.uri.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("row {row} has no track identifier")]
    MissingIdentifier { row: usize },
    #[error("row {row} does not exist")]
    NoSuchRow { row: usize },
}

/// Rendering surface the listing pipeline appends to.
pub trait ListingSink: Send + Sync {
    /// Append a row and return its index.
    fn append_row(&self, row: Row) -> usize;
    fn row_count(&self) -> usize;
    fn cursor_position(&self) -> usize;
}

#[derive(Debug, Default)]
struct ListingState {
    rows: Vec<Row>,
    cursor: usize,
}

/// Rows visible around the cursor, cut for a viewport of a given height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingWindow {
    pub rows: Vec<Row>,
    /// Position of the cursor inside `rows`, if any row is visible.
    pub selected: Option<usize>,
    pub total: usize,
    pub cursor: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Listing {
    state: Arc<Mutex<ListingState>>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ListingState> {
        // Rows are only ever appended whole, so a poisoned guard still holds a valid listing.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the cursor to `idx`, clamped to the last row.
    pub fn set_cursor(&self, idx: usize) {
        let mut state = self.lock();
        state.cursor = idx.min(state.rows.len().saturating_sub(1));
    }

    /// Move the cursor by `delta` rows, clamped to the listing bounds.
    pub fn move_cursor(&self, delta: isize) {
        let mut state = self.lock();
        let last = state.rows.len().saturating_sub(1);
        state.cursor = state.cursor.saturating_add_signed(delta).min(last);
    }

    pub fn cursor_to_end(&self) {
        let mut state = self.lock();
        state.cursor = state.rows.len().saturating_sub(1);
    }

    /// Identifier of the track rendered at `row`.
    pub fn uri_at(&self, row: usize) -> Result<TrackUri, ListingError> {
        let state = self.lock();
        state
            .rows
            .get(row)
            .ok_or(ListingError::NoSuchRow { row })?
            .uri
            .clone()
            .ok_or(ListingError::MissingIdentifier { row })
    }

    /// Identifier of the track under the cursor.
    pub fn selected_uri(&self) -> Result<TrackUri, ListingError> {
        let row = self.cursor_position();
        self.uri_at(row)
    }

    /// Snapshot of the rows to draw in a viewport of `height` rows, keeping the
    /// cursor centered when possible.
    pub fn window(&self, height: usize) -> ListingWindow {
        let state = self.lock();
        let total = state.rows.len();
        let cursor = state.cursor;

        let (start, end) = if height == 0 {
            (0, 0)
        } else if total <= height {
            (0, total)
        } else {
            let half = height / 2;
            let mut start = cursor.saturating_sub(half);
            if start + height > total {
                start = total - height;
            }
            (start, start + height)
        };

        let selected = (start..end).contains(&cursor).then(|| cursor - start);

        ListingWindow {
            rows: state.rows[start..end].to_vec(),
            selected,
            total,
            cursor,
        }
    }

    /// All identifiers in row order.
    #[cfg(test)]
    pub fn uris(&self) -> Vec<Option<TrackUri>> {
        self.lock().rows.iter().map(|r| r.uri.clone()).collect()
    }
}

impl ListingSink for Listing {
    fn append_row(&self, row: Row) -> usize {
        let mut state = self.lock();
        state.rows.push(row);
        state.rows.len() - 1
    }

    fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    fn cursor_position(&self) -> usize {
        self.lock().cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize) -> Row {
        Row {
            columns: [format!("track {n}"), "artist".into(), "album".into(), "1:00".into()],
            uri: Some(TrackUri::new(format!("spotify:track:t{n}"))),
        }
    }

    fn listing_with(n: usize) -> Listing {
        let listing = Listing::new();
        for i in 0..n {
            listing.append_row(row(i));
        }
        listing
    }

    #[test]
    fn append_row_returns_insertion_index() {
        let listing = Listing::new();
        assert_eq!(listing.append_row(row(0)), 0);
        assert_eq!(listing.append_row(row(1)), 1);
        assert_eq!(listing.row_count(), 2);
    }

    #[test]
    fn cursor_is_clamped_to_rows() {
        let listing = listing_with(3);
        listing.set_cursor(10);
        assert_eq!(listing.cursor_position(), 2);

        listing.move_cursor(-5);
        assert_eq!(listing.cursor_position(), 0);

        listing.move_cursor(1);
        assert_eq!(listing.cursor_position(), 1);

        listing.cursor_to_end();
        assert_eq!(listing.cursor_position(), 2);

        let empty = Listing::new();
        empty.move_cursor(3);
        assert_eq!(empty.cursor_position(), 0);
    }

    #[test]
    fn selected_uri_reports_missing_identifier() {
        let listing = listing_with(1);
        listing.append_row(Row {
            columns: Default::default(),
            uri: None,
        });

        assert_eq!(
            listing.selected_uri().unwrap().as_str(),
            "spotify:track:t0"
        );

        listing.set_cursor(1);
        assert_eq!(
            listing.selected_uri(),
            Err(ListingError::MissingIdentifier { row: 1 })
        );
        assert_eq!(
            Listing::new().selected_uri(),
            Err(ListingError::NoSuchRow { row: 0 })
        );
    }

    #[test]
    fn window_centers_cursor_and_sticks_to_edges() {
        let listing = listing_with(20);

        let w = listing.window(5);
        assert_eq!(w.rows.len(), 5);
        assert_eq!(w.selected, Some(0));
        assert_eq!(w.rows[0].columns[0], "track 0");

        listing.set_cursor(10);
        let w = listing.window(5);
        assert_eq!(w.rows[0].columns[0], "track 8");
        assert_eq!(w.selected, Some(2));

        listing.set_cursor(19);
        let w = listing.window(5);
        assert_eq!(w.rows[0].columns[0], "track 15");
        assert_eq!(w.selected, Some(4));
        assert_eq!(w.total, 20);
    }

    #[test]
    fn window_of_empty_listing_selects_nothing() {
        let w = Listing::new().window(10);
        assert!(w.rows.is_empty());
        assert_eq!(w.selected, None);
    }

    #[test]
    fn zero_height_window_copies_no_rows() {
        let listing = listing_with(1000);
        listing.set_cursor(500);

        let w = listing.window(0);
        assert!(w.rows.is_empty());
        assert_eq!(w.selected, None);
        assert_eq!(w.total, 1000);
        assert_eq!(w.cursor, 500);
    }
}
