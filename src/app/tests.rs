use super::*;
use crate::config::StartPage;
use crate::events::Command;
use crate::library::{Track, TrackUri};
use crate::listing::{Listing, ListingError, ListingSink, Row};

fn t(n: usize) -> Track {
    Track {
        uri: TrackUri::new(format!("spotify:track:id{n}")),
        name: format!("Track {n}"),
        artists: vec!["Artist".into()],
        album: "Album".into(),
        duration_ms: 180_000,
    }
}

fn app_with(n: usize) -> App {
    let listing = Listing::new();
    for i in 0..n {
        listing.append_row(Row::from_track(&t(i)));
    }
    App::new(listing)
}

#[test]
fn new_app_starts_on_listing_while_loading() {
    let app = app_with(0);
    assert_eq!(app.page, Page::Listing);
    assert!(app.loading);
    assert_eq!(app.listing.row_count(), 0);
    assert!(app.logs.is_none());
}

#[test]
fn cursor_moves_stay_within_rows() {
    let mut app = app_with(3);
    app.prev();
    assert_eq!(app.listing.cursor_position(), 0);

    app.next();
    app.next();
    app.next();
    assert_eq!(app.listing.cursor_position(), 2);

    app.go_top();
    assert_eq!(app.listing.cursor_position(), 0);

    app.go_bottom();
    assert_eq!(app.listing.cursor_position(), 2);
}

#[test]
fn paging_moves_by_page_step() {
    let mut app = app_with(50);
    app.page_step = 20;

    app.page_down();
    assert_eq!(app.listing.cursor_position(), 20);
    app.page_down();
    app.page_down();
    assert_eq!(app.listing.cursor_position(), 49);
    app.page_up();
    assert_eq!(app.listing.cursor_position(), 29);

    app.page_step = 0;
    app.page_up();
    assert_eq!(app.listing.cursor_position(), 28);
}

#[test]
fn selection_commands_carry_the_selected_uri() {
    let mut app = app_with(3);
    app.next();

    assert_eq!(
        app.play_selected(),
        Ok(Command::PlayUri(TrackUri::new("spotify:track:id1")))
    );
    assert_eq!(
        app.queue_selected(),
        Ok(Command::QueueUri(TrackUri::new("spotify:track:id1")))
    );
}

#[test]
fn selection_commands_fail_without_identifier() {
    let app = app_with(0);
    assert_eq!(app.play_selected(), Err(ListingError::NoSuchRow { row: 0 }));

    let app = app_with(0);
    app.listing.append_row(Row {
        columns: Default::default(),
        uri: None,
    });
    assert_eq!(
        app.queue_selected(),
        Err(ListingError::MissingIdentifier { row: 0 })
    );
}

#[test]
fn pages_follow_start_page_setting() {
    assert_eq!(Page::from(StartPage::Logs), Page::Logs);
    assert_eq!(Page::from(StartPage::Listing), Page::Listing);

    let mut app = app_with(1);
    app.show_page(Page::Logs);
    assert_eq!(app.page, Page::Logs);
}

#[test]
fn finish_loading_clears_the_flag() {
    let mut app = app_with(1);
    app.finish_loading();
    assert!(!app.loading);
    app.set_status("queued Track 0");
    assert_eq!(app.status.as_deref(), Some("queued Track 0"));
}
