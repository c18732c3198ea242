use std::env;
use std::sync::Arc;

use crossbeam::channel;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{LevelFilter, debug, error, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::events::Dispatcher;
use crate::listing::Listing;
use crate::logging::{self, LogBuffer};
use crate::pipeline::{self, CancelToken, FetchOutcome, FetchPipeline, ListingPipeline, PipelineConfig};
use crate::spotify::SpotifyClient;

mod args;
mod event_loop;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = args::parse(env::args().skip(1))?;
    if args.help {
        print!("{}", args::USAGE);
        return Ok(());
    }

    let mut settings = settings::load_settings();
    args.apply(&mut settings);
    let level = settings.logging.level_filter().unwrap_or(LevelFilter::Error);

    // Without a target device there is nothing to control: list devices instead.
    if settings.spotify.device.is_none() {
        logging::install_stderr(level, settings.logging.color);
        let client = startup::connect(&settings)?;
        startup::list_devices(&client)?;
        return Ok(());
    }

    let logs = logging::install_buffer(level, settings.logging.capacity)?;
    let client = startup::connect(&settings)?;
    run_tui(&settings, client, logs)
}

fn run_tui(
    settings: &config::Settings,
    client: SpotifyClient,
    logs: Arc<LogBuffer>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::from(&settings.pipeline);
    let cancel = CancelToken::new();

    let (queue_tx, queue_rx) = pipeline::track_queue(config.fetching_buffer);
    let fetch = FetchPipeline::spawn(
        client.clone(),
        queue_tx,
        queue_rx.clone(),
        &config,
        cancel.clone(),
    )?;

    let (command_tx, command_rx) = channel::unbounded();
    let dispatcher = Dispatcher::spawn(client, command_rx)?;

    // Blocks until the first `load_eager` tracks are listed.
    let listing = Listing::new();
    let loader = ListingPipeline::start(listing.clone(), queue_rx, &config, cancel.clone())?;
    debug!("{} tracks loaded before start", loader.eager_loaded());

    let mut app = App::new(listing);
    app.page = settings.ui.start_page.into();
    app.page_step = settings.ui.page_step;
    app.set_logs(logs);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();
        event_loop::run(
            &mut terminal,
            settings,
            &mut app,
            &loader,
            &command_tx,
            &cancel,
            &mut state,
        )
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Wind everything down even if the UI failed.
    cancel.cancel();
    drop(command_tx);
    let report = loader.wait();
    let outcome = fetch.wait();
    let handled = dispatcher.join();
    debug!(
        "listing {:?} after {} rows, {} commands handled",
        report.outcome, report.appended, handled
    );

    run_result?;
    match outcome {
        FetchOutcome::Complete { tracks } => {
            debug!("fetched all {tracks} saved tracks");
            Ok(())
        }
        FetchOutcome::Cancelled { tracks } => {
            debug!("fetching stopped after {tracks} saved tracks");
            Ok(())
        }
        FetchOutcome::Truncated { tracks, error } => {
            // The log buffer is gone with the UI, so say it on stderr too.
            warn!("saved tracks truncated after {tracks}: {error}");
            eprintln!("nspotify: only {tracks} saved tracks were loaded: {error}");
            Ok(())
        }
        FetchOutcome::Fatal(err) => {
            error!("could not fetch saved tracks: {err}");
            Err(err.into())
        }
        FetchOutcome::WorkerPanicked => Err("fetch worker panicked".into()),
    }
}
