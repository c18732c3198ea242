mod app;
mod config;
mod events;
mod library;
mod listing;
mod logging;
mod pipeline;
mod runtime;
mod spotify;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
