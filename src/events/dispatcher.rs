use std::io;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use log::{debug, error, trace};

use super::command::Command;
use super::control::PlaybackControl;

/// Execute one command against `control`. Remote failures are logged and dropped.
pub fn dispatch<C: PlaybackControl + ?Sized>(control: &C, command: &Command) {
    debug!("dispatching {command}");
    match command {
        Command::PlayUri(uri) => {
            // Resolve first so a malformed identifier never reaches the remote.
            if let Err(err) = uri.track_id() {
                error!("refusing to play {uri}: {err}");
                return;
            }
            if let Err(err) = control.play_uri(uri) {
                error!("request to play URI failed: {err}");
            }
        }
        Command::QueueUri(uri) => match uri.track_id() {
            Ok(id) => {
                if let Err(err) = control.queue(&id) {
                    error!("request to queue URI failed: {err}");
                }
            }
            Err(err) => error!("refusing to queue {uri}: {err}"),
        },
        Command::Play => play(control),
        Command::Pause => pause(control),
        Command::Toggle => match control.current_status() {
            Ok(true) => pause(control),
            Ok(false) => play(control),
            Err(err) => {
                error!("failed to determine playback status, assuming playing: {err}");
                pause(control);
            }
        },
        Command::PlayNext => {
            if let Err(err) = control.next() {
                error!("request to play next failed: {err}");
            }
        }
        Command::PlayPrevious => {
            if let Err(err) = control.previous() {
                error!("request to play previous failed: {err}");
            }
        }
    }
}

fn play<C: PlaybackControl + ?Sized>(control: &C) {
    if let Err(err) = control.play() {
        error!("request to play failed: {err}");
    }
}

fn pause<C: PlaybackControl + ?Sized>(control: &C) {
    if let Err(err) = control.pause() {
        error!("request to pause failed: {err}");
    }
}

/// Thread executing commands in arrival order until every sender is dropped.
pub struct Dispatcher {
    handle: JoinHandle<usize>,
}

impl Dispatcher {
    pub fn spawn<C>(control: C, commands: Receiver<Command>) -> io::Result<Self>
    where
        C: PlaybackControl + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("event-dispatcher".into())
            .spawn(move || {
                let mut handled = 0;
                for command in commands.iter() {
                    dispatch(&control, &command);
                    handled += 1;
                }
                trace!("no more commands, terminating dispatcher");
                handled
            })?;
        Ok(Self { handle })
    }

    /// Wait for the command channel to close and return how many commands ran.
    pub fn join(self) -> usize {
        self.handle.join().unwrap_or_else(|_| {
            error!("event dispatcher panicked");
            0
        })
    }
}
