//! Playback commands issued by the UI and the thread that executes them.

mod command;
mod control;
mod dispatcher;

pub use command::Command;
pub use control::PlaybackControl;
pub use dispatcher::Dispatcher;
