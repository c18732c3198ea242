use std::fmt;

use crate::library::TrackUri;

/// A playback request. Every variant maps to exactly one remote action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start playing this track.
    PlayUri(TrackUri),
    /// Append this track to the playback queue.
    QueueUri(TrackUri),
    Play,
    Pause,
    /// Pause when playing, resume otherwise.
    Toggle,
    PlayPrevious,
    PlayNext,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayUri(uri) => write!(f, "PlayUri({uri})"),
            Self::QueueUri(uri) => write!(f, "QueueUri({uri})"),
            Self::Play => f.write_str("Play"),
            Self::Pause => f.write_str("Pause"),
            Self::Toggle => f.write_str("Toggle"),
            Self::PlayPrevious => f.write_str("PlayPrevious"),
            Self::PlayNext => f.write_str("PlayNext"),
        }
    }
}
