use crate::library::{TrackId, TrackUri};
use crate::spotify::RemoteError;

/// Remote playback surface the dispatcher drives.
///
/// Implementations target the configured device, if any. Calls block until the
/// remote side answered.
pub trait PlaybackControl {
    fn play(&self) -> Result<(), RemoteError>;
    fn pause(&self) -> Result<(), RemoteError>;
    fn play_uri(&self, uri: &TrackUri) -> Result<(), RemoteError>;
    fn queue(&self, id: &TrackId) -> Result<(), RemoteError>;
    fn next(&self) -> Result<(), RemoteError>;
    fn previous(&self) -> Result<(), RemoteError>;
    /// Whether something is currently playing.
    fn current_status(&self) -> Result<bool, RemoteError>;
}
