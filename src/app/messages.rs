use crate::audio::ChannelEvent;
use crate::content::{Chapter, ContentError, Verse};

/// Everything the main loop reacts to. Worker threads only ever send these.
#[derive(Debug)]
pub enum Message {
    /// One line typed on stdin.
    Input(String),
    InputClosed,
    VersesLoaded {
        request: u64,
        result: Result<Vec<Verse>, ContentError>,
    },
    ChaptersLoaded(Result<Vec<Chapter>, ContentError>),
    Channel(ChannelEvent),
    SafeQuit,
}
