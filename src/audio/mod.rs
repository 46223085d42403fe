//! The single audio output channel driven by the playback orchestrator.
//!
//! Commands are fire-and-forget; everything the channel learns afterwards
//! (position, duration, completion, play outcome) comes back as a
//! [`ChannelEvent`] delivered on the caller's event loop.

mod epoch;
#[cfg(test)]
pub mod fake;
mod rodio_channel;

pub use epoch::LoadEpoch;
pub use rodio_channel::{RodioChannel, RodioChannelOptions};

use thiserror::Error;

/// Generation id of one play request. Only the newest id is current.
pub type PlayRequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayRejection {
    /// A newer pause, source swap or stop overtook the request.
    #[error("play request was interrupted by a newer request")]
    Superseded,
    #[error("playback failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    Progress {
        position: f64,
    },
    MetadataReady {
        duration: f64,
    },
    Ended,
    PlayResolved {
        request: PlayRequestId,
        outcome: Result<(), PlayRejection>,
    },
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio output: {0}")]
    Output(String),
    #[error("failed to fetch audio from {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("failed to decode audio from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Single-stream media output. Exactly one orchestrator owns one channel.
pub trait AudioChannel {
    fn set_source(&mut self, url: &str);

    /// Source most recently assigned with `set_source`.
    fn current_source(&self) -> Option<&str>;

    /// Request playback; resolves later through `ChannelEvent::PlayResolved`.
    fn play(&mut self, request: PlayRequestId);

    fn pause(&mut self);

    fn set_rate(&mut self, multiplier: f32);

    fn seek(&mut self, seconds: f64);

    /// Pause and rewind to the start of the loaded source.
    fn stop(&mut self);
}
