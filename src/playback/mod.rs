//! Verse playback orchestration: owned session state, a pure transition
//! function and the applier that drives the audio channel.

mod orchestrator;
mod state;
mod transitions;
mod view;

pub use orchestrator::{BookmarkDraft, Orchestrator};
pub use state::PlaybackRate;
#[cfg(test)]
pub use state::{PlaybackSession, SequenceStatus};
pub use transitions::{PlayerEvent, PlayerNotice};
pub use view::{PlayerView, TransportState, format_time};
