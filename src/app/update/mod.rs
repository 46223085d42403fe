use super::messages::Message;
use super::state::App;
use crate::audio::AudioChannel;
use crate::catalog::Reciter;

mod commands;
mod reducer;
mod runtime;

pub(in crate::app) use commands::normalize_key;

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Effect {
    FetchVerses {
        request: u64,
        chapter: u32,
        reciter: Reciter,
    },
    FetchChapters,
    SaveBookmarks,
    SaveSession,
    Print(String),
    QuitSafely,
}

impl<C: AudioChannel> App<C> {
    pub fn update(&mut self, message: Message) {
        let effects = self.reduce(message);
        for effect in effects {
            self.run_effect(effect);
        }
    }
}
