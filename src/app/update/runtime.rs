use super::super::messages::Message;
use super::super::state::{App, StartRequest};
use super::Effect;
use crate::audio::AudioChannel;
use crate::cache::save_session;
use crate::content::ContentError;
use crate::playback::PlayerEvent;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

impl<C: AudioChannel> App<C> {
    /// Kick off the first chapter load.
    pub fn start(&mut self, start: StartRequest) {
        for effect in self.reduce_start(start) {
            self.run_effect(effect);
        }
    }

    pub(super) fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::FetchVerses {
                request,
                chapter,
                reciter,
            } => {
                let source = Arc::clone(&self.source);
                let sender = self.sender.clone();
                let spawned = thread::Builder::new()
                    .name(format!("fetch-chapter-{chapter}"))
                    .spawn(move || {
                        let result = source.fetch_verses(chapter, &reciter);
                        if sender.send(Message::VersesLoaded { request, result }).is_err() {
                            debug!(request, "Main loop gone before verses arrived");
                        }
                    });
                if let Err(err) = spawned {
                    warn!(request, chapter, "Failed to spawn verse fetch: {err}");
                    let _ = self.sender.send(Message::VersesLoaded {
                        request,
                        result: Err(ContentError::Worker(err.to_string())),
                    });
                }
            }
            Effect::FetchChapters => {
                let source = Arc::clone(&self.source);
                let sender = self.sender.clone();
                let spawned = thread::Builder::new()
                    .name("fetch-chapter-list".to_string())
                    .spawn(move || {
                        let _ = sender.send(Message::ChaptersLoaded(source.fetch_chapters()));
                    });
                if let Err(err) = spawned {
                    warn!("Failed to spawn chapter list fetch: {err}");
                }
            }
            Effect::SaveBookmarks => {
                if let Err(err) = self.bookmarks.save() {
                    warn!("Failed to save bookmarks: {err:#}");
                }
            }
            Effect::SaveSession => {
                if let Some(state) = self.session_state() {
                    save_session(&self.cache_dir, &state);
                }
            }
            Effect::Print(text) => println!("{text}"),
            Effect::QuitSafely => self.quit_safely(),
        }
    }

    fn quit_safely(&mut self) {
        if self.exit_requested {
            return;
        }
        info!("Safe quit requested; stopping playback and saving state");
        self.player.dispatch(PlayerEvent::Close);
        if let Err(err) = self.bookmarks.save() {
            warn!("Failed to save bookmarks on quit: {err:#}");
        }
        if let Some(state) = self.session_state() {
            save_session(&self.cache_dir, &state);
        }
        self.exit_requested = true;
    }
}
