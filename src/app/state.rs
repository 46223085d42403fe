use super::messages::Message;
use crate::audio::AudioChannel;
use crate::bookmarks::BookmarkStore;
use crate::cache::SessionState;
use crate::catalog::{Reciter, builtin_chapters, reciter_or_default};
use crate::config::AppConfig;
use crate::content::{Chapter, VerseSource};
use crate::playback::{Orchestrator, PlaybackRate};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// What to open right after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub chapter: u32,
    pub verse: Option<u32>,
}

/// Shell state around the orchestrator.
pub struct App<C: AudioChannel> {
    pub(super) config: AppConfig,
    pub(super) player: Orchestrator<C>,
    pub(super) source: Arc<dyn VerseSource>,
    pub(super) bookmarks: BookmarkStore,
    pub(super) chapters: Vec<Chapter>,
    pub(super) reciter: Reciter,
    pub(super) sender: Sender<Message>,
    pub(super) cache_dir: PathBuf,
    pub(super) exit_requested: bool,
}

impl<C: AudioChannel> App<C> {
    pub fn new(
        config: AppConfig,
        channel: C,
        source: Arc<dyn VerseSource>,
        sender: Sender<Message>,
    ) -> Self {
        let cache_dir = PathBuf::from(&config.cache_dir);
        let rate = PlaybackRate::from_multiplier(config.playback_rate);
        let player = Orchestrator::new(channel, rate, config.bookmark_preview_chars);
        let reciter = reciter_or_default(&config.reciter_id).clone();
        Self {
            bookmarks: BookmarkStore::open(&cache_dir),
            chapters: builtin_chapters(),
            player,
            source,
            reciter,
            sender,
            cache_dir,
            config,
            exit_requested: false,
        }
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub(super) fn session_state(&self) -> Option<SessionState> {
        let chapter = self.player.session().chapter()?;
        Some(SessionState {
            chapter: chapter.number,
            reciter_id: self.reciter.id.clone(),
            playback_rate: self.player.session().rate().multiplier(),
        })
    }
}
